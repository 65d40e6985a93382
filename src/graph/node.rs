/// Context passed to graph nodes during rendering
///
/// Ambient layers are unpitched and free-running, so the only thing a node
/// needs from the outside is the device sample rate.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    /// Length of one sample in seconds.
    #[inline]
    pub fn dt(&self) -> f64 {
        1.0 / self.sample_rate as f64
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes render mono blocks in place. Sources overwrite `out`; processors
/// (filters, gains) transform whatever is already there.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node is still producing sound
    ///
    /// Continuous beds never finish. One-shots return false once their stop
    /// time has passed, which lets the mixer free them.
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
