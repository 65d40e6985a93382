use crate::{
    dsp::automation::Automation,
    graph::node::{GraphNode, RenderCtx},
};

/// Gain envelope node.
///
/// Renders its automation timeline as a control signal. Combine it with a
/// source through `.amplify()` to shape a one-shot:
///
/// ```ignore
/// OscNode::sine(800.0).amplify(EnvNode::new(|env| {
///     env.set_value_at(0.0, 0.0)
///         .linear_ramp_to(0.3, 0.05)
///         .linear_ramp_to(0.0, 0.4);
/// }))
/// ```
pub struct EnvNode {
    env: Automation,
}

impl EnvNode {
    pub fn new(schedule: impl FnOnce(&mut Automation)) -> Self {
        let mut env = Automation::new(0.0);
        schedule(&mut env);
        Self { env }
    }

    /// Current envelope level.
    pub fn level(&self) -> f32 {
        self.env.value()
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.env.render(out, ctx.sample_rate);
    }

    /// Finished once the timeline has settled at silence.
    fn is_active(&self) -> bool {
        !(self.env.is_settled() && self.env.value() == 0.0)
    }
}
