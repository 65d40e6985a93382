use crate::graph::{amplify::Amplify, node::GraphNode, through::Through};

/// Fluent chaining for layer recipes.
///
/// ```ignore
/// NoiseNode::once(white)
///     .through(FilterNode::bandpass(3_000.0).with_q(5.0))
///     .amplify(EnvNode::new(|env| { env.linear_ramp_to(0.0, 0.01); }))
///     .boxed()
/// ```
pub trait NodeExt: GraphNode + Sized {
    /// Multiply by a control signal, usually an envelope.
    fn amplify<M: GraphNode>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    /// Feed this node into a processor such as a filter.
    fn through<F: GraphNode>(self, filter: F) -> Through<Self, F> {
        Through::new(self, filter)
    }

    /// Erase the type so the node can cross the command ring.
    fn boxed(self) -> Box<dyn GraphNode>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<T: GraphNode> NodeExt for T {}
