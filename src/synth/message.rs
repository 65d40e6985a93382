use std::fmt;

use crate::graph::{gain::GainStage, node::GraphNode};

/// Handle under which the mixer holds a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Atmosphere generation a node was connected for.
///
/// Bumped on every atmosphere build, so teardown can reach one-shots that
/// were fired for the old atmosphere without tracking each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OwnerId(pub u64);

impl OwnerId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Control-plane to render-plane commands.
pub enum GraphCommand {
    /// Start rendering `node` through `gain` into the master bus.
    ///
    /// Transient nodes are freed by the mixer once they report inactive;
    /// everything else stays until disconnected.
    Connect {
        id: NodeId,
        owner: OwnerId,
        label: &'static str,
        transient: bool,
        node: Box<dyn GraphNode>,
        gain: GainStage,
    },
    /// Ramp a node's gain stage to `target` over `seconds`.
    Fade {
        id: NodeId,
        target: f32,
        seconds: f32,
    },
    /// Fade every transient of `owner` to silence.
    FadeTransients { owner: OwnerId, seconds: f32 },
    /// Remove a node. Unknown ids are ignored.
    Disconnect { id: NodeId },
    /// Ramp the master gain linearly to `volume`.
    SetMasterVolume { volume: f32, seconds: f32 },
}

impl GraphCommand {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            GraphCommand::Connect { .. } => "connect",
            GraphCommand::Fade { .. } => "fade",
            GraphCommand::FadeTransients { .. } => "fade-transients",
            GraphCommand::Disconnect { .. } => "disconnect",
            GraphCommand::SetMasterVolume { .. } => "set-master-volume",
        }
    }

    /// Copy of a control command, kept so a rejected send can be retried.
    /// `None` for `Connect`, which owns its node.
    pub fn duplicate(&self) -> Option<GraphCommand> {
        match *self {
            GraphCommand::Connect { .. } => None,
            GraphCommand::Fade {
                id,
                target,
                seconds,
            } => Some(GraphCommand::Fade {
                id,
                target,
                seconds,
            }),
            GraphCommand::FadeTransients { owner, seconds } => {
                Some(GraphCommand::FadeTransients { owner, seconds })
            }
            GraphCommand::Disconnect { id } => Some(GraphCommand::Disconnect { id }),
            GraphCommand::SetMasterVolume { volume, seconds } => {
                Some(GraphCommand::SetMasterVolume { volume, seconds })
            }
        }
    }
}

impl fmt::Debug for GraphCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphCommand::Connect {
                id,
                owner,
                label,
                transient,
                gain,
                ..
            } => f
                .debug_struct("Connect")
                .field("id", id)
                .field("owner", owner)
                .field("label", label)
                .field("transient", transient)
                .field("base_gain", &gain.base())
                .finish_non_exhaustive(),
            GraphCommand::Fade {
                id,
                target,
                seconds,
            } => f
                .debug_struct("Fade")
                .field("id", id)
                .field("target", target)
                .field("seconds", seconds)
                .finish(),
            GraphCommand::FadeTransients { owner, seconds } => f
                .debug_struct("FadeTransients")
                .field("owner", owner)
                .field("seconds", seconds)
                .finish(),
            GraphCommand::Disconnect { id } => {
                f.debug_struct("Disconnect").field("id", id).finish()
            }
            GraphCommand::SetMasterVolume { volume, seconds } => f
                .debug_struct("SetMasterVolume")
                .field("volume", volume)
                .field("seconds", seconds)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::RenderCtx;

    struct Hum;

    impl GraphNode for Hum {
        fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
            out.fill(0.1);
        }
    }

    #[test]
    fn control_commands_can_be_duplicated() {
        let fade = GraphCommand::Fade {
            id: NodeId(4),
            target: 0.0,
            seconds: 0.5,
        };
        let copy = fade.duplicate().unwrap();
        assert_eq!(copy.name(), "fade");
        assert_eq!(format!("{copy:?}"), format!("{fade:?}"));

        let connect = GraphCommand::Connect {
            id: NodeId(5),
            owner: OwnerId(1),
            label: "hum",
            transient: false,
            node: Box::new(Hum),
            gain: GainStage::unity(),
        };
        assert!(connect.duplicate().is_none());
    }
}
