use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{
    dsp::{
        amplify::{hard_clip, sum_in_place},
        automation::Automation,
    },
    graph::{
        gain::GainStage,
        node::{GraphNode, RenderCtx},
    },
    synth::message::{GraphCommand, NodeId, OwnerId},
    MAX_BLOCK_SIZE,
};

/*
Mixer
=====

The mixer is the only thing the audio thread runs. It owns every live layer
node, sums them through their gain stages into the master bus, and applies the
master gain.

  control thread                         audio thread
  ──────────────                         ────────────
  MixerHandle::send ──[command ring]──→ Mixer::render
  MixerHandle::collect ←─[retired ring]── (removed slots)

Nothing on the audio side allocates or frees memory once the mixer is built:

  - Slots live in a Vec allocated once for the configured slot count. A Connect
    beyond that count is refused and the node is handed straight back.
  - `beds` of those slots are kept for continuous nodes. One-shots may only
    fill the rest, so a burst of crackles can never crowd out a bed:

      ┌───────────── slots ─────────────┐
      │ one-shots (slots - beds) │ beds │
      └─────────────────────────────────┘
  - Removed slots are pushed onto the retired ring and dropped by the control
    side the next time it sends a command.

Output is clamped to [-1, 1] after the master gain.
*/

/// Capacity of the render side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerSettings {
    /// Maximum number of simultaneously connected nodes.
    pub slots: usize,
    /// Slots only continuous nodes may use.
    pub beds: usize,
    /// Depth of the command ring buffer.
    pub command_queue: usize,
}

impl MixerSettings {
    /// Slots left over for one-shots.
    pub fn one_shots(&self) -> usize {
        self.slots.saturating_sub(self.beds)
    }

    /// Ring space one-shot connects must leave free for control commands.
    pub fn control_reserve(&self) -> usize {
        self.command_queue / 4
    }
}

impl Default for MixerSettings {
    fn default() -> Self {
        Self {
            slots: 64,
            beds: 16,
            command_queue: 256,
        }
    }
}

struct Slot {
    id: NodeId,
    owner: OwnerId,
    transient: bool,
    node: Box<dyn GraphNode>,
    gain: GainStage,
}

/// Node and gain stage removed from the mixer, waiting to be dropped.
pub struct Retired {
    pub id: NodeId,
    pub label: &'static str,
    node: Box<dyn GraphNode>,
    gain: GainStage,
}

impl Retired {
    /// Release the node on the calling thread.
    pub fn release(self) {
        drop(self.node);
        drop(self.gain);
    }
}

/// Control-side end of a mixer.
pub struct MixerHandle {
    commands: Producer<GraphCommand>,
    retired: Consumer<Retired>,
}

impl MixerHandle {
    /// Queue a command for the next render block.
    ///
    /// Returns the command back if the ring is full.
    pub fn send(&mut self, command: GraphCommand) -> Result<(), GraphCommand> {
        self.collect();
        match self.commands.push(command) {
            Ok(()) => Ok(()),
            Err(PushError::Full(command)) => Err(command),
        }
    }

    /// Free space in the command ring. Never more than the render side will
    /// actually accept.
    pub fn free(&self) -> usize {
        self.commands.slots()
    }

    /// Drop nodes the mixer has finished with. Returns how many were freed.
    pub fn collect(&mut self) -> usize {
        let mut freed = 0;
        while let Ok(retired) = self.retired.pop() {
            retired.release();
            freed += 1;
        }
        freed
    }
}

/// Render-side bus.
pub struct Mixer {
    slots: Vec<Slot>,
    labels: Vec<&'static str>,
    capacity: usize,
    one_shots: usize,
    master: Automation,
    commands: Consumer<GraphCommand>,
    retired: Producer<Retired>,
    scratch: Vec<f32>,
    refused: u64,
}

impl Mixer {
    /// Build a mixer and its control handle. The master gain starts at
    /// `master_volume`.
    pub fn new(settings: MixerSettings, master_volume: f32) -> (Mixer, MixerHandle) {
        let slots = settings.slots.max(1);
        let (command_tx, command_rx) = RingBuffer::new(settings.command_queue.max(1));
        // Room for every slot plus every command's payload
        let (retired_tx, retired_rx) = RingBuffer::new(slots + settings.command_queue.max(1));

        let mixer = Mixer {
            slots: Vec::with_capacity(slots),
            labels: Vec::with_capacity(slots),
            capacity: slots,
            one_shots: settings.one_shots().min(slots),
            master: Automation::new(master_volume),
            commands: command_rx,
            retired: retired_tx,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
            refused: 0,
        };
        let handle = MixerHandle {
            commands: command_tx,
            retired: retired_rx,
        };
        (mixer, handle)
    }

    /// Number of connected nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether a node with this id is connected.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Labels of connected nodes, in slot order.
    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    /// Current master gain.
    pub fn master_gain(&self) -> f32 {
        self.master.value()
    }

    /// Connects refused because every slot was taken.
    pub fn refused(&self) -> u64 {
        self.refused
    }

    /// Apply every queued command.
    pub fn process_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: GraphCommand) {
        match command {
            GraphCommand::Connect {
                id,
                owner,
                label,
                transient,
                node,
                gain,
            } => {
                let full = if transient {
                    self.slots.iter().filter(|slot| slot.transient).count() >= self.one_shots
                } else {
                    self.slots.len() >= self.capacity
                };
                if full {
                    self.refused += 1;
                    self.retire(Retired {
                        id,
                        label,
                        node,
                        gain,
                    });
                    return;
                }
                self.slots.push(Slot {
                    id,
                    owner,
                    transient,
                    node,
                    gain,
                });
                self.labels.push(label);
            }
            GraphCommand::Fade {
                id,
                target,
                seconds,
            } => {
                if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == id) {
                    slot.gain.fade_to(target, seconds);
                }
            }
            GraphCommand::FadeTransients { owner, seconds } => {
                for slot in self
                    .slots
                    .iter_mut()
                    .filter(|slot| slot.transient && slot.owner == owner)
                {
                    slot.gain.fade_to(0.0, seconds);
                }
            }
            GraphCommand::Disconnect { id } => {
                if let Some(index) = self.slots.iter().position(|slot| slot.id == id) {
                    self.remove(index);
                }
            }
            GraphCommand::SetMasterVolume { volume, seconds } => {
                self.master.ramp_from_now(volume, seconds as f64);
            }
        }
    }

    fn remove(&mut self, index: usize) {
        let slot = self.slots.swap_remove(index);
        let label = self.labels.swap_remove(index);
        self.retire(Retired {
            id: slot.id,
            label,
            node: slot.node,
            gain: slot.gain,
        });
    }

    fn retire(&mut self, retired: Retired) {
        // Sized so this cannot fill; if it ever does the node is dropped here
        let _ = self.retired.push(retired);
    }

    /// Render one buffer of mono output.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.process_commands();

        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_block(block, ctx);
        }
    }

    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);

        for slot in &mut self.slots {
            let buffer = &mut self.scratch[..out.len()];
            buffer.fill(0.0);
            slot.node.render_block(buffer, ctx);
            slot.gain.apply(buffer, ctx);
            sum_in_place(out, buffer);
        }

        // Free one-shots that have run their course
        let mut index = 0;
        while index < self.slots.len() {
            let slot = &self.slots[index];
            let finished = slot.transient && (!slot.node.is_active() || slot.gain.is_silent());
            if finished {
                self.remove(index);
            } else {
                index += 1;
            }
        }

        self.master.apply(out, ctx.sample_rate);
        hard_clip(out, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{envelope::EnvNode, oscillator::OscNode};

    struct Dc(f32);

    impl GraphNode for Dc {
        fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
            out.fill(self.0);
        }
    }

    fn ctx() -> RenderCtx {
        RenderCtx::new(1_000.0)
    }

    fn connect(id: u64, level: f32, gain: GainStage) -> GraphCommand {
        GraphCommand::Connect {
            id: NodeId(id),
            owner: OwnerId(1),
            label: "dc",
            transient: false,
            node: Box::new(Dc(level)),
            gain,
        }
    }

    #[test]
    fn sums_nodes_through_master() {
        let (mut mixer, mut handle) = Mixer::new(MixerSettings::default(), 0.5);
        assert!(handle.send(connect(1, 0.2, GainStage::unity())).is_ok());
        assert!(handle.send(connect(2, 0.4, GainStage::new(0.5))).is_ok());

        let mut out = vec![0.0; 32];
        mixer.render(&mut out, &ctx());

        assert_eq!(mixer.len(), 2);
        assert!(out.iter().all(|s| (*s - 0.2).abs() < 1e-6));
    }

    #[test]
    fn disconnect_retires_to_control_side() {
        let (mut mixer, mut handle) = Mixer::new(MixerSettings::default(), 1.0);
        assert!(handle.send(connect(7, 0.1, GainStage::unity())).is_ok());
        mixer.process_commands();
        assert!(mixer.contains(NodeId(7)));

        assert!(handle.send(GraphCommand::Disconnect { id: NodeId(7) }).is_ok());
        assert!(handle.send(GraphCommand::Disconnect { id: NodeId(7) }).is_ok());
        mixer.process_commands();

        assert!(mixer.is_empty());
        assert_eq!(handle.collect(), 1);
    }

    #[test]
    fn output_is_clamped() {
        let (mut mixer, mut handle) = Mixer::new(MixerSettings::default(), 1.0);
        assert!(handle.send(connect(1, 0.9, GainStage::unity())).is_ok());
        assert!(handle.send(connect(2, 0.9, GainStage::unity())).is_ok());

        let mut out = vec![0.0; 16];
        mixer.render(&mut out, &ctx());
        assert!(out.iter().all(|s| *s == 1.0));
    }

    #[test]
    fn master_volume_ramps() {
        let (mut mixer, mut handle) = Mixer::new(MixerSettings::default(), 1.0);
        assert!(handle.send(connect(1, 0.5, GainStage::unity())).is_ok());
        assert!(handle
            .send(GraphCommand::SetMasterVolume {
                volume: 0.0,
                seconds: 0.1,
            })
            .is_ok());

        let mut out = vec![0.0; 200];
        mixer.render(&mut out, &ctx());

        assert!((out[50] - 0.25).abs() < 0.01);
        assert!(out[101..].iter().all(|s| *s == 0.0));
        assert_eq!(mixer.master_gain(), 0.0);
    }

    #[test]
    fn finished_transients_are_freed() {
        let (mut mixer, mut handle) = Mixer::new(MixerSettings::default(), 1.0);
        let chirp = crate::graph::extensions::NodeExt::amplify(
            OscNode::sine(100.0).stop_after(0.05),
            EnvNode::new(|env| {
                env.set_value_at(0.5, 0.0);
            }),
        );
        let sent = handle.send(GraphCommand::Connect {
            id: NodeId(3),
            owner: OwnerId(1),
            label: "chirp",
            transient: true,
            node: Box::new(chirp),
            gain: GainStage::unity(),
        });
        assert!(sent.is_ok());

        let mut out = vec![0.0; 100];
        mixer.render(&mut out, &ctx());

        assert!(mixer.is_empty());
        assert_eq!(handle.collect(), 1);
    }

    #[test]
    fn fade_transients_only_touches_owner() {
        let (mut mixer, mut handle) = Mixer::new(MixerSettings::default(), 1.0);
        for (id, owner, transient) in [(1, 1, true), (2, 2, true), (3, 1, false)] {
            let sent = handle.send(GraphCommand::Connect {
                id: NodeId(id),
                owner: OwnerId(owner),
                label: "dc",
                transient,
                node: Box::new(Dc(0.1)),
                gain: GainStage::unity(),
            });
            assert!(sent.is_ok());
        }
        assert!(handle
            .send(GraphCommand::FadeTransients {
                owner: OwnerId(1),
                seconds: 0.0,
            })
            .is_ok());

        let mut out = vec![0.0; 8];
        mixer.render(&mut out, &ctx());

        assert!(!mixer.contains(NodeId(1)));
        assert!(mixer.contains(NodeId(2)));
        assert!(mixer.contains(NodeId(3)));
    }

    #[test]
    fn refuses_connect_when_full() {
        let settings = MixerSettings {
            slots: 1,
            beds: 1,
            command_queue: 8,
        };
        let (mut mixer, mut handle) = Mixer::new(settings, 1.0);
        assert!(handle.send(connect(1, 0.1, GainStage::unity())).is_ok());
        assert!(handle.send(connect(2, 0.1, GainStage::unity())).is_ok());
        mixer.process_commands();

        assert_eq!(mixer.len(), 1);
        assert_eq!(mixer.refused(), 1);
        assert_eq!(handle.collect(), 1);
    }

    fn one_shot(id: u64) -> GraphCommand {
        GraphCommand::Connect {
            id: NodeId(id),
            owner: OwnerId(1),
            label: "pop",
            transient: true,
            node: Box::new(Dc(0.1)),
            gain: GainStage::unity(),
        }
    }

    #[test]
    fn one_shots_cannot_take_bed_slots() {
        let settings = MixerSettings {
            slots: 4,
            beds: 2,
            command_queue: 16,
        };
        let (mut mixer, mut handle) = Mixer::new(settings, 1.0);
        for id in 1..=5 {
            assert!(handle.send(one_shot(id)).is_ok());
        }
        assert!(handle.send(connect(10, 0.1, GainStage::unity())).is_ok());
        assert!(handle.send(connect(11, 0.1, GainStage::unity())).is_ok());
        mixer.process_commands();

        assert_eq!(mixer.len(), 4);
        assert_eq!(mixer.refused(), 3);
        assert!(mixer.contains(NodeId(10)));
        assert!(mixer.contains(NodeId(11)));
    }

    #[test]
    fn free_space_tracks_the_ring() {
        let settings = MixerSettings {
            command_queue: 8,
            ..MixerSettings::default()
        };
        let (mut mixer, mut handle) = Mixer::new(settings, 1.0);
        assert_eq!(handle.free(), 8);
        assert_eq!(settings.control_reserve(), 2);

        assert!(handle.send(one_shot(1)).is_ok());
        assert!(handle.send(one_shot(2)).is_ok());
        assert_eq!(handle.free(), 6);

        mixer.process_commands();
        assert_eq!(handle.free(), 8);
    }
}
