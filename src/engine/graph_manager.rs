use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{runtime::Handle, time::sleep};
use tracing::{debug, error, info, warn};

use crate::{
    config::{clamp_volume, EngineConfig},
    graph::{gain::GainStage, node::GraphNode},
    io::{DeviceInfo, DeviceState, OutputBackend},
    lock,
    synth::{
        message::{GraphCommand, NodeId, OwnerId},
        mixer::MixerSettings,
    },
};

/// Graph manager shared between the engine and its scheduler tasks.
pub type SharedGraph = Arc<Mutex<GraphManager>>;

/// How often deferred control commands are retried.
pub const FLUSH_RETRY: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    Pending,
    Active(DeviceInfo),
    /// Opening the output failed. Never retried.
    Failed,
}

/// Owns the output backend and the master gain.
///
/// Activation is lazy: nothing touches the device until `init()`. Before that,
/// volume changes are only remembered and applied when the output opens.
///
/// Control commands (fades, disconnects, master volume) are never dropped.
/// When the output's command queue is full they wait in `pending`, in order,
/// and are retried by `flush`. A node stays in `connected` until its
/// disconnect has actually been handed to the output. One-shots are only
/// fired while the output is running and its queue has room to spare, so
/// they cannot crowd out control traffic.
pub struct GraphManager {
    backend: Box<dyn OutputBackend>,
    activation: Activation,
    volume: f32,
    volume_ramp: f32,
    settings: MixerSettings,
    next_id: u64,
    connected: HashSet<NodeId>,
    pending: VecDeque<GraphCommand>,
    flushing: bool,
}

impl GraphManager {
    pub fn new(backend: impl OutputBackend + 'static, config: &EngineConfig) -> Self {
        Self {
            backend: Box::new(backend),
            activation: Activation::Pending,
            volume: clamp_volume(config.initial_volume),
            volume_ramp: config.volume_ramp,
            settings: config.mixer_settings(),
            next_id: 0,
            connected: HashSet::new(),
            pending: VecDeque::new(),
            flushing: false,
        }
    }

    pub fn into_shared(self) -> SharedGraph {
        Arc::new(Mutex::new(self))
    }

    /// Adopt a new configuration. Mixer settings and the initial volume only
    /// apply while the output is still unopened.
    pub fn configure(&mut self, config: &EngineConfig) {
        self.volume_ramp = config.volume_ramp;
        if self.activation == Activation::Pending {
            self.settings = config.mixer_settings();
            self.volume = clamp_volume(config.initial_volume);
        }
    }

    /// Open the output on first call. Returns whether the output is usable.
    pub fn init(&mut self) -> bool {
        match self.activation {
            Activation::Active(_) => return true,
            Activation::Failed => return false,
            Activation::Pending => {}
        }

        match self.backend.open(self.settings) {
            Ok(device) => {
                info!(
                    device = %device.name,
                    sample_rate = device.sample_rate,
                    "ambient output activated"
                );
                self.activation = Activation::Active(device);
                self.send_control(GraphCommand::SetMasterVolume {
                    volume: self.volume,
                    seconds: 0.0,
                });
                true
            }
            Err(e) => {
                error!(error = %e, "failed to initialize ambient output");
                self.activation = Activation::Failed;
                false
            }
        }
    }

    /// Resume the output if it is suspended.
    pub fn resume(&mut self) {
        if !self.is_active() || self.backend.state() != DeviceState::Suspended {
            return;
        }
        match self.backend.resume() {
            Ok(()) => debug!("ambient output resumed"),
            Err(e) => error!(error = %e, "failed to resume ambient output"),
        }
    }

    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    pub fn is_active(&self) -> bool {
        matches!(self.activation, Activation::Active(_))
    }

    pub fn is_failed(&self) -> bool {
        self.activation == Activation::Failed
    }

    pub fn device_state(&self) -> DeviceState {
        self.backend.state()
    }

    /// Sample rate of the open output.
    pub fn sample_rate(&self) -> Option<f32> {
        match &self.activation {
            Activation::Active(device) => Some(device.sample_rate),
            _ => None,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Clamp and store `volume`, ramping the master gain to it.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        self.send_control(GraphCommand::SetMasterVolume {
            volume: self.volume,
            seconds: self.volume_ramp,
        });
    }

    /// Connect a continuous node. It stays until `disconnect`.
    ///
    /// Refused once every bed slot is taken, so the mixer never has to turn
    /// a bed away.
    pub fn connect(
        &mut self,
        owner: OwnerId,
        label: &'static str,
        node: Box<dyn GraphNode>,
        gain: GainStage,
    ) -> Option<NodeId> {
        if self.connected.len() >= self.settings.beds {
            warn!(label, beds = self.settings.beds, "no bed slot free, connect refused");
            return None;
        }
        let id = self.connect_node(owner, label, node, gain, false)?;
        self.connected.insert(id);
        Some(id)
    }

    /// Whether a one-shot fired now would reach a running output without
    /// eating into the room kept for control commands.
    pub fn can_trigger(&self) -> bool {
        self.is_active()
            && self.backend.state() == DeviceState::Running
            && self.pending.is_empty()
            && self
                .backend
                .free_commands()
                .map_or(true, |free| free > self.settings.control_reserve())
    }

    /// Fire a self-terminating one-shot. The mixer frees it when it finishes.
    pub fn trigger(
        &mut self,
        owner: OwnerId,
        label: &'static str,
        node: Box<dyn GraphNode>,
    ) -> Option<NodeId> {
        if !self.can_trigger() {
            debug!(label, "one-shot skipped");
            return None;
        }
        self.connect_node(owner, label, node, GainStage::unity(), true)
    }

    fn connect_node(
        &mut self,
        owner: OwnerId,
        label: &'static str,
        node: Box<dyn GraphNode>,
        gain: GainStage,
        transient: bool,
    ) -> Option<NodeId> {
        if !self.is_active() {
            return None;
        }
        // Connects must not overtake a deferred disconnect
        if !self.flush() {
            warn!(label, pending = self.pending.len(), "output busy, connect skipped");
            return None;
        }
        self.next_id += 1;
        let id = NodeId(self.next_id);
        debug!(id = id.0, owner = owner.0, label, transient, "connect");

        let command = GraphCommand::Connect {
            id,
            owner,
            label,
            transient,
            node,
            gain,
        };
        match self.backend.submit(command) {
            Ok(()) => Some(id),
            Err(e) => {
                warn!(error = %e, label, "connect dropped");
                None
            }
        }
    }

    /// Ramp a connected node's gain stage to silence.
    pub fn fade(&mut self, id: NodeId, seconds: f32) {
        if self.connected.contains(&id) {
            self.send_control(GraphCommand::Fade {
                id,
                target: 0.0,
                seconds,
            });
        }
    }

    /// Fade every in-flight one-shot of `owner`.
    pub fn fade_transients(&mut self, owner: OwnerId, seconds: f32) {
        self.send_control(GraphCommand::FadeTransients { owner, seconds });
    }

    /// Remove a connected node. Unknown or already removed ids are ignored.
    pub fn disconnect(&mut self, id: NodeId) {
        if !self.connected.contains(&id) || self.disconnect_pending(id) {
            return;
        }
        debug!(id = id.0, "disconnect");
        self.send_control(GraphCommand::Disconnect { id });
    }

    fn disconnect_pending(&self, id: NodeId) -> bool {
        self.pending
            .iter()
            .any(|command| matches!(command, GraphCommand::Disconnect { id: queued } if *queued == id))
    }

    /// Whether `id` is connected. Stays true until its disconnect has been
    /// handed to the output.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.connected.contains(&id)
    }

    /// Number of continuous nodes currently connected.
    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    /// Control commands waiting for room in the output's queue.
    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn send_control(&mut self, command: GraphCommand) {
        if !self.is_active() {
            return;
        }
        let was_clear = self.pending.is_empty();
        self.pending.push_back(command);
        if !self.flush() && was_clear {
            warn!(
                pending = self.pending.len(),
                "output command queue full, deferring control commands"
            );
        }
    }

    /// Hand deferred control commands to the output, oldest first. Returns
    /// whether the queue is empty afterwards.
    pub fn flush(&mut self) -> bool {
        while let Some(command) = self.pending.pop_front() {
            let retry = command.duplicate();
            let disconnect = match command {
                GraphCommand::Disconnect { id } => Some(id),
                _ => None,
            };
            match self.backend.submit(command) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "graph command dropped");
                }
                Err(e) => {
                    debug!(error = %e, pending = self.pending.len() + 1, "graph command deferred");
                    if let Some(retry) = retry {
                        self.pending.push_front(retry);
                    }
                    return false;
                }
            }
            if let Some(id) = disconnect {
                self.connected.remove(&id);
            }
        }
        true
    }
}

/// Keep retrying deferred control commands in the background until they are
/// all delivered. No-op when nothing is deferred, when a retry task is
/// already running, or outside a tokio runtime.
pub fn spawn_flush(graph: &SharedGraph) {
    let mut manager = lock(graph);
    if manager.pending.is_empty() || manager.flushing {
        return;
    }
    let Ok(runtime) = Handle::try_current() else {
        return;
    };
    manager.flushing = true;

    let weak = Arc::downgrade(graph);
    runtime.spawn(async move {
        loop {
            sleep(FLUSH_RETRY).await;
            let delivered = {
                let Some(graph) = weak.upgrade() else {
                    return;
                };
                let mut manager = lock(&graph);
                let delivered = manager.flush();
                if delivered {
                    manager.flushing = false;
                }
                delivered
            };
            if delivered {
                debug!("deferred control commands delivered");
                return;
            }
        }
    });
}
