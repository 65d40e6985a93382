use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    catalog::LayerDescriptor,
    config::EngineConfig,
    dsp::noise::{NoiseBuffer, NoiseGenerator, NoiseKind},
    engine::{
        graph_manager::SharedGraph,
        scheduler::{ActiveSchedule, Cadence, EventScheduler, Shot},
    },
    graph::{gain::GainStage, node::GraphNode},
    lock,
    random::SharedRandom,
    synth::message::{NodeId, OwnerId},
    voices,
};

/// A continuous node connected on behalf of an atmosphere.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSource {
    pub id: NodeId,
    pub label: &'static str,
    pub owner: OwnerId,
    /// Whether the gain stage carries an LFO.
    pub modulated: bool,
}

/// Everything one layer left running.
#[derive(Default)]
pub struct LayerHandles {
    pub sources: Vec<ActiveSource>,
    pub schedules: Vec<ActiveSchedule>,
}

impl LayerHandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `source` if it was connected.
    pub fn source(mut self, source: Option<ActiveSource>) -> Self {
        self.sources.extend(source);
        self
    }

    pub fn schedule(mut self, schedule: ActiveSchedule) -> Self {
        self.schedules.push(schedule);
        self
    }

    pub fn extend(&mut self, other: LayerHandles) {
        self.sources.extend(other.sources);
        self.schedules.extend(other.schedules);
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.schedules.is_empty()
    }
}

/// What a builder gets to wire its layer with.
pub struct LayerContext<'a> {
    graph: &'a SharedGraph,
    random: &'a SharedRandom,
    scheduler: &'a EventScheduler,
    config: &'a EngineConfig,
    owner: OwnerId,
    noise: NoiseGenerator,
}

impl<'a> LayerContext<'a> {
    pub fn new(
        graph: &'a SharedGraph,
        random: &'a SharedRandom,
        scheduler: &'a EventScheduler,
        config: &'a EngineConfig,
        owner: OwnerId,
        sample_rate: f32,
    ) -> Self {
        Self {
            graph,
            random,
            scheduler,
            config,
            owner,
            noise: NoiseGenerator::new(sample_rate),
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn sample_rate(&self) -> f32 {
        self.noise.sample_rate()
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    pub fn noise(&self, kind: NoiseKind, seconds: f32) -> NoiseBuffer {
        let mut random = lock(self.random);
        self.noise.create(kind, seconds, &mut **random)
    }

    /// A buffer the length of the configured bed loop.
    pub fn loop_noise(&self, kind: NoiseKind) -> NoiseBuffer {
        self.noise(kind, self.config.noise_loop)
    }

    /// Connect a continuous bed that fades in to `level`.
    pub fn bed(
        &self,
        label: &'static str,
        node: impl GraphNode + 'static,
        level: f32,
    ) -> Option<ActiveSource> {
        self.connect(label, node, GainStage::fading_in(level, self.config.fade_in))
    }

    /// Connect a continuous node through an explicit gain stage.
    pub fn connect(
        &self,
        label: &'static str,
        node: impl GraphNode + 'static,
        gain: GainStage,
    ) -> Option<ActiveSource> {
        let modulated = gain.is_modulated();
        let id = lock(self.graph).connect(self.owner, label, Box::new(node), gain)?;
        Some(ActiveSource {
            id,
            label,
            owner: self.owner,
            modulated,
        })
    }

    /// Register a recurring one-shot trigger.
    pub fn schedule<F>(&self, label: &'static str, cadence: Cadence, build: F) -> ActiveSchedule
    where
        F: FnMut(&mut Shot<'_>) -> Box<dyn GraphNode> + Send + 'static,
    {
        self.scheduler.schedule(self.owner, label, cadence, build)
    }
}

/// Wires one kind of layer.
pub trait LayerBuilder: Send + Sync {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles;
}

impl<F> LayerBuilder for F
where
    F: Fn(&LayerContext<'_>, &LayerDescriptor) -> LayerHandles + Send + Sync,
{
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        self(ctx, layer)
    }
}

/// Layer kind → builder.
#[derive(Default)]
pub struct LayerRegistry {
    builders: HashMap<String, Box<dyn LayerBuilder>>,
}

impl LayerRegistry {
    /// A registry with no kinds at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stock layer kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        voices::register_builtin(&mut registry);
        registry
    }

    /// Add or replace the builder for `kind`.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        builder: impl LayerBuilder + 'static,
    ) -> &mut Self {
        self.builders.insert(kind.into(), Box::new(builder));
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Build one layer. Unknown kinds are skipped with a warning.
    pub fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> Option<LayerHandles> {
        let Some(builder) = self.builders.get(&layer.kind) else {
            warn!(kind = %layer.kind, "unknown layer kind, skipping");
            return None;
        };
        let handles = builder.build(ctx, layer);
        debug!(
            kind = %layer.kind,
            sources = handles.sources.len(),
            schedules = handles.schedules.len(),
            "layer built"
        );
        Some(handles)
    }
}
