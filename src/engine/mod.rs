//! The ambient engine: switching between atmospheres.
//!
//! ```ignore
//! let mut engine = AmbientEngine::new(CpalBackend::new());
//! engine.play("rainy-study").await;   // fade in rain, start thunder
//! engine.set_volume(0.3);
//! engine.play("fireplace").await;     // rain fades out first, then fire
//! engine.stop(true).await;
//! ```
//!
//! # Transitions
//!
//! ```text
//! Uninitialized ──init──→ Idle(silence) ──play(x)──→ Playing(x)
//!                    │          ↑                      │   ↑
//!              (open fails)     └──────stop()──────────┘   │ play(y)
//!                    ↓                                     ↓
//!                  Inert                              Playing(y)
//! ```
//!
//! Switching is strictly out-then-in: every handle of the old atmosphere is
//! faded, cancelled and disconnected before the first node of the new one is
//! connected. One-shots the old atmosphere already fired are faded with it.

pub mod graph_manager;
pub mod layers;
pub mod scheduler;

use std::mem;

use tokio::time::{sleep, sleep_until, Duration, Instant};
use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, SILENCE},
    config::EngineConfig,
    io::OutputBackend,
    lock,
    random::{self, RandomSource, SharedRandom},
    synth::message::OwnerId,
};

use self::{
    graph_manager::{spawn_flush, GraphManager, SharedGraph, FLUSH_RETRY},
    layers::{ActiveSource, LayerBuilder, LayerContext, LayerHandles, LayerRegistry},
    scheduler::{ActiveSchedule, EventScheduler},
};

/// How long `play` waits for a busy output to take the old atmosphere's
/// teardown before building the new one anyway.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Sources faded out by a `stop` and not yet disconnected.
struct Retiring {
    sources: Vec<ActiveSource>,
    deadline: Instant,
}

pub struct AmbientEngine {
    graph: SharedGraph,
    random: SharedRandom,
    config: EngineConfig,
    catalog: Catalog,
    registry: LayerRegistry,
    current: String,
    owner: OwnerId,
    sources: Vec<ActiveSource>,
    schedules: Vec<ActiveSchedule>,
    retiring: Option<Retiring>,
}

impl AmbientEngine {
    /// Engine over `backend` with the stock catalog and layers. Nothing is
    /// opened until the first `init()` or `play()`.
    pub fn new(backend: impl OutputBackend + 'static) -> Self {
        let config = EngineConfig::default();
        Self {
            graph: GraphManager::new(backend, &config).into_shared(),
            random: random::from_entropy(),
            config,
            catalog: Catalog::builtin(),
            registry: LayerRegistry::builtin(),
            current: SILENCE.to_string(),
            owner: OwnerId::default(),
            sources: Vec::new(),
            schedules: Vec::new(),
            retiring: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        lock(&self.graph).configure(&config);
        self.config = config;
        self
    }

    pub fn with_random(mut self, source: impl RandomSource + 'static) -> Self {
        self.random = random::shared(source);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Add or replace the builder for a layer kind.
    pub fn with_layer(
        mut self,
        kind: impl Into<String>,
        builder: impl LayerBuilder + 'static,
    ) -> Self {
        self.registry.register(kind, builder);
        self
    }

    /// Open the output. Idempotent; a failure leaves the engine inert.
    pub fn init(&self) {
        lock(&self.graph).init();
    }

    /// Resume the output if the platform suspended it.
    pub fn resume(&self) {
        lock(&self.graph).resume();
    }

    /// Switch to atmosphere `id`.
    ///
    /// Whatever is playing is faded out and torn down first. An unknown id
    /// leaves the engine silent.
    pub async fn play(&mut self, id: &str) {
        self.init();
        self.resume();
        if self.is_inert() {
            return;
        }

        self.stop(true).await;
        self.drain().await;

        let Some(atmosphere) = self.catalog.get(id).cloned() else {
            warn!(atmosphere = id, "unknown atmosphere");
            return;
        };
        if atmosphere.is_silence() {
            debug!(atmosphere = id, "silence");
            self.current = atmosphere.id;
            return;
        }

        let Some(sample_rate) = lock(&self.graph).sample_rate() else {
            return;
        };

        self.owner = self.owner.next();
        let scheduler = EventScheduler::new(self.graph.clone(), self.random.clone());
        let ctx = LayerContext::new(
            &self.graph,
            &self.random,
            &scheduler,
            &self.config,
            self.owner,
            sample_rate,
        );

        let mut handles = LayerHandles::new();
        for layer in &atmosphere.layers {
            if let Some(built) = self.registry.build(&ctx, layer) {
                handles.extend(built);
            }
        }

        debug!(
            atmosphere = %atmosphere.id,
            owner = self.owner.0,
            sources = handles.sources.len(),
            schedules = handles.schedules.len(),
            "atmosphere started"
        );
        self.sources = handles.sources;
        self.schedules = handles.schedules;
        self.current = atmosphere.id;
    }

    /// Silence every layer, fading over the configured time when `fade_out`.
    ///
    /// Schedules are cancelled before this returns its first poll. If the
    /// future is dropped during the fade, the next `play` or `stop` finishes
    /// the teardown.
    pub async fn stop(&mut self, fade_out: bool) {
        self.finish_retiring().await;

        let seconds = if fade_out { self.config.fade_out } else { 0.0 };
        let schedules = mem::take(&mut self.schedules);
        let sources = mem::take(&mut self.sources);
        let was_playing = self.current != SILENCE;
        self.current = SILENCE.to_string();

        if !was_playing && sources.is_empty() && schedules.is_empty() {
            return;
        }

        {
            let mut graph = lock(&self.graph);
            for schedule in &schedules {
                schedule.cancel();
            }
            for source in &sources {
                graph.fade(source.id, seconds);
            }
            graph.fade_transients(self.owner, seconds);
        }
        drop(schedules);
        spawn_flush(&self.graph);

        debug!(
            sources = sources.len(),
            fade_secs = seconds,
            "atmosphere stopping"
        );
        self.retiring = Some(Retiring {
            sources,
            deadline: Instant::now() + Duration::from_secs_f32(seconds.max(0.0)),
        });
        self.finish_retiring().await;
    }

    /// Wait out a pending fade and disconnect what it was fading.
    async fn finish_retiring(&mut self) {
        if let Some(retiring) = &self.retiring {
            sleep_until(retiring.deadline).await;
        }
        if let Some(retiring) = self.retiring.take() {
            let mut graph = lock(&self.graph);
            for source in &retiring.sources {
                graph.disconnect(source.id);
            }
        }
        spawn_flush(&self.graph);
    }

    /// Wait until every deferred control command has reached the output.
    async fn drain(&self) {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        loop {
            let (delivered, pending) = {
                let mut graph = lock(&self.graph);
                (graph.flush(), graph.pending_commands())
            };
            if delivered {
                return;
            }
            if Instant::now() >= deadline {
                warn!(pending, "output still busy, starting atmosphere anyway");
                return;
            }
            sleep(FLUSH_RETRY).await;
        }
    }

    /// Set the master volume, clamped to `[0, 1]`.
    pub fn set_volume(&self, volume: f32) {
        lock(&self.graph).set_volume(volume);
        spawn_flush(&self.graph);
    }

    pub fn volume(&self) -> f32 {
        lock(&self.graph).volume()
    }

    pub fn current_atmosphere(&self) -> &str {
        &self.current
    }

    /// Whether an atmosphere other than silence is playing.
    pub fn is_active(&self) -> bool {
        self.current != SILENCE
    }

    /// Whether opening the output failed.
    pub fn is_inert(&self) -> bool {
        lock(&self.graph).is_failed()
    }

    pub fn is_initialized(&self) -> bool {
        lock(&self.graph).is_active()
    }

    pub fn active_sources(&self) -> &[ActiveSource] {
        &self.sources
    }

    pub fn active_schedules(&self) -> &[ActiveSchedule] {
        &self.schedules
    }

    /// Sources faded out but not yet disconnected.
    pub fn retiring_sources(&self) -> usize {
        self.retiring.as_ref().map_or(0, |r| r.sources.len())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
