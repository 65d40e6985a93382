use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::{
    dsp::noise::{NoiseBuffer, NoiseGenerator, NoiseKind},
    engine::graph_manager::SharedGraph,
    graph::node::GraphNode,
    lock,
    random::{RandomSource, SharedRandom},
    synth::message::OwnerId,
};

/*
Event Scheduling
================

Thunder, gulls, birds, espresso hiss and fire crackle are one-shots fired
from a recurring trigger. Each trigger is a tokio task driven by a Cadence:

  start         k·period                 (k+1)·period
    │ first? ─→ ●  tick ── gate ── jitter ─→ fire   ●  tick ...
    │           │                                    │
    └── grid ───┴────────── fixed, never drifts ─────┘

  period        Base spacing of ticks. Ticks sit on a fixed grid measured
                from when the trigger was registered; a slow tick never pushes
                later ones back.
  spread        One-time random extension of the period, drawn at
                registration (espresso machines are not metronomes).
  first delay   Optional extra occurrence before the first tick (thunder
                rolls in 2–7 s after the atmosphere starts).
  probability   Chance that a tick fires at all.
  jitter        Fraction of the period; a firing tick waits a random
                sub-delay in [0, jitter·period) before the one-shot starts.

Cancellation
------------

Every firing re-checks the trigger's cancel flag while holding the graph
lock. `AmbientEngine::stop` flips the flags under that same lock, so nothing
fires once cancellation returns, even on a multi-threaded runtime. The task
is aborted as well, so it stops sleeping.

Quiet ticks
-----------

A tick that comes due while the output is not pulling audio (suspended, or
its command queue nearly full) is skipped, not queued. The grid carries on,
and firing resumes with the next tick once the output catches up.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cadence {
    pub period: Duration,
    pub spread: Duration,
    pub first_delay: Option<(Duration, Duration)>,
    pub probability: f32,
    pub jitter: f32,
}

impl Cadence {
    /// Fire on every tick, exactly on the grid.
    pub fn every(period: Duration) -> Self {
        Self {
            period,
            spread: Duration::ZERO,
            first_delay: None,
            probability: 1.0,
            jitter: 0.0,
        }
    }

    pub fn every_ms(period_ms: u64) -> Self {
        Self::every(Duration::from_millis(period_ms))
    }

    pub fn with_spread(mut self, spread: Duration) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_first_delay(mut self, min: Duration, max: Duration) -> Self {
        self.first_delay = Some((min, max.max(min)));
        self
    }

    pub fn with_probability(mut self, probability: f32) -> Self {
        self.probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }
}

fn draw(random: &mut dyn RandomSource, min: Duration, max: Duration) -> Duration {
    let span = max.saturating_sub(min).as_secs_f64();
    if span <= 0.0 {
        return min;
    }
    min + Duration::from_secs_f64(span * random.next_unit() as f64)
}

/// What a firing trigger gets to build its one-shot with.
pub struct Shot<'a> {
    pub random: &'a mut dyn RandomSource,
    pub noise: NoiseGenerator,
}

impl Shot<'_> {
    pub fn sample_rate(&self) -> f32 {
        self.noise.sample_rate()
    }

    /// Fresh noise buffer of `seconds`.
    pub fn noise(&mut self, kind: NoiseKind, seconds: f32) -> NoiseBuffer {
        self.noise.create(kind, seconds, &mut *self.random)
    }
}

/// A registered recurring trigger.
///
/// Dropping it cancels the trigger.
pub struct ActiveSchedule {
    label: &'static str,
    owner: OwnerId,
    period: Duration,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ActiveSchedule {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Effective tick period, including any spread.
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Stop the trigger. Hold the graph lock while calling this to make it
    /// atomic with respect to firing.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.task.abort();
    }
}

impl Drop for ActiveSchedule {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawns recurring one-shot triggers.
#[derive(Clone)]
pub struct EventScheduler {
    graph: SharedGraph,
    random: SharedRandom,
}

impl EventScheduler {
    pub fn new(graph: SharedGraph, random: SharedRandom) -> Self {
        Self { graph, random }
    }

    /// Register a trigger. `build` makes the one-shot each time it fires.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(
        &self,
        owner: OwnerId,
        label: &'static str,
        cadence: Cadence,
        mut build: F,
    ) -> ActiveSchedule
    where
        F: FnMut(&mut Shot<'_>) -> Box<dyn GraphNode> + Send + 'static,
    {
        let (period, first_delay) = {
            let mut random = lock(&self.random);
            let period = draw(&mut **random, cadence.period, cadence.period + cadence.spread)
                .max(Duration::from_millis(1));
            let first_delay = cadence
                .first_delay
                .map(|(min, max)| draw(&mut **random, min, max));
            (period, first_delay)
        };

        let cancelled = Arc::new(AtomicBool::new(false));
        let trigger = Trigger {
            graph: Arc::clone(&self.graph),
            random: Arc::clone(&self.random),
            cancelled: Arc::clone(&cancelled),
            owner,
            label,
        };

        debug!(
            label,
            owner = owner.0,
            period_ms = period.as_millis() as u64,
            "schedule registered"
        );

        let task = tokio::spawn(async move {
            let start = Instant::now();

            if let Some(delay) = first_delay {
                sleep(delay).await;
                if !trigger.fire(&mut build) {
                    return;
                }
            }

            let mut ticks = interval_at(start + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;
                if trigger.is_cancelled() {
                    return;
                }

                let (fires, delay) = {
                    let mut random = lock(&trigger.random);
                    let fires = random.chance(cadence.probability);
                    let delay = if fires && cadence.jitter > 0.0 {
                        draw(&mut **random, Duration::ZERO, period.mul_f32(cadence.jitter))
                    } else {
                        Duration::ZERO
                    };
                    (fires, delay)
                };
                if !fires {
                    continue;
                }
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                if !trigger.fire(&mut build) {
                    return;
                }
            }
        });

        ActiveSchedule {
            label,
            owner,
            period,
            cancelled,
            task,
        }
    }
}

struct Trigger {
    graph: SharedGraph,
    random: SharedRandom,
    cancelled: Arc<AtomicBool>,
    owner: OwnerId,
    label: &'static str,
}

impl Trigger {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Build and connect one one-shot. Returns false once cancelled.
    fn fire<F>(&self, build: &mut F) -> bool
    where
        F: FnMut(&mut Shot<'_>) -> Box<dyn GraphNode>,
    {
        let mut graph = lock(&self.graph);
        if self.is_cancelled() {
            return false;
        }
        let Some(sample_rate) = graph.sample_rate() else {
            return false;
        };
        if !graph.can_trigger() {
            debug!(label = self.label, state = ?graph.device_state(), "tick skipped");
            return true;
        }

        let node = {
            let mut random = lock(&self.random);
            let mut shot = Shot {
                random: &mut **random,
                noise: NoiseGenerator::new(sample_rate),
            };
            build(&mut shot)
        };
        graph.trigger(self.owner, self.label, node);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineConfig,
        engine::graph_manager::GraphManager,
        graph::node::RenderCtx,
        io::offline::OfflineBackend,
        random::{self, ScriptedRandom},
    };
    use std::sync::atomic::AtomicUsize;

    struct Blip;

    impl GraphNode for Blip {
        fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
            out.fill(0.0);
        }
    }

    fn setup(values: Vec<f32>) -> EventScheduler {
        let mut graph = GraphManager::new(OfflineBackend::new(1_000.0), &EngineConfig::default());
        graph.init();
        EventScheduler::new(graph.into_shared(), random::shared(ScriptedRandom::new(values)))
    }

    fn counting(
        count: &Arc<AtomicUsize>,
    ) -> impl FnMut(&mut Shot<'_>) -> Box<dyn GraphNode> + Send + 'static {
        let count = Arc::clone(count);
        move |_shot| {
            count.fetch_add(1, Ordering::SeqCst);
            Box::new(Blip)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_on_a_fixed_grid() {
        let scheduler = setup(vec![0.0]);
        let count = Arc::new(AtomicUsize::new(0));
        let _schedule = scheduler.schedule(
            OwnerId(1),
            "blip",
            Cadence::every_ms(1_000),
            counting(&count),
        );

        sleep(Duration::from_millis(3_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn probability_gate_uses_random_source() {
        // Alternating draws: 0.2 passes a 0.5 gate, 0.8 does not
        let scheduler = setup(vec![0.2, 0.8]);
        let count = Arc::new(AtomicUsize::new(0));
        let _schedule = scheduler.schedule(
            OwnerId(1),
            "blip",
            Cadence::every_ms(100).with_probability(0.5),
            counting(&count),
        );

        sleep(Duration::from_millis(1_050)).await;
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn first_delay_adds_an_early_occurrence() {
        let scheduler = setup(vec![0.5]);
        let count = Arc::new(AtomicUsize::new(0));
        let _schedule = scheduler.schedule(
            OwnerId(1),
            "blip",
            Cadence::every_ms(10_000)
                .with_first_delay(Duration::from_secs(2), Duration::from_secs(6)),
            counting(&count),
        );

        sleep(Duration::from_millis(3_900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn jitter_does_not_shift_the_grid() {
        // Every tick waits half of jitter·period = 250 ms
        let scheduler = setup(vec![0.5]);
        let count = Arc::new(AtomicUsize::new(0));
        let _schedule = scheduler.schedule(
            OwnerId(1),
            "blip",
            Cadence::every_ms(1_000).with_jitter(0.5),
            counting(&count),
        );

        sleep(Duration::from_millis(1_200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        sleep(Duration::from_millis(2_000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn spread_extends_the_period_once() {
        let scheduler = setup(vec![0.5]);
        let count = Arc::new(AtomicUsize::new(0));
        let schedule = scheduler.schedule(
            OwnerId(1),
            "blip",
            Cadence::every_ms(8_000).with_spread(Duration::from_millis(3_000)),
            counting(&count),
        );
        assert_eq!(schedule.period(), Duration::from_millis(9_500));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_schedules_never_fire() {
        let scheduler = setup(vec![0.0]);
        let count = Arc::new(AtomicUsize::new(0));
        let schedule = scheduler.schedule(
            OwnerId(1),
            "blip",
            Cadence::every_ms(100),
            counting(&count),
        );

        sleep(Duration::from_millis(250)).await;
        {
            let _graph = lock(&scheduler.graph);
            schedule.cancel();
        }
        let fired = count.load(Ordering::SeqCst);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), fired);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let scheduler = setup(vec![0.0]);
        let count = Arc::new(AtomicUsize::new(0));
        drop(scheduler.schedule(
            OwnerId(1),
            "blip",
            Cadence::every_ms(100),
            counting(&count),
        ));

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_while_suspended_are_skipped() {
        let backend = OfflineBackend::new(1_000.0).suspended();
        let mut graph = GraphManager::new(backend, &EngineConfig::default());
        graph.init();
        let scheduler = EventScheduler::new(
            graph.into_shared(),
            random::shared(ScriptedRandom::new(vec![0.0])),
        );
        let count = Arc::new(AtomicUsize::new(0));
        let _schedule = scheduler.schedule(
            OwnerId(1),
            "blip",
            Cadence::every_ms(1_000),
            counting(&count),
        );

        sleep(Duration::from_millis(10_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        lock(&scheduler.graph).resume();
        sleep(Duration::from_millis(2_000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
