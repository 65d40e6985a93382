use std::f32::consts::PI;

use hush_ambient::{
    dsp::noise::{NoiseGenerator, NoiseKind},
    graph::{noise::NoiseNode, GraphNode, RenderCtx},
    io::offline::OfflineBackend,
    random::ScriptedRandom,
    voices, AmbientEngine,
};
use rand::{rngs::SmallRng, SeedableRng};
use rustfft::{num_complex::Complex, FftPlanner};

const SAMPLE_RATE: f32 = 48_000.0;
const FFT_SIZE: usize = 16_384;

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Power-weighted mean frequency of a Hann-windowed frame, DC excluded.
fn spectral_centroid(samples: &[f32]) -> f32 {
    let n = samples.len();
    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let window = 0.5 - 0.5 * (2.0 * PI * i as f32 / n as f32).cos();
            Complex::new(s * window, 0.0)
        })
        .collect();
    FftPlanner::<f32>::new()
        .plan_fft_forward(n)
        .process(&mut buffer);

    let bin_hz = SAMPLE_RATE / n as f32;
    let (weighted, total) = buffer[1..n / 2]
        .iter()
        .enumerate()
        .fold((0.0f64, 0.0f64), |(weighted, total), (i, bin)| {
            let power = bin.norm_sqr() as f64;
            let freq = (i + 1) as f64 * bin_hz as f64;
            (weighted + freq * power, total + power)
        });
    (weighted / total) as f32
}

fn render(mut node: impl GraphNode) -> Vec<f32> {
    let mut out = vec![0.0; FFT_SIZE];
    node.render_block(&mut out, &RenderCtx::new(SAMPLE_RATE));
    out
}

fn noise(kind: NoiseKind, seed: u64) -> hush_ambient::dsp::noise::NoiseBuffer {
    let mut rng = SmallRng::seed_from_u64(seed);
    NoiseGenerator::new(SAMPLE_RATE).create(kind, 2.0, &mut rng)
}

#[test]
fn noise_colours_order_by_brightness() {
    let white = spectral_centroid(&render(NoiseNode::looping(noise(NoiseKind::White, 1))));
    let murmur = spectral_centroid(&render(voices::murmur(noise(NoiseKind::Pink, 2))));
    let brown = spectral_centroid(&render(NoiseNode::looping(noise(NoiseKind::Brown, 3))));

    assert!(white > murmur, "white {white} Hz vs murmur {murmur} Hz");
    assert!(murmur > brown, "murmur {murmur} Hz vs brown {brown} Hz");
}

#[test]
fn wind_sits_below_the_murmur() {
    let wind = spectral_centroid(&render(voices::wind(noise(NoiseKind::Pink, 4))));
    let murmur = spectral_centroid(&render(voices::murmur(noise(NoiseKind::Pink, 4))));
    assert!(wind < murmur, "wind {wind} Hz vs murmur {murmur} Hz");
}

#[test]
fn patter_is_brighter_than_the_rain_body() {
    let body = spectral_centroid(&render(voices::rain_body(noise(NoiseKind::Brown, 5), false)));
    let patter = spectral_centroid(&render(voices::rain_patter(
        noise(NoiseKind::White, 6),
        false,
    )));
    assert!(patter > body, "patter {patter} Hz vs body {body} Hz");
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

#[test]
fn silence_renders_zeros() {
    runtime().block_on(async {
        let backend = OfflineBackend::new(8_000.0);
        let tap = backend.tap();
        let mut engine = AmbientEngine::new(backend);
        engine.play("silence").await;

        let out = tap.render_seconds(1.0);
        assert!(out.iter().all(|s| *s == 0.0));
        assert_eq!(tap.live_nodes(), 0);
    });
}

#[test]
fn rainy_study_is_audible_and_bounded() {
    runtime().block_on(async {
        let backend = OfflineBackend::new(8_000.0);
        let tap = backend.tap();
        let mut engine =
            AmbientEngine::new(backend).with_random(SmallRng::seed_from_u64(7));
        engine.play("rainy-study").await;

        let fade_in = tap.render_seconds(0.5);
        let settled = tap.render_seconds(1.0);
        assert!(rms(&settled) > rms(&fade_in[..400]));
        assert!(rms(&settled) > 1e-3);
        assert!(settled.iter().all(|s| s.abs() <= 1.0));
        assert_eq!(tap.live_labels().len(), 2);
    });
}

#[test]
fn stopping_fades_to_silence() {
    runtime().block_on(async {
        let backend = OfflineBackend::new(8_000.0);
        let tap = backend.tap();
        let mut engine =
            AmbientEngine::new(backend).with_random(ScriptedRandom::new(vec![0.9, 0.1, 0.6]));
        engine.play("cafe").await;
        tap.render_seconds(1.0);

        engine.stop(false).await;
        let out = tap.render_seconds(0.5);
        assert!(out[100..].iter().all(|s| *s == 0.0));
        assert_eq!(tap.live_nodes(), 0);
    });
}

#[test]
fn fireplace_keeps_burning_at_zero_volume() {
    runtime().block_on(async {
        let backend = OfflineBackend::new(8_000.0);
        let tap = backend.tap();
        let mut engine =
            AmbientEngine::new(backend).with_random(ScriptedRandom::new(vec![0.9, 0.1, 0.6, 0.3]));
        engine.play("fireplace").await;
        assert_eq!(engine.active_sources().len(), 1);
        assert_eq!(engine.active_schedules().len(), 1);
        assert_eq!(engine.active_schedules()[0].period().as_millis(), 200);

        let loud = tap.render_seconds(1.0);
        assert!(rms(&loud[4_000..]) > 0.0);

        engine.set_volume(0.0);
        tap.render_seconds(0.2);
        let quiet = tap.render_seconds(0.5);
        assert!(quiet.iter().all(|s| *s == 0.0));
        assert_eq!(engine.active_sources().len(), 1);
        assert!(tap.live_labels().contains(&"fire"));

        engine.stop(true).await;
        tap.sync();
        assert!(engine.active_sources().is_empty());
        assert_eq!(tap.live_nodes(), 0);
    });
}
