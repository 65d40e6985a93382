use std::{path::Path, time::Duration};

use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use rand::{rngs::SmallRng, SeedableRng};
use tracing::info;

use hush_ambient::{
    dsp::amplify::{peak, rms},
    io::offline::{write_wav, OfflineBackend},
    AmbientEngine, Catalog,
};

/// Length of one offline render step.
const RENDER_STEP_SECS: f64 = 0.01;

fn check_id(catalog: &Catalog, id: &str) -> Result<()> {
    if catalog.contains(id) {
        return Ok(());
    }
    let known: Vec<&str> = catalog.ids().collect();
    bail!("unknown atmosphere `{id}` (available: {})", known.join(", "))
}

pub fn list(json: bool) -> Result<()> {
    let catalog = Catalog::builtin();

    if json {
        #[cfg(feature = "serde")]
        {
            println!("{}", catalog.to_json()?);
            return Ok(());
        }
        #[cfg(not(feature = "serde"))]
        bail!("JSON output needs the `serde` feature");
    }

    for atmosphere in catalog.iter() {
        println!(
            "{}  {:<12} {:<16} {}",
            atmosphere.icon, atmosphere.id, atmosphere.name, atmosphere.description
        );
        for layer in &atmosphere.layers {
            match layer.interval_ms {
                Some(ms) => println!(
                    "      {:<14} vol {:.2}  every ~{:.1}s",
                    layer.kind,
                    layer.volume,
                    ms as f32 / 1000.0
                ),
                None => println!("      {:<14} vol {:.2}", layer.kind, layer.volume),
            }
        }
    }
    Ok(())
}

#[cfg(feature = "cpal")]
pub fn play(id: &str, volume: f32, seconds: Option<f32>) -> Result<()> {
    use hush_ambient::io::cpal::CpalBackend;

    check_id(&Catalog::builtin(), id)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .wrap_err("failed to start runtime")?;

    runtime.block_on(async {
        let mut engine = AmbientEngine::new(CpalBackend::new());
        engine.set_volume(volume);
        engine.play(id).await;
        if engine.is_inert() {
            bail!("no usable audio output");
        }

        info!(atmosphere = id, volume = engine.volume(), "playing");
        match seconds {
            Some(seconds) => tokio::time::sleep(Duration::from_secs_f32(seconds.max(0.0))).await,
            None => {
                println!("Playing {id}... Press Ctrl+C to stop");
                std::future::pending::<()>().await;
            }
        }

        engine.stop(true).await;
        Ok::<_, color_eyre::Report>(())
    })
}

#[cfg(not(feature = "cpal"))]
pub fn play(id: &str, _volume: f32, _seconds: Option<f32>) -> Result<()> {
    check_id(&Catalog::builtin(), id)?;
    Err(eyre!(
        "built without the `cpal` feature; use `render` or rebuild with --features cpal"
    ))
}

pub fn render(
    id: &str,
    out: &Path,
    seconds: f32,
    sample_rate: u32,
    seed: u64,
    volume: f32,
) -> Result<()> {
    check_id(&Catalog::builtin(), id)?;
    if sample_rate == 0 {
        return Err(eyre!("sample rate must be positive"));
    }

    // Virtual clock: schedules advance with rendered audio, not wall time
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .wrap_err("failed to start runtime")?;

    let rate = sample_rate as f32;
    let total = (seconds.max(0.0) * rate).round() as usize;
    let step = ((RENDER_STEP_SECS * sample_rate as f64).round() as usize).max(1);

    let samples = runtime.block_on(async {
        let backend = OfflineBackend::new(rate);
        let tap = backend.tap();
        let mut engine = AmbientEngine::new(backend).with_random(SmallRng::seed_from_u64(seed));
        engine.set_volume(volume);
        engine.play(id).await;

        let mut samples = vec![0.0f32; total];
        for block in samples.chunks_mut(step) {
            tap.render_into(block);
            let elapsed = block.len() as f64 / sample_rate as f64;
            tokio::time::sleep(Duration::from_secs_f64(elapsed)).await;
        }

        engine.stop(false).await;
        samples
    });

    write_wav(out, &samples, sample_rate)
        .wrap_err_with(|| format!("failed to write {}", out.display()))?;

    info!(
        atmosphere = id,
        path = %out.display(),
        seconds,
        peak = peak(&samples),
        rms = rms(&samples),
        "render complete"
    );
    Ok(())
}
