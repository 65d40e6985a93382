use std::f32::consts::PI;

use crate::graph::node::RenderCtx;

/*
| type      | passes          | rejects          | used for                       |
| --------- | --------------- | ---------------- | ------------------------------ |
| low-pass  | below cutoff    | above cutoff     | rain/wind/wave beds, thunder   |
| high-pass | above cutoff    | below cutoff     | espresso hiss                  |
| band-pass | around cutoff   | both sides       | cafe murmur, fire crackle pops |

The filter is the TPT (topology-preserving transform) state-variable filter.
One structure yields all three responses at once; `q` controls the width of
the band-pass and the peak at the cutoff of the low/high-pass outputs:

    k = 1 / q
    g = tan(pi * cutoff / sample_rate)

Q = 0.707 is a flat Butterworth response, Q = 1 adds a gentle bump, Q = 5 is
the narrow resonant band used for crackle pops. The band-pass output is scaled
by `k` so its peak gain is unity regardless of Q.
*/

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

/// Default resonance, matching a plain biquad with Q = 1.
pub const DEFAULT_Q: f32 = 1.0;

const MIN_Q: f32 = 0.05;

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: DEFAULT_Q,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        // Keep the prewarp away from Nyquist where tan() diverges
        let cutoff = self.cutoff_hz.clamp(10.0, ctx.sample_rate * 0.49);
        (PI * cutoff / ctx.sample_rate).tan()
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: k * v1,
            highpass: sample - k * v1 - v2,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = 1.0 / self.q.max(MIN_Q);

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);
            *sample = match self.filter_type {
                FilterType::LowPass => outputs.lowpass,
                FilterType::HighPass => outputs.highpass,
                FilterType::BandPass => outputs.bandpass,
            }
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Phasor;

    fn ctx() -> RenderCtx {
        RenderCtx::new(48_000.0)
    }

    fn sine(frequency: f32, len: usize) -> Vec<f32> {
        let mut phasor = Phasor::new();
        (0..len).map(|_| phasor.next_sine(frequency, 48_000.0)).collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len() / 4;
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = vec![1.0; 2048];
        filter.render(&mut buffer, &ctx());
        assert!(buffer[2047] > 0.99, "got {}", buffer[2047]);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut filter = SVFilter::highpass(500.0);
        let mut buffer = vec![1.0; 2048];
        filter.render(&mut buffer, &ctx());
        assert!(buffer[2047].abs() < 0.001, "got {}", buffer[2047]);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = SVFilter::lowpass(400.0);
        let mut buffer = sine(5_000.0, 2048);
        filter.render(&mut buffer, &ctx());

        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.05, "expected high freq attenuation, got peak: {peak}");
    }

    #[test]
    fn test_bandpass_has_unity_peak_at_cutoff() {
        let mut filter = SVFilter::bandpass(3_000.0);
        filter.set_q(5.0);
        let mut centre = sine(3_000.0, 4096);
        filter.render(&mut centre, &ctx());
        let centre_peak = peak_after_transient(&centre);

        filter.reset();
        let mut off = sine(600.0, 4096);
        filter.render(&mut off, &ctx());
        let off_peak = peak_after_transient(&off);

        assert!((centre_peak - 1.0).abs() < 0.05, "centre peak {centre_peak}");
        assert!(off_peak < centre_peak * 0.2, "off peak {off_peak}");
    }

    #[test]
    fn test_cutoff_above_nyquist_stays_finite() {
        let mut filter = SVFilter::lowpass(40_000.0);
        let mut buffer = sine(1_000.0, 512);
        filter.render(&mut buffer, &ctx());
        assert!(buffer.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_set_cutoff_affects_filtering() {
        let mut dark = SVFilter::lowpass(200.0);
        let mut bright = SVFilter::lowpass(4_000.0);
        dark.set_cutoff(200.0);

        let mut a = sine(2_000.0, 2048);
        let mut b = a.clone();
        dark.render(&mut a, &ctx());
        bright.render(&mut b, &ctx());

        assert!(peak_after_transient(&a) < peak_after_transient(&b));
    }
}
