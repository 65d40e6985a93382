//! Signal multiplication and summing primitives.

/*
Gain, Products and Sums
=======================

The mixer does three things to every block, over and over:

  1. multiply a layer by its gain stage      signal[i] *= gain[i]
  2. add the layer into the bus              bus[i]    += signal[i]
  3. multiply the bus by the master gain     bus[i]    *= master[i]
  4. clip the bus to the output range        bus[i]     = clamp(bus[i], -1, 1)

Gain is linear amplitude:
    ×1.0   =   0 dB  (unity)
    ×0.5   =  -6 dB
    ×0.1   = -20 dB
    ×0.01  = -40 dB  (the "near zero" thunder decays to)

Summing layers can exceed [-1.0, +1.0]. Layer volumes in the catalog are kept
well below one so a full atmosphere stays in range; the output stage clamps
anything that slips through.
*/

/// Clamp every sample into `[-limit, limit]` (in-place).
#[inline]
pub fn hard_clip(signal: &mut [f32], limit: f32) {
    for sample in signal.iter_mut() {
        *sample = sample.clamp(-limit, limit);
    }
}

/// Multiply a signal by a modulator, writing result into signal buffer (in-place).
#[inline]
pub fn multiply_in_place(signal: &mut [f32], modulator: &[f32]) {
    debug_assert_eq!(signal.len(), modulator.len());

    for (s, &m) in signal.iter_mut().zip(modulator.iter()) {
        *s *= m;
    }
}

/// Add signal B into signal A in-place.
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Largest absolute sample value.
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/// Root-mean-square level.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|s| s * s).sum::<f32>() / signal.len() as f32).sqrt()
}
