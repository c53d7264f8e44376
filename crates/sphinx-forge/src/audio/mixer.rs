//! Sample algebra: concatenation and weighted mixing.
//!
//! Both operations are pure; inputs are never modified.

use sphinx_common::{SphinxError, SphinxResult};

use super::sample::{Sample, decode_pcm16, encode_pcm16};

/// Concatenate samples in order.
///
/// Works on the PCM bytes directly, so `concatenate(&[x]) == x` with no
/// re-encoding loss. An empty slice yields an empty sample.
pub fn concatenate(samples: &[Sample]) -> Sample {
    let total: usize = samples.iter().map(|s| s.pcm_bytes().len()).sum();
    let mut pcm = Vec::with_capacity(total);
    for sample in samples {
        pcm.extend_from_slice(sample.pcm_bytes());
    }
    Sample::from_raw(pcm)
}

/// Mix `b` into `a`: `out[i] = a[i] * gain_a + b[i] * gain_b`.
///
/// The output always has `a`'s length. Every index at or past the end of `b`
/// is silence (exactly zero), not `a[i] * gain_a`.
pub fn mix(a: &Sample, gain_a: f64, b: &Sample, gain_b: f64) -> SphinxResult<Sample> {
    check_gain("gain_a", gain_a)?;
    check_gain("gain_b", gain_b)?;

    let lhs = a.decode();
    let rhs = decode_pcm16(b.pcm_bytes());
    let mixed: Vec<f64> = lhs
        .iter()
        .enumerate()
        .map(|(i, &x)| match rhs.get(i) {
            Some(&y) => x * gain_a + y * gain_b,
            None => 0.0,
        })
        .collect();

    Ok(Sample::from_raw(encode_pcm16(&mixed)))
}

fn check_gain(name: &str, gain: f64) -> SphinxResult<()> {
    if gain.is_finite() && gain >= 0.0 {
        Ok(())
    } else {
        Err(SphinxError::InvalidArgument(format!(
            "{} must be finite and non-negative, got {}",
            name, gain
        )))
    }
}
