//! Rational-rate linear resampler for fixed-rate devices.

use crate::radio::types::Sample;

/// Device-side rate units for the resampled interface.
pub const RESAMP_INRATE: u32 = 96;
/// GSM-side rate units for the resampled interface.
pub const RESAMP_OUTRATE: u32 = 65;

/// Converts a stream at `in_rate` units to `out_rate` units by linear
/// interpolation, carrying phase across calls.
#[derive(Debug, Clone)]
pub struct Resampler {
    step: f64,
    /// Position of the next output, relative to `prev` (index 0).
    pos: f64,
    prev: Option<Sample>,
}

impl Resampler {
    pub fn new(in_rate: u32, out_rate: u32) -> Self {
        Self {
            step: in_rate.max(1) as f64 / out_rate.max(1) as f64,
            pos: 0.0,
            prev: None,
        }
    }

    /// Resample `input`, appending to `out`.
    pub fn process(&mut self, input: &[Sample], out: &mut Vec<Sample>) {
        let mut ext = Vec::with_capacity(input.len() + 1);
        ext.extend(self.prev);
        ext.extend_from_slice(input);

        if ext.len() < 2 {
            self.prev = ext.last().copied();
            return;
        }

        let last = (ext.len() - 1) as f64;
        while self.pos < last {
            let i = self.pos.floor() as usize;
            let frac = (self.pos - i as f64) as f32;
            out.push(ext[i].lerp(ext[i + 1], frac));
            self.pos += self.step;
        }
        self.pos -= last;
        self.prev = ext.last().copied();
    }

    pub fn reset(&mut self) {
        self.pos = 0.0;
        self.prev = None;
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new(RESAMP_INRATE, RESAMP_OUTRATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: usize, n: usize) -> Vec<Sample> {
        (start..start + n).map(|k| Sample::new(k as f32, 0.0)).collect()
    }

    #[test]
    fn test_output_rate() {
        let mut r = Resampler::default();
        let mut out = Vec::new();
        for chunk in 0..20 {
            r.process(&ramp(chunk * 96, 96), &mut out);
        }
        let expected = 20 * 65;
        assert!((out.len() as i64 - expected as i64).abs() <= 1, "got {}", out.len());
    }

    #[test]
    fn test_interpolates_across_chunks() {
        let mut r = Resampler::new(3, 2);
        let mut out = Vec::new();
        r.process(&ramp(0, 5), &mut out);
        r.process(&ramp(5, 7), &mut out);
        for (k, s) in out.iter().enumerate() {
            let expected = k as f32 * 1.5;
            assert!((s.i - expected).abs() < 1e-3, "sample {}: {} != {}", k, s.i, expected);
        }
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_single_samples() {
        let mut r = Resampler::new(1, 1);
        let mut out = Vec::new();
        r.process(&ramp(0, 1), &mut out);
        assert!(out.is_empty());
        r.process(&ramp(1, 1), &mut out);
        assert_eq!(out, vec![Sample::new(0.0, 0.0)]);
    }
}
