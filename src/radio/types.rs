//! Sample, burst and capability types shared by the radio layer.

use std::fmt;

/// Complex baseband sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub i: f32,
    pub q: f32,
}

impl Sample {
    pub const fn new(i: f32, q: f32) -> Self {
        Self { i, q }
    }

    /// Squared magnitude.
    pub fn power(&self) -> f32 {
        self.i * self.i + self.q * self.q
    }

    /// Linear interpolation towards `other`, `frac` in `[0, 1)`.
    pub fn lerp(self, other: Sample, frac: f32) -> Sample {
        Sample {
            i: self.i + (other.i - self.i) * frac,
            q: self.q + (other.q - self.q) * frac,
        }
    }
}

/// A block of received samples with the device timestamp of its first sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioBurst {
    pub timestamp: u64,
    pub samples: Vec<Sample>,
}

impl RadioBurst {
    pub fn new(timestamp: u64, samples: Vec<Sample>) -> Self {
        Self { timestamp, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean sample power.
    pub fn mean_power(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(Sample::power).sum::<f32>() / self.samples.len() as f32
    }
}

/// Operating mode reported by an opened radio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioCapability {
    /// Device runs at the native symbol-multiple rate.
    Normal,
    /// Device runs at a fixed rate that must be resampled.
    Resampled,
    /// Anything else; carries the raw device code.
    Unsupported(i32),
}

impl RadioCapability {
    pub const NORMAL_CODE: i32 = 0;
    pub const RESAMPLED_CODE: i32 = 1;

    /// Map a raw device type code.
    pub fn from_code(code: i32) -> Self {
        match code {
            Self::NORMAL_CODE => RadioCapability::Normal,
            Self::RESAMPLED_CODE => RadioCapability::Resampled,
            other => RadioCapability::Unsupported(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            RadioCapability::Normal => Self::NORMAL_CODE,
            RadioCapability::Resampled => Self::RESAMPLED_CODE,
            RadioCapability::Unsupported(code) => *code,
        }
    }
}

impl fmt::Display for RadioCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioCapability::Normal => write!(f, "NORMAL"),
            RadioCapability::Resampled => write!(f, "RESAMP"),
            RadioCapability::Unsupported(code) => write!(f, "UNSUPPORTED({})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_codes() {
        assert_eq!(RadioCapability::from_code(0), RadioCapability::Normal);
        assert_eq!(RadioCapability::from_code(1), RadioCapability::Resampled);
        assert_eq!(RadioCapability::from_code(7), RadioCapability::Unsupported(7));
        assert_eq!(RadioCapability::Unsupported(7).code(), 7);
        assert_eq!(RadioCapability::Resampled.to_string(), "RESAMP");
    }

    #[test]
    fn test_burst_power() {
        let burst = RadioBurst::new(0, vec![Sample::new(1.0, 0.0), Sample::new(0.0, 3.0)]);
        assert_eq!(burst.mean_power(), 5.0);
        assert_eq!(RadioBurst::new(0, Vec::new()).mean_power(), 0.0);
    }

    #[test]
    fn test_lerp() {
        let s = Sample::new(0.0, 2.0).lerp(Sample::new(4.0, 0.0), 0.25);
        assert_eq!(s, Sample::new(1.0, 1.5));
    }
}
