//! This module provides objects to reason about the processing context.
//! Currently, the only information wrapped is the audio sample rate and the
//! matching sample period.

use crate::Float;

#[derive(Clone, Copy, Debug, PartialEq)]
/// A floating point (using the type `Smp`) processing context
pub struct Context<Smp: Float> {
    /// The sample rate, in Hz, with the same type as a processing type
    pub sample_rate: Smp,
    /// The duration of one sample, in seconds.  Kept alongside the sample
    /// rate so every device steps by the exact same increment.
    pub sample_time: Smp,
}

impl<Smp: Float> Context<Smp> {
    /// Create a new `Context` for the given sample rate
    pub fn new(sample_rate: Smp) -> Self {
        Self {
            sample_rate,
            sample_time: Smp::ONE / sample_rate,
        }
    }
    /// Create a new `Context` from a host-provided sample rate and period.
    /// The period is used as-is rather than recomputed from the rate.
    pub fn with_sample_time(sample_rate: Smp, sample_time: Smp) -> Self {
        Self {
            sample_rate,
            sample_time,
        }
    }
    /// Returns the sample rate as an integer number of Hz
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate.to_u32().unwrap_or_default()
    }
}

impl<Smp: Float> Default for Context<Smp> {
    fn default() -> Self {
        Self::new(<Smp as From<u16>>::from(44100u16))
    }
}
