use super::*;

/// The default pulse duration, in seconds
pub const DEFAULT_PULSE_DURATION: f32 = 1e-3f32;

/// Generates a fixed-length pulse once triggered.
///
/// Triggering while a pulse is already active keeps whichever of the two
/// remaining durations is longer; a trigger never shortens a pulse.
#[derive(Clone, Copy, Default, Debug)]
pub struct PulseGenerator<Smp: Float> {
    remaining: Smp,
}

impl<Smp: Float> PulseGenerator<Smp> {
    /// Constructor
    pub fn new() -> Self {
        Self {
            remaining: Smp::ZERO,
        }
    }
    /// Arm the pulse for `duration` seconds
    pub fn trigger(&mut self, duration: Smp) {
        if duration > self.remaining {
            self.remaining = duration;
        }
    }
    /// Arm the pulse for [DEFAULT_PULSE_DURATION]
    pub fn trigger_default(&mut self) {
        self.trigger(Smp::from_f32(DEFAULT_PULSE_DURATION));
    }
    /// Step the pulse forward by `dt` seconds.  Returns true while the pulse
    /// is high.
    pub fn advance(&mut self, dt: Smp) -> bool {
        if self.remaining > Smp::ZERO {
            self.remaining = self.remaining - dt;
            true
        } else {
            false
        }
    }
    /// The time left on the current pulse, in seconds
    pub fn remaining(&self) -> Smp {
        self.remaining
    }
    /// Cancel any active pulse
    pub fn reset(&mut self) {
        self.remaining = Smp::ZERO;
    }
}

impl<Smp: Float> Device<Smp> for PulseGenerator<Smp> {
    type Input = ();
    type Params = ();
    type Output = bool;
    fn next(&mut self, context: &Context<Smp>, _: (), _: ()) -> bool {
        self.advance(context.sample_time)
    }
}
