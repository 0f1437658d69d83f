use super::*;

/// Rise and fall rates for a [SlewLimiter], in units per second
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlewRates<Smp: Float> {
    /// Maximum rate of increase
    pub rise: Smp,
    /// Maximum rate of decrease
    pub fall: Smp,
}

impl<Smp: Float> SlewRates<Smp> {
    /// The same rate in both directions
    pub fn symmetric(rate: Smp) -> Self {
        Self {
            rise: rate,
            fall: rate,
        }
    }
}

/// Limits the rate of change of a signal.  Each step moves the output toward
/// the target by at most `rise * dt` upward or `fall * dt` downward.
#[derive(Clone, Copy, Default, Debug)]
pub struct SlewLimiter<Smp: Float> {
    out: Smp,
}

impl<Smp: Float> SlewLimiter<Smp> {
    /// Constructor
    pub fn new() -> Self {
        Self { out: Smp::ZERO }
    }
    /// Move toward `target` over one step of `dt` seconds
    pub fn advance(&mut self, dt: Smp, target: Smp, rates: SlewRates<Smp>) -> Smp {
        let lo = self.out - rates.fall * dt;
        let hi = self.out + rates.rise * dt;
        self.out = if target > hi {
            hi
        } else if target < lo {
            lo
        } else {
            target
        };
        self.out
    }
    /// The current output
    pub fn value(&self) -> Smp {
        self.out
    }
    /// Jump the output to `value`
    pub fn reset(&mut self, value: Smp) {
        self.out = value;
    }
}

impl<Smp: Float> Device<Smp> for SlewLimiter<Smp> {
    type Input = Smp;
    type Params = SlewRates<Smp>;
    type Output = Smp;
    fn next(&mut self, context: &Context<Smp>, target: Smp, rates: SlewRates<Smp>) -> Smp {
        self.advance(context.sample_time, target, rates)
    }
}

/// A one-pole lowpass: each step closes `lambda * dt` of the remaining
/// distance to the target (never more than all of it).
#[derive(Clone, Copy, Default, Debug)]
pub struct ExponentialFilter<Smp: Float> {
    out: Smp,
}

impl<Smp: Float> ExponentialFilter<Smp> {
    /// Constructor
    pub fn new() -> Self {
        Self { out: Smp::ZERO }
    }
    /// Move toward `target` over one step of `dt` seconds
    pub fn advance(&mut self, dt: Smp, target: Smp, lambda: Smp) -> Smp {
        let mut k = lambda * dt;
        if k > Smp::ONE {
            k = Smp::ONE;
        }
        self.out = self.out + (target - self.out) * k;
        self.out
    }
    /// The current output
    pub fn value(&self) -> Smp {
        self.out
    }
    /// Jump the output to `value`
    pub fn reset(&mut self, value: Smp) {
        self.out = value;
    }
}

impl<Smp: Float> Device<Smp> for ExponentialFilter<Smp> {
    type Input = Smp;
    type Params = Smp;
    type Output = Smp;
    fn next(&mut self, context: &Context<Smp>, target: Smp, lambda: Smp) -> Smp {
        self.advance(context.sample_time, target, lambda)
    }
}
