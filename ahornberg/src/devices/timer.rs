use super::*;

/// A monotonic timer counting the seconds since it was last reset.  Time only
/// advances through per-sample increments.
#[derive(Clone, Copy, Default, Debug)]
pub struct Timer<Smp: Float> {
    time: Smp,
}

impl<Smp: Float> Timer<Smp> {
    /// Constructor
    pub fn new() -> Self {
        Self { time: Smp::ZERO }
    }
    /// Advance the timer by `dt` seconds and return the elapsed time
    pub fn advance(&mut self, dt: Smp) -> Smp {
        self.time = self.time + dt;
        self.time
    }
    /// The elapsed time, in seconds
    pub fn time(&self) -> Smp {
        self.time
    }
    /// Set the elapsed time back to zero
    pub fn reset(&mut self) {
        self.time = Smp::ZERO;
    }
}

impl<Smp: Float> Device<Smp> for Timer<Smp> {
    type Input = ();
    type Params = ();
    type Output = Smp;
    fn next(&mut self, context: &Context<Smp>, _: (), _: ()) -> Smp {
        self.advance(context.sample_time)
    }
}
