use super::*;

/// A Schmitt trigger used to debounce trigger and gate inputs.
///
/// The trigger goes high once its input reaches 1 and only goes low again
/// after the input falls to 0, so noise between the two thresholds cannot
/// retrigger it.  [EdgeTrigger::detect] reports only the low-to-high
/// transition, so it fires at most once per contiguous high interval.
///
/// Raw voltages are expected to be normalized first, e.g. with
/// [crate::util::rescale_trigger].
#[derive(Clone, Copy, Default, Debug)]
pub struct EdgeTrigger {
    was_high: bool,
}

impl EdgeTrigger {
    /// Constructor
    pub const fn new() -> Self {
        Self { was_high: false }
    }
    /// Feed one sample of the normalized input.  Returns true on a rising
    /// edge only.
    pub fn detect<Smp: Float>(&mut self, input: Smp) -> bool {
        if self.was_high {
            if input <= Smp::ZERO {
                self.was_high = false;
            }
            false
        } else if input >= Smp::ONE {
            self.was_high = true;
            true
        } else {
            false
        }
    }
    /// True while the trigger is in its high state
    pub fn is_high(&self) -> bool {
        self.was_high
    }
    /// Return to the low state
    pub fn reset(&mut self) {
        self.was_high = false;
    }
}

impl<Smp: Float> Device<Smp> for EdgeTrigger {
    type Input = Smp;
    type Params = ();
    type Output = bool;
    fn next(&mut self, _: &Context<Smp>, input: Smp, _: ()) -> bool {
        self.detect(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::rescale_trigger;

    #[test]
    fn fires_once_per_high_interval() {
        let mut trig = EdgeTrigger::new();
        let signal = [0f32, 0.5, 1.0, 1.0, 0.5, 1.0, 0.0, 0.7, 1.2, 2.0];
        let fired: usize = signal.iter().filter(|x| trig.detect(**x)).count();
        // Rising at index 2, held through the dip to 0.5, released at 6,
        // rising again at index 8.
        assert_eq!(fired, 2);
    }
    #[test]
    fn hysteresis_holds_state() {
        let mut trig = EdgeTrigger::new();
        assert!(trig.detect(1f32));
        assert!(!trig.detect(0.01f32));
        assert!(trig.is_high());
        assert!(!trig.detect(1f32));
        assert!(!trig.detect(0f32));
        assert!(!trig.is_high());
        assert!(trig.detect(1f32));
    }
    #[test]
    fn hardware_voltage_range() {
        let mut trig = EdgeTrigger::new();
        assert!(!trig.detect(rescale_trigger(1.9f32)));
        assert!(trig.detect(rescale_trigger(2.5f32)));
        assert!(!trig.detect(rescale_trigger(0.2f32)));
        assert!(!trig.detect(rescale_trigger(0.1f32)));
        assert!(trig.detect(rescale_trigger(5f32)));
    }
    #[test]
    fn reset_returns_low() {
        let mut trig = EdgeTrigger::new();
        trig.detect(1f64);
        trig.reset();
        assert!(trig.detect(1f64));
    }
    #[test]
    fn device_iterator() {
        let ctx = Context::<f32>::default();
        let mut trig = EdgeTrigger::new();
        let input = [0f32, 1.0, 1.0, 0.0, 1.0];
        let edges = trig
            .process(&ctx, input.iter().copied(), core::iter::repeat(()))
            .filter(|x| *x)
            .count();
        assert_eq!(edges, 2);
    }
}
