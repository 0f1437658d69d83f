//! This module contains definitions of the DSP primitives and the Metronome
//! and CVFreqShift engines built from them.

use crate::context::Context;
use crate::Float;

pub(crate) mod pitchshift;
pub(crate) mod pulse;
pub(crate) mod slew;
pub(crate) mod tempo;
pub(crate) mod timer;
pub(crate) mod trigger;

/// Something that is stepped once per sample frame
///
/// Every engine and primitive in this crate is a `Device`: the Metronome's
/// [TempoEngine], the CVFreqShift [PitchShift], the MIDIPolyExpression
/// engine, and the building blocks they share ([EdgeTrigger],
/// [SlewLimiter], [ExponentialFilter]).
///
/// `Input` is what arrives on patched ports (a trigger voltage, a pitch, or
/// nothing at all for the MIDI driven engine).  `Params` is what the panel
/// sets.  `Output` is whatever the host writes back: a voltage, a slot per
/// MIDI channel, or `None` when an output must be left alone.
pub trait Device<Smp: Float> {
    /// Per-sample signal input
    type Input;
    /// Panel configuration for one sample
    type Params;
    /// Per-sample result
    type Output;
    /// Advance by one sample period of `context`
    fn next(
        &mut self,
        context: &Context<Smp>,
        input: Self::Input,
        params: Self::Params,
    ) -> Self::Output;
    /// Step once per pair of `input` and `params`, lazily.  The iterator
    /// ends when either source runs dry.
    fn process<'a, InputIt, ParamIt>(
        &'a mut self,
        context: &'a Context<Smp>,
        input: InputIt,
        params: ParamIt,
    ) -> DeviceIter<'a, Smp, Self, core::iter::Zip<InputIt, ParamIt>>
    where
        Self: Sized,
        InputIt: Iterator<Item = Self::Input>,
        ParamIt: Iterator<Item = Self::Params>,
    {
        DeviceIter {
            device: self,
            context,
            frames: input.zip(params),
        }
    }
}

/// The lazy sample stream returned by [Device::process]
pub struct DeviceIter<'a, Smp: Float, D: Device<Smp>, Frames> {
    device: &'a mut D,
    context: &'a Context<Smp>,
    frames: Frames,
}

impl<'a, Smp, D, Frames> Iterator for DeviceIter<'a, Smp, D, Frames>
where
    Smp: Float,
    D: Device<Smp>,
    Frames: Iterator<Item = (D::Input, D::Params)>,
{
    type Item = D::Output;
    fn next(&mut self) -> Option<D::Output> {
        let (input, params) = self.frames.next()?;
        Some(self.device.next(self.context, input, params))
    }
}

pub use pitchshift::{
    shift_pitch, FrequencyRange, PitchShift, PitchShiftParams, BATCH_SIZE, FREQUENCY_RANGES,
    INIT_FREQUENCY_RANGE, LOG_FLOOR, MIN_FREQUENCY_RANGE, NUM_FREQUENCY_RANGES, NUM_PITCH_BUSES,
};
pub use pulse::DEFAULT_PULSE_DURATION;
pub use pulse::PulseGenerator;
pub use slew::{ExponentialFilter, SlewLimiter, SlewRates};
pub use tempo::{
    BpmIndex, TempoEngine, TempoInputs, TempoParams, TempoState, BPM_VALUES, INIT_BPM,
    NUM_BPM_VALUES,
};
pub use timer::Timer;
pub use trigger::EdgeTrigger;
