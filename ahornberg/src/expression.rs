//! This module contains the expression engine behind MIDIPolyExpression.
//!
//! Each MIDI channel carries one note (as with MPE controllers), and each
//! channel in the configured range is mapped onto one polyphonic output
//! slot.  MIDI messages update the per-channel [ChannelEnvelope]s between
//! samples; the per-sample pass smooths them into control voltages.

use crate::devices::{Device, EdgeTrigger, ExponentialFilter, SlewLimiter, SlewRates};
use crate::{context::Context, util, Float, MAX_CHANNELS};
use wmidi::MidiMessage;

pub mod cc;
mod envelope;

pub use envelope::{ChannelEnvelope, ChannelOutput, INITIAL_SLEW_VALUE, SLEW_VALUE};

/// The lowest MIDI channel number
pub const MIN_MIDI_CHANNEL: u8 = 1;
/// The highest MIDI channel number
pub const MAX_MIDI_CHANNEL: u8 = 16;
/// The default pitch bend range, in semitones
pub const DEFAULT_PITCH_BEND_RANGE: u16 = 48;

/// Configuration shared by every channel of an [ExpressionEngine]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpressionParams<Smp: Float> {
    /// The first MIDI channel listened to, 1-16
    pub first_channel: u8,
    /// The number of channels listened to, 1-16
    pub channel_count: u8,
    /// When set, the gate output carries the note velocity
    pub gate_velocity_mode: bool,
    /// Time for a held note to fall to `decay_y`, in seconds.  0 disables
    /// decay.
    pub decay: Smp,
    /// Time for the volume to fall from full scale after note-off, in
    /// seconds.  0 releases immediately.
    pub release: Smp,
    /// Exponent applied to the pitch bend
    pub pitch_shape: Smp,
    /// Exponent applied to the volume
    pub volume_shape: Smp,
    /// The level a decaying note settles at, in [0, 1]
    pub decay_y: Smp,
    /// Keep the note pitch after note-off instead of returning to 0V
    pub preserve_pitch_after_note_off: bool,
    /// Full scale pitch bend, in semitones
    pub pitch_bend_range: Smp,
}

impl<Smp: Float> Default for ExpressionParams<Smp> {
    fn default() -> Self {
        Self {
            first_channel: MIN_MIDI_CHANNEL,
            channel_count: MAX_MIDI_CHANNEL,
            gate_velocity_mode: false,
            decay: Smp::ZERO,
            release: Smp::ZERO,
            pitch_shape: Smp::ONE,
            volume_shape: Smp::ONE,
            decay_y: Smp::ZERO,
            preserve_pitch_after_note_off: false,
            pitch_bend_range: Smp::from_u16(DEFAULT_PITCH_BEND_RANGE),
        }
    }
}

impl<Smp: Float> ExpressionParams<Smp> {
    /// The zero-based index of the first channel in range
    pub fn first_index(&self) -> usize {
        self.first_channel.clamp(MIN_MIDI_CHANNEL, MAX_MIDI_CHANNEL) as usize - 1
    }
    /// The zero-based index of the last channel in range
    pub fn last_index(&self) -> usize {
        let count = self.channel_count.clamp(1, MAX_MIDI_CHANNEL) as usize;
        (self.first_index() + count - 1).min(MAX_CHANNELS - 1)
    }
    /// The number of channels in range, which is also the number of
    /// polyphonic output channels
    pub fn active_channels(&self) -> usize {
        self.last_index() - self.first_index() + 1
    }
    /// The output slot for a zero-based MIDI channel index, or `None` if the
    /// channel is out of range
    pub fn slot(&self, channel_index: usize) -> Option<usize> {
        if (self.first_index()..=self.last_index()).contains(&channel_index) {
            Some(channel_index - self.first_index())
        } else {
            None
        }
    }
}

/// The outputs of one sample of an [ExpressionEngine]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpressionOutput<Smp: Float> {
    /// The number of valid slots
    pub channels: usize,
    /// Per-slot outputs.  Slots at or beyond `channels` are zero.
    pub slots: [ChannelOutput<Smp>; MAX_CHANNELS],
}

impl<Smp: Float> Default for ExpressionOutput<Smp> {
    fn default() -> Self {
        Self {
            channels: 0,
            slots: [ChannelOutput::default(); MAX_CHANNELS],
        }
    }
}

impl<Smp: Float> ExpressionOutput<Smp> {
    /// The valid slots
    pub fn active(&self) -> &[ChannelOutput<Smp>] {
        &self.slots[..self.channels]
    }
}

/// The MIDIPolyExpression engine: 16 [ChannelEnvelope]s fed by MIDI
#[derive(Clone, Default, Debug)]
pub struct ExpressionEngine<Smp: Float> {
    channels: [ChannelEnvelope<Smp>; MAX_CHANNELS],
    volume_14bit_mode: bool,
}

impl<Smp: Float> ExpressionEngine<Smp> {
    /// Constructor
    pub fn new() -> Self {
        Self::default()
    }
    /// Apply one MIDI message.  Messages for channels outside the configured
    /// range, and messages the engine has no use for, are ignored.
    pub fn handle_midi(&mut self, msg: &MidiMessage, params: &ExpressionParams<Smp>) {
        let Some(channel) = Self::channel_of(msg) else {
            return;
        };
        if params.slot(channel).is_none() {
            return;
        }
        let env = &mut self.channels[channel];
        match msg {
            MidiMessage::NoteOn(_, note, vel) if u8::from(*vel) > 0 => {
                env.note_on(u8::from(*note), u8::from(*vel));
            }
            MidiMessage::NoteOn(_, _, _) | MidiMessage::NoteOff(_, _, _) => {
                env.note_off(params.preserve_pitch_after_note_off);
            }
            MidiMessage::ControlChange(_, function, value) => {
                let value = u8::from(*value);
                match *function {
                    cc::VOLUME_MSB => env.set_volume_msb(value),
                    cc::VOLUME_LSB => {
                        if env.set_volume_lsb(value) {
                            self.volume_14bit_mode = true;
                        }
                    }
                    cc::MODULATION | cc::TIMBRE => env.set_modulation(value),
                    cc::ALL_NOTES_OFF | cc::ALL_SOUND_OFF => env.gate_off(),
                    _ => {}
                }
            }
            MidiMessage::ChannelPressure(_, value) => {
                env.set_pressure(u8::from(*value));
            }
            MidiMessage::PitchBendChange(_, bend) => {
                env.set_pitch_bend(
                    u16::from(*bend),
                    params.pitch_shape,
                    params.pitch_bend_range,
                );
            }
            _ => {}
        }
    }
    fn channel_of(msg: &MidiMessage) -> Option<usize> {
        match msg {
            MidiMessage::NoteOn(ch, _, _)
            | MidiMessage::NoteOff(ch, _, _)
            | MidiMessage::ControlChange(ch, _, _)
            | MidiMessage::ChannelPressure(ch, _)
            | MidiMessage::PitchBendChange(ch, _) => Some(ch.index() as usize),
            _ => None,
        }
    }
    /// Close the current dispatch window.  A volume MSB that was not
    /// followed by its LSB within the window is dropped.
    pub fn end_dispatch(&mut self) {
        for env in self.channels.iter_mut() {
            env.end_dispatch();
        }
    }
    /// True once a 14-bit volume value has been received
    pub fn volume_14bit_mode(&self) -> bool {
        self.volume_14bit_mode
    }
    /// Set the 14-bit volume flag, e.g. when restoring saved state
    pub fn set_volume_14bit_mode(&mut self, mode: bool) {
        self.volume_14bit_mode = mode;
    }
    /// The envelope for a zero-based MIDI channel index
    pub fn envelope(&self, channel_index: usize) -> Option<&ChannelEnvelope<Smp>> {
        self.channels.get(channel_index)
    }
    /// Return every channel to its initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl<Smp: Float> Device<Smp> for ExpressionEngine<Smp> {
    /// MIDI is applied through [ExpressionEngine::handle_midi]
    type Input = ();
    type Params = ExpressionParams<Smp>;
    type Output = ExpressionOutput<Smp>;
    fn next(
        &mut self,
        context: &Context<Smp>,
        _: (),
        params: ExpressionParams<Smp>,
    ) -> ExpressionOutput<Smp> {
        let mut out = ExpressionOutput::default();
        let first = params.first_index();
        let last = params.last_index();
        out.channels = last - first + 1;
        for (slot, env) in out
            .slots
            .iter_mut()
            .zip(self.channels[first..=last].iter_mut())
        {
            *slot = env.step(context.sample_time, &params);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmidi::{Channel, ControlFunction, Note, PitchBend, U7};

    fn ch(n: u8) -> Channel {
        Channel::from_index(n).unwrap()
    }
    fn control(channel: u8, function: ControlFunction, value: u8) -> MidiMessage<'static> {
        MidiMessage::ControlChange(ch(channel), function, U7::from_u8_lossy(value))
    }
    fn note_on(channel: u8, note: u8, vel: u8) -> MidiMessage<'static> {
        MidiMessage::NoteOn(
            ch(channel),
            Note::from_u8_lossy(note),
            U7::from_u8_lossy(vel),
        )
    }
    fn note_off(channel: u8, note: u8) -> MidiMessage<'static> {
        MidiMessage::NoteOff(ch(channel), Note::from_u8_lossy(note), U7::MIN)
    }

    #[test]
    fn channel_range() {
        let p = ExpressionParams::<f32> {
            first_channel: 3,
            channel_count: 4,
            ..Default::default()
        };
        assert_eq!(p.first_index(), 2);
        assert_eq!(p.last_index(), 5);
        assert_eq!(p.active_channels(), 4);
        assert_eq!(p.slot(2), Some(0));
        assert_eq!(p.slot(5), Some(3));
        assert_eq!(p.slot(6), None);
        let p = ExpressionParams::<f32> {
            first_channel: 14,
            channel_count: 16,
            ..Default::default()
        };
        assert_eq!(p.active_channels(), 3);
        assert_eq!(ExpressionParams::<f32>::default().active_channels(), 16);
    }
    #[test]
    fn note_on_off_in_one_window() {
        let ctx = Context::new(1000f64);
        let p = ExpressionParams::default();
        let mut engine = ExpressionEngine::new();
        engine.handle_midi(&note_on(0, 72, 100), &p);
        engine.handle_midi(&note_off(0, 72), &p);
        engine.end_dispatch();
        let out = engine.next(&ctx, (), p);
        assert_eq!(out.slots[0].gate, 0.0);
        assert_eq!(out.slots[0].note, 0.0);
    }
    #[test]
    fn preserved_pitch_after_note_off() {
        let ctx = Context::new(1000f64);
        let p = ExpressionParams {
            preserve_pitch_after_note_off: true,
            ..Default::default()
        };
        let mut engine = ExpressionEngine::new();
        engine.handle_midi(&note_on(0, 72, 100), &p);
        engine.handle_midi(&note_on(0, 72, 0), &p);
        let out = engine.next(&ctx, (), p);
        assert_eq!(out.slots[0].gate, 0.0);
        assert!((out.slots[0].note - 1.0).abs() < 1e-12);
    }
    #[test]
    fn fourteen_bit_volume() {
        let p = ExpressionParams::<f64>::default();
        let mut engine = ExpressionEngine::new();
        engine.handle_midi(&control(1, cc::VOLUME_MSB, 64), &p);
        engine.handle_midi(&control(1, cc::VOLUME_LSB, 0), &p);
        let env = engine.envelope(1).unwrap();
        assert!((env.volume() - 8192.0 / 16383.0).abs() < 1e-12);
        assert_eq!(env.pending_volume_msb(), None);
        assert!(engine.volume_14bit_mode());
    }
    #[test]
    fn lone_lsb_is_seven_bit() {
        let p = ExpressionParams::<f64>::default();
        let mut engine = ExpressionEngine::new();
        engine.handle_midi(&control(1, cc::VOLUME_LSB, 0), &p);
        assert_eq!(engine.envelope(1).unwrap().volume(), 0.0);
        assert!(!engine.volume_14bit_mode());
    }
    #[test]
    fn msb_expires_with_window() {
        let p = ExpressionParams::<f64>::default();
        let mut engine = ExpressionEngine::new();
        engine.handle_midi(&control(0, cc::VOLUME_MSB, 64), &p);
        assert_eq!(engine.envelope(0).unwrap().pending_volume_msb(), Some(64));
        engine.end_dispatch();
        engine.handle_midi(&control(0, cc::VOLUME_LSB, 127), &p);
        assert_eq!(engine.envelope(0).unwrap().volume(), 1.0);
        assert!(!engine.volume_14bit_mode());
    }
    #[test]
    fn out_of_range_channel_ignored() {
        let ctx = Context::new(1000f32);
        let p = ExpressionParams {
            first_channel: 2,
            channel_count: 2,
            ..Default::default()
        };
        let mut engine = ExpressionEngine::new();
        engine.handle_midi(&note_on(0, 60, 100), &p);
        engine.handle_midi(&note_on(3, 60, 100), &p);
        assert!(!engine.envelope(0).unwrap().gate());
        assert!(!engine.envelope(3).unwrap().gate());
        engine.handle_midi(&note_on(2, 60, 100), &p);
        let out = engine.next(&ctx, (), p);
        assert_eq!(out.channels, 2);
        assert_eq!(out.slots[0].gate, 0.0);
        assert_eq!(out.slots[1].gate, 10.0);
        assert!(out.slots[2..].iter().all(|s| *s == ChannelOutput::default()));
    }
    #[test]
    fn controllers() {
        let p = ExpressionParams::<f64>::default();
        let mut engine = ExpressionEngine::new();
        engine.handle_midi(&control(4, cc::TIMBRE, 127), &p);
        assert_eq!(engine.envelope(4).unwrap().modulation(), 1.0);
        engine.handle_midi(&control(4, cc::MODULATION, 0), &p);
        assert_eq!(engine.envelope(4).unwrap().modulation(), 0.0);
        engine.handle_midi(&MidiMessage::ChannelPressure(ch(4), U7::MAX), &p);
        assert_eq!(engine.envelope(4).unwrap().volume(), 1.0);
        engine.handle_midi(
            &MidiMessage::PitchBendChange(ch(4), PitchBend::MIN),
            &p,
        );
        assert!((engine.envelope(4).unwrap().pitch() + 4.0).abs() < 1e-12);
        engine.handle_midi(&note_on(4, 60, 1), &p);
        engine.handle_midi(&control(4, cc::ALL_NOTES_OFF, 0), &p);
        assert!(!engine.envelope(4).unwrap().gate());
    }
    #[test]
    fn reset_clears_everything() {
        let p = ExpressionParams::<f32>::default();
        let mut engine = ExpressionEngine::new();
        engine.handle_midi(&note_on(0, 60, 100), &p);
        engine.set_volume_14bit_mode(true);
        engine.reset();
        assert!(!engine.envelope(0).unwrap().gate());
        assert!(!engine.volume_14bit_mode());
    }
}
