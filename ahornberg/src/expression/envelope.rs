use super::*;

/// The slew rate used while a note is held, in units per second
pub const SLEW_VALUE: f32 = 40f32;

/// The volume fall rate after a note-off when no release time is set.
/// Full scale drops in a tenth of a millisecond.
pub const INITIAL_SLEW_VALUE: f32 = 10000f32;

/// The control voltages produced for one MIDI channel on one sample
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct ChannelOutput<Smp: Float> {
    /// 0V, or 10V while a note is held (scaled by velocity in gate velocity
    /// mode)
    pub gate: Smp,
    /// Smoothed volume, 0-10V
    pub volume: Smp,
    /// Smoothed note pitch plus pitch bend, 1V/oct relative to C4
    pub pitch: Smp,
    /// Smoothed modulation, 0-10V
    pub modulation: Smp,
    /// The unsmoothed note pitch, 1V/oct relative to C4
    pub note: Smp,
    /// The unsmoothed pitch bend, in volts
    pub pitch_bend: Smp,
}

/// The expression state of a single MIDI channel
#[derive(Clone, Default, Debug)]
pub struct ChannelEnvelope<Smp: Float> {
    note: u8,
    note_volume: Smp,
    note_pitch: Smp,
    volume: Smp,
    old_volume: Smp,
    volume_msb: u8,
    volume_msb_set: bool,
    note_length: Smp,
    decay_time: Smp,
    pitch: Smp,
    modulation: Smp,
    gate: bool,
    gate_edge: EdgeTrigger,
    retrigger: bool,
    pitch_slew: SlewLimiter<Smp>,
    modulation_slew: ExponentialFilter<Smp>,
    volume_slew: SlewLimiter<Smp>,
}

/// `x^shape` for `x` clamped into [0, 1]
fn shaped<Smp: Float>(x: Smp, shape: Smp) -> Smp {
    let base = util::clamp(x, Smp::ZERO, Smp::ONE);
    if shape == Smp::ONE {
        base
    } else {
        base.fpow(shape)
    }
}

fn from_7_bit<Smp: Float>(value: u8) -> Smp {
    Smp::from_u16(value as u16) / Smp::from_u16(127)
}

impl<Smp: Float> ChannelEnvelope<Smp> {
    /// Constructor
    pub fn new() -> Self {
        Self::default()
    }
    pub(crate) fn note_on(&mut self, note: u8, velocity: u8) {
        self.gate = true;
        self.note = note;
        self.note_pitch = util::note_to_voltage(note);
        self.note_volume = from_7_bit(velocity);
        self.volume = self.note_volume;
        self.retrigger = true;
    }
    pub(crate) fn note_off(&mut self, preserve_pitch: bool) {
        self.gate = false;
        if !preserve_pitch {
            self.note_pitch = Smp::ZERO;
        }
    }
    pub(crate) fn gate_off(&mut self) {
        self.gate = false;
    }
    pub(crate) fn set_volume_msb(&mut self, value: u8) {
        self.volume_msb = value;
        self.volume_msb_set = true;
        self.volume = from_7_bit(value);
    }
    /// Returns true if the LSB completed a 14-bit value
    pub(crate) fn set_volume_lsb(&mut self, value: u8) -> bool {
        if self.volume_msb_set {
            let combined = ((self.volume_msb as u16) << 7) | (value as u16);
            self.volume = Smp::from_u16(combined) / Smp::from_u16(cc::MAX_14_BIT);
            self.volume_msb_set = false;
            true
        } else {
            self.volume = from_7_bit(value);
            false
        }
    }
    pub(crate) fn set_pressure(&mut self, value: u8) {
        self.volume = from_7_bit(value);
    }
    pub(crate) fn set_modulation(&mut self, value: u8) {
        self.modulation = from_7_bit(value);
    }
    pub(crate) fn set_pitch_bend(&mut self, value: u16, shape: Smp, range: Smp) {
        let offset = Smp::from_u16(value.min(cc::MAX_14_BIT))
            - Smp::from_u16(cc::PITCH_BEND_CENTER);
        let bend = if offset < Smp::ZERO {
            offset / Smp::from_u16(cc::PITCH_BEND_CENTER)
        } else {
            offset / Smp::from_u16(cc::MAX_14_BIT - cc::PITCH_BEND_CENTER)
        };
        let magnitude = shaped(bend.abs(), shape) * range / Smp::TWELVE;
        self.pitch = if bend < Smp::ZERO {
            -magnitude
        } else {
            magnitude
        };
    }
    pub(crate) fn end_dispatch(&mut self) {
        self.volume_msb_set = false;
    }
    /// Advance the envelope by `dt` seconds and compute this channel's
    /// control voltages
    pub fn step(&mut self, dt: Smp, params: &ExpressionParams<Smp>) -> ChannelOutput<Smp> {
        let gate_level = if self.gate { Smp::ONE } else { Smp::ZERO };
        if self.gate_edge.detect(gate_level) {
            self.note_length = Smp::ZERO;
            self.decay_time = Smp::ZERO;
        }
        if self.volume != self.old_volume {
            self.decay_time = Smp::ZERO;
            self.old_volume = self.volume;
        }
        if self.gate {
            self.note_length = self.note_length + dt;
            self.decay_time = self.decay_time + dt;
        }

        let volume_target = if self.gate {
            shaped(self.volume, params.volume_shape) * self.decay_gain(params)
        } else {
            Smp::ZERO
        };

        let slow = Smp::from_f32(SLEW_VALUE);
        let fast = Smp::from_f32(INITIAL_SLEW_VALUE);
        if self.retrigger {
            self.pitch_slew.reset(self.note_pitch + self.pitch);
            self.volume_slew.reset(volume_target);
            self.retrigger = false;
        }
        let (pitch_rates, volume_rates) = if self.gate {
            (SlewRates::symmetric(slow), SlewRates::symmetric(slow))
        } else {
            let fall = if params.release > Smp::ZERO {
                Smp::ONE / params.release
            } else {
                fast
            };
            (SlewRates::symmetric(slow), SlewRates { rise: slow, fall })
        };

        let pitch = self
            .pitch_slew
            .advance(dt, self.note_pitch + self.pitch, pitch_rates);
        let volume = self.volume_slew.advance(dt, volume_target, volume_rates);
        let modulation = self.modulation_slew.advance(dt, self.modulation, slow);

        let gate = match (self.gate, params.gate_velocity_mode) {
            (false, _) => Smp::ZERO,
            (true, false) => Smp::TEN,
            (true, true) => Smp::TEN * self.note_volume,
        };
        ChannelOutput {
            gate,
            volume: Smp::TEN * volume,
            pitch,
            modulation: Smp::TEN * modulation,
            note: self.note_pitch,
            pitch_bend: self.pitch,
        }
    }
    fn decay_gain(&self, params: &ExpressionParams<Smp>) -> Smp {
        if params.decay > Smp::ZERO {
            let progress = self.decay_time / params.decay;
            let progress = if progress > Smp::ONE {
                Smp::ONE
            } else {
                progress
            };
            let floor = util::clamp(params.decay_y, Smp::ZERO, Smp::ONE);
            floor + (Smp::ONE - floor) * (Smp::ONE - progress)
        } else {
            Smp::ONE
        }
    }
    /// The last note number received
    pub fn note(&self) -> u8 {
        self.note
    }
    /// The velocity of the last note, in [0, 1]
    pub fn note_volume(&self) -> Smp {
        self.note_volume
    }
    /// The pitch of the last note, 1V/oct relative to C4
    pub fn note_pitch(&self) -> Smp {
        self.note_pitch
    }
    /// The unsmoothed volume, in [0, 1]
    pub fn volume(&self) -> Smp {
        self.volume
    }
    /// The volume MSB awaiting its LSB, if any
    pub fn pending_volume_msb(&self) -> Option<u8> {
        self.volume_msb_set.then_some(self.volume_msb)
    }
    /// Seconds since the current note started
    pub fn note_length(&self) -> Smp {
        self.note_length
    }
    /// Seconds since the note started or the volume last changed
    pub fn decay_time(&self) -> Smp {
        self.decay_time
    }
    /// The unsmoothed pitch bend, in volts
    pub fn pitch(&self) -> Smp {
        self.pitch
    }
    /// The unsmoothed modulation, in [0, 1]
    pub fn modulation(&self) -> Smp {
        self.modulation
    }
    /// True while a note is held
    pub fn gate(&self) -> bool {
        self.gate
    }
    /// The gate as seen by the last processed sample
    pub fn old_gate(&self) -> bool {
        self.gate_edge.is_high()
    }
}
