use super::pulse::DEFAULT_PULSE_DURATION;
use super::*;
use crate::util::rescale_trigger;
use serde::{Deserialize, Serialize};

/// The number of selectable tempi
pub const NUM_BPM_VALUES: usize = 39;

/// The index of the tempo selected on startup (60 BPM)
pub const INIT_BPM: usize = 10;

/// The selectable tempi, in beats per minute.  The spacing is not uniform:
/// it follows the traditional metronome scale, so steps are finer in the
/// slow range.
pub static BPM_VALUES: [u16; NUM_BPM_VALUES] = [
    40, 42, 44, 46, 48, 50, 52, 54, 56, 58, 60, 63, 66, 69, 72, 76, 80, 84, 88, 92, 96, 100, 104,
    108, 112, 116, 120, 126, 132, 138, 144, 152, 160, 168, 176, 184, 192, 200, 208,
];

/// An index into [BPM_VALUES].  It can only be constructed in range, and all
/// of its stepping operations wrap around the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BpmIndex(u8);

impl BpmIndex {
    /// The slowest tempo
    pub const MIN: Self = Self(0);
    /// The fastest tempo
    pub const MAX: Self = Self(NUM_BPM_VALUES as u8 - 1);
    /// Create an index, clamping anything past the end of the table to the
    /// fastest tempo
    pub const fn new_clamped(index: usize) -> Self {
        if index >= NUM_BPM_VALUES {
            Self::MAX
        } else {
            Self(index as u8)
        }
    }
    /// Find the index of a tempo in the table, if it is one of the
    /// selectable values
    pub fn from_bpm(bpm: u16) -> Option<Self> {
        BPM_VALUES
            .iter()
            .position(|x| *x == bpm)
            .map(|i| Self(i as u8))
    }
    /// The raw index
    pub const fn get(self) -> usize {
        self.0 as usize
    }
    /// The tempo at this index, in beats per minute
    pub fn bpm(self) -> u16 {
        BPM_VALUES[self.get()]
    }
    /// The duration of one beat, in seconds
    pub fn period<Smp: Float>(self) -> Smp {
        Smp::SIXTY / Smp::from_u16(self.bpm())
    }
    /// Step `steps` entries toward faster tempi, wrapping from the fastest
    /// back around to the slowest
    pub const fn faster(self, steps: usize) -> Self {
        let mut index = self.0 as usize + steps;
        while index >= NUM_BPM_VALUES {
            index -= NUM_BPM_VALUES;
        }
        Self(index as u8)
    }
    /// Step one entry toward slower tempi.  The wrap check is `<= 0` after
    /// the decrement, so stepping down from index 1 lands on the fastest
    /// tempo rather than on index 0.
    pub const fn slower(self) -> Self {
        let index = self.0 as i32 - 1;
        if index <= 0 {
            Self::MAX
        } else {
            Self(index as u8)
        }
    }
}

impl Default for BpmIndex {
    fn default() -> Self {
        Self(INIT_BPM as u8)
    }
}

impl TryFrom<u8> for BpmIndex {
    type Error = &'static str;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (value as usize) < NUM_BPM_VALUES {
            Ok(Self(value))
        } else {
            Err("BPM index out of range")
        }
    }
}

impl From<BpmIndex> for u8 {
    fn from(value: BpmIndex) -> Self {
        value.0
    }
}

/// The persistent, user-visible state of the Metronome
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoState {
    /// The current tempo
    #[serde(rename = "bpm")]
    pub bpm_index: BpmIndex,
    /// The tempo restored by the reset input
    #[serde(rename = "resetBpm")]
    pub reset_bpm_index: BpmIndex,
    /// Running or stopped
    pub play: bool,
}

/// The six trigger inputs of a [TempoEngine].  `None` means the input is not
/// patched; the voltage is the raw CV otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct TempoInputs<Smp: Float> {
    /// Step three tempi faster
    pub three_step_faster: Option<Smp>,
    /// Step two tempi faster
    pub two_step_faster: Option<Smp>,
    /// Step one tempo faster
    pub one_step_faster: Option<Smp>,
    /// Step one tempo slower
    pub one_step_slower: Option<Smp>,
    /// Return to the reset tempo
    pub bpm_reset: Option<Smp>,
    /// Toggle play/stop
    pub play: Option<Smp>,
}

/// Parameters for a [TempoEngine]
#[derive(Clone, Copy, Debug)]
pub struct TempoParams<Smp: Float> {
    /// Is anything listening to the pulse output?  The clock only runs while
    /// it is.
    pub output_connected: bool,
    /// Width of each output pulse, in seconds
    pub pulse_duration: Smp,
}

impl<Smp: Float> Default for TempoParams<Smp> {
    fn default() -> Self {
        Self {
            output_connected: true,
            pulse_duration: Smp::from_f32(DEFAULT_PULSE_DURATION),
        }
    }
}

/// The Metronome: emits a 10V pulse at the start of every beat of the
/// selected tempo, and lets the tempo be nudged, reset and started/stopped
/// from trigger inputs.
#[derive(Clone, Default)]
pub struct TempoEngine<Smp: Float> {
    state: TempoState,
    timer: Timer<Smp>,
    pulse: PulseGenerator<Smp>,
    three_step_faster: EdgeTrigger,
    two_step_faster: EdgeTrigger,
    one_step_faster: EdgeTrigger,
    one_step_slower: EdgeTrigger,
    bpm_reset: EdgeTrigger,
    play: EdgeTrigger,
}

impl<Smp: Float> TempoEngine<Smp> {
    /// Constructor
    pub fn new() -> Self {
        Self::default()
    }
    /// Construct with a restored state
    pub fn with_state(state: TempoState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }
    /// The persistent state
    pub fn state(&self) -> TempoState {
        self.state
    }
    /// Replace the persistent state.  Timing is not disturbed.
    pub fn set_state(&mut self, state: TempoState) {
        self.state = state;
    }
    /// The current tempo index
    pub fn bpm_index(&self) -> BpmIndex {
        self.state.bpm_index
    }
    /// Select a tempo by index, clamped into the table
    pub fn set_bpm_index(&mut self, index: usize) {
        self.state.bpm_index = BpmIndex::new_clamped(index);
    }
    /// Select the tempo restored by the reset input, clamped into the table
    pub fn set_reset_bpm_index(&mut self, index: usize) {
        self.state.reset_bpm_index = BpmIndex::new_clamped(index);
    }
    /// The current tempo, in beats per minute
    pub fn bpm(&self) -> u16 {
        self.state.bpm_index.bpm()
    }
    /// Is the clock running?
    pub fn is_playing(&self) -> bool {
        self.state.play
    }
    /// Start or stop the clock
    pub fn set_playing(&mut self, play: bool) {
        self.state.play = play;
    }
    /// Seconds since the last beat (or since the clock was started)
    pub fn elapsed(&self) -> Smp {
        self.timer.time()
    }
    /// Restore the initial state, stop the clock and clear all timing and
    /// trigger state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
    fn nudge(trigger: &mut EdgeTrigger, voltage: Option<Smp>) -> bool {
        voltage.map_or(false, |v| trigger.detect(rescale_trigger(v)))
    }
}

impl<Smp: Float> Device<Smp> for TempoEngine<Smp> {
    type Input = TempoInputs<Smp>;
    type Params = TempoParams<Smp>;
    /// `None` while the clock is not driving the output
    type Output = Option<Smp>;
    fn next(
        &mut self,
        context: &Context<Smp>,
        input: TempoInputs<Smp>,
        params: TempoParams<Smp>,
    ) -> Option<Smp> {
        let mut out = None;
        if params.output_connected && self.state.play {
            let dt = context.sample_time;
            let time = self.timer.advance(dt);
            if time >= self.state.bpm_index.period::<Smp>() {
                self.pulse.trigger(params.pulse_duration);
                self.timer.reset();
            } else if time == dt {
                // First sample after a start or reset: the first beat
                // fires immediately.
                self.pulse.trigger(params.pulse_duration);
            }
            out = Some(if self.pulse.advance(dt) {
                Smp::TEN
            } else {
                Smp::ZERO
            });
        }
        if Self::nudge(&mut self.three_step_faster, input.three_step_faster) {
            self.state.bpm_index = self.state.bpm_index.faster(3);
        }
        if Self::nudge(&mut self.two_step_faster, input.two_step_faster) {
            self.state.bpm_index = self.state.bpm_index.faster(2);
        }
        if Self::nudge(&mut self.one_step_faster, input.one_step_faster) {
            self.state.bpm_index = self.state.bpm_index.faster(1);
        }
        if Self::nudge(&mut self.one_step_slower, input.one_step_slower) {
            self.state.bpm_index = self.state.bpm_index.slower();
        }
        if Self::nudge(&mut self.bpm_reset, input.bpm_reset) {
            self.state.bpm_index = self.state.reset_bpm_index;
        }
        if Self::nudge(&mut self.play, input.play) {
            self.state.play = !self.state.play;
            self.timer.reset();
        }
        out
    }
}
