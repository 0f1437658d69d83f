use super::*;
use crate::FREQ_C4;

/// The frequency knob spans +/- this many Hz, multiplied by the octave
/// multiplier of the selected range
pub const MIN_FREQUENCY_RANGE: f32 = 10f32;

/// The number of selectable frequency ranges
pub const NUM_FREQUENCY_RANGES: usize = 9;

/// The index of the range selected on startup (x16)
pub const INIT_FREQUENCY_RANGE: usize = 4;

/// The number of independent pitch buses on a CVFreqShift
pub const NUM_PITCH_BUSES: usize = 9;

/// Lower bound on the linear frequency ratio before taking its logarithm.
/// 2^-10, so the output never drops below -10V.
pub const LOG_FLOOR: f32 = 0.0009766f32;

/// Channels are shifted in batches of this many lanes
pub const BATCH_SIZE: usize = 4;

/// One entry of the frequency range table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyRange {
    /// 2^n for the n-th range
    pub octave_multiplier: u16,
    /// The octave multiplier as a fraction of the frequency of C4, i.e. the
    /// linear pitch ratio that one Hz of shift times the multiplier adds at
    /// 0V
    pub ratio_to_c4: f32,
}

impl FrequencyRange {
    /// The largest shift this range can dial in, in Hz
    pub fn max_shift_hz(&self) -> f32 {
        self.octave_multiplier as f32 * MIN_FREQUENCY_RANGE
    }
}

/// The selectable frequency ranges, x1 through x256
pub static FREQUENCY_RANGES: [FrequencyRange; NUM_FREQUENCY_RANGES] = [
    FrequencyRange {
        octave_multiplier: 1,
        ratio_to_c4: 1f32 / FREQ_C4,
    },
    FrequencyRange {
        octave_multiplier: 2,
        ratio_to_c4: 2f32 / FREQ_C4,
    },
    FrequencyRange {
        octave_multiplier: 4,
        ratio_to_c4: 4f32 / FREQ_C4,
    },
    FrequencyRange {
        octave_multiplier: 8,
        ratio_to_c4: 8f32 / FREQ_C4,
    },
    FrequencyRange {
        octave_multiplier: 16,
        ratio_to_c4: 16f32 / FREQ_C4,
    },
    FrequencyRange {
        octave_multiplier: 32,
        ratio_to_c4: 32f32 / FREQ_C4,
    },
    FrequencyRange {
        octave_multiplier: 64,
        ratio_to_c4: 64f32 / FREQ_C4,
    },
    FrequencyRange {
        octave_multiplier: 128,
        ratio_to_c4: 128f32 / FREQ_C4,
    },
    FrequencyRange {
        octave_multiplier: 256,
        ratio_to_c4: 256f32 / FREQ_C4,
    },
];

/// Parameters for a [PitchShift]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchShiftParams<Smp: Float> {
    /// The frequency knob, in [-MIN_FREQUENCY_RANGE, MIN_FREQUENCY_RANGE]
    pub frequency: Smp,
    /// Index into [FREQUENCY_RANGES].  Out of range values use the widest
    /// range.
    pub range: usize,
    /// Attenuation of the modulation input, in [0, 1]
    pub modulation_amount: Smp,
}

impl<Smp: Float> Default for PitchShiftParams<Smp> {
    fn default() -> Self {
        Self {
            frequency: Smp::ZERO,
            range: INIT_FREQUENCY_RANGE,
            modulation_amount: Smp::ZERO,
        }
    }
}

impl<Smp: Float> PitchShiftParams<Smp> {
    /// The selected frequency range
    pub fn frequency_range(&self) -> &'static FrequencyRange {
        &FREQUENCY_RANGES[self.range.min(NUM_FREQUENCY_RANGES - 1)]
    }
    /// The linear shift to add to each 2^pitch.  The modulation voltage, if
    /// patched, is scaled by the fourth power of the modulation amount so
    /// the knob has fine resolution near zero.
    pub fn freq_shift(&self, modulation: Option<Smp>) -> Smp {
        let mut shift = self.frequency * Smp::from_f32(self.frequency_range().ratio_to_c4);
        if let Some(voltage) = modulation {
            shift = shift + self.modulation_amount.powi(4) * voltage;
        }
        shift
    }
}

/// Shift a 1V/oct pitch by a fixed number of Hz (scaled to C4):
/// `log2(max(LOG_FLOOR, 2^pitch + shift))`
pub fn shift_pitch<Smp: Float>(pitch: Smp, shift: Smp) -> Smp {
    let floor = Smp::from_f32(LOG_FLOOR);
    let linear = pitch.fexp2() + shift;
    // Written so that NaN also lands on the floor
    let clamped = if linear > floor { linear } else { floor };
    clamped.flog2()
}

/// The CVFreqShift engine.
///
/// Unlike a pitch transposition, a frequency shift adds the same number of
/// Hz to every note, so intervals between shifted notes are no longer
/// harmonic.  The engine is stateless apart from a count of processed buses.
#[derive(Clone, Default, Debug)]
pub struct PitchShift<Smp: Float> {
    buses_processed: u64,
    phantom: core::marker::PhantomData<Smp>,
}

impl<Smp: Float> PitchShift<Smp> {
    /// Constructor
    pub fn new() -> Self {
        Self::default()
    }
    /// Shift every channel of `input` into `output`, four lanes at a time.
    /// Both slices should have the bus' channel count; only the common
    /// length is processed.  Returns the number of channels written.
    pub fn process_bus(&mut self, input: &[Smp], output: &mut [Smp], shift: Smp) -> usize {
        let channels = input.len().min(output.len());
        let batches = input[..channels]
            .chunks(BATCH_SIZE)
            .zip(output[..channels].chunks_mut(BATCH_SIZE));
        for (pitches, shifted) in batches {
            let mut lanes = [Smp::ZERO; BATCH_SIZE];
            lanes[..pitches.len()].copy_from_slice(pitches);
            let lanes = lanes.map(|pitch| shift_pitch(pitch, shift));
            shifted.copy_from_slice(&lanes[..shifted.len()]);
        }
        self.buses_processed += 1;
        channels
    }
    /// The number of buses processed since construction.  Disconnected
    /// outputs are skipped by the host and never counted.
    pub fn buses_processed(&self) -> u64 {
        self.buses_processed
    }
}

impl<Smp: Float> Device<Smp> for PitchShift<Smp> {
    /// A 1V/oct pitch
    type Input = Smp;
    /// The shift, as returned by [PitchShiftParams::freq_shift]
    type Params = Smp;
    type Output = Smp;
    fn next(&mut self, _: &Context<Smp>, pitch: Smp, shift: Smp) -> Smp {
        shift_pitch(pitch, shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(pitch: f64, shift: f64) -> f64 {
        f64::max(LOG_FLOOR as f64, pitch.exp2() + shift).log2()
    }

    #[test]
    fn range_table() {
        for (i, range) in FREQUENCY_RANGES.iter().enumerate() {
            assert_eq!(range.octave_multiplier as u32, 1u32 << i);
            let expected = (1u32 << i) as f32 / FREQ_C4;
            assert!((range.ratio_to_c4 - expected).abs() < 1e-9);
        }
        assert_eq!(FREQUENCY_RANGES[4].max_shift_hz(), 160f32);
    }
    #[test]
    fn shift_matches_formula() {
        for i in 0..=100 {
            let pitch = (i as f64) / 10.0 - 5.0;
            for shift in [-2.0, -0.5, 0.0, 0.01, 0.5, 3.0] {
                let out = shift_pitch(pitch, shift);
                assert!((out - reference(pitch, shift)).abs() < 1e-5);
            }
        }
    }
    #[test]
    fn zero_shift_is_identity() {
        for pitch in [-3f32, -1.0, 0.0, 0.25, 2.0] {
            assert!((shift_pitch(pitch, 0f32) - pitch).abs() < 1e-5);
        }
    }
    #[test]
    fn log_argument_is_floored() {
        let out = shift_pitch(0f32, -5f32);
        assert!(out.is_finite());
        assert!((out - LOG_FLOOR.log2()).abs() < 1e-4);
        assert!(shift_pitch(0f32, f32::NAN).is_finite());
    }
    #[test]
    fn freq_shift_with_and_without_modulation() {
        let params = PitchShiftParams {
            frequency: MIN_FREQUENCY_RANGE as f64,
            range: 4,
            modulation_amount: 0.5,
        };
        let base = MIN_FREQUENCY_RANGE as f64 * FREQUENCY_RANGES[4].ratio_to_c4 as f64;
        assert!((params.freq_shift(None) - base).abs() < 1e-9);
        let modulated = params.freq_shift(Some(2.0));
        assert!((modulated - (base + 0.0625 * 2.0)).abs() < 1e-9);
    }
    #[test]
    fn range_index_is_clamped() {
        let params = PitchShiftParams {
            frequency: 1f32,
            range: 100,
            modulation_amount: 0f32,
        };
        assert_eq!(params.frequency_range().octave_multiplier, 256);
    }
    #[test]
    fn bus_processing_in_batches() {
        let mut engine = PitchShift::<f32>::new();
        let input: [f32; 7] = [-2.0, -1.0, 0.0, 0.5, 1.0, 2.0, 3.0];
        let mut output = [99f32; 16];
        let written = engine.process_bus(&input, &mut output[..7], 0.25);
        assert_eq!(written, 7);
        for (x, y) in input.iter().zip(output.iter()) {
            assert!((*y as f64 - reference(*x as f64, 0.25)).abs() < 1e-4);
        }
        assert!(output[7..].iter().all(|x| *x == 99f32));
        assert_eq!(engine.buses_processed(), 1);
    }
    #[test]
    fn full_polyphony() {
        let mut engine = PitchShift::<f64>::new();
        let mut input = [0f64; 16];
        for (i, x) in input.iter_mut().enumerate() {
            *x = i as f64 / 4.0;
        }
        let mut output = [0f64; 16];
        assert_eq!(engine.process_bus(&input, &mut output, 1.0), 16);
        for (x, y) in input.iter().zip(output.iter()) {
            assert!((y - reference(*x, 1.0)).abs() < 1e-5);
        }
    }
}
