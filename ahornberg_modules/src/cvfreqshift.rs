//! The CVFreqShift module: nine polyphonic 1V/oct buses, all shifted by the
//! same number of Hz.

use std::sync::Arc;

use ahornberg::devices::{
    PitchShift, PitchShiftParams, INIT_FREQUENCY_RANGE, MIN_FREQUENCY_RANGE,
    NUM_FREQUENCY_RANGES, NUM_PITCH_BUSES,
};

use crate::paramquantity::{frequency_range_s2v, frequency_range_v2s};
use crate::{Input, Module, Output, Param, ParamQuantity, ProcessArgs};

/// The shift, in Hz per octave multiplier of the selected range
pub const FREQUENCY_PARAM: usize = 0;
/// Attenuator for [FREQUENCY_MODULATION_INPUT]
pub const FREQUENCY_MODULATION_AMOUNT_PARAM: usize = 1;
/// Index into the frequency range table
pub const FREQUENCY_RANGE_PARAM: usize = 2;
pub const NUM_PARAMS: usize = 3;

/// The first of the [NUM_PITCH_BUSES] pitch inputs
pub const PITCH_INPUT: usize = 0;
/// Added to the shift, scaled by the fourth power of the attenuator
pub const FREQUENCY_MODULATION_INPUT: usize = PITCH_INPUT + NUM_PITCH_BUSES;
pub const NUM_INPUTS: usize = FREQUENCY_MODULATION_INPUT + 1;

/// The first of the [NUM_PITCH_BUSES] pitch outputs
pub const PITCH_OUTPUT: usize = 0;
pub const NUM_OUTPUTS: usize = PITCH_OUTPUT + NUM_PITCH_BUSES;

/// The CVFreqShift module
pub struct CvFreqShift {
    pub params: Vec<Param>,
    pub inputs: [Input; NUM_INPUTS],
    pub outputs: [Output; NUM_OUTPUTS],
    engine: PitchShift<f32>,
}

impl Default for CvFreqShift {
    fn default() -> Self {
        Self::new()
    }
}

impl CvFreqShift {
    /// A CVFreqShift with no shift
    pub fn new() -> Self {
        let params: Vec<Param> = vec![
            ParamQuantity::new(
                "Frequency",
                -MIN_FREQUENCY_RANGE,
                MIN_FREQUENCY_RANGE,
                0f32,
            )
            .with_unit(" Hz")
            .into(),
            ParamQuantity::new("Frequency Modulation", 0f32, 1f32, 0f32).into(),
            ParamQuantity::new(
                "Frequency Range",
                0f32,
                (NUM_FREQUENCY_RANGES - 1) as f32,
                INIT_FREQUENCY_RANGE as f32,
            )
            .with_snap()
            .with_unit(" Hz")
            .with_value_to_string(Arc::new(frequency_range_v2s))
            .with_string_to_value(Arc::new(frequency_range_s2v))
            .into(),
        ];
        log::debug!("Creating CVFreqShift with {} pitch buses", NUM_PITCH_BUSES);
        Self {
            params,
            inputs: Default::default(),
            outputs: Default::default(),
            engine: PitchShift::new(),
        }
    }
    /// The engine parameters as currently set on the panel
    pub fn shift_params(&self) -> PitchShiftParams<f32> {
        PitchShiftParams {
            frequency: self.params[FREQUENCY_PARAM].value(),
            range: self.params[FREQUENCY_RANGE_PARAM].index(),
            modulation_amount: self.params[FREQUENCY_MODULATION_AMOUNT_PARAM].value(),
        }
    }
    /// The number of buses processed so far.  Buses whose output is not
    /// connected are skipped.
    pub fn buses_processed(&self) -> u64 {
        self.engine.buses_processed()
    }
}

impl Module for CvFreqShift {
    fn process(&mut self, _: &ProcessArgs) {
        let shift = self
            .shift_params()
            .freq_shift(self.inputs[FREQUENCY_MODULATION_INPUT].connected_voltage());
        let buses = self.inputs[PITCH_INPUT..PITCH_INPUT + NUM_PITCH_BUSES]
            .iter()
            .zip(self.outputs[PITCH_OUTPUT..PITCH_OUTPUT + NUM_PITCH_BUSES].iter_mut());
        for (input, output) in buses {
            if output.is_connected() {
                output.set_channels(input.channels());
                self.engine
                    .process_bus(input.voltages(), output.voltages_mut(), shift);
            }
        }
    }
    fn on_reset(&mut self) {
        for param in self.params.iter_mut() {
            param.reset();
        }
    }
}
