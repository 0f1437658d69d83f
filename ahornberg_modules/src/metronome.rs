//! The Metronome module: a 10V pulse at the start of every beat, with a
//! radio button per tempo and trigger inputs to nudge, reset and
//! start/stop the clock.

use std::sync::Arc;

use ahornberg::devices::{
    Device, TempoEngine, TempoInputs, TempoParams, TempoState, BPM_VALUES, INIT_BPM,
    NUM_BPM_VALUES,
};
use serde::Deserialize;

use crate::paramquantity::{bpm_s2v, bpm_v2s};
use crate::{Input, Module, Output, Param, ParamQuantity, ProcessArgs};

/// The first of the [NUM_BPM_VALUES] tempo buttons
pub const BPM_VALUE_BUTTON_PARAM: usize = 0;
/// The selected tempo, as an index into [BPM_VALUES]
pub const BPM_VALUE_PARAM: usize = BPM_VALUE_BUTTON_PARAM + NUM_BPM_VALUES;
/// The tempo restored by [BPM_RESET_INPUT]
pub const BPM_RESET_VALUE_PARAM: usize = BPM_VALUE_PARAM + 1;
/// Running (1) or stopped (0)
pub const PLAY_PARAM: usize = BPM_RESET_VALUE_PARAM + 1;
pub const NUM_PARAMS: usize = PLAY_PARAM + 1;

/// Trigger inputs
pub const THREE_STEP_FASTER_INPUT: usize = 0;
pub const TWO_STEP_FASTER_INPUT: usize = 1;
pub const ONE_STEP_FASTER_INPUT: usize = 2;
pub const ONE_STEP_SLOWER_INPUT: usize = 3;
pub const BPM_RESET_INPUT: usize = 4;
pub const PLAY_INPUT: usize = 5;
pub const NUM_INPUTS: usize = 6;

/// 10V pulse at the start of every beat
pub const BPM_OUTPUT: usize = 0;
pub const NUM_OUTPUTS: usize = 1;

fn bpm_quantity(name: &str) -> ParamQuantity {
    ParamQuantity::new(name, 0f32, (NUM_BPM_VALUES - 1) as f32, INIT_BPM as f32)
        .with_snap()
        .with_unit(" BPM")
        .with_value_to_string(Arc::new(bpm_v2s))
        .with_string_to_value(Arc::new(bpm_s2v))
}

/// The Metronome module
pub struct Metronome {
    pub params: Vec<Param>,
    pub inputs: [Input; NUM_INPUTS],
    pub outputs: [Output; NUM_OUTPUTS],
    engine: TempoEngine<f32>,
    mirrored_bpm: usize,
}

impl Default for Metronome {
    fn default() -> Self {
        Self::new()
    }
}

impl Metronome {
    /// A stopped metronome at 60 BPM
    pub fn new() -> Self {
        let mut params: Vec<Param> = BPM_VALUES
            .iter()
            .enumerate()
            .map(|(i, bpm)| ParamQuantity::switch(format!("{} BPM", bpm), i == INIT_BPM).into())
            .collect();
        params.push(bpm_quantity("BPM").into());
        params.push(bpm_quantity("Reset BPM").into());
        params.push(ParamQuantity::switch("Play / Stop", false).into());
        log::debug!("Creating Metronome with {} params", params.len());
        Self {
            params,
            inputs: Default::default(),
            outputs: Default::default(),
            engine: TempoEngine::new(),
            mirrored_bpm: INIT_BPM,
        }
    }
    /// The current tempo, in beats per minute
    pub fn bpm(&self) -> u16 {
        self.engine.bpm()
    }
    /// The state saved with the patch
    pub fn state(&self) -> TempoState {
        self.engine.state()
    }
    /// Press the button for tempo `index`
    pub fn select_bpm(&mut self, index: usize) {
        if index < NUM_BPM_VALUES {
            self.params[BPM_VALUE_BUTTON_PARAM + index].set_value(1f32);
        }
    }
    /// Pull user edits from the params into the engine.  A changed tempo
    /// param wins; otherwise a newly pressed tempo button selects its tempo.
    fn read_params(&mut self) {
        let requested = self.params[BPM_VALUE_PARAM].index();
        let index = if requested != self.mirrored_bpm {
            requested
        } else {
            (0..NUM_BPM_VALUES)
                .find(|i| {
                    *i != self.mirrored_bpm && self.params[BPM_VALUE_BUTTON_PARAM + i].is_on()
                })
                .unwrap_or(self.mirrored_bpm)
        };
        self.engine.set_bpm_index(index);
        self.engine
            .set_reset_bpm_index(self.params[BPM_RESET_VALUE_PARAM].index());
        self.engine.set_playing(self.params[PLAY_PARAM].is_on());
    }
    /// Mirror the engine state into the params, lighting exactly one tempo
    /// button
    fn write_params(&mut self) {
        let state = self.engine.state();
        let index = state.bpm_index.get();
        self.mirrored_bpm = index;
        for i in 0..NUM_BPM_VALUES {
            self.params[BPM_VALUE_BUTTON_PARAM + i].set_value(if i == index { 1f32 } else { 0f32 });
        }
        self.params[BPM_VALUE_PARAM].set_value(index as f32);
        self.params[BPM_RESET_VALUE_PARAM].set_value(state.reset_bpm_index.get() as f32);
        self.params[PLAY_PARAM].set_value(if state.play { 1f32 } else { 0f32 });
    }
}

impl Module for Metronome {
    fn process(&mut self, args: &ProcessArgs) {
        self.read_params();
        let inputs = TempoInputs {
            three_step_faster: self.inputs[THREE_STEP_FASTER_INPUT].connected_voltage(),
            two_step_faster: self.inputs[TWO_STEP_FASTER_INPUT].connected_voltage(),
            one_step_faster: self.inputs[ONE_STEP_FASTER_INPUT].connected_voltage(),
            one_step_slower: self.inputs[ONE_STEP_SLOWER_INPUT].connected_voltage(),
            bpm_reset: self.inputs[BPM_RESET_INPUT].connected_voltage(),
            play: self.inputs[PLAY_INPUT].connected_voltage(),
        };
        let params = TempoParams {
            output_connected: self.outputs[BPM_OUTPUT].is_connected(),
            ..TempoParams::default()
        };
        if let Some(voltage) = self.engine.next(&args.context(), inputs, params) {
            self.outputs[BPM_OUTPUT].set_voltage(voltage, 0);
        }
        self.write_params();
    }
    fn on_reset(&mut self) {
        self.engine.reset();
        self.mirrored_bpm = INIT_BPM;
        for param in self.params.iter_mut() {
            param.reset();
        }
        self.outputs[BPM_OUTPUT].set_voltage(0f32, 0);
    }
    fn data_to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.engine.state()).unwrap_or_default()
    }
    fn data_from_json(&mut self, data: &serde_json::Value) -> Result<(), serde_json::Error> {
        let state = TempoState::deserialize(data).map_err(|e| {
            log::warn!("Ignoring saved Metronome state: {}", e);
            e
        })?;
        self.engine.set_state(state);
        self.write_params();
        Ok(())
    }
}
