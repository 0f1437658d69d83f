//! The MIDIPolyExpression module: turns an MPE (one note per channel) MIDI
//! stream into polyphonic gate, volume, pitch and modulation voltages.

use ahornberg::devices::Device;
use ahornberg::expression::{
    ChannelOutput, ExpressionEngine, ExpressionOutput, ExpressionParams, MAX_MIDI_CHANNEL,
    MIN_MIDI_CHANNEL,
};
use serde::{Deserialize, Serialize};

use crate::{Light, MidiQueue, Module, Output, Param, ParamQuantity, ProcessArgs};

/// First and number of MIDI channels listened to, 1-based
pub const MIDI_CHANNEL_FIRST_PARAM: usize = 0;
pub const MIDI_CHANNEL_COUNT_PARAM: usize = 1;
/// Scale the gate by note velocity
pub const GATE_VELOCITY_MODE_PARAM: usize = 2;
/// Decay and release times, in seconds
pub const DECAY_PARAM: usize = 3;
pub const RELEASE_PARAM: usize = 4;
/// Exponents applied to pitch bend and volume
pub const PITCH_SHAPE_PARAM: usize = 5;
pub const VOLUME_SHAPE_PARAM: usize = 6;
/// The level volume decays to while a note is held
pub const DECAY_Y_PARAM: usize = 7;
/// Keep the note pitch after note-off
pub const PRESERVE_PITCH_AFTER_NOTEOFF_PARAM: usize = 8;
pub const NUM_PARAMS: usize = 9;

/// Polyphonic outputs, one channel per listened MIDI channel
pub const GATE_OUTPUT: usize = 0;
pub const VOLUME_OUTPUT: usize = 1;
pub const PITCH_OUTPUT: usize = 2;
pub const MODULATION_OUTPUT: usize = 3;
pub const NOTE_OUTPUT: usize = 4;
pub const PITCHBEND_OUTPUT: usize = 5;
pub const NUM_OUTPUTS: usize = 6;

/// Lit once a 14-bit channel volume has been received
pub const VOLUME_14_BIT_LIGHT: usize = 0;
pub const NUM_LIGHTS: usize = 1;

/// Longest decay and release times, in seconds
pub const MAX_ENVELOPE_TIME: f32 = 10f32;
/// Shape exponents span [1/MAX_SHAPE, MAX_SHAPE]
pub const MAX_SHAPE: f32 = 4f32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SavedData {
    #[serde(rename = "volume14BitMode")]
    volume_14bit_mode: bool,
}

/// The MIDIPolyExpression module
pub struct MidiPolyExpression {
    pub params: Vec<Param>,
    pub outputs: [Output; NUM_OUTPUTS],
    pub lights: [Light; NUM_LIGHTS],
    midi_input: MidiQueue,
    engine: ExpressionEngine<f32>,
}

impl MidiPolyExpression {
    /// Create a module reading MIDI from `midi_input`
    pub fn new(midi_input: MidiQueue) -> Self {
        let channel_min = MIN_MIDI_CHANNEL as f32;
        let channel_max = MAX_MIDI_CHANNEL as f32;
        let params: Vec<Param> = vec![
            ParamQuantity::new("First MIDI Channel", channel_min, channel_max, channel_min)
                .with_snap()
                .into(),
            ParamQuantity::new("MIDI Channel Count", channel_min, channel_max, channel_max)
                .with_snap()
                .into(),
            ParamQuantity::switch("Gate Velocity Mode", false).into(),
            ParamQuantity::new("Decay", 0f32, MAX_ENVELOPE_TIME, 0f32)
                .with_unit(" s")
                .into(),
            ParamQuantity::new("Release", 0f32, MAX_ENVELOPE_TIME, 0f32)
                .with_unit(" s")
                .into(),
            ParamQuantity::new("Pitch Shape", 1f32 / MAX_SHAPE, MAX_SHAPE, 1f32).into(),
            ParamQuantity::new("Volume Shape", 1f32 / MAX_SHAPE, MAX_SHAPE, 1f32).into(),
            ParamQuantity::new("Decay Level", 0f32, 1f32, 0f32).into(),
            ParamQuantity::switch("Preserve Pitch After Note Off", false).into(),
        ];
        log::debug!("Creating MIDIPolyExpression");
        Self {
            params,
            outputs: Default::default(),
            lights: Default::default(),
            midi_input,
            engine: ExpressionEngine::new(),
        }
    }
    /// The engine configuration as currently set on the panel
    pub fn expression_params(&self) -> ExpressionParams<f32> {
        ExpressionParams {
            first_channel: self.params[MIDI_CHANNEL_FIRST_PARAM].index() as u8,
            channel_count: self.params[MIDI_CHANNEL_COUNT_PARAM].index() as u8,
            gate_velocity_mode: self.params[GATE_VELOCITY_MODE_PARAM].is_on(),
            decay: self.params[DECAY_PARAM].value(),
            release: self.params[RELEASE_PARAM].value(),
            pitch_shape: self.params[PITCH_SHAPE_PARAM].value(),
            volume_shape: self.params[VOLUME_SHAPE_PARAM].value(),
            decay_y: self.params[DECAY_Y_PARAM].value(),
            preserve_pitch_after_note_off: self.params[PRESERVE_PITCH_AFTER_NOTEOFF_PARAM]
                .is_on(),
            ..ExpressionParams::default()
        }
    }
    /// The engine, for inspection
    pub fn engine(&self) -> &ExpressionEngine<f32> {
        &self.engine
    }
    fn write_outputs(&mut self, out: &ExpressionOutput<f32>) {
        let slots = out.active();
        let fields: [(usize, fn(&ChannelOutput<f32>) -> f32); NUM_OUTPUTS] = [
            (GATE_OUTPUT, |slot| slot.gate),
            (VOLUME_OUTPUT, |slot| slot.volume),
            (PITCH_OUTPUT, |slot| slot.pitch),
            (MODULATION_OUTPUT, |slot| slot.modulation),
            (NOTE_OUTPUT, |slot| slot.note),
            (PITCHBEND_OUTPUT, |slot| slot.pitch_bend),
        ];
        for (id, field) in fields {
            let output = &mut self.outputs[id];
            if !output.is_connected() {
                continue;
            }
            output.set_channels(out.channels);
            for (channel, slot) in slots.iter().enumerate() {
                output.set_voltage(field(slot), channel);
            }
        }
    }
}

impl Module for MidiPolyExpression {
    fn process(&mut self, args: &ProcessArgs) {
        let params = self.expression_params();
        while let Some(msg) = self.midi_input.try_pop(args.frame) {
            self.engine.handle_midi(&msg, &params);
        }
        self.engine.end_dispatch();
        let out = self.engine.next(&args.context(), (), params);
        self.write_outputs(&out);
        let light = if self.engine.volume_14bit_mode() {
            1f32
        } else {
            0f32
        };
        self.lights[VOLUME_14_BIT_LIGHT].set_brightness(light);
    }
    fn on_reset(&mut self) {
        self.engine.reset();
        self.midi_input.clear();
        for param in self.params.iter_mut() {
            param.reset();
        }
    }
    fn data_to_json(&self) -> serde_json::Value {
        let data = SavedData {
            volume_14bit_mode: self.engine.volume_14bit_mode(),
        };
        serde_json::to_value(data).unwrap_or_default()
    }
    fn data_from_json(&mut self, data: &serde_json::Value) -> Result<(), serde_json::Error> {
        let data = SavedData::deserialize(data).map_err(|e| {
            log::warn!("Ignoring saved MIDIPolyExpression state: {}", e);
            e
        })?;
        self.engine.set_volume_14bit_mode(data.volume_14bit_mode);
        Ok(())
    }
}
