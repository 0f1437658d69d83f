//! This contains the glue that binds the [ahornberg] DSP engines to a
//! modular synthesis host: ports, parameters, the MIDI input queue, and
//! per-module state persistence.
//!
//! A host owns one value implementing [Module] per module instance and
//! calls [Module::process] once per sample frame from its audio thread.
//! Everything else (connecting cables, turning knobs, saving patches)
//! happens between calls by way of the ports and params each module
//! exposes.

use ahornberg::context::Context;

pub mod cvfreqshift;
pub mod metronome;
pub mod midipolyexpression;
pub mod midiqueue;
pub mod paramquantity;
pub mod port;

pub use cvfreqshift::CvFreqShift;
pub use metronome::Metronome;
pub use midipolyexpression::MidiPolyExpression;
pub use midiqueue::{midi_queue, MidiQueue, MidiSender};
pub use paramquantity::{Param, ParamQuantity};
pub use port::{Input, Light, Output};

/// Per-frame arguments passed to [Module::process]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProcessArgs {
    /// The sample rate, in Hz
    pub sample_rate: f32,
    /// The duration of one frame, in seconds
    pub sample_time: f32,
    /// The index of the frame being processed
    pub frame: i64,
}

impl ProcessArgs {
    /// Arguments for frame `frame` at `sample_rate`
    pub fn new(sample_rate: f32, frame: i64) -> Self {
        Self {
            sample_rate,
            sample_time: 1f32 / sample_rate,
            frame,
        }
    }
    /// The same arguments, one frame later
    pub fn next_frame(&self) -> Self {
        Self {
            frame: self.frame + 1,
            ..*self
        }
    }
    /// The DSP context for this frame
    pub fn context(&self) -> Context<f32> {
        Context::with_sample_time(self.sample_rate, self.sample_time)
    }
}

impl Default for ProcessArgs {
    fn default() -> Self {
        Self::new(44100f32, 0)
    }
}

/// A module instance, as seen by the host
pub trait Module {
    /// Compute one frame of output
    fn process(&mut self, args: &ProcessArgs);
    /// Return to the initial state (the host's "Initialize" action)
    fn on_reset(&mut self) {}
    /// Module state to store in a saved patch beyond its param values
    fn data_to_json(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
    /// Restore state returned by [Module::data_to_json].  On error the
    /// module is left unchanged.
    fn data_from_json(&mut self, _data: &serde_json::Value) -> Result<(), serde_json::Error> {
        Ok(())
    }
}
