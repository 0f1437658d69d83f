//! This crate contains all of the DSP logic for the Ahornberg modules.  It is
//! `no_std` and does not allocate: every device keeps its state inline and is
//! stepped once per sample by the host.
//!
//! The three engines are:
//!
//!  - [devices::TempoEngine], the core of the Metronome: a free running
//!    timer and pulse generator with debounced tempo nudge inputs.
//!  - [devices::PitchShift], the core of CVFreqShift: a log-domain frequency
//!    shift applied to polyphonic 1V/oct pitch buses.
//!  - [expression::ExpressionEngine], the core of MIDIPolyExpression: 16
//!    per-channel envelopes driven by MIDI and smoothed into control voltages.
//!
//! All of the devices are generic over the sample type through the [Float]
//! trait, which is implemented for `f32` and `f64`.

#![no_std]
#![warn(missing_docs)]

#[cfg(test)]
extern crate std;

mod float_approx;

mod float_traits;
pub use float_traits::Float;

pub mod context;
pub mod devices;
pub mod expression;
pub mod util;

/// True if using libm for floating-point math, false if using internal
/// approximation functions
pub const USE_LIBM: bool = cfg!(feature = "libm");

/// The frequency of middle C (C4), in Hz.  A pitch of 0V on a 1V/oct bus
/// corresponds to this frequency.
pub const FREQ_C4: f32 = 261.6256f32;

/// The number of polyphonic channels a single port can carry
pub const MAX_CHANNELS: usize = 16;
