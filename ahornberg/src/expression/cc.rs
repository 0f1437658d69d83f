//! Contains constant definitions for the MIDI CCs understood by the
//! expression engine.
//!
//! Volume follows the channel volume controller pair (CC 7 and its LSB,
//! CC 39), so controllers that send 14-bit volume get full resolution.
//! Modulation is driven by either the mod wheel or the MPE timbre
//! controller (CC 74).

#![allow(missing_docs)]

use wmidi::{ControlFunction, U7};

pub const MODULATION: ControlFunction = ControlFunction(U7::from_u8_lossy(1));
pub const VOLUME_MSB: ControlFunction = ControlFunction(U7::from_u8_lossy(7));
pub const VOLUME_LSB: ControlFunction = ControlFunction(U7::from_u8_lossy(39));
pub const TIMBRE: ControlFunction = ControlFunction(U7::from_u8_lossy(74));
pub const ALL_SOUND_OFF: ControlFunction = ControlFunction(U7::from_u8_lossy(120));
pub const ALL_NOTES_OFF: ControlFunction = ControlFunction(U7::from_u8_lossy(123));

/// The value of a centered 14-bit pitch bend
pub const PITCH_BEND_CENTER: u16 = 8192;
/// The largest 14-bit value
pub const MAX_14_BIT: u16 = 16383;
