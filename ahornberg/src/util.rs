//! Various utility functions and helpful constants

use crate::Float;

/// Linearly maps `x` from the range `[x_min, x_max]` to `[y_min, y_max]`.
/// The result is not clamped.
pub fn rescale<Smp: Float>(x: Smp, x_min: Smp, x_max: Smp, y_min: Smp, y_max: Smp) -> Smp {
    y_min + (x - x_min) / (x_max - x_min) * (y_max - y_min)
}

/// Maps a raw trigger voltage from the hardware range [0.1V, 2V] onto [0, 1],
/// the range an [EdgeTrigger](crate::devices::EdgeTrigger) thresholds on.
pub fn rescale_trigger<Smp: Float>(voltage: Smp) -> Smp {
    rescale(
        voltage,
        Smp::from_f32(0.1f32),
        Smp::TWO,
        Smp::ZERO,
        Smp::ONE,
    )
}

/// Clamp `x` into `[lo, hi]`.  NaN is mapped to `lo`.
pub fn clamp<Smp: Float>(x: Smp, lo: Smp, hi: Smp) -> Smp {
    if x > hi {
        hi
    } else if x >= lo {
        x
    } else {
        lo
    }
}

/// Convert a MIDI note number to a 1V/oct pitch voltage, with C4 (note 60)
/// at 0V
pub fn note_to_voltage<Smp: Float>(note: u8) -> Smp {
    (Smp::from_u16(note as u16) - Smp::from_u16(60)) / Smp::TWELVE
}
