//! Module parameters.  A [ParamQuantity] describes a knob, switch or button
//! (its range, default, name and how its value is shown and typed in); a
//! [Param] is one instance of it holding the current value.

use std::fmt;
use std::sync::Arc;

use ahornberg::devices::{BpmIndex, FREQUENCY_RANGES, NUM_FREQUENCY_RANGES};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BPM_REGEX: Regex = Regex::new(r"^([0-9]+) ?(?:[bB][pP][mM])?$").unwrap();
    static ref RANGE_REGEX: Regex = Regex::new(r"^(?:\+/-|±)? ?([0-9]+) ?(?:[hH][zZ])?$").unwrap();
}

/// Formats a param value for display
pub type ValueToString = Arc<dyn Fn(f32) -> String + Send + Sync>;
/// Parses typed-in text into a param value
pub type StringToValue = Arc<dyn Fn(&str) -> Option<f32> + Send + Sync>;

/// Shows a tempo index as its tempo
pub fn bpm_v2s(x: f32) -> String {
    BpmIndex::new_clamped(x as usize).bpm().to_string()
}

/// Parses a tempo (e.g. "120" or "120 BPM") into its tempo index.  Tempi
/// that are not in the table are rejected.
pub fn bpm_s2v(s: &str) -> Option<f32> {
    let groups = BPM_REGEX.captures(s.trim())?;
    let bpm = groups.get(1)?.as_str().parse::<u16>().ok()?;
    BpmIndex::from_bpm(bpm).map(|index| index.get() as f32)
}

/// Shows a frequency range index as the span of the frequency knob
pub fn frequency_range_v2s(x: f32) -> String {
    let range = &FREQUENCY_RANGES[(x as usize).min(NUM_FREQUENCY_RANGES - 1)];
    format!("+/-{}", range.max_shift_hz() as u32)
}

/// Parses a frequency span (e.g. "+/-160" or "160 Hz") into its range index
pub fn frequency_range_s2v(s: &str) -> Option<f32> {
    let groups = RANGE_REGEX.captures(s.trim())?;
    let hz = groups.get(1)?.as_str().parse::<u32>().ok()?;
    FREQUENCY_RANGES
        .iter()
        .position(|range| range.max_shift_hz() as u32 == hz)
        .map(|i| i as f32)
}

fn numeric_v2s(x: f32, snap: bool) -> String {
    if snap {
        (x.round() as i32).to_string()
    } else {
        let s = format!("{:.3}", x);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// The description of a parameter
#[derive(Clone)]
pub struct ParamQuantity {
    name: String,
    unit: String,
    min_value: f32,
    max_value: f32,
    default_value: f32,
    snap: bool,
    value_to_string: Option<ValueToString>,
    string_to_value: Option<StringToValue>,
}

impl fmt::Debug for ParamQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamQuantity")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("min_value", &self.min_value)
            .field("max_value", &self.max_value)
            .field("default_value", &self.default_value)
            .field("snap", &self.snap)
            .finish()
    }
}

impl ParamQuantity {
    /// A continuous parameter spanning `[min, max]`
    pub fn new(name: impl Into<String>, min: f32, max: f32, default: f32) -> Self {
        Self {
            name: name.into(),
            unit: String::new(),
            min_value: min,
            max_value: max,
            default_value: default,
            snap: false,
            value_to_string: None,
            string_to_value: None,
        }
    }
    /// A two-state switch or button
    pub fn switch(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, 0f32, 1f32, if default { 1f32 } else { 0f32 }).with_snap()
    }
    /// Append `unit` when displaying the value, e.g. " Hz"
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
    /// Round every value to an integer
    pub fn with_snap(mut self) -> Self {
        self.snap = true;
        self
    }
    /// Replace the display strategy
    pub fn with_value_to_string(mut self, f: ValueToString) -> Self {
        self.value_to_string = Some(f);
        self
    }
    /// Replace the parser used for typed-in values
    pub fn with_string_to_value(mut self, f: StringToValue) -> Self {
        self.string_to_value = Some(f);
        self
    }
    /// The label shown to the user
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn unit(&self) -> &str {
        &self.unit
    }
    pub fn min_value(&self) -> f32 {
        self.min_value
    }
    pub fn max_value(&self) -> f32 {
        self.max_value
    }
    /// The value restored by a reset
    pub fn default_value(&self) -> f32 {
        self.default_value
    }
    /// Clamp (and snap, if configured) `value` into range.  NaN maps to the
    /// default.
    pub fn constrain(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value;
        }
        let value = value.clamp(self.min_value, self.max_value);
        if self.snap {
            value.round()
        } else {
            value
        }
    }
    /// `value` as text, including the unit
    pub fn display(&self, value: f32) -> String {
        let text = match &self.value_to_string {
            Some(f) => f(value),
            None => numeric_v2s(value, self.snap),
        };
        text + &self.unit
    }
    /// Parse typed-in text.  The unit may be given or left off.
    pub fn parse(&self, s: &str) -> Option<f32> {
        let s = s.trim();
        if let Some(f) = &self.string_to_value {
            return f(s);
        }
        let unit = self.unit.trim();
        let s = if unit.is_empty() {
            s
        } else {
            s.strip_suffix(unit).unwrap_or(s).trim_end()
        };
        s.parse::<f32>().ok()
    }
}

/// One parameter of a module instance
#[derive(Clone, Debug)]
pub struct Param {
    quantity: ParamQuantity,
    value: f32,
}

impl Param {
    /// A param at its quantity's default value
    pub fn new(quantity: ParamQuantity) -> Self {
        let value = quantity.default_value();
        Self { quantity, value }
    }
    /// The param's metadata
    pub fn quantity(&self) -> &ParamQuantity {
        &self.quantity
    }
    /// The current value, always in range
    pub fn value(&self) -> f32 {
        self.value
    }
    /// The value rounded to an index
    pub fn index(&self) -> usize {
        self.value.round().max(0f32) as usize
    }
    /// True for a switch that is on
    pub fn is_on(&self) -> bool {
        self.value >= 0.5
    }
    /// Set the value, clamped into the quantity's range
    pub fn set_value(&mut self, value: f32) {
        self.value = self.quantity.constrain(value);
    }
    /// Return to the default value
    pub fn reset(&mut self) {
        self.value = self.quantity.default_value();
    }
    /// The value as shown to the user
    pub fn display_value(&self) -> String {
        self.quantity.display(self.value)
    }
    /// Set the value from typed-in text
    pub fn set_display_value(&mut self, s: &str) -> Result<(), &'static str> {
        let value = self.quantity.parse(s).ok_or("Unrecognized parameter value")?;
        self.set_value(value);
        Ok(())
    }
}

impl From<ParamQuantity> for Param {
    fn from(quantity: ParamQuantity) -> Self {
        Self::new(quantity)
    }
}
