//! Polyphonic ports and lights.  Each port carries up to
//! [MAX_CHANNELS] voltages in fixed-size storage, so patching and reading
//! never allocates on the audio thread.

use ahornberg::MAX_CHANNELS;
use arrayvec::ArrayVec;

type Voltages = ArrayVec<f32, MAX_CHANNELS>;

fn fill(dst: &mut Voltages, src: &[f32]) {
    dst.clear();
    for v in src.iter().take(MAX_CHANNELS) {
        dst.push(*v);
    }
}

/// A module input.  An input is connected while it has at least one
/// channel.
#[derive(Clone, Default, Debug)]
pub struct Input {
    voltages: Voltages,
}

impl Input {
    /// A disconnected input
    pub fn new() -> Self {
        Self::default()
    }
    /// Patch a polyphonic cable carrying `voltages`.  Channels beyond
    /// [MAX_CHANNELS] are dropped.
    pub fn connect(&mut self, voltages: &[f32]) {
        fill(&mut self.voltages, voltages);
    }
    /// Patch a monophonic cable carrying `voltage`
    pub fn set_voltage(&mut self, voltage: f32) {
        self.connect(&[voltage]);
    }
    /// Unpatch the input
    pub fn disconnect(&mut self) {
        self.voltages.clear();
    }
    /// True while a cable is patched
    pub fn is_connected(&self) -> bool {
        !self.voltages.is_empty()
    }
    /// The number of polyphonic channels on the cable, 0 if unpatched
    pub fn channels(&self) -> usize {
        self.voltages.len()
    }
    /// The voltage on `channel`, or 0V if there is no such channel
    pub fn voltage(&self, channel: usize) -> f32 {
        self.voltages.get(channel).copied().unwrap_or_default()
    }
    /// The voltage on the first channel, if connected
    pub fn connected_voltage(&self) -> Option<f32> {
        self.voltages.first().copied()
    }
    /// Every channel's voltage
    pub fn voltages(&self) -> &[f32] {
        &self.voltages
    }
}

/// A module output.  Whether anything listens to the output is decided by
/// the host, so the connection state is explicit.
#[derive(Clone, Debug)]
pub struct Output {
    voltages: Voltages,
    connected: bool,
}

impl Default for Output {
    fn default() -> Self {
        let mut voltages = Voltages::new();
        voltages.push(0f32);
        Self {
            voltages,
            connected: false,
        }
    }
}

impl Output {
    /// A disconnected monophonic output at 0V
    pub fn new() -> Self {
        Self::default()
    }
    /// Called by the host when a cable is patched or removed
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
    /// True while something listens to this output
    pub fn is_connected(&self) -> bool {
        self.connected
    }
    /// Resize to `channels` channels (at most [MAX_CHANNELS]).  New channels
    /// read 0V.
    pub fn set_channels(&mut self, channels: usize) {
        let channels = channels.min(MAX_CHANNELS);
        self.voltages.truncate(channels);
        while self.voltages.len() < channels {
            self.voltages.push(0f32);
        }
    }
    /// The current channel count
    pub fn channels(&self) -> usize {
        self.voltages.len()
    }
    /// Set the voltage on `channel`.  Writes to channels beyond the current
    /// channel count are ignored.
    pub fn set_voltage(&mut self, voltage: f32, channel: usize) {
        if let Some(v) = self.voltages.get_mut(channel) {
            *v = voltage;
        }
    }
    /// The voltage on `channel`, or 0V if there is no such channel
    pub fn voltage(&self, channel: usize) -> f32 {
        self.voltages.get(channel).copied().unwrap_or_default()
    }
    /// Every channel's voltage
    pub fn voltages(&self) -> &[f32] {
        &self.voltages
    }
    /// Every channel's voltage, for writing in place
    pub fn voltages_mut(&mut self) -> &mut [f32] {
        &mut self.voltages
    }
}

/// A panel light
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Light {
    brightness: f32,
}

impl Light {
    /// Brightness in [0, 1]
    pub fn set_brightness(&mut self, brightness: f32) {
        self.brightness = brightness;
    }
    pub fn brightness(&self) -> f32 {
        self.brightness
    }
}
