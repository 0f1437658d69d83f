use ahornberg::FREQ_C4;
use ahornberg_modules::{
    cvfreqshift, metronome, midi_queue, midipolyexpression, CvFreqShift, Metronome,
    MidiPolyExpression, MidiQueue, Module, ProcessArgs,
};

const SAMPLE_RATE: f32 = 1000f32;

fn frames() -> impl Iterator<Item = ProcessArgs> {
    (0..).map(|frame| ProcessArgs::new(SAMPLE_RATE, frame))
}

fn patched_expression(midi_input: MidiQueue) -> MidiPolyExpression {
    let mut m = MidiPolyExpression::new(midi_input);
    for output in m.outputs.iter_mut() {
        output.set_connected(true);
    }
    m
}

#[test]
fn metronome_pulses_once_per_second() {
    let mut m = Metronome::new();
    m.params[metronome::PLAY_PARAM].set_value(1f32);
    m.outputs[metronome::BPM_OUTPUT].set_connected(true);
    let mut starts = Vec::new();
    let mut widths = Vec::new();
    let mut last = 0f32;
    for args in frames().take(3500) {
        m.process(&args);
        let v = m.outputs[metronome::BPM_OUTPUT].voltage(0);
        if v > 0f32 {
            assert_eq!(v, 10f32);
            if last == 0f32 {
                starts.push(args.frame);
                widths.push(0);
            }
            if let Some(w) = widths.last_mut() {
                *w += 1;
            }
        }
        last = v;
    }
    assert_eq!(starts.len(), 4);
    assert_eq!(starts[0], 0);
    for pair in starts.windows(2) {
        assert!((pair[1] - pair[0] - 1000).abs() <= 2);
    }
    assert!(widths.iter().all(|w| (1..=2).contains(w)));
}

#[test]
fn stopped_metronome_leaves_output_alone() {
    let mut m = Metronome::new();
    m.outputs[metronome::BPM_OUTPUT].set_connected(true);
    m.outputs[metronome::BPM_OUTPUT].set_voltage(3f32, 0);
    for args in frames().take(100) {
        m.process(&args);
    }
    assert_eq!(m.outputs[metronome::BPM_OUTPUT].voltage(0), 3f32);
}

#[test]
fn metronome_state_round_trips() {
    let mut m = Metronome::new();
    m.select_bpm(20);
    m.params[metronome::BPM_RESET_VALUE_PARAM].set_value(30f32);
    m.params[metronome::PLAY_PARAM].set_value(1f32);
    m.process(&ProcessArgs::default());
    let saved = m.data_to_json();
    assert_eq!(
        saved,
        serde_json::json!({ "bpm": 20, "resetBpm": 30, "play": true })
    );
    let mut restored = Metronome::new();
    assert!(restored.data_from_json(&saved).is_ok());
    assert_eq!(restored.state(), m.state());
    assert_eq!(restored.bpm(), 96);
    assert_eq!(
        restored.params[metronome::BPM_VALUE_PARAM].display_value(),
        "96 BPM"
    );
}

#[test]
fn freq_shift_at_full_range() {
    let mut m = CvFreqShift::new();
    m.params[cvfreqshift::FREQUENCY_PARAM].set_value(10f32);
    m.inputs[cvfreqshift::PITCH_INPUT].connect(&[0f32, 1f32]);
    m.outputs[cvfreqshift::PITCH_OUTPUT].set_connected(true);
    m.process(&ProcessArgs::default());
    let shift = 10f32 * 16f32 / FREQ_C4;
    let out = m.outputs[cvfreqshift::PITCH_OUTPUT].voltages();
    assert_eq!(out.len(), 2);
    assert!((out[0] - (1f32 + shift).log2()).abs() < 1e-5);
    assert!((out[1] - (2f32 + shift).log2()).abs() < 1e-5);
}

#[test]
fn freq_shift_mirrors_channels_and_skips_unpatched_buses() {
    let mut m = CvFreqShift::new();
    m.params[cvfreqshift::FREQUENCY_PARAM].set_value(-10f32);
    m.inputs[cvfreqshift::PITCH_INPUT + 1].connect(&[0.5f32; 5]);
    m.inputs[cvfreqshift::PITCH_INPUT + 2].connect(&[0.5f32; 16]);
    m.outputs[cvfreqshift::PITCH_OUTPUT + 1].set_connected(true);
    m.process(&ProcessArgs::default());
    assert_eq!(m.outputs[cvfreqshift::PITCH_OUTPUT + 1].channels(), 5);
    // Unpatched output keeps its initial single channel at 0V
    assert_eq!(m.outputs[cvfreqshift::PITCH_OUTPUT + 2].voltages(), &[0f32]);
    assert_eq!(m.buses_processed(), 1);
    let expected = (0.5f32.exp2() - 10f32 * 16f32 / FREQ_C4).log2();
    assert!(m.outputs[cvfreqshift::PITCH_OUTPUT + 1]
        .voltages()
        .iter()
        .all(|v| (v - expected).abs() < 1e-5));
}

#[test]
fn mpe_channels_map_to_slots() {
    let (tx, rx) = midi_queue();
    let mut m = patched_expression(rx);
    m.params[midipolyexpression::MIDI_CHANNEL_FIRST_PARAM].set_value(2f32);
    m.params[midipolyexpression::MIDI_CHANNEL_COUNT_PARAM].set_value(4f32);
    // note-on, channel 3 (index 2), C5
    assert!(tx.send_bytes(0, &[0x92, 72, 127]));
    // channel 1 is out of range
    assert!(tx.send_bytes(0, &[0x90, 48, 127]));
    m.process(&ProcessArgs::new(SAMPLE_RATE, 0));
    let gate = &m.outputs[midipolyexpression::GATE_OUTPUT];
    assert_eq!(gate.channels(), 4);
    assert_eq!(gate.voltages(), &[0f32, 10f32, 0f32, 0f32]);
    let note = m.outputs[midipolyexpression::NOTE_OUTPUT].voltage(1);
    assert!((note - 1f32).abs() < 1e-6);
}

#[test]
fn note_on_and_off_in_one_frame() {
    let (tx, rx) = midi_queue();
    let mut m = patched_expression(rx);
    tx.send_bytes(5, &[0x90, 64, 100]);
    tx.send_bytes(5, &[0x80, 64, 0]);
    let mut gates = Vec::new();
    for args in frames().take(10) {
        m.process(&args);
        gates.push(m.outputs[midipolyexpression::GATE_OUTPUT].voltage(0));
    }
    assert!(gates.iter().all(|g| *g == 0f32));
    assert_eq!(m.outputs[midipolyexpression::NOTE_OUTPUT].voltage(0), 0f32);
}

#[test]
fn midi_is_applied_on_its_frame() {
    let (tx, rx) = midi_queue();
    let mut m = patched_expression(rx);
    let sender = std::thread::spawn(move || {
        tx.send_bytes(3, &[0x90, 60, 127]);
        tx.send_bytes(6, &[0x80, 60, 0]);
    });
    assert!(sender.join().is_ok());
    let mut gates = Vec::new();
    for args in frames().take(8) {
        m.process(&args);
        gates.push(m.outputs[midipolyexpression::GATE_OUTPUT].voltage(0));
    }
    assert_eq!(gates, vec![0f32, 0f32, 0f32, 10f32, 10f32, 10f32, 0f32, 0f32]);
}

#[test]
fn fourteen_bit_volume_reaches_output() {
    let (tx, rx) = midi_queue();
    let mut m = patched_expression(rx);
    tx.send_bytes(0, &[0x90, 60, 127]);
    tx.send_bytes(1, &[0xB0, 7, 64]);
    tx.send_bytes(1, &[0xB0, 39, 0]);
    for args in frames().take(200) {
        m.process(&args);
    }
    let volume = m.outputs[midipolyexpression::VOLUME_OUTPUT].voltage(0);
    assert!((volume - 10f32 * 8192f32 / 16383f32).abs() < 1e-4);
    assert_eq!(
        m.lights[midipolyexpression::VOLUME_14_BIT_LIGHT].brightness(),
        1f32
    );
    let saved = m.data_to_json();
    let (_tx, rx) = midi_queue();
    let mut restored = MidiPolyExpression::new(rx);
    assert!(restored.data_from_json(&saved).is_ok());
    assert!(restored.engine().volume_14bit_mode());
}

#[test]
fn metronome_follows_typed_tempo() {
    let mut m = Metronome::new();
    m.params[metronome::PLAY_PARAM].set_value(1f32);
    m.outputs[metronome::BPM_OUTPUT].set_connected(true);
    let mut frames = (0..).map(|frame| ProcessArgs::new(44100f32, frame));
    for args in frames.by_ref().take(100) {
        m.process(&args);
    }
    assert!(m.params[metronome::BPM_VALUE_PARAM]
        .set_display_value("120 BPM")
        .is_ok());
    let mut starts = Vec::new();
    let mut last = 0f32;
    for args in frames.take(44100) {
        m.process(&args);
        let v = m.outputs[metronome::BPM_OUTPUT].voltage(0);
        if v > 0f32 && last == 0f32 {
            starts.push(args.frame);
        }
        last = v;
    }
    assert_eq!(m.bpm(), 120);
    assert!(starts.len() >= 2);
    for pair in starts.windows(2) {
        assert!((pair[1] - pair[0] - 22050).abs() <= 2);
    }
}

#[test]
fn notes_jump_at_audio_rate() {
    let (tx, rx) = midi_queue();
    let mut m = patched_expression(rx);
    tx.send_bytes(0, &[0x90, 84, 127]);
    tx.send_bytes(1, &[0x90, 48, 127]);
    let args = ProcessArgs::new(44100f32, 0);
    m.process(&args);
    assert!((m.outputs[midipolyexpression::PITCH_OUTPUT].voltage(0) - 2f32).abs() < 1e-6);
    assert!((m.outputs[midipolyexpression::VOLUME_OUTPUT].voltage(0) - 10f32).abs() < 1e-5);
    m.process(&args.next_frame());
    assert!((m.outputs[midipolyexpression::PITCH_OUTPUT].voltage(0) + 1f32).abs() < 1e-6);
}
