//! The MIDI input queue.  MIDI arrives on a driver or GUI thread and is
//! consumed on the audio thread; messages are stamped with the frame they
//! belong to so the audio thread can apply them sample-accurately.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use wmidi::MidiMessage;

/// The number of messages that may be in flight before senders start
/// dropping them
pub const MIDI_QUEUE_SIZE: usize = 1024;

type Stamped = (i64, MidiMessage<'static>);

/// Create a connected sender/queue pair
pub fn midi_queue() -> (MidiSender, MidiQueue) {
    let (tx, rx) = sync_channel(MIDI_QUEUE_SIZE);
    (MidiSender { tx }, MidiQueue { rx, parked: None })
}

/// The producer side of the queue.  Cheap to clone; each clone may live on
/// its own thread.
#[derive(Clone)]
pub struct MidiSender {
    tx: SyncSender<Stamped>,
}

impl MidiSender {
    /// Queue `msg` for frame `frame`.  Never blocks; returns false if the
    /// message was dropped.
    pub fn send(&self, frame: i64, msg: MidiMessage<'static>) -> bool {
        match self.tx.try_send((frame, msg)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("MIDI queue full, dropping message for frame {}", frame);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("MIDI queue closed, dropping message for frame {}", frame);
                false
            }
        }
    }
    /// Decode raw MIDI bytes and queue the message.  Malformed input is
    /// dropped.
    pub fn send_bytes(&self, frame: i64, bytes: &[u8]) -> bool {
        match MidiMessage::try_from(bytes) {
            Ok(msg) => self.send(frame, msg.to_owned()),
            Err(e) => {
                log::debug!("Dropping malformed MIDI message {:02x?}: {:?}", bytes, e);
                false
            }
        }
    }
}

/// The consumer side of the queue, owned by the module on the audio thread
pub struct MidiQueue {
    rx: Receiver<Stamped>,
    parked: Option<Stamped>,
}

impl MidiQueue {
    /// Pop the next message due at or before `frame`, in arrival order.
    /// Never blocks.  A message stamped for a later frame is held back
    /// until that frame.
    pub fn try_pop(&mut self, frame: i64) -> Option<MidiMessage<'static>> {
        let (due, msg) = match self.parked.take() {
            Some(stamped) => stamped,
            None => self.rx.try_recv().ok()?,
        };
        if due > frame {
            self.parked = Some((due, msg));
            None
        } else {
            Some(msg)
        }
    }
    /// Drop everything queued so far
    pub fn clear(&mut self) {
        self.parked = None;
        while self.rx.try_recv().is_ok() {}
    }
}
