use std::collections::VecDeque;

use anyhow::bail;

use super::EventSource;
use crate::event_model::event::{RawEvent, TouchEvent};

/// Plays back a fixed list of events, then fails like a closed device.
#[derive(Debug, Default, Clone)]
pub struct ReplaySource {
    events: VecDeque<TouchEvent>,
}

impl ReplaySource {
    pub fn new(events: impl IntoIterator<Item = TouchEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn from_raw(events: impl IntoIterator<Item = RawEvent>) -> Self {
        Self::new(events.into_iter().map(TouchEvent::from))
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ReplaySource {
    fn next_event(&mut self) -> anyhow::Result<TouchEvent> {
        match self.events.pop_front() {
            Some(event) => Ok(event),
            None => bail!("end of event stream"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_in_order_then_fails() {
        let mut source = ReplaySource::from_raw([
            RawEvent::new(0x03, 0x2f, 1),
            RawEvent::new(0x00, 0, 0),
        ]);
        assert_eq!(source.next_event().unwrap(), TouchEvent::SlotSelect(1));
        assert_eq!(source.next_event().unwrap(), TouchEvent::FrameSync);
        assert_eq!(source.remaining(), 0);
        assert!(source.next_event().is_err());
    }
}
