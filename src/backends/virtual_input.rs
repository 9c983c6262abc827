use crate::backends::EventSource;
use crate::clock::Timestamp;
use crate::error::Result;
use crate::event::{DeviceClass, RawEvent};
use crate::manager::InputManager;
use std::collections::VecDeque;

/// Replays a fixed script of timed events.
///
/// Entries are kept in time order (equal times keep insertion order) and released
/// once due, so a test or demo can describe a whole session up front and drive it
/// frame by frame.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    name: String,
    script: VecDeque<(Timestamp, DeviceClass, RawEvent)>,
}

impl ScriptedSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: VecDeque::new(),
        }
    }

    /// Add an event due at `at`.
    pub fn at(mut self, at: Timestamp, class: DeviceClass, event: RawEvent) -> Self {
        self.push(at, class, event);
        self
    }

    pub fn push(&mut self, at: Timestamp, class: DeviceClass, event: RawEvent) {
        let pos = self.script.partition_point(|(due, _, _)| *due <= at);
        self.script.insert(pos, (at, class, event));
    }

    /// Convenience: press at `down`, release at `up`.
    pub fn tap(mut self, class: DeviceClass, index: usize, down: Timestamp, up: Timestamp) -> Self {
        self.push(down, class, RawEvent::press(index));
        self.push(up, class, RawEvent::release(index));
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn is_finished(&self) -> bool {
        self.script.is_empty()
    }
}

impl EventSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn pump(&mut self, now: Timestamp, input: &mut InputManager) -> Result<usize> {
        let mut delivered = 0;
        while let Some((at, _, _)) = self.script.front() {
            if *at > now {
                break;
            }
            if let Some((_, class, event)) = self.script.pop_front() {
                input.enqueue(class, event)?;
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}
