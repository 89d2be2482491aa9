//! Virtual clock and recording port for exercising the engine off-target.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::bus::{Clock, OutputPort};

/// Clock that only moves when slept on or advanced by hand.
#[derive(Clone)]
pub struct MockClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

/// Port that keeps every byte with the virtual time it was written at.
#[derive(Clone)]
pub struct RecordingPort {
    clock: MockClock,
    writes: Rc<RefCell<Vec<(Duration, u8)>>>,
}

impl RecordingPort {
    pub fn new(clock: &MockClock) -> Self {
        Self {
            clock: clock.clone(),
            writes: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn writes(&self) -> Vec<(Duration, u8)> {
        self.writes.borrow().clone()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.writes.borrow().iter().map(|(_, b)| *b).collect()
    }

    pub fn clear(&self) {
        self.writes.borrow_mut().clear();
    }
}

impl OutputPort for RecordingPort {
    fn write_byte(&mut self, value: u8) {
        self.writes.borrow_mut().push((self.clock.elapsed(), value));
    }
}
