//! Shared 8-bit output bus with strobe pulses and inter-pulse pacing

use std::time::{Duration, Instant};

use spin_sleep::SpinSleeper;

use super::phase::ENABLE_BIT;

/// Digital output port driving the eight bus lines.
///
/// Writes are synchronous and observed by the hardware in issue order.
pub trait OutputPort {
    fn write_byte(&mut self, value: u8);
}

/// Time source used for pulse pacing.
pub trait Clock {
    fn now(&self) -> Instant;
    /// Block the calling thread for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock with spin-assisted sleeps, accurate down to a few microseconds.
#[derive(Default)]
pub struct SpinClock {
    sleeper: SpinSleeper,
}

impl Clock for SpinClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeper.sleep(duration);
    }
}

/// Bus timing for the driver board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmTiming {
    /// Minimum gap between the end of one pulse and the start of the next
    pub pulse_interval: Duration,
    /// How long the strobe stays high before it is dropped
    pub strobe_hold: Duration,
}

impl Default for ArmTiming {
    fn default() -> Self {
        Self {
            pulse_interval: Duration::from_micros(1000),
            strobe_hold: Duration::from_micros(2000),
        }
    }
}

/// Output port plus the timing state shared by every joint on it.
pub struct Bus<P, C> {
    port: P,
    clock: C,
    timing: ArmTiming,
    last_pulse: Instant,
}

impl<P: OutputPort, C: Clock> Bus<P, C> {
    pub fn new(port: P, clock: C, timing: ArmTiming) -> Self {
        let last_pulse = clock.now();
        Self {
            port,
            clock,
            timing,
            last_pulse,
        }
    }

    /// Latch `value` into the driver board.
    ///
    /// Waits out whatever is left of the pulse interval, raises the strobe
    /// with `value` on the other lines, holds it, then drops the strobe
    /// with the same lines.
    pub fn pulse(&mut self, value: u8) {
        let elapsed = self.clock.now().saturating_duration_since(self.last_pulse);
        if let Some(remaining) = self.timing.pulse_interval.checked_sub(elapsed)
            && !remaining.is_zero()
        {
            self.clock.sleep(remaining);
        }

        let value = value & !ENABLE_BIT;
        tracing::trace!("bus <- {:#010b}", value | ENABLE_BIT);
        self.port.write_byte(value | ENABLE_BIT);
        if !self.timing.strobe_hold.is_zero() {
            self.clock.sleep(self.timing.strobe_hold);
        }
        tracing::trace!("bus <- {:#010b}", value);
        self.port.write_byte(value);

        self.last_pulse = self.clock.now();
    }

    pub fn timing(&self) -> ArmTiming {
        self.timing
    }

    pub fn into_parts(self) -> (P, C) {
        (self.port, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::mock::{MockClock, RecordingPort};

    #[test]
    fn test_pulse_strobes_then_releases() {
        let clock = MockClock::new();
        let port = RecordingPort::new(&clock);
        let mut bus = Bus::new(port.clone(), clock.clone(), ArmTiming::default());

        bus.pulse(0b1001_0000);

        assert_eq!(port.bytes(), vec![0b1001_0001, 0b1001_0000]);
        let writes = port.writes();
        assert_eq!(writes[1].0 - writes[0].0, Duration::from_micros(2000));
    }

    #[test]
    fn test_first_pulse_waits_for_interval() {
        let clock = MockClock::new();
        let port = RecordingPort::new(&clock);
        let mut bus = Bus::new(port.clone(), clock.clone(), ArmTiming::default());

        clock.advance(Duration::from_micros(400));
        bus.pulse(0);

        assert_eq!(port.writes()[0].0, Duration::from_micros(1000));
    }

    #[test]
    fn test_no_wait_when_bus_idle() {
        let clock = MockClock::new();
        let port = RecordingPort::new(&clock);
        let mut bus = Bus::new(port.clone(), clock.clone(), ArmTiming::default());

        clock.advance(Duration::from_millis(50));
        bus.pulse(0);

        assert_eq!(port.writes()[0].0, Duration::from_millis(50));
    }

    #[test]
    fn test_strobe_bit_in_value_is_ignored() {
        let clock = MockClock::new();
        let port = RecordingPort::new(&clock);
        let mut bus = Bus::new(port.clone(), clock, ArmTiming::default());

        bus.pulse(0b0010_0011);

        assert_eq!(port.bytes(), vec![0b0010_0011, 0b0010_0010]);
    }
}
