//! Output ports for the ArmDroid bus on a Raspberry Pi header.

use anyhow::{Context, Result};
use armdroid::OutputPort;
use rppal::gpio::{Gpio, OutputPin};

/// Eight GPIO lines driven as one byte, bit n on `pins[n]`.
pub struct GpioPort {
    lines: Vec<OutputPin>,
}

impl GpioPort {
    pub fn open(pins: [u8; 8]) -> Result<Self> {
        let gpio = Gpio::new().context("Failed to open GPIO")?;
        let lines = pins
            .iter()
            .map(|&pin| {
                gpio.get(pin)
                    .map(|p| p.into_output_low())
                    .with_context(|| format!("Failed to claim GPIO {}", pin))
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::info!("Bus on BCM pins {:?}", pins);
        Ok(Self { lines })
    }
}

impl OutputPort for GpioPort {
    fn write_byte(&mut self, value: u8) {
        // Data lines first so they are settled before the strobe moves.
        for (bit, line) in self.lines.iter_mut().enumerate().rev() {
            if value & (1 << bit) != 0 {
                line.set_high();
            } else {
                line.set_low();
            }
        }
    }
}

/// Dry-run port: logs the bytes instead of driving pins.
#[derive(Default)]
pub struct TracePort {
    written: u64,
}

impl OutputPort for TracePort {
    fn write_byte(&mut self, value: u8) {
        self.written += 1;
        tracing::debug!("bus[{}] = {:#010b}", self.written, value);
    }
}
