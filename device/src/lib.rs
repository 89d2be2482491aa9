//! Commutation engine for the ArmDroid 1000 robotic arm.
//!
//! The arm's driver board listens on an 8-line parallel bus. Each byte
//! carries a strobe bit, the address of one of six joints and the phase
//! lines for that joint's stepper. This crate keeps the phase of every
//! joint and turns motion requests into correctly paced strobe pulses.
//!
//! | Module | Purpose |
//! | ------ | ------- |
//! | [`motor`] | Controller, phase sequence, joint registry, bus pacing |
//! | [`error`] | Rejection reasons for motion requests |
//!
//! ```no_run
//! use armdroid::{ArmController, Direction, OutputPort};
//!
//! struct Stdout;
//! impl OutputPort for Stdout {
//!     fn write_byte(&mut self, value: u8) {
//!         println!("{value:#010b}");
//!     }
//! }
//!
//! let mut arm = ArmController::with_port(Stdout);
//! arm.drive(5, 100, Direction::Forward)?;
//! arm.drive_multi(&[3, 4], &[-50, 20])?;
//! arm.set_energized(false);
//! # Ok::<(), armdroid::ArmError>(())
//! ```

pub mod error;
pub mod motor;

pub use armdroid_protocol::{ArmCommand, ArmStatus, Direction, JOINT_COUNT, JointStatus};
pub use error::ArmError;
pub use motor::bus::{ArmTiming, Clock, OutputPort, SpinClock};
pub use motor::joint::{Joint, address_of};
pub use motor::phase::Phase;
pub use motor::{ArmController, CommutationState};
