//! Commutation engine for the ArmDroid 1000 stepper arm
//!
//! Arm: ArmDroid 1000 (D&M Computing)
//! - Six unipolar steppers behind one driver board
//! - Driver board fed by an 8-line parallel bus: strobe, address, phase
//! - Open loop: no encoders, position is an odometer of issued steps

pub mod bus;
pub mod joint;
pub mod phase;

#[cfg(test)]
pub(crate) mod mock;

use armdroid_protocol::{ArmCommand, ArmStatus, Direction, JOINT_COUNT, JointStatus};
use tracing::{debug, info, warn};

use self::bus::{ArmTiming, Bus, Clock, OutputPort, SpinClock};
use self::joint::Joint;
use self::phase::Phase;
use crate::error::ArmError;

/// Commutation state of one joint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommutationState {
    /// Phase currently latched into the driver
    pub phase: Phase,
    /// Net steps taken since start-up, positive is forward
    pub position: i64,
    pub energized: bool,
}

impl CommutationState {
    fn new() -> Self {
        Self {
            energized: true,
            ..Self::default()
        }
    }
}

/// Arm controller owning the bus and the commutation state of every joint.
///
/// All motion is blocking: a call returns once its last pulse is on the
/// bus. Every operation takes `&mut self`, so pulses from two callers can
/// never interleave; to share the controller between threads put it behind
/// a `Mutex` and hold the lock for the whole operation.
pub struct ArmController<P, C = SpinClock> {
    bus: Bus<P, C>,
    joints: [CommutationState; JOINT_COUNT],
    motors_off: bool,
}

impl<P: OutputPort> ArmController<P> {
    /// Controller on the wall clock with the stock driver board timing.
    pub fn with_port(port: P) -> Self {
        Self::new(port, SpinClock::default(), ArmTiming::default())
    }
}

impl<P: OutputPort, C: Clock> ArmController<P, C> {
    /// Create a new arm controller
    ///
    /// Nothing is written to the port until the first operation.
    pub fn new(port: P, clock: C, timing: ArmTiming) -> Self {
        Self {
            bus: Bus::new(port, clock, timing),
            joints: [CommutationState::new(); JOINT_COUNT],
            motors_off: false,
        }
    }

    /// Handle arm command
    pub fn handle_command(&mut self, cmd: &ArmCommand) -> Result<(), ArmError> {
        match cmd {
            ArmCommand::Drive { joint, steps, direction } => {
                self.drive(*joint as usize, *steps, *direction)
            }
            ArmCommand::DriveMulti { joints, steps } => {
                let joints: Vec<usize> = joints.iter().map(|&j| j as usize).collect();
                self.drive_multi(&joints, steps)
            }
            ArmCommand::SetEnergized { on } => {
                self.set_energized(*on);
                Ok(())
            }
        }
    }

    /// Advance one joint by a single phase.
    pub fn step(&mut self, joint_index: usize, direction: Direction) -> Result<(), ArmError> {
        Joint::from_index(joint_index)
            .and_then(|joint| {
                self.ensure_energized()?;
                self.commutate(joint, direction);
                Ok(())
            })
            .inspect_err(|e| warn!("step rejected: {}", e))
    }

    /// Step one joint `steps` times in `direction`.
    pub fn drive(
        &mut self,
        joint_index: usize,
        steps: i32,
        direction: Direction,
    ) -> Result<(), ArmError> {
        self.try_drive(joint_index, steps, direction)
            .inspect_err(|e| warn!("drive rejected: {}", e))
    }

    /// [`drive`](Self::drive) with an integer direction: `1` forward,
    /// `0` backward.
    pub fn drive_raw(&mut self, joint_index: usize, steps: i32, direction: u8) -> Result<(), ArmError> {
        match Direction::from_raw(direction) {
            Some(direction) => self.drive(joint_index, steps, direction),
            None => {
                let e = ArmError::InvalidDirection(direction);
                warn!("drive rejected: {}", e);
                Err(e)
            }
        }
    }

    fn try_drive(
        &mut self,
        joint_index: usize,
        steps: i32,
        direction: Direction,
    ) -> Result<(), ArmError> {
        let joint = Joint::from_index(joint_index)?;
        if steps <= 0 {
            return Err(ArmError::InvalidStepCount(steps));
        }
        self.ensure_energized()?;

        debug!("drive {}: {} steps {:?}", joint.name(), steps, direction);
        for _ in 0..steps {
            self.commutate(joint, direction);
        }
        debug!(
            "drive {} done: position={}",
            joint.name(),
            self.joints[joint.index()].position
        );
        Ok(())
    }

    /// Step several joints together.
    ///
    /// Each entry of `signed_steps` belongs to the joint at the same
    /// position in `joint_indices`; its sign selects the direction and its
    /// magnitude the number of steps. Joints advance in rounds of one step
    /// each, so the longest move sets the number of rounds and shorter moves
    /// finish early. Arguments are fully checked before the first pulse.
    pub fn drive_multi(
        &mut self,
        joint_indices: &[usize],
        signed_steps: &[i32],
    ) -> Result<(), ArmError> {
        self.try_drive_multi(joint_indices, signed_steps)
            .inspect_err(|e| warn!("multi-drive rejected: {}", e))
    }

    fn try_drive_multi(
        &mut self,
        joint_indices: &[usize],
        signed_steps: &[i32],
    ) -> Result<(), ArmError> {
        if joint_indices.len() != signed_steps.len() {
            return Err(ArmError::LengthMismatch {
                joints: joint_indices.len(),
                steps: signed_steps.len(),
            });
        }
        let mut moves = joint_indices
            .iter()
            .zip(signed_steps)
            .map(|(&index, &steps)| {
                Joint::from_index(index)
                    .map(|joint| (joint, Direction::from_signed(steps), steps.unsigned_abs()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.ensure_energized()?;

        let rounds = moves.iter().map(|(_, _, n)| *n).max().unwrap_or(0);
        debug!("multi-drive: {} joints, {} rounds", moves.len(), rounds);
        for _ in 0..rounds {
            for (joint, direction, remaining) in moves.iter_mut() {
                if *remaining > 0 {
                    self.commutate(*joint, *direction);
                    *remaining -= 1;
                }
            }
        }
        Ok(())
    }

    /// Hold (`true`) or release (`false`) every motor.
    ///
    /// Releasing latches each joint's address with no phase line set, which
    /// drops holding torque; the arm may sag. Holding re-latches the phase
    /// each joint had, so the rotors pick up where they were.
    pub fn set_energized(&mut self, on: bool) {
        for joint in Joint::ALL {
            let state = &mut self.joints[joint.index()];
            state.energized = on;
            let value = if on {
                joint.address_bits() | state.phase.pattern()
            } else {
                joint.address_bits()
            };
            self.bus.pulse(value);
        }
        self.motors_off = !on;
        info!("Motors {}", if on { "energized" } else { "released" });
    }

    pub fn is_energized(&self) -> bool {
        !self.motors_off
    }

    /// Snapshot of the commutation state of one joint.
    pub fn joint_state(&self, joint_index: usize) -> Option<CommutationState> {
        self.joints.get(joint_index).copied()
    }

    /// Get current arm status
    pub fn status(&self) -> ArmStatus {
        ArmStatus {
            motors_off: self.motors_off,
            joints: self.joints.map(|s| JointStatus {
                phase: s.phase.as_u8(),
                position: s.position,
                energized: s.energized,
            }),
        }
    }

    pub fn timing(&self) -> ArmTiming {
        self.bus.timing()
    }

    /// Give back the port and clock, e.g. to release the GPIO lines.
    pub fn into_parts(self) -> (P, C) {
        self.bus.into_parts()
    }

    fn ensure_energized(&self) -> Result<(), ArmError> {
        if self.motors_off {
            Err(ArmError::MotorsDisabled)
        } else {
            Ok(())
        }
    }

    /// Perform one commutation step
    fn commutate(&mut self, joint: Joint, direction: Direction) {
        let state = &mut self.joints[joint.index()];
        state.phase = state.phase.advance(direction);
        state.position += direction.signum();
        let value = joint.address_bits() | state.phase.pattern();
        self.bus.pulse(value);
    }
}
