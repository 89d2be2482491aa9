#![cfg_attr(not(test), no_std)]

use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Number of independently actuated joints on the arm.
pub const JOINT_COUNT: usize = 6;

/// Stepping direction of a joint.
///
/// As a plain integer `1` walks the phase table forward and `0` walks it
/// backward.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    /// Parse the integer form (`0` or `1`). Returns `None` for anything else.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Backward),
            1 => Some(Self::Forward),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            Self::Backward => 0,
            Self::Forward => 1,
        }
    }

    /// Direction selected by the sign of a signed step count.
    pub fn from_signed(steps: i32) -> Self {
        if steps < 0 { Self::Backward } else { Self::Forward }
    }

    /// +1 or -1, the odometer delta of one step.
    pub fn signum(self) -> i64 {
        match self {
            Self::Backward => -1,
            Self::Forward => 1,
        }
    }
}

/// Arm control commands
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArmCommand {
    /// Step a single joint `steps` times.
    Drive { joint: u8, steps: i32, direction: Direction },
    /// Step several joints in lock-step; the sign of each entry picks its direction.
    DriveMulti {
        joints: Vec<u8, JOINT_COUNT>,
        steps: Vec<i32, JOINT_COUNT>,
    },
    /// Hold (`true`) or release (`false`) every motor.
    SetEnergized { on: bool },
}

/// Commutation snapshot of one joint
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct JointStatus {
    pub phase: u8,      // Current phase index (0-3)
    pub position: i64,  // Net steps since start-up
    pub energized: bool,
}

/// Arm status response
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ArmStatus {
    pub motors_off: bool,
    pub joints: [JointStatus; JOINT_COUNT],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_raw() {
        assert_eq!(Direction::from_raw(0), Some(Direction::Backward));
        assert_eq!(Direction::from_raw(1), Some(Direction::Forward));
        assert_eq!(Direction::from_raw(2), None);
        assert_eq!(Direction::Forward.as_raw(), 1);
    }

    #[test]
    fn test_direction_from_signed() {
        assert_eq!(Direction::from_signed(-3), Direction::Backward);
        assert_eq!(Direction::from_signed(3), Direction::Forward);
        assert_eq!(Direction::Backward.signum(), -1);
    }

    #[test]
    fn test_command_from_toml() {
        let cmd: ArmCommand =
            toml::from_str("[drive]\njoint = 5\nsteps = 5\ndirection = \"backward\"\n").unwrap();
        assert_eq!(
            cmd,
            ArmCommand::Drive { joint: 5, steps: 5, direction: Direction::Backward }
        );

        let cmd: ArmCommand = toml::from_str("[set_energized]\non = false\n").unwrap();
        assert_eq!(cmd, ArmCommand::SetEnergized { on: false });
    }
}
