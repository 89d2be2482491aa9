//! Joint registry: which driver lines address which joint.
//!
//! The ArmDroid driver board decodes the address lines to route the phase
//! bits to one of its six motor drivers. The table is fixed by the board
//! wiring; some joints share address lines on purpose (wrist pitch is the
//! gripper and wrist roll lines together).

use armdroid_protocol::JOINT_COUNT;

use crate::error::ArmError;

/// Address lines per joint, indexed by joint number.
pub const JOINT_ADDRESS: [u8; JOINT_COUNT] = [
    0b0001_0000, // gripper
    0b0000_0010, // wrist roll
    0b0001_0010, // wrist pitch
    0b0010_0000, // upper arm
    0b0011_0000, // shoulder
    0b0010_0010, // base
];

/// One of the six actuated axes of the arm
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Joint {
    Gripper = 0,
    WristRoll = 1,
    WristPitch = 2,
    UpperArm = 3,
    Shoulder = 4,
    Base = 5,
}

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Self::Gripper,
        Self::WristRoll,
        Self::WristPitch,
        Self::UpperArm,
        Self::Shoulder,
        Self::Base,
    ];

    pub fn from_index(index: usize) -> Result<Self, ArmError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ArmError::InvalidJointIndex(index))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Address bits selecting this joint's driver.
    pub fn address_bits(self) -> u8 {
        JOINT_ADDRESS[self as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Gripper => "gripper",
            Self::WristRoll => "wrist roll",
            Self::WristPitch => "wrist pitch",
            Self::UpperArm => "upper arm",
            Self::Shoulder => "shoulder",
            Self::Base => "base",
        }
    }
}

/// Address bits of the joint at `index`.
pub fn address_of(index: usize) -> Result<u8, ArmError> {
    Joint::from_index(index).map(Joint::address_bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::phase::{ENABLE_BIT, PHASE_MASK};

    #[test]
    fn test_address_lookup() {
        assert_eq!(address_of(0), Ok(0b0001_0000));
        assert_eq!(address_of(5), Ok(0b0010_0010));
        assert_eq!(address_of(6), Err(ArmError::InvalidJointIndex(6)));
    }

    #[test]
    fn test_addresses_unique_and_clear_of_phase_lines() {
        for (i, a) in JOINT_ADDRESS.iter().enumerate() {
            assert_eq!(a & (PHASE_MASK | ENABLE_BIT), 0, "joint {i} overlaps");
            for b in &JOINT_ADDRESS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_index_round_trip() {
        for joint in Joint::ALL {
            assert_eq!(Joint::from_index(joint.index()), Ok(joint));
        }
        assert_eq!(Joint::Base.name(), "base");
    }
}
