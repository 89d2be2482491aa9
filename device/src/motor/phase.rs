//! 4-phase commutation logic for the ArmDroid stepper motors

use armdroid_protocol::Direction;

/// Strobe bit: the driver board latches the other seven lines on its edge.
pub const ENABLE_BIT: u8 = 0b0000_0001;

/// Phase select lines, in forward commutation order.
pub const PHASE_PATTERN: [u8; 4] = [
    0b1000_0000, // A
    0b0000_1000, // B
    0b0100_0000, // C
    0b0000_0100, // D
];

/// Bits owned by the phase select lines.
pub const PHASE_MASK: u8 = 0b1100_1100;

/// Rotor commutation phase
///
/// Each phase energizes one winding pair. Walking the sequence forward
/// turns the rotor one way, walking it backward turns it the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Phase {
    #[default]
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

impl Phase {
    /// Advance to the next phase (D wraps to A)
    pub fn next(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::C,
            Self::C => Self::D,
            Self::D => Self::A,
        }
    }

    /// Step back to the previous phase (A wraps to D)
    pub fn prev(self) -> Self {
        match self {
            Self::A => Self::D,
            Self::B => Self::A,
            Self::C => Self::B,
            Self::D => Self::C,
        }
    }

    pub fn advance(self, direction: Direction) -> Self {
        match direction {
            Direction::Forward => self.next(),
            Direction::Backward => self.prev(),
        }
    }

    /// Get the phase index (0-3)
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Phase select bits driven while this phase is held
    pub fn pattern(self) -> u8 {
        PHASE_PATTERN[self as usize]
    }
}
