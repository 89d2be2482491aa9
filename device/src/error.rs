use thiserror::Error;

/// Reasons the engine refuses an operation.
///
/// None of these are fatal: the offending call is dropped before any byte
/// reaches the bus and the controller stays ready for the next one.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArmError {
    #[error("joint index {0} out of range (0-5)")]
    InvalidJointIndex(usize),
    #[error("direction {0} is not 0 (backward) or 1 (forward)")]
    InvalidDirection(u8),
    #[error("step count {0} must be positive")]
    InvalidStepCount(i32),
    #[error("{joints} joints given with {steps} step counts")]
    LengthMismatch { joints: usize, steps: usize },
    #[error("motors are de-energized")]
    MotorsDisabled,
}
