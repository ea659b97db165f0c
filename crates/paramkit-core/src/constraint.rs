use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConstraintError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ConstraintError {
    #[error("value {value} outside [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("invalid constraint: min {min} > max {max}")]
    Inverted { min: i64, max: i64 },

    #[error("invalid constraint: step {0} must be positive")]
    Step(i64),
}

///
/// ConstraintPolicy
/// what happens when a write lands outside the bounds
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ConstraintPolicy {
    #[default]
    Clamp,
    Reject,
}

///
/// Constraints
///
/// Inclusive integer bounds with a step, bound to a constrained accessor
/// before first use. `step` drives spin controls only; writes are not
/// snapped to it.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Constraints {
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub policy: ConstraintPolicy,
}

impl Constraints {
    #[must_use]
    pub const fn new(min: i64, max: i64, step: i64) -> Self {
        Self {
            min,
            max,
            step,
            policy: ConstraintPolicy::Clamp,
        }
    }

    #[must_use]
    pub const fn rejecting(mut self) -> Self {
        self.policy = ConstraintPolicy::Reject;
        self
    }

    pub const fn check(&self) -> Result<(), ConstraintError> {
        if self.min > self.max {
            return Err(ConstraintError::Inverted {
                min: self.min,
                max: self.max,
            });
        }
        if self.step <= 0 {
            return Err(ConstraintError::Step(self.step));
        }

        Ok(())
    }

    #[must_use]
    pub const fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }

    pub const fn apply(&self, value: i64) -> Result<i64, ConstraintError> {
        if self.contains(value) {
            return Ok(value);
        }

        match self.policy {
            ConstraintPolicy::Clamp => Ok(if value < self.min {
                self.min
            } else {
                self.max
            }),
            ConstraintPolicy::Reject => Err(ConstraintError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            }),
        }
    }
}
