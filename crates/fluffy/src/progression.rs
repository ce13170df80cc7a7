//! Arithmetic progressions used as `List` literals.
//!
//! Two shorthand forms are supported:
//!
//! - `start, ..., end` steps by `+1`;
//! - `start, second, ..., end` steps by `second - start`.
//!
//! Values are produced while they do not pass `end` in the direction of the step, so `end`
//! is included only when the progression hits it exactly.

use thiserror::Error;

use crate::instances::List;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRange {
    #[error("invalid range {start}, {start}, ..., {end}: the step is zero")]
    ZeroStep { start: i64, end: i64 },
    #[error("invalid range {start}, {second}, ...: the step overflows")]
    StepOverflow { start: i64, second: i64 },
}

/// A lazy progression; construct it with [`Progression::new`].
#[derive(Debug, Clone)]
pub struct Progression {
    next: Option<i64>,
    step: i64,
    end: i64,
}

impl Progression {
    pub fn new(start: i64, second: Option<i64>, end: i64) -> Result<Self, InvalidRange> {
        let step = match second {
            Some(second) => second
                .checked_sub(start)
                .ok_or(InvalidRange::StepOverflow { start, second })?,
            None => 1,
        };
        if step == 0 {
            return Err(InvalidRange::ZeroStep { start, end });
        }
        Ok(Self {
            next: Some(start),
            step,
            end,
        })
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    fn passes_end(&self, value: i64) -> bool {
        if self.step > 0 {
            value > self.end
        } else {
            value < self.end
        }
    }
}

impl Iterator for Progression {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let current = self.next?;
        if self.passes_end(current) {
            self.next = None;
            return None;
        }
        // Stop quietly instead of wrapping around at the edge of `i64`.
        self.next = current.checked_add(self.step);
        Some(current)
    }
}

impl List<i64> {
    /// `start, ..., end` with a unit step.
    pub fn range(start: i64, end: i64) -> List<i64> {
        Progression {
            next: Some(start),
            step: 1,
            end,
        }
        .collect()
    }

    /// `start, second, ..., end` with the step inferred as `second - start`.
    pub fn progression(start: i64, second: i64, end: i64) -> Result<List<i64>, InvalidRange> {
        Ok(Progression::new(start, Some(second), end)?.collect())
    }
}
