// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Named major-number series shared across repositories

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A named pool of allocated major numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Serie {
    /// Series id
    pub id: String,
    /// Every value ever allocated, in producer order
    #[serde(default)]
    pub values: Vec<u32>,
}

/// One value of a series, as proposed or allocated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorValue {
    /// Series id
    pub id: String,
    /// Major number
    pub value: u32,
}

impl Serie {
    /// Create an empty series
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: Vec::new(),
        }
    }

    /// Candidate for the next allocation: highest value so far plus one.
    ///
    /// `None` once `u32::MAX` has been allocated.
    #[must_use]
    pub fn next_value(&self) -> Option<u32> {
        self.values.iter().copied().max().unwrap_or(0).checked_add(1)
    }

    /// The next candidate wrapped for an allocation command. Nothing is
    /// recorded until the engine accepts the allocation.
    pub fn propose(&self) -> Result<MajorValue> {
        let value = self.next_value().ok_or_else(|| {
            Error::validation(format!("series {} has no values left to allocate", self.id))
        })?;
        Ok(MajorValue {
            id: self.id.clone(),
            value,
        })
    }

    /// Record an accepted allocation.
    pub fn with_value(mut self, value: u32) -> Result<Self> {
        if value == 0 {
            return Err(Error::validation("major values start at 1"));
        }
        if self.values.contains(&value) {
            return Err(Error::conflict(format!(
                "value {value} is already allocated in series {}",
                self.id
            )));
        }
        self.values.push(value);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_next_value_is_max_plus_one() {
        let serie = Serie {
            id: "csp".into(),
            values: vec![1, 2, 4],
        };
        assert_eq!(serie.next_value(), Some(5));
    }

    #[test]
    fn test_next_value_unordered() {
        let serie = Serie {
            id: "csp".into(),
            values: vec![7, 3],
        };
        assert_eq!(serie.next_value(), Some(8));
    }

    #[test]
    fn test_next_value_empty() {
        assert_eq!(Serie::new("csp").next_value(), Some(1));
    }

    #[test]
    fn test_propose_does_not_mutate() {
        let serie = Serie {
            id: "csp".into(),
            values: vec![1],
        };
        let proposal = serie.propose().unwrap();
        assert_eq!(proposal, MajorValue { id: "csp".into(), value: 2 });
        assert_eq!(serie.values, vec![1]);
    }

    #[test]
    fn test_exhausted_series_has_no_next_value() {
        let serie = Serie {
            id: "csp".into(),
            values: vec![3, u32::MAX],
        };
        assert_eq!(serie.next_value(), None);
        assert_eq!(serie.propose().unwrap_err().kind(), ErrorKind::Validation);

        let almost = Serie {
            id: "csp".into(),
            values: vec![u32::MAX - 1],
        };
        assert_eq!(almost.next_value(), Some(u32::MAX));
    }

    #[test]
    fn test_with_value() {
        let serie = Serie::new("csp").with_value(3).unwrap();
        assert_eq!(serie.values, vec![3]);

        let err = serie.clone().with_value(3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(serie.with_value(0).unwrap_err().kind(), ErrorKind::Validation);
    }
}
