//! Mock implementations for integration tests.
#![allow(dead_code)]

use anyhow::{Result, anyhow};
use code_cartographer::domain::ports::SourceUnitProvider;
use code_cartographer::domain::semantic::SourceUnit;

/// In-memory provider returning units in a fixed (possibly scrambled) order.
pub struct MockUnitProvider {
    pub units: Vec<SourceUnit>,
}

impl MockUnitProvider {
    pub fn new(units: Vec<SourceUnit>) -> Self {
        Self { units }
    }

    pub fn reversed(mut self) -> Self {
        self.units.reverse();
        self
    }

    pub fn rotated(mut self, by: usize) -> Self {
        if !self.units.is_empty() {
            let by = by % self.units.len();
            self.units.rotate_left(by);
        }
        self
    }
}

impl SourceUnitProvider for MockUnitProvider {
    fn load(&self) -> Result<Vec<SourceUnit>> {
        Ok(self.units.clone())
    }
}

/// Provider that always fails, for error-propagation tests.
pub struct FailingProvider;

impl SourceUnitProvider for FailingProvider {
    fn load(&self) -> Result<Vec<SourceUnit>> {
        Err(anyhow!("front end crashed"))
    }
}
