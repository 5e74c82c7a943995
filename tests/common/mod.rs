//! Shared test utilities for integration tests.
//! Not a test binary of its own; each test file pulls it in with `mod common;`.
#![allow(dead_code)]

pub mod fixtures;
pub mod mock;
