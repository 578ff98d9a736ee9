//! Shared test fixtures

pub mod common;
