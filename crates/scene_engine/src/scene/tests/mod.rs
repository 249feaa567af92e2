//! Scenario tests for the scene aggregate

mod lifecycle;
mod persistence;
mod support;
