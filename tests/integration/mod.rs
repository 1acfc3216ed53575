//! Integration tests for lrtag
//!
//! These tests verify that multiple components work together correctly.

#[path = "../common/mod.rs"]
pub mod common;

pub mod properties;
pub mod rewrite_flow;
