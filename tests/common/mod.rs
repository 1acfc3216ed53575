//! Shared test utilities for lrtag
//!
//! This module provides common helpers for integration tests:
//! - Temporary script trees with session markers
//! - Sample LoadRunner scripts and declarations files
