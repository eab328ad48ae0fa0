//! Unified validation framework for store-action payloads.
//!
//! This module provides reusable validation rules applied before any
//! collaborator is contacted, so obviously-malformed input never leaves
//! the device.

pub mod rules;

pub use validator::Validate;
