//! Core library components.
//!
//! This module contains the rotation state machine, the adapter interfaces it
//! depends on, and the configuration that drives candidate generation.

pub mod config;
pub mod rotation;
pub mod target;
pub mod types;
pub mod vault;
