// Copyright 2025 Amiable
// SPDX-License-Identifier: MIT

//! Pushpluck Library
//!
//! Play an Ableton Push 1 as a polyphonic fretted string instrument.
//! This is the main library entry point that re-exports types from
//! pushpluck_core.
//!
//! New code should use pushpluck_core directly instead of this module.

// Re-export everything from pushpluck_core
pub use pushpluck_core::*;

// Module aliases for common imports
pub mod config {
    pub use pushpluck_core::config::*;
}

pub mod events {
    pub use pushpluck_core::events::*;
}

pub mod fretboard {
    pub use pushpluck_core::fretboard::*;
}

pub mod push {
    pub use pushpluck_core::push::*;
}

pub mod shadow {
    pub use pushpluck_core::shadow::*;
}
