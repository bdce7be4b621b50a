//! Core types and utilities for nlpchat
//!
//! This crate provides the error type, configuration handling, logging
//! setup, and the conversation session store used by the other nlpchat
//! components.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};
