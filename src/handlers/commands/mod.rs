//! Command handlers module
//!
//! This module contains handlers for bot commands

pub mod admin;
pub mod start;
