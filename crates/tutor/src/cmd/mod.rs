//! Command implementations for the tutor CLI

pub mod check;
pub mod serve;
