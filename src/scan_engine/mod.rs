//! Scan engine core: domain model and pure services.
//!
//! Nothing in this module performs I/O.

pub mod domain;
pub mod services;
