//! # Domain Models
//!
//! This crate contains pure domain types with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O and no heavy logic, only data and small helpers.

pub mod config;
pub mod constants;
pub mod events;
pub mod ids;
pub mod notification;
pub mod registry;
pub mod roles;
