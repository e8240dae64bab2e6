//! Core types shared across rowmodel facilities
//!
//! This crate provides the canonical schema constants used by both the
//! error facility and the structured logging macros.

pub mod schema;
