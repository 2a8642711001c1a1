//! HALPI - AI interaction orchestration for the learning platform
//!
//! This crate turns a typed student interaction into a templated prompt, sends
//! it to a thread-based agent API, and repairs and validates the returned JSON
//! into a typed result, falling back to a safe default on any failure.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
