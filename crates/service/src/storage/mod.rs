//! Storage abstractions for service layer
//!
//! File-seeded stores for small collections that live in memory.

pub mod json_seq_store;
