//! Core business logic for Memograph.
//!
//! Defines the storage and embedder traits the infrastructure layer
//! implements, and the `MemoryService` that owns the search policy and the
//! relationship graph traversal. This crate never depends on
//! `memograph-infra`.

pub mod memory;
