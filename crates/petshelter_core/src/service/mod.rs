//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into typed use-case level APIs.
//! - Keep CLI/editor callers decoupled from resource-path details.

pub mod pet_service;
