//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and draft algorithms into use-case APIs.
//! - Keep callers decoupled from storage details.

pub mod draft_service;
pub mod roster_service;
