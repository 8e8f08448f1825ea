//! Superdate - swipe and match service for the Superdate dating app
//!
//! This library records directional swipes and turns reciprocal likes into a
//! single canonical match per pair, atomically and safely under concurrent
//! submissions from both sides.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::SwipeEngine;
pub use error::{InvalidReason, SwipeError};
pub use models::{PrincipalId, SwipeAction, Swipe, Match, MatchPair, SwipeResult, RecordSwipeRequest};
pub use services::{MemoryStore, PostgresStore, StoreError, SwipeStore, UnitOfWork};
