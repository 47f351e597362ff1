//! # Patitas Rust Backend
//!
//! Reservation and matching engine for a pet-care services marketplace.
//!
//! This crate provides a Rust-based backend for a marketplace that connects
//! pet owners with veterinarians, dog walkers and caregivers. It matches
//! providers against booking queries, runs the reservation lifecycle with
//! per-provider conflict detection, and records notifications for both
//! parties. The backend exposes a REST API via Axum.
//!
//! ## Features
//!
//! - **Matching**: Filter providers by locality, species, category and
//!   declared weekly availability
//! - **Reservations**: Pending/confirmed/cancelled/completed lifecycle with
//!   a per-provider no-overlap guarantee
//! - **Notifications**: Per-party notification feed driven by lifecycle
//!   transitions
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Domain types shared across all layers
//! - [`models`]: Time primitives (reservation windows, weekly slots)
//! - [`matching`]: Pure provider filtering
//! - [`ledger`]: Reservation lifecycle state machine
//! - [`db`]: Repository pattern and persistence layer
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod ledger;
pub mod matching;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;
