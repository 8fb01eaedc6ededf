//! # StudyPlan Rust Backend
//!
//! Manual study-schedule allocation engine.
//!
//! This crate provides a Rust-based backend for the StudyPlan platform: users
//! select lessons from one or more courses, place each lesson onto a calendar
//! day and time slot, validate the draft, and persist the result as a schedule
//! with time-stamped items. The backend exposes a REST API via Axum for the
//! React frontend.
//!
//! ## Features
//!
//! - **Draft State**: Course/section/lesson selection and per-lesson calendar
//!   allocations for a schedule under construction
//! - **Week Navigation**: Fixed 7-day calendar window clamped to the schedule
//!   period
//! - **Validation**: Accumulating, total validation of a draft before
//!   submission
//! - **Persistence**: Transactional creation of schedules and their items
//! - **Lesson Catalog**: Read-only lesson lookup backing allocation and
//!   enrichment
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Public domain types (lessons, schedules, schedule items)
//! - [`db`]: Database operations, repository pattern, and persistence layer
//! - [`models`]: In-memory draft state, week window, and time types
//! - [`services`]: Draft validation logic
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
