// ABOUTME: Core data model and error types shared across Trainer Portal crates
// ABOUTME: Profiles, workouts, meal plans, assignments and the uniform AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

#![deny(unsafe_code)]

//! # Portal Core
//!
//! Types that describe the rows of the hosted store and the error taxonomy used
//! by every layer of the portal. Nothing in this crate performs I/O.

/// Uniform error type and error codes
pub mod errors;

/// Row types for the five remote tables
pub mod models;
