// ABOUTME: Security helpers for the browser-facing portal
// ABOUTME: Session cookie construction, parsing and expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

/// Secure HTTP cookie utilities
pub mod cookies;
