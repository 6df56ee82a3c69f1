// ABOUTME: Configuration module for Trainer Portal
// ABOUTME: Environment-first configuration with a TOML secrets-file fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

/// Server configuration loaded from the process environment
pub mod environment;
