// ABOUTME: Helper modules shared by the route integration tests
// ABOUTME: Re-exports the in-process axum request builder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

pub mod axum_test;
