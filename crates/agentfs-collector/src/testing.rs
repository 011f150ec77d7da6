// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Test-only filesystem doubles
//!
//! This module provides a decorating filesystem that counts calls and injects
//! failures, so collector behavior can be observed without a special host setup.

#[cfg(test)]
pub mod mock_fs;
