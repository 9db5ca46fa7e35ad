// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod score;
pub mod user;

pub use score::{AverageVector, ScoreRecord};
pub use user::{AuthenticatedUser, UserProfile};
