// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod card;

pub use card::{Card, CardId, CardStatus, CardView, NewCard};
