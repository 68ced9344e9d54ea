// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod health;
pub mod lookup;
pub mod redemption;

pub use health::StoreHealth;
pub use lookup::LookupService;
pub use redemption::{Redemption, RedemptionService};
