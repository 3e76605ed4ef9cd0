// SPDX-License-Identifier: MIT

//! SatQuest API: backend for the gamified SAT-practice app.
//!
//! This crate provides the powerup economy engine: purchasing
//! reward-boosting powerups with virtual currency, activating them into
//! time-bounded effects, and resolving boosted rewards.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{CatalogService, EconomyService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub catalog: Arc<CatalogService>,
    pub economy: EconomyService,
}
