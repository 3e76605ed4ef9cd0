// SPDX-License-Identifier: MIT

//! API routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ActiveEffectView, PowerupStack, PriceRail, RewardOutcome, StoreItem, User};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_ITEM_ID_LEN: usize = 100;
const MAX_ACTIVATION_COUNT: u32 = 100;
const MAX_REWARD_BASE: i64 = 1_000_000;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/users/bootstrap", post(bootstrap_user))
        .route("/api/shop/items", get(list_items))
        .route("/api/shop/purchase", post(purchase))
        .route("/api/powerups/activate", post(activate))
        .route("/api/powerups/active", get(list_active))
        .route("/api/rewards/apply", post(apply_reward))
}

fn validate_item_id(item_id: &str) -> Result<()> {
    if item_id.is_empty() || item_id.len() > MAX_ITEM_ID_LEN {
        return Err(crate::error::AppError::BadRequest(
            "Invalid item id".to_string(),
        ));
    }
    Ok(())
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub currency: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub tokens: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            display_name: user.display_name,
            email: user.email,
            currency: user.currency,
            tokens: user.tokens,
        }
    }
}

/// Get current user profile and balances.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state.db.get_user(&user.user_id).await?.ok_or_else(|| {
        crate::error::AppError::NotFound(format!("User {} not found", user.user_id))
    })?;

    Ok(Json(profile.into()))
}

#[derive(Deserialize)]
struct BootstrapRequest {
    email: Option<String>,
    display_name: Option<String>,
}

/// Idempotently create the caller's user record with starting balances.
///
/// Called by the frontend after first sign-in. Racing calls for the same
/// user all converge on one record.
async fn bootstrap_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<BootstrapRequest>,
) -> Result<Json<UserResponse>> {
    let display_name = body.display_name.unwrap_or_else(|| "Student".to_string());
    let fresh = User::new(
        &user.user_id,
        body.email,
        &display_name,
        state.config.starting_currency,
        chrono::Utc::now(),
    );

    let stored = state.db.create_user_if_absent(&fresh).await?;
    tracing::info!(user_id = %stored.user_id, "User bootstrapped");

    Ok(Json(stored.into()))
}

// ─── Shop ────────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ItemsResponse {
    pub items: Vec<StoreItem>,
}

/// List the purchasable catalog.
async fn list_items(State(state): State<Arc<AppState>>) -> Result<Json<ItemsResponse>> {
    let items = state.catalog.list_items().await?;
    Ok(Json(ItemsResponse { items }))
}

#[derive(Deserialize)]
struct PurchaseRequest {
    item_id: String,
    rail: PriceRail,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PurchaseResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub currency: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub tokens: i64,
    pub inventory: Vec<PowerupStack>,
}

/// Purchase one unit of a store item.
async fn purchase(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>> {
    validate_item_id(&body.item_id)?;

    let outcome = state
        .economy
        .purchase(&user.user_id, &body.item_id, body.rail)
        .await?;

    Ok(Json(PurchaseResponse {
        currency: outcome.currency,
        tokens: outcome.tokens,
        inventory: outcome.inventory,
    }))
}

// ─── Powerups ────────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivateRequest {
    item_id: String,
    /// Units to activate in one go (defaults to 1)
    #[serde(default = "default_activation_count")]
    count: u32,
}

fn default_activation_count() -> u32 {
    1
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActiveEffectsResponse {
    pub active_effects: Vec<ActiveEffectView>,
}

/// Activate owned powerup units into a timed effect.
async fn activate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ActivateRequest>,
) -> Result<Json<ActiveEffectsResponse>> {
    validate_item_id(&body.item_id)?;
    if body.count == 0 || body.count > MAX_ACTIVATION_COUNT {
        return Err(crate::error::AppError::BadRequest(format!(
            "Activation count must be between 1 and {}",
            MAX_ACTIVATION_COUNT
        )));
    }

    let active_effects = state
        .economy
        .activate(&user.user_id, &body.item_id, body.count)
        .await?;

    Ok(Json(ActiveEffectsResponse { active_effects }))
}

/// List the caller's live effects with derived remaining time.
async fn list_active(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ActiveEffectsResponse>> {
    let active_effects = state.economy.list_active(&user.user_id).await?;
    Ok(Json(ActiveEffectsResponse { active_effects }))
}

// ─── Rewards ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct RewardRequest {
    base_amount: i64,
}

/// Credit a reward, boosted by the strongest live multiplier.
async fn apply_reward(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<RewardRequest>,
) -> Result<Json<RewardOutcome>> {
    if body.base_amount < 0 || body.base_amount > MAX_REWARD_BASE {
        return Err(crate::error::AppError::BadRequest(format!(
            "Reward amount must be between 0 and {}",
            MAX_REWARD_BASE
        )));
    }

    let outcome = state
        .economy
        .apply_reward(&user.user_id, body.base_amount)
        .await?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_id_bounds() {
        assert!(validate_item_id("coin-boost-2x").is_ok());
        assert!(validate_item_id("").is_err());
        assert!(validate_item_id(&"a".repeat(MAX_ITEM_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_activate_request_defaults_count() {
        let body: ActivateRequest =
            serde_json::from_str(r#"{"item_id":"coin-boost-2x"}"#).unwrap();
        assert_eq!(body.count, 1);
    }
}
