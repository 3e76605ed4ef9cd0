// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile, balances, powerup inventory and active effects)
//! - Store items (the purchasable catalog)
//!
//! All economy mutations go through [`FirestoreDb::update_user_atomic`],
//! which wraps a read-modify-write of the user document in a Firestore
//! transaction so that concurrent requests for the same user serialize
//! instead of losing updates.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{StoreItem, User};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 20;

/// How many times a conflicted user transaction is retried with fresh data
/// before giving up.
const TXN_MAX_ATTEMPTS: u32 = 5;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create a user record only if none exists yet.
    ///
    /// The write uses Firestore create semantics, which fail when the
    /// document already exists. A bootstrap racing a concurrent write for
    /// the same ID therefore loses the race and returns the stored record
    /// instead of overwriting it.
    pub async fn create_user_if_absent(&self, user: &User) -> Result<User, AppError> {
        if let Some(existing) = self.get_user(&user.user_id).await? {
            return Ok(existing);
        }

        let created: Result<User, _> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await;

        match created {
            Ok(stored) => Ok(stored),
            // Another writer got in after the read above; theirs stands.
            Err(e) => match self.get_user(&user.user_id).await? {
                Some(existing) => Ok(existing),
                None => Err(AppError::Database(e.to_string())),
            },
        }
    }

    // ─── Atomic User Mutation ────────────────────────────────────

    /// Atomically mutate a user document.
    ///
    /// Begins a Firestore transaction, reads the current document, applies
    /// `mutate` to the in-memory record, and stages the write on the
    /// transaction before committing. A commit rejected because of a
    /// concurrent modification restarts the whole read-mutate-write with
    /// fresh data, up to [`TXN_MAX_ATTEMPTS`] times.
    ///
    /// `mutate` returning an error aborts the transaction with zero side
    /// effects; precondition failures (insufficient funds or inventory)
    /// surface unchanged.
    pub async fn update_user_atomic<T, F>(&self, user_id: &str, mut mutate: F) -> Result<T, AppError>
    where
        F: FnMut(&mut User) -> Result<T, AppError>,
    {
        let client = self.get_client()?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            // Fresh read of the current user state for this attempt.
            let current: Option<User> = client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(user_id)
                .await
                .map_err(|e| {
                    AppError::Database(format!("Failed to read user in transaction: {}", e))
                })?;

            let Some(mut user) = current else {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!("User {} not found", user_id)));
            };

            let outcome = match mutate(&mut user) {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Validation/precondition failure: nothing was staged.
                    let _ = transaction.rollback().await;
                    return Err(e);
                }
            };

            client
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(user_id)
                .object(&user)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add user write to transaction: {}", e))
                })?;

            match transaction.commit().await {
                Ok(_) => {
                    tracing::debug!(user_id, attempt, "User transaction committed");
                    return Ok(outcome);
                }
                Err(e) if attempt < TXN_MAX_ATTEMPTS => {
                    tracing::warn!(
                        user_id,
                        attempt,
                        error = %e,
                        "User transaction conflicted, retrying with fresh data"
                    );
                }
                Err(e) => {
                    return Err(AppError::Conflict(format!(
                        "User transaction failed after {} attempts: {}",
                        attempt, e
                    )));
                }
            }
        }
    }

    // ─── Store Item Operations ───────────────────────────────────

    /// Get a store item by its catalog ID.
    pub async fn get_store_item(&self, item_id: &str) -> Result<Option<StoreItem>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STORE_ITEMS)
            .obj()
            .one(item_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all store items.
    pub async fn list_store_items(&self) -> Result<Vec<StoreItem>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::STORE_ITEMS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Seed the catalog with default items if it is empty.
    ///
    /// Idempotent: existing items are left untouched and nothing is
    /// written when the collection already has content. Returns how many
    /// items were inserted.
    pub async fn seed_store_items(&self, defaults: &[StoreItem]) -> Result<usize, AppError> {
        let existing = self.list_store_items().await?;
        if !existing.is_empty() {
            tracing::debug!(count = existing.len(), "Store catalog already seeded");
            return Ok(0);
        }

        let client = self.get_client()?;

        stream::iter(defaults.to_vec())
            .map(|item| async move {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::STORE_ITEMS)
                    .document_id(&item.id)
                    .object(&item)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        tracing::info!(count = defaults.len(), "Store catalog seeded");
        Ok(defaults.len())
    }
}
