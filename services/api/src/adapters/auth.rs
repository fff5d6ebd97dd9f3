//! services/api/src/adapters/auth.rs
//!
//! This module contains the bearer-token adapter, the concrete implementation
//! of the `TokenVerifier` port. Token issuance belongs to the external
//! identity service; this adapter only resolves a presented token to a user id.

use async_trait::async_trait;
use skillswap_core::ports::{PortError, PortResult, TokenVerifier};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// A token-verification adapter that implements the `TokenVerifier` port.
#[derive(Clone)]
pub struct BearerTokenAdapter {
    pool: PgPool,
}

impl BearerTokenAdapter {
    /// Creates a new `BearerTokenAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TokenRecord {
    user_id: Uuid,
}

#[async_trait]
impl TokenVerifier for BearerTokenAdapter {
    async fn verify(&self, token: &str) -> PortResult<Uuid> {
        let record = sqlx::query_as::<_, TokenRecord>(
            "SELECT user_id FROM auth_tokens WHERE token = $1 AND expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        match record {
            Some(record) => Ok(record.user_id),
            None => Err(PortError::Unauthorized),
        }
    }
}
