//! Download token service.
//!
//! Issues and looks up the expiring capability tokens that gate file
//! downloads. A live token is reused per order so repeated result-page
//! views do not accumulate rows; a new token is minted only when none
//! is live.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::download_token::DownloadToken;

/// Validity window for newly minted tokens
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Mint an unguessable token string: 32 random bytes, URL-safe base64.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Download token persistence service
pub struct TokenService {
    db: PgPool,
}

impl TokenService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn find(&self, token: &str) -> Result<Option<DownloadToken>> {
        let token = sqlx::query_as::<_, DownloadToken>(
            "SELECT * FROM download_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;

        Ok(token)
    }

    /// Most recently created token for an order, live or not.
    pub async fn latest_for_order(&self, order_id: i64) -> Result<Option<DownloadToken>> {
        let token = sqlx::query_as::<_, DownloadToken>(
            "SELECT * FROM download_tokens WHERE order_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(token)
    }

    /// Reuse the order's live token if one exists (refreshing the stored
    /// path if it changed), otherwise mint a fresh one valid for
    /// [`TOKEN_TTL_HOURS`].
    pub async fn get_or_mint(&self, order_id: i64, file_path: &str) -> Result<DownloadToken> {
        let now = Utc::now();

        if let Some(existing) = self.latest_for_order(order_id).await? {
            if !existing.is_expired(now) {
                if existing.file_path != file_path {
                    sqlx::query("UPDATE download_tokens SET file_path = $2 WHERE token = $1")
                        .bind(&existing.token)
                        .bind(file_path)
                        .execute(&self.db)
                        .await?;
                    return Ok(DownloadToken {
                        file_path: file_path.to_string(),
                        ..existing
                    });
                }
                return Ok(existing);
            }
        }

        let token = sqlx::query_as::<_, DownloadToken>(
            r#"
            INSERT INTO download_tokens (token, order_id, file_path, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(generate_token())
        .bind(order_id)
        .bind(file_path)
        .bind(now + Duration::hours(TOKEN_TTL_HOURS))
        .fetch_one(&self.db)
        .await?;

        Ok(token)
    }
}
