//! Rate limiting middleware using Redis
//!
//! Sliding-window rate limiting on the mutating patient/doctor
//! endpoints, keyed by the party id forwarded by the gateway.

use crate::{
    error::{ApiError, Result},
    middleware::identity::PartyIdentity,
};
use axum::{extract::Request, middleware::Next, response::Response};
use entity::sea_orm_active_enums::PartyRole;
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per minute for patients
    pub patient_rpm: u32,
    /// Requests per minute for doctors
    pub doctor_rpm: u32,
    /// Window size in seconds
    pub window_seconds: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            patient_rpm: 60,
            doctor_rpm: 120,
            window_seconds: 60,
        }
    }
}

/// Rate limiting middleware
///
/// Uses a sliding window counter in Redis to track request rates per
/// party. Returns 429 Too Many Requests when the limit is exceeded.
pub fn rate_limit_middleware(
    redis_client: Arc<Client>,
    config: RateLimitConfig,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response>> + Send>>
       + Clone {
    move |request: Request, next: Next| {
        let redis_client = redis_client.clone();
        let config = config.clone();

        Box::pin(async move {
            // Extract identity from request extensions (set by identity middleware)
            let identity = request.extensions().get::<PartyIdentity>().ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!(
                    "Rate limit middleware requires identity_middleware"
                ))
            })?;

            let limit = match identity.role {
                PartyRole::Patient => config.patient_rpm,
                PartyRole::Doctor => config.doctor_rpm,
            };

            let allowed = check_rate_limit(
                &redis_client,
                &identity.party_id.to_string(),
                limit,
                config.window_seconds,
            )
            .await?;

            if !allowed {
                warn!(
                    "Rate limit exceeded for party: {} (role: {:?})",
                    identity.party_id, identity.role
                );
                return Err(ApiError::RateLimitExceeded);
            }

            debug!(
                "Rate limit check passed for party: {} (role: {:?})",
                identity.party_id, identity.role
            );

            Ok(next.run(request).await)
        })
    }
}

/// Check rate limit using Redis sliding window counter
///
/// Returns true if the request is allowed, false if the limit is
/// exceeded.
async fn check_rate_limit(
    redis_client: &Client,
    party_id: &str,
    limit: u32,
    window_seconds: u32,
) -> Result<bool> {
    let mut conn = redis_client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis connection failed: {}", e)))?;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let key = format!("rate_limit:party:{}", party_id);
    let window_start = now - u64::from(window_seconds);

    // Use Redis sorted set with timestamps as scores
    // Remove old entries outside the window
    let _: () = conn
        .zrembyscore(&key, 0, window_start as f64)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis ZREMRANGEBYSCORE failed: {}", e)))?;

    // Count requests in current window
    let count: u32 = conn
        .zcard(&key)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis ZCARD failed: {}", e)))?;

    if count >= limit {
        return Ok(false);
    }

    // Add current request to sorted set
    let member = format!("{}:{}", now, uuid::Uuid::new_v4());
    let _: () = conn
        .zadd(&key, member, now as f64)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis ZADD failed: {}", e)))?;

    // Set expiration on key (window + buffer)
    let _: () = conn
        .expire(&key, i64::from(window_seconds) + 10)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis EXPIRE failed: {}", e)))?;

    Ok(true)
}

/// Create rate limit middleware with default configuration
pub fn create_rate_limiter(
    redis_client: Arc<Client>,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response>> + Send>>
       + Clone {
    rate_limit_middleware(redis_client, RateLimitConfig::default())
}
