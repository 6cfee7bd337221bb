use crate::error::{ApiError, Result};
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use entity::sea_orm_active_enums::PartyRole;
use uuid::Uuid;

/// Request extension storing the verified party forwarded by the
/// gateway
#[derive(Debug, Clone)]
pub struct PartyIdentity {
    pub party_id: Uuid,
    pub role: PartyRole,
}

impl PartyIdentity {
    /// Guard a handler against the wrong audience.
    pub fn require_role(&self, role: PartyRole) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Unauthorized(
                "Caller role is not allowed on this endpoint".to_string(),
            ))
        }
    }
}

/// Party identity middleware
///
/// Authentication itself happens at the upstream gateway, which
/// forwards the verified caller in `X-Party-Id` / `X-Party-Role`.
/// This middleware parses those headers and stores the identity in
/// request extensions.
///
/// Returns 401 Unauthorized if either header is missing or malformed.
pub async fn identity_middleware(mut request: Request, next: Next) -> Result<Response> {
    let headers = request.headers();

    let party_id = headers
        .get("x-party-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing X-Party-Id header".to_string()))?;

    let party_id = Uuid::parse_str(party_id)
        .map_err(|_| ApiError::Unauthorized("Invalid X-Party-Id header".to_string()))?;

    let role = headers
        .get("x-party-role")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing X-Party-Role header".to_string()))?;

    let role = match role {
        "patient" => PartyRole::Patient,
        "doctor" => PartyRole::Doctor,
        _ => {
            return Err(ApiError::Unauthorized(
                "Invalid X-Party-Role header".to_string(),
            ))
        }
    };

    let identity = PartyIdentity { party_id, role };
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Axum extractor for party identity
///
/// Only works on routes behind identity_middleware.
impl<S> FromRequestParts<S> for PartyIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<PartyIdentity>()
            .cloned()
            .ok_or_else(|| {
                ApiError::Unauthorized(
                    "Party identity not found - route must be protected by identity_middleware"
                        .to_string(),
                )
            })
    }
}
