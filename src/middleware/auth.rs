use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::actor::{Actor, Role};
use crate::models::scope::Scope;

/// Claims issued by the platform's identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: String,
    pub client_id: i64,
}

impl Claims {
    pub fn into_actor(self) -> Result<Actor> {
        let user_id = self
            .sub
            .parse::<i64>()
            .map_err(|_| Error::Unauthorized("invalid_subject".to_string()))?;
        let role = self.role.parse::<Role>().map_err(Error::Unauthorized)?;
        Ok(Actor::new(user_id, role, Scope::from_client_id(self.client_id)))
    }
}

/// HS256 keys derived once from the shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    decoding: Arc<DecodingKey>,
    encoding: Arc<EncodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| Error::Unauthorized("invalid_token".to_string()))
    }

    /// Used by local tooling and tests; production tokens come from the
    /// identity service.
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))
    }
}

fn bearer_token(req: &Request) -> Result<&str> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing_authorization".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".to_string()))
}

/// Validates the bearer token and attaches the caller's [`Actor`].
pub async fn require_bearer_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Response {
    let actor = match bearer_token(&req)
        .and_then(|token| keys.verify(token))
        .and_then(Claims::into_actor)
    {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };
    req.extensions_mut().insert(actor);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: &str, client_id: i64) -> Claims {
        Claims {
            sub: "42".to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
            role: role.to_string(),
            client_id,
        }
    }

    #[test]
    fn signed_claims_round_trip_into_actor() {
        let keys = JwtKeys::new("secret");
        let token = keys.sign(&claims("OFFICE_MANAGER", 7)).unwrap();
        let actor = keys.verify(&token).unwrap().into_actor().unwrap();
        assert_eq!(actor, Actor::new(42, Role::OfficeManager, Scope::Tenant(7)));
    }

    #[test]
    fn client_one_is_the_global_scope() {
        let actor = claims("ADMIN", 1).into_actor().unwrap();
        assert_eq!(actor.scope, Scope::Global);
    }

    #[test]
    fn foreign_signatures_and_unknown_roles_are_rejected() {
        let token = JwtKeys::new("other").sign(&claims("ADMIN", 1)).unwrap();
        assert!(matches!(
            JwtKeys::new("secret").verify(&token),
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            claims("JANITOR", 2).into_actor(),
            Err(Error::Unauthorized(_))
        ));
    }
}
