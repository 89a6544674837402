//! Token authority: issues and verifies the signed bearer tokens that carry an
//! identity's subject id and role claim.
//!
//! Verification is a pure function of `(token, secret)`; nothing is persisted
//! and tokens cannot be revoked before they expire.

pub mod password;

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Closed set of roles. Anything else in a token fails deserialization and
/// the request is treated as unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Agent,
    User,
}

#[derive(Debug, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Agent, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::User => "user",
        }
    }

    /// Capitalized name used in `403` messages ("Agent access required").
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Agent => "Agent",
            Role::User => "User",
        }
    }

    /// Roles this role may be changed into. Roles are fixed at signup.
    pub fn allowed_transitions(&self) -> &'static [Role] {
        &[]
    }

    pub fn can_become(&self, target: Role) -> bool {
        *self == target || self.allowed_transitions().contains(&target)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "agent" => Ok(Role::Agent),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The set of roles an endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet {
    bits: u8,
}

impl RoleSet {
    pub const ANY: RoleSet = RoleSet { bits: 0b111 };

    const fn bit(role: Role) -> u8 {
        match role {
            Role::Admin => 0b001,
            Role::Agent => 0b010,
            Role::User => 0b100,
        }
    }

    pub const fn only(role: Role) -> Self {
        RoleSet { bits: Self::bit(role) }
    }

    pub const fn with(self, role: Role) -> Self {
        RoleSet { bits: self.bits | Self::bit(role) }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.bits & Self::bit(role) != 0
    }

    /// Reason text for a `403`, e.g. "Admin access required" or
    /// "Admin or Agent access required".
    pub fn requirement(&self) -> String {
        let labels: Vec<&str> = Role::ALL
            .iter()
            .filter(|role| self.contains(**role))
            .map(|role| role.label())
            .collect();
        format!("{} access required", labels.join(" or "))
    }
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id, carried as a string per RFC 7519.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn new(subject_id: i64, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: subject_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// A verified caller: the only thing downstream layers learn from a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub subject_id: i64,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidToken,

    #[error("token has expired")]
    Expired,

    #[error("token claims are missing or malformed")]
    Malformed,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Signs and verifies access tokens with the process-wide HS256 secret.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(expiry_hours as i64),
        }
    }

    /// Access-token lifetime in seconds, reported to clients as `expires_in`.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn issue(&self, subject_id: i64, role: Role) -> Result<String, TokenError> {
        self.sign(&Claims::new(subject_id, role, self.ttl))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Actor, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidToken,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

        let subject_id = data.claims.sub.parse::<i64>().map_err(|_| TokenError::Malformed)?;

        Ok(Actor {
            subject_id,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "unit-test-secret-with-at-least-32-bytes";

    fn authority() -> TokenAuthority {
        TokenAuthority::new(SECRET, 24)
    }

    #[test]
    fn issued_token_verifies_to_same_actor() {
        let tokens = authority();
        let token = tokens.issue(7, Role::User).unwrap();
        let actor = tokens.verify(&token).unwrap();
        assert_eq!(actor, Actor { subject_id: 7, role: Role::User });
    }

    #[test]
    fn wrong_secret_is_invalid_token() {
        let token = authority().issue(7, Role::Agent).unwrap();
        let other = TokenAuthority::new("a-completely-different-secret-value!!", 24);
        assert!(matches!(other.verify(&token), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = authority();
        let claims = Claims::new(7, Role::User, Duration::hours(-1));
        let token = tokens.sign(&claims).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(authority().verify("not.a.jwt"), Err(TokenError::Malformed)));
        assert!(matches!(authority().verify(""), Err(TokenError::Malformed)));
    }

    #[test]
    fn unknown_role_claim_fails_closed() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "sub": "7", "role": "superuser", "iat": 0, "exp": exp, "jti": "x" }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(authority().verify(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn missing_role_claim_is_malformed() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "sub": "7", "iat": 0, "exp": exp, "jti": "x" }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(authority().verify(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn non_numeric_subject_is_malformed() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "sub": "alice", "role": "user", "iat": 0, "exp": exp, "jti": "x" }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(authority().verify(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn role_set_membership_and_reason() {
        let admin_only = RoleSet::only(Role::Admin);
        assert!(admin_only.contains(Role::Admin));
        assert!(!admin_only.contains(Role::Agent));
        assert_eq!(admin_only.requirement(), "Admin access required");

        let staff = RoleSet::only(Role::Admin).with(Role::Agent);
        assert!(staff.contains(Role::Agent));
        assert!(!staff.contains(Role::User));
        assert_eq!(staff.requirement(), "Admin or Agent access required");

        assert!(Role::ALL.iter().all(|r| RoleSet::ANY.contains(*r)));
    }

    #[test]
    fn roles_parse_strictly() {
        assert_eq!("agent".parse::<Role>().unwrap(), Role::Agent);
        assert!("Agent".parse::<Role>().is_err());
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn roles_have_no_transitions() {
        for role in Role::ALL {
            assert!(role.can_become(role));
            for other in Role::ALL.into_iter().filter(|r| *r != role) {
                assert!(!role.can_become(other));
            }
        }
    }
}
