//! Access token issuing for Plaza.
//!
//! Tokens are HS256 JWTs carrying the bound identity. Verification lives
//! with the web layer (`web::middleware::JwtState`), which both the REST
//! extractor and the gateway handshake share.

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::{PlazaError, Result};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: i64,
    /// Username.
    pub username: String,
    /// Administrator flag.
    pub is_admin: bool,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

/// Issue an access token for a user.
pub fn issue_token(secret: &str, expiry_secs: u64, user: &User) -> Result<String> {
    let now = chrono::Utc::now().timestamp() as u64;

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        is_admin: user.is_admin,
        iat: now,
        exp: now + expiry_secs,
        jti: uuid::Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| PlazaError::Auth(format!("token encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn test_user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            password: "hash".to_string(),
            is_admin: false,
            is_deleted: false,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_decode_token() {
        let token = issue_token("test-secret", 3600, &test_user()).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, 1);
        assert_eq!(decoded.claims.username, "alice");
        assert!(!decoded.claims.is_admin);
        assert!(decoded.claims.exp > decoded.claims.iat);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = issue_token("secret1", 3600, &test_user()).unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret2"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_tokens_have_unique_ids() {
        let user = test_user();
        let t1 = issue_token("s", 3600, &user).unwrap();
        let t2 = issue_token("s", 3600, &user).unwrap();
        assert_ne!(t1, t2);
    }
}
