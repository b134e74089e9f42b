//! HS256 bearer token validation

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use super::{AuthConfig, AuthError, PrincipalId};

/// Claims carried by session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
}

impl TokenClaims {
    /// `userId` wins over `sub` when both are present
    pub fn principal(&self) -> Option<PrincipalId> {
        self.user_id
            .as_deref()
            .or(self.sub.as_deref())
            .filter(|id| !id.is_empty())
            .map(PrincipalId::new)
    }
}

/// Verifies bearer tokens against a shared secret
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.clock_skew_seconds;

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Validate a raw `Authorization` header value
    pub fn validate_header(&self, header: &str) -> Result<PrincipalId, AuthError> {
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidFormat(header.to_string()))?;
        self.validate(token)
    }

    /// Validate a bare token and return its principal
    pub fn validate(&self, token: &str) -> Result<PrincipalId, AuthError> {
        let data = decode::<TokenClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::JwtError(e),
            }
        })?;

        data.claims.principal().ok_or(AuthError::MissingPrincipal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret";

    fn token<T: Serialize>(claims: &T, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(user_id: Option<&str>, sub: Option<&str>, exp_offset: i64) -> TokenClaims {
        TokenClaims {
            user_id: user_id.map(String::from),
            sub: sub.map(String::from),
            exp: chrono::Utc::now().timestamp() + exp_offset,
        }
    }

    fn validator() -> TokenValidator {
        TokenValidator::new(&AuthConfig::with_secret(SECRET))
    }

    #[test]
    fn valid_token_yields_user_id() {
        let t = token(&claims(Some("u-1"), Some("ignored"), 3600), SECRET);
        let principal = validator().validate(&t).unwrap();
        assert_eq!(principal.as_str(), "u-1");
    }

    #[test]
    fn sub_is_used_without_user_id() {
        let t = token(&claims(None, Some("u-2"), 3600), SECRET);
        let principal = validator().validate_header(&format!("Bearer {}", t)).unwrap();
        assert_eq!(principal.as_str(), "u-2");
    }

    #[test]
    fn extra_claims_are_ignored() {
        let extra = serde_json::json!({
            "userId": "u-3",
            "role": "student",
            "exp": chrono::Utc::now().timestamp() + 3600,
        });
        let principal = validator().validate(&token(&extra, SECRET)).unwrap();
        assert_eq!(principal.as_str(), "u-3");
    }

    #[test]
    fn expired_token_is_rejected() {
        let t = token(&claims(Some("u-1"), None, -3600), SECRET);
        assert!(matches!(validator().validate(&t), Err(AuthError::Expired)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let t = token(&claims(Some("u-1"), None, 3600), "other-secret");
        assert!(matches!(
            validator().validate(&t),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn token_without_principal_is_rejected() {
        let t = token(&claims(None, None, 3600), SECRET);
        assert!(matches!(
            validator().validate(&t),
            Err(AuthError::MissingPrincipal)
        ));
    }

    #[test]
    fn non_bearer_header_is_rejected() {
        assert!(matches!(
            validator().validate_header("Basic dXNlcjpwYXNz"),
            Err(AuthError::InvalidFormat(_))
        ));
    }
}
