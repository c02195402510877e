// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token issuing and verification.

use std::sync::Arc;
use std::time::Duration;

use campus_core::Principal;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::Claims;
use crate::error::{ApiError, ApiResult};

/// Message returned for every token failure.
pub const TOKEN_REJECTED: &str = "Authentication required.";

/// Recommended minimum secret length in bytes.
const RECOMMENDED_SECRET_LEN: usize = 32;

// =============================================================================
// JwtConfig
// =============================================================================

/// Token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token lifetime in seconds.
    pub ttl_secs: i64,
    /// HMAC algorithm used for signing.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "campus".to_string(),
            ttl_secs: 3600,
            algorithm: Algorithm::HS256,
            leeway_secs: 0,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::configuration("JWT secret is not configured"));
        }
        if !matches!(self.algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ApiError::configuration(format!(
                "Unsupported JWT algorithm {:?}; only HMAC algorithms are accepted",
                self.algorithm
            )));
        }
        if self.ttl_secs <= 0 {
            return Err(ApiError::configuration("JWT lifetime must be positive"));
        }
        if self.secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                length = self.secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "JWT secret is shorter than recommended"
            );
        }
        Ok(())
    }
}

// =============================================================================
// TokenService
// =============================================================================

/// Issues and verifies signed bearer tokens.
///
/// Secret, issuer and lifetime are fixed at construction.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenService {
    /// Creates a new token service with the given configuration.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iat", "iss"]);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs a token for the principal.
    ///
    /// An absent principal, or one without a username, is rejected.
    pub fn generate_token(&self, principal: Option<&Principal>) -> ApiResult<String> {
        let principal = principal
            .filter(|p| !p.username.is_empty())
            .ok_or_else(|| ApiError::unauthorized(TOKEN_REJECTED))?;

        let claims = Claims::for_principal(principal, &self.config.issuer, self.config.ttl_secs);
        self.encode_claims(&claims)
    }

    /// Verifies a token and returns the principal it carries.
    pub fn verify_token(&self, token: Option<&str>) -> ApiResult<Principal> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized(TOKEN_REJECTED))?;

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.into_principal())
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidSignature => "invalid signature",
                    ErrorKind::InvalidIssuer => "invalid issuer",
                    ErrorKind::InvalidAlgorithm => "algorithm mismatch",
                    ErrorKind::MissingRequiredClaim(_) => "missing claim",
                    ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
                        "malformed"
                    }
                    _ => "rejected",
                };
                tracing::debug!(reason, error = %e, "Token verification failed");
                ApiError::unauthorized(TOKEN_REJECTED)
            })
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> ApiResult<String> {
        let header = Header::new(self.config.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to create token: {}", e)))
    }

    /// Returns the token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.config.ttl_secs
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("ttl_secs", &self.config.ttl_secs)
            .finish()
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            _ => "HS256",
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported algorithm: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::Role;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn service() -> TokenService {
        TokenService::new(JwtConfig::new(SECRET)).unwrap()
    }

    fn principal() -> Principal {
        Principal::new(
            42,
            "mira",
            vec![Role::new(3, "student_member"), Role::new(4, "student_monitor")],
        )
    }

    #[test]
    fn test_generate_and_verify_round_trip() {
        let service = service();
        let token = service.generate_token(Some(&principal())).unwrap();

        let verified = service.verify_token(Some(&token)).unwrap();
        assert_eq!(verified, principal());
    }

    #[test]
    fn test_generate_rejects_absent_principal() {
        let service = service();

        let err = service.generate_token(None).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));

        let nameless = Principal::new(1, "", Vec::new());
        assert!(service.generate_token(Some(&nameless)).is_err());
    }

    #[test]
    fn test_verify_missing_or_empty_token() {
        let service = service();
        assert!(matches!(service.verify_token(None), Err(ApiError::Unauthorized { .. })));
        assert!(matches!(service.verify_token(Some("")), Err(ApiError::Unauthorized { .. })));
        assert!(matches!(service.verify_token(Some("   ")), Err(ApiError::Unauthorized { .. })));
    }

    #[test]
    fn test_verify_malformed_token() {
        assert!(service().verify_token(Some("invalid.token.here")).is_err());
        assert!(service().verify_token(Some("not-a-jwt")).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let claims = Claims::for_principal(&principal(), "campus", -3600);
        let token = service.encode_claims(&claims).unwrap();

        let err = service.verify_token(Some(&token)).unwrap_err();
        assert_eq!(err.user_message(), TOKEN_REJECTED);
    }

    #[test]
    fn test_expiry_has_no_leeway_by_default() {
        let service = service();
        let claims = Claims::for_principal(&principal(), "campus", -1);
        let token = service.encode_claims(&claims).unwrap();

        assert!(service.verify_token(Some(&token)).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let one = TokenService::new(JwtConfig::new("secret-one-for-testing-purposes-only!")).unwrap();
        let two = TokenService::new(JwtConfig::new("secret-two-for-testing-purposes-only!")).unwrap();

        let token = one.generate_token(Some(&principal())).unwrap();
        assert!(two.verify_token(Some(&token)).is_err());
    }

    #[test]
    fn test_tampered_token() {
        let service = service();
        let token = service.generate_token(Some(&principal())).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = Claims::for_principal(
            &Principal::new(42, "mira", vec![Role::new(1, "admin")]),
            "campus",
            3600,
        );
        let other = TokenService::new(JwtConfig::new("another-secret-that-is-long-enough!!")).unwrap();
        let forged_token = other.encode_claims(&forged).unwrap();
        parts[1] = forged_token.split('.').nth(1).unwrap().to_string();

        assert!(service.verify_token(Some(&parts.join("."))).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let issuer_a = TokenService::new(JwtConfig::new(SECRET).with_issuer("a")).unwrap();
        let issuer_b = TokenService::new(JwtConfig::new(SECRET).with_issuer("b")).unwrap();

        let token = issuer_a.generate_token(Some(&principal())).unwrap();
        assert!(issuer_b.verify_token(Some(&token)).is_err());
    }

    #[test]
    fn test_algorithm_mismatch() {
        let hs256 = service();
        let hs512 = TokenService::new(JwtConfig::new(SECRET).with_algorithm(Algorithm::HS512)).unwrap();

        let token = hs512.generate_token(Some(&principal())).unwrap();
        assert!(hs512.verify_token(Some(&token)).is_ok());
        assert!(hs256.verify_token(Some(&token)).is_err());
    }

    #[test]
    fn test_config_validation() {
        let err = TokenService::new(JwtConfig::new("")).unwrap_err();
        assert!(matches!(err, ApiError::Configuration { .. }));

        let rsa = JwtConfig::new(SECRET).with_algorithm(Algorithm::RS256);
        assert!(TokenService::new(rsa).is_err());

        // Short secrets are accepted with a warning.
        assert!(TokenService::new(JwtConfig::new("short")).is_ok());
    }

    #[test]
    fn test_config_serde_algorithm() {
        let config: JwtConfig =
            serde_json::from_str(r#"{"secret": "s", "algorithm": "HS384"}"#).unwrap();
        assert_eq!(config.algorithm, Algorithm::HS384);
        assert_eq!(config.issuer, "campus");

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("\"secret\""));

        assert!(serde_json::from_str::<JwtConfig>(r#"{"algorithm": "RS256"}"#).is_err());
    }

    #[tokio::test]
    async fn test_token_expires_after_ttl() {
        let service = TokenService::new(JwtConfig::new(SECRET).with_ttl(Duration::from_secs(1))).unwrap();
        let token = service.generate_token(Some(&principal())).unwrap();
        assert!(service.verify_token(Some(&token)).is_ok());

        tokio::time::sleep(Duration::from_millis(2100)).await;

        assert!(matches!(
            service.verify_token(Some(&token)),
            Err(ApiError::Unauthorized { .. })
        ));
    }
}
