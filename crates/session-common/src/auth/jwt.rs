//! Access credential signing
//!
//! Short-lived bearer credentials are JWTs signed with a symmetric key. The
//! signer is configured with exactly one algorithm and rejects any credential
//! whose header names a different one before any claim is looked at.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use session_core::SubjectId;
use uuid::Uuid;

/// Access-credential verification failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid signing method")]
    InvalidSigningMethod,

    #[error("Invalid credential signature")]
    InvalidSignature,

    #[error("Malformed credential")]
    Malformed,

    #[error("Credential expired")]
    Expired,

    #[error("Credential revoked")]
    Revoked,

    #[error("Failed to encode credential: {0}")]
    Encoding(String),
}

impl CredentialError {
    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSigningMethod => "INVALID_SIGNING_METHOD",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Malformed => "MALFORMED_CREDENTIAL",
            Self::Expired => "CREDENTIAL_EXPIRED",
            Self::Revoked => "CREDENTIAL_REVOKED",
            Self::Encoding(_) => "CREDENTIAL_ENCODING_FAILED",
        }
    }
}

/// HMAC algorithms the signer can be configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SigningAlgorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl SigningAlgorithm {
    /// Name as written in the JWT `alg` header
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }

    fn jwt_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            other => Err(format!("unsupported signing algorithm: {other}")),
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims carried by an access credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Subject email at issue time
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique credential ID; keeps same-second credentials distinct
    pub jti: String,
}

impl AccessClaims {
    /// Get the subject as a typed ID
    ///
    /// # Errors
    /// Returns `Malformed` if the subject cannot be parsed
    pub fn subject_id(&self) -> Result<SubjectId, CredentialError> {
        SubjectId::parse(&self.sub).map_err(|_| CredentialError::Malformed)
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// A freshly signed access credential and the claims inside it
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub claims: AccessClaims,
}

impl IssuedCredential {
    /// Seconds between issue and expiry
    pub fn expires_in(&self) -> i64 {
        self.claims.exp - self.claims.iat
    }
}

/// Credential pair handed to a caller after login or rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

impl SessionTokens {
    pub fn bearer(access: IssuedCredential, refresh_token: String) -> Self {
        Self {
            expires_in: access.expires_in(),
            access_token: access.token,
            refresh_token,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Stateless signer/verifier for access credentials
#[derive(Clone)]
pub struct CredentialSigner {
    algorithm: SigningAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl CredentialSigner {
    /// Create a signer bound to one secret and one algorithm
    #[must_use]
    pub fn new(secret: &[u8], algorithm: SigningAlgorithm) -> Self {
        let mut validation = Validation::new(algorithm.jwt_algorithm());
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Issue a credential valid for `ttl` from now
    ///
    /// # Errors
    /// Returns `Encoding` if signing fails
    pub fn issue(
        &self,
        subject_id: SubjectId,
        subject_email: &str,
        ttl: Duration,
    ) -> Result<IssuedCredential, CredentialError> {
        self.issue_at(subject_id, subject_email, Utc::now(), ttl)
    }

    /// Issue a credential with an explicit issue instant
    ///
    /// # Errors
    /// Returns `Encoding` if signing fails
    pub fn issue_at(
        &self,
        subject_id: SubjectId,
        subject_email: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<IssuedCredential, CredentialError> {
        let claims = AccessClaims {
            sub: subject_id.to_string(),
            email: subject_email.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(self.algorithm.jwt_algorithm()),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| CredentialError::Encoding(e.to_string()))?;

        Ok(IssuedCredential { token, claims })
    }

    /// Verify signature and expiry, returning the trusted claims
    ///
    /// # Errors
    /// `InvalidSigningMethod` if the header names another algorithm,
    /// `InvalidSignature`, `Expired`, or `Malformed` otherwise
    pub fn verify(&self, token: &str) -> Result<AccessClaims, CredentialError> {
        if header_algorithm(token)? != self.algorithm.as_str() {
            return Err(CredentialError::InvalidSigningMethod);
        }

        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => CredentialError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    CredentialError::InvalidSignature
                }
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                    CredentialError::InvalidSigningMethod
                }
                _ => CredentialError::Malformed,
            },
        )?;

        Ok(data.claims)
    }
}

/// Read the `alg` field of an unverified compact JWS header
fn header_algorithm(token: &str) -> Result<String, CredentialError> {
    #[derive(Deserialize)]
    struct RawHeader {
        alg: String,
    }

    let mut segments = token.split('.');
    let header = segments.next().filter(|s| !s.is_empty());
    if segments.count() != 2 {
        return Err(CredentialError::Malformed);
    }

    let bytes = header
        .and_then(|h| URL_SAFE_NO_PAD.decode(h).ok())
        .ok_or(CredentialError::Malformed)?;
    let raw: RawHeader = serde_json::from_slice(&bytes).map_err(|_| CredentialError::Malformed)?;

    Ok(raw.alg)
}

impl fmt::Debug for CredentialSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSigner")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
