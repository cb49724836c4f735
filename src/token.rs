//! Verification token codec: HS256 compact JWT mint and validate.
//!
//! The wire format is a standard three-segment compact JWT so any conforming
//! HS256 verifier can check these tokens. Expiry is evaluated against an
//! explicit clock supplied by the caller; the `*_at` variants exist so boundary
//! behavior is testable at fixed timestamps.

use crate::error::VerifyError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Verification tokens expire 24 hours after issuance.
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Claims embedded in a verification token.
///
/// `email` records the address at issuance time and is informational only;
/// verification re-reads the live account via the subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationClaims {
    /// Subject (account ID the token is bound to).
    pub sub: String,
    /// Account email at time of issuance.
    pub email: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Mint a verification token bound to an account.
pub fn verification_token_mint(
    account_id: &str,
    email: &str,
    secret: &str,
) -> Result<String, VerifyError> {
    verification_token_mint_at(account_id, email, secret, Utc::now())
}

/// Mint a verification token with an explicit issuance time.
pub fn verification_token_mint_at(
    account_id: &str,
    email: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<String, VerifyError> {
    let claims = VerificationClaims {
        sub: account_id.to_string(),
        email: email.to_string(),
        iat: now.timestamp(),
        exp: now.timestamp() + TOKEN_LIFETIME_SECS,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate and decode a verification token.
pub fn verification_token_validate(
    token: &str,
    secret: &str,
) -> Result<VerificationClaims, VerifyError> {
    verification_token_validate_at(token, secret, Utc::now())
}

/// Validate a verification token against an explicit clock.
///
/// A token is valid while `now <= exp`. Signature, encoding, and claim-shape
/// failures all map to invalid-token; only a good signature past its expiry
/// maps to token-expired.
pub fn verification_token_validate_at(
    token: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<VerificationClaims, VerifyError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked below against the caller-supplied clock.
    validation.validate_exp = false;

    let token_data = decode::<VerificationClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    let claims = token_data.claims;
    if claims.sub.is_empty() {
        return Err(VerifyError::InvalidToken);
    }
    if now.timestamp() > claims.exp {
        return Err(VerifyError::TokenExpired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::TimeZone;

    const SECRET: &str = "s";

    fn at(timestamp: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(timestamp, 0).unwrap()
    }

    #[test]
    fn mint_and_validate_roundtrip() {
        let token =
            verification_token_mint_at("u1", "a@example.com", SECRET, at(1000)).unwrap();
        let claims = verification_token_validate_at(&token, SECRET, at(1000)).unwrap();

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.iat, 1000);
        assert_eq!(claims.exp, 1000 + TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn token_is_valid_until_expiry_boundary() {
        let token =
            verification_token_mint_at("u1", "a@example.com", SECRET, at(1000)).unwrap();

        // One second after issuance.
        assert!(verification_token_validate_at(&token, SECRET, at(1001)).is_ok());
        // Exactly at expiry: current time <= exp is still valid.
        assert!(verification_token_validate_at(&token, SECRET, at(1000 + 86400)).is_ok());
        // One second past expiry.
        assert!(matches!(
            verification_token_validate_at(&token, SECRET, at(1000 + 86401)),
            Err(VerifyError::TokenExpired)
        ));
    }

    #[test]
    fn token_with_wrong_secret_fails() {
        let token =
            verification_token_mint_at("u1", "a@example.com", SECRET, at(1000)).unwrap();
        let result = verification_token_validate_at(&token, "different-secret", at(1000));
        assert!(matches!(result, Err(VerifyError::Jwt(_))));
    }

    #[test]
    fn malformed_token_fails() {
        assert!(verification_token_validate_at("not-a-token", SECRET, at(1000)).is_err());
        assert!(verification_token_validate_at("a.b", SECRET, at(1000)).is_err());
        assert!(verification_token_validate_at("", SECRET, at(1000)).is_err());
    }

    #[test]
    fn tampered_payload_fails() {
        let token =
            verification_token_mint_at("u1", "a@example.com", SECRET, at(1000)).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "sub": "u2",
                "email": "a@example.com",
                "iat": 1000,
                "exp": 1000 + TOKEN_LIFETIME_SECS,
            })
            .to_string(),
        );
        parts[1] = forged_payload.as_str();
        let tampered = parts.join(".");

        assert!(verification_token_validate_at(&tampered, SECRET, at(1000)).is_err());
    }

    #[test]
    fn token_without_subject_fails() {
        #[derive(Serialize)]
        struct NoSubject {
            email: String,
            iat: i64,
            exp: i64,
        }

        let token = encode(
            &Header::default(),
            &NoSubject {
                email: "a@example.com".to_string(),
                iat: 1000,
                exp: 1000 + TOKEN_LIFETIME_SECS,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verification_token_validate_at(&token, SECRET, at(1000)).is_err());
    }

    #[test]
    fn wire_format_is_compact_hs256_jwt() {
        let token =
            verification_token_mint_at("u1", "a@example.com", SECRET, at(1000)).unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);

        let header_bytes = URL_SAFE_NO_PAD.decode(segments[0]).expect("base64url header");
        let header: serde_json::Value = serde_json::from_slice(&header_bytes).expect("json header");
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");
    }
}
