//! Admin sessions.
//!
//! A successful login issues a signed token that is stored in the
//! [`COOKIE_NAME`] cookie. Tokens have the form `v1.<payload>.<signature>`,
//! where the payload is base64url JSON claims and the signature is
//! HMAC-SHA256 over the encoded payload. Every admin request verifies the
//! signature and expiry; the presence of the cookie alone grants nothing.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying the admin session token.
pub const COOKIE_NAME: &str = "admintoken";

/// Role claimed by every issued session.
pub const ADMIN_ROLE: &str = "admin";

const TOKEN_VERSION_V1: &str = "v1";
const MAX_TOKEN_LEN: usize = 512;

/// Errors raised while issuing or verifying a session token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session token is malformed: {0}")]
    Malformed(String),
    #[error("unsupported session token version: {0}")]
    UnsupportedVersion(String),
    #[error("session token signature mismatch")]
    InvalidSignature,
    #[error("session token expired")]
    Expired,
    #[error("session token does not grant the admin role")]
    Forbidden,
    #[error("session key error: {0}")]
    Key(String),
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub role: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Issues and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| SessionError::Key(e.to_string()))
    }

    /// Issue an admin token valid from `now` for the configured TTL.
    pub fn issue_at(&self, now: DateTime<Utc>) -> Result<String, SessionError> {
        let claims = SessionClaims {
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let payload_bytes =
            serde_json::to_vec(&claims).map_err(|e| SessionError::Malformed(e.to_string()))?;
        let payload_part = URL_SAFE_NO_PAD.encode(payload_bytes);

        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}.{}", TOKEN_VERSION_V1, payload_part, sig_part))
    }

    pub fn issue(&self) -> Result<String, SessionError> {
        self.issue_at(Utc::now())
    }

    /// Verify `token` at `now` and return its claims.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(SessionError::Malformed("token exceeds max length".into()));
        }
        let mut parts = token.split('.');
        let (Some(version), Some(payload_part), Some(sig_part), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SessionError::Malformed("expected three parts".into()));
        };
        if version != TOKEN_VERSION_V1 {
            return Err(SessionError::UnsupportedVersion(version.to_string()));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::InvalidSignature)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        let claims: SessionClaims = serde_json::from_slice(&payload_bytes)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;

        if claims.exp <= now.timestamp() {
            return Err(SessionError::Expired);
        }
        if claims.role != ADMIN_ROLE {
            return Err(SessionError::Forbidden);
        }
        Ok(claims)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.verify_at(token, Utc::now())
    }
}

/// The single admin account.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// `Set-Cookie` value installing a session token.
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        COOKIE_NAME,
        token,
        ttl.num_seconds().max(0)
    )
}

/// `Set-Cookie` value removing the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", COOKIE_NAME)
}

/// Find the session token in a `Cookie` request header.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name.trim() == COOKIE_NAME && !value.is_empty()).then_some(value.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> SessionSigner {
        SessionSigner::new("test-secret", Duration::hours(8))
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let token = signer().issue_at(noon()).unwrap();
        assert!(token.starts_with("v1."));
        let claims = signer().verify_at(&token, noon()).unwrap();
        assert_eq!(claims.role, ADMIN_ROLE);
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let token = signer().issue_at(noon()).unwrap();
        let later = noon() + Duration::hours(8);
        assert_eq!(signer().verify_at(&token, later), Err(SessionError::Expired));
        assert!(signer()
            .verify_at(&token, later - Duration::seconds(1))
            .is_ok());
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = signer().issue_at(noon()).unwrap();
        let other = SessionSigner::new("another-secret", Duration::hours(8));
        assert_eq!(
            other.verify_at(&token, noon()),
            Err(SessionError::InvalidSignature)
        );
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let token = signer().issue_at(noon()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = SessionClaims {
            role: ADMIN_ROLE.into(),
            iat: 0,
            exp: i64::MAX,
        };
        let forged = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);
        assert_eq!(
            signer().verify_at(&tampered, noon()),
            Err(SessionError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(
            signer().verify_at("1", noon()),
            Err(SessionError::Malformed(_))
        ));
        assert!(matches!(
            signer().verify_at("v2.a.b", noon()),
            Err(SessionError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            signer().verify_at("v1.a.b.c", noon()),
            Err(SessionError::Malformed(_))
        ));
    }

    #[test]
    fn test_cookie_header_parsing() {
        assert_eq!(
            token_from_cookie_header("theme=dark; admintoken=v1.abc.def; x=1"),
            Some("v1.abc.def")
        );
        assert_eq!(token_from_cookie_header("admintoken="), None);
        assert_eq!(token_from_cookie_header("notadmintoken=1"), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok", Duration::hours(8));
        assert_eq!(
            cookie,
            "admintoken=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=28800"
        );
        assert!(clear_session_cookie().ends_with("Max-Age=0"));
    }

    #[test]
    fn test_credentials() {
        let creds = AdminCredentials::new("admin", "supersecret");
        assert!(creds.matches("admin", "supersecret"));
        assert!(!creds.matches("admin", "wrong"));
        assert!(!format!("{:?}", creds).contains("supersecret"));
    }
}
