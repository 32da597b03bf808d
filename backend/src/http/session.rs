//! Admin session extraction.

use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};

use super::error::AppError;
use super::state::AppState;
use crate::auth::{token_from_cookie_header, SessionClaims, SessionError, SessionSigner};

/// Verify the session cookie carried by `headers`.
pub fn verify_session(
    headers: &HeaderMap,
    signer: &SessionSigner,
) -> Result<SessionClaims, SessionError> {
    let token = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(token_from_cookie_header)
        .ok_or_else(|| SessionError::Malformed("no session cookie".to_string()))?;
    signer.verify(token)
}

/// Extractor that only succeeds for a verified admin session.
///
/// Handlers list it before any body extractor, so unauthenticated requests are
/// rejected with 401 before their payload is looked at.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match verify_session(&parts.headers, &state.sessions) {
            Ok(claims) => Ok(AdminSession(claims)),
            Err(e) => {
                tracing::debug!("Rejected admin request: {}", e);
                Err(AppError::from(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration;

    #[test]
    fn test_verify_session_reads_cookie_header() {
        let signer = SessionSigner::new("secret", Duration::hours(1));
        let token = signer.issue().unwrap();

        let mut headers = HeaderMap::new();
        assert!(verify_session(&headers, &signer).is_err());

        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("a=b; admintoken={}", token)).unwrap(),
        );
        assert!(verify_session(&headers, &signer).is_ok());

        headers.insert(COOKIE, HeaderValue::from_static("admintoken=1"));
        assert!(verify_session(&headers, &signer).is_err());
    }
}
