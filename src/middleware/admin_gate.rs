use axum::{extract::Request, middleware::Next, response::Response};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::context::RequestContext;
use crate::error::ApiError;

/// Gate every administrative route behind the tenant's secret entry segment.
///
/// Any failure - no resolved tenant, missing segment, wrong segment - yields
/// the same response an unmapped route produces. A client probing path
/// segments cannot tell a real tenant with a wrong token from a host that
/// maps to nothing at all. The causes differ only in server logs.
pub async fn admin_entry_gate_middleware(
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let tenant = request
        .extensions()
        .get::<RequestContext>()
        .and_then(|ctx| ctx.tenant().cloned());

    let claimed = claimed_entry(request.uri().path()).map(str::to_owned);

    let Some(tenant) = tenant else {
        tracing::warn!("admin entry check before tenant resolution");
        return Err(ApiError::uniform_not_found());
    };

    match claimed {
        Some(segment) if entry_matches(&segment, &tenant.admin_entry_token) => {
            tracing::debug!(tenant_id = tenant.id, "admin entry accepted");
            Ok(next.run(request).await)
        }
        _ => {
            // Missing or empty segment is always a mismatch; there is no
            // default entry path.
            tracing::warn!(tenant_id = tenant.id, "admin entry token mismatch");
            Err(ApiError::uniform_not_found())
        }
    }
}

/// The path segment immediately after `/admin/`, if any.
fn claimed_entry(path: &str) -> Option<&str> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    if segments.next() != Some("admin") {
        return None;
    }
    segments.next()
}

/// Constant-time token comparison.
///
/// Both sides are digested first, so the comparison runs over fixed-width
/// values: no timing signal proportional to the matching prefix, and no
/// length leak either.
fn entry_matches(claimed: &str, expected: &str) -> bool {
    let claimed = Sha256::digest(claimed.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    claimed.as_slice().ct_eq(expected.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claimed_entry_parses_admin_paths() {
        assert_eq!(claimed_entry("/admin/xyz123/dashboard"), Some("xyz123"));
        assert_eq!(claimed_entry("/admin/xyz123"), Some("xyz123"));
        assert_eq!(claimed_entry("/admin//dashboard"), Some("dashboard"));
    }

    #[test]
    fn claimed_entry_rejects_non_admin_paths() {
        assert_eq!(claimed_entry("/"), None);
        assert_eq!(claimed_entry("/admin"), None);
        assert_eq!(claimed_entry("/admin/"), None);
        assert_eq!(claimed_entry("/other/xyz123"), None);
    }

    #[test]
    fn entry_matches_exact_token_only() {
        assert!(entry_matches("xyz123", "xyz123"));
        assert!(!entry_matches("xyz12", "xyz123"));
        assert!(!entry_matches("xyz1234", "xyz123"));
        assert!(!entry_matches("", "xyz123"));
        assert!(!entry_matches("XYZ123", "xyz123"));
    }
}
