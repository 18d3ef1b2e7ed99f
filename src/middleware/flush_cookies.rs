use axum::{extract::Request, middleware::Next, response::Response};

use crate::cookies::{write_set_cookie_headers, CookieJar};

/// Outermost cookie stage: parse the inbound cookie header into a fresh
/// per-request jar at entry, and flush every queued cookie onto the response
/// exactly once at finalization.
///
/// Handlers and middleware queue through the jar extension; nobody writes
/// `Set-Cookie` directly, so deletions and sets share a single flush point.
pub async fn flush_cookies_middleware(mut request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    request.extensions_mut().insert(jar.clone());

    let mut response = next.run(request).await;
    write_set_cookie_headers(&jar, response.headers_mut());
    response
}
