use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

const ALLOW_METHODS: &str = "GET, HEAD, POST, PUT, PATCH, DELETE, OPTIONS";

/// Resolve the `Access-Control-Allow-Origin` value for a request.
///
/// The literal request origin is echoed when it matches an allow-list
/// entry exactly, modulo one trailing slash, or as a prefix of the origin.
/// Anything else falls back to the first allow-list entry, so failures
/// stay visible to browser callers instead of turning into opaque CORS
/// errors. Returns `None` only when the allow-list is empty.
pub fn resolve_allow_origin<'a>(origin: Option<&'a str>, allow_list: &'a [String]) -> Option<&'a str> {
    let fallback = allow_list.first().map(String::as_str)?;

    let Some(origin) = origin else {
        return Some(fallback);
    };

    for entry in allow_list {
        let entry = entry.trim_end_matches('/');
        if origin.trim_end_matches('/') == entry || origin.starts_with(entry) {
            return Some(origin);
        }
    }

    Some(fallback)
}

/// Middleware applying the CORS policy to every response, success or error,
/// and short-circuiting preflight: OPTIONS always yields 204 with no body,
/// regardless of path or auth state.
pub async fn apply_cors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let cors = &state.config.server.cors;
    if let Some(allow_origin) = resolve_allow_origin(origin.as_deref(), &cors.allow_origins)
        && let Ok(value) = HeaderValue::from_str(allow_origin)
    {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, X-Custom-Auth-Key"),
        );
        if let Ok(max_age) = HeaderValue::from_str(&cors.max_age.to_string()) {
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, max_age);
        }
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }

    response
}
