use std::sync::Arc;

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, trace};

use crate::model::AppState;

/// Where a route expects the shared secret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Source {
    Header(&'static str),
    /// A string field of a JSON request body.
    BodyField(&'static str),
}

/// How a route answers when the secret is wrong.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rejection {
    Text,
    Json,
}

#[derive(Debug)]
pub struct Protected {
    pub method: &'static str,
    /// `:name` segments match any single non-empty segment.
    pub path: &'static str,
    pub source: Source,
    pub rejection: Rejection,
}

/// Every route that requires the shared secret. Anything not listed is open.
pub const PROTECTED_ROUTES: &[Protected] = &[
    Protected {
        method: "GET",
        path: "/",
        source: Source::BodyField("auth"),
        rejection: Rejection::Text,
    },
    Protected {
        method: "GET",
        path: "/getuser/:id",
        source: Source::Header("auth"),
        rejection: Rejection::Json,
    },
    Protected {
        method: "POST",
        path: "/addpost/:userId",
        source: Source::Header("auth"),
        rejection: Rejection::Text,
    },
];

pub fn check_auth(secret: &str, candidate: Option<&str>) -> bool {
    candidate == Some(secret)
}

/// HEAD is answered by the GET handler, so it gets the GET entry's checks.
pub fn protection_for(method: &str, path: &str) -> Option<&'static Protected> {
    let method = if method == "HEAD" { "GET" } else { method };
    PROTECTED_ROUTES
        .iter()
        .find(|route| route.method == method && matches_pattern(route.path, path))
}

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let mut pattern = pattern.split('/');
    let mut path = path.split('/');
    loop {
        match (pattern.next(), path.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                let matched = if expected.starts_with(':') {
                    !actual.is_empty()
                } else {
                    expected == actual
                };
                if !matched {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

impl Rejection {
    fn respond(self) -> Response {
        match self {
            Rejection::Text => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            Rejection::Json => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "message": "Unauthorized" })),
            )
                .into_response(),
        }
    }
}

/// Middleware applying [`PROTECTED_ROUTES`] to every request.
pub async fn guard(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next<Body>,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(protected) = protection_for(method.as_str(), &path) else {
        return next.run(request).await;
    };

    let (request, candidate) = match protected.source {
        Source::Header(name) => {
            let candidate = request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            (request, candidate)
        }
        Source::BodyField(field) => {
            // The handler still gets the body, so buffer it and put it back.
            let (parts, body) = request.into_parts();
            let bytes = match read_limited(body, state.body_limit).await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => {
                    debug!(
                        "Body of {} {} is over {} bytes",
                        method, path, state.body_limit
                    );
                    return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
                        .into_response();
                }
                Err(err) => {
                    debug!("Failed to read body of {} {}: {}", method, path, err);
                    return protected.rejection.respond();
                }
            };
            let candidate = body_field(&bytes, field);
            (Request::from_parts(parts, Body::from(bytes)), candidate)
        }
    };

    if !check_auth(&state.auth_secret, candidate.as_deref()) {
        debug!("Unauthorized request to {} {}", method, path);
        return protected.rejection.respond();
    }

    trace!("Request to {} {} authorized", method, path);
    next.run(request).await
}

/// Buffer `body`, or `None` once it grows past `limit` bytes.
async fn read_limited(mut body: Body, limit: usize) -> Result<Option<Bytes>, hyper::Error> {
    let mut buffer = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        if buffer.len() + chunk.len() > limit {
            return Ok(None);
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(Some(Bytes::from(buffer)))
}

fn body_field(bytes: &Bytes, field: &str) -> Option<String> {
    let body: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    body.get(field)?.as_str().map(str::to_owned)
}
