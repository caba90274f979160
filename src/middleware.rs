//! Request middleware as an explicit chain.
//!
//! There is no continuation callback: each step inspects the request head
//! and returns a control signal. The chain runs steps in registration order
//! and stops at the first short-circuit.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::info;

use crate::auth::BasicAuth;

/// Control signal returned by each step.
pub enum StepOutcome {
    Continue,
    ShortCircuit(Response),
}

/// One link in the chain.
pub trait Step: Send + Sync {
    fn apply(&self, parts: &Parts) -> StepOutcome;
}

#[derive(Default)]
pub struct MiddlewareChain {
    steps: Vec<Box<dyn Step>>,
}

impl MiddlewareChain {
    pub fn push(&mut self, step: impl Step + 'static) {
        self.steps.push(Box::new(step));
    }

    pub fn run(&self, parts: &Parts) -> StepOutcome {
        for step in &self.steps {
            if let StepOutcome::ShortCircuit(resp) = step.apply(parts) {
                return StepOutcome::ShortCircuit(resp);
            }
        }
        StepOutcome::Continue
    }
}

/// Axum entry point: runs the chain against the request head, then either
/// answers directly or hands off to the router.
pub async fn run_chain(
    State(chain): State<Arc<MiddlewareChain>>,
    req: Request,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();
    match chain.run(&parts) {
        StepOutcome::ShortCircuit(resp) => resp,
        StepOutcome::Continue => next.run(Request::from_parts(parts, body)).await,
    }
}

/// Logs every request line.
pub struct RequestLog;

impl Step for RequestLog {
    fn apply(&self, parts: &Parts) -> StepOutcome {
        info!(method = %parts.method, path = %parts.uri.path(), "request");
        StepOutcome::Continue
    }
}

/// HTTP Basic guard. Compares the `Authorization` header against the
/// configured credentials in constant time.
pub struct BasicGuard {
    expected: String,
}

impl BasicGuard {
    pub fn new(auth: &BasicAuth) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", auth.user, auth.password));
        Self {
            expected: format!("Basic {encoded}"),
        }
    }

    fn rejection() -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic")],
            Json(json!({"error": "unauthorized", "reason": "invalid or missing credentials"})),
        )
            .into_response()
    }
}

impl Step for BasicGuard {
    fn apply(&self, parts: &Parts) -> StepOutcome {
        if let Some(value) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            && bool::from(value.as_bytes().ct_eq(self.expected.as_bytes()))
        {
            return StepOutcome::Continue;
        }
        StepOutcome::ShortCircuit(Self::rejection())
    }
}
