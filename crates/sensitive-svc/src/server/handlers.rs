//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        ErrorResponse, FieldRuleSpec, HealthResponse, ProtectRequest, ProtectResponse,
        RevealRequest, RevealResponse,
    },
    ServiceError,
};
use sensitive::{
    protect_fields, reveal_fields, EnvelopeError, FieldError, FieldRule, MaskRule, SensitiveType,
};
use tracing::warn;

use super::state::AppState;

/// `POST /protect`: mask and encrypt the listed fields of `payload`.
///
/// Each listed string field is replaced with `_mask|<code>|...|<mask>` under
/// the active suite.
pub async fn protect(State(state): State<AppState>, Json(req): Json<ProtectRequest>) -> Response {
    let rules = match resolve_rules(&req.fields) {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    let mut payload = req.payload;
    if let Err(e) = protect_fields(&state.codec, &mut payload, &rules) {
        let err = to_service_error(&e);
        warn!(error = %e, "protect failed");
        return error_response(&err);
    }

    (StatusCode::OK, Json(ProtectResponse { payload })).into_response()
}

/// `POST /reveal`: decrypt the listed fields of `payload`.
///
/// The suite is read from each envelope, so one payload may mix GM and
/// Modern fields. Raw values that satisfy the field's rule pass through.
pub async fn reveal(State(state): State<AppState>, Json(req): Json<RevealRequest>) -> Response {
    let rules = match resolve_rules(&req.fields) {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    let mut payload = req.payload;
    if let Err(e) = reveal_fields(&state.codec, &mut payload, &rules) {
        let err = to_service_error(&e);
        warn!(error = %e, "reveal failed");
        return error_response(&err);
    }

    (StatusCode::OK, Json(RevealResponse { payload })).into_response()
}

/// `GET /health`: liveness check reporting the active and supported suites.
pub async fn health(State(state): State<AppState>) -> Response {
    let service = state.service();
    let body = HealthResponse {
        status: "ok".into(),
        active_mode: service.active_mode().code().into(),
        supported_modes: service
            .supported_modes()
            .into_iter()
            .map(|m| m.code().to_owned())
            .collect(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Rule resolution and error mapping
// ---------------------------------------------------------------------------

fn resolve_rules(specs: &[FieldRuleSpec]) -> Result<Vec<FieldRule>, ServiceError> {
    specs.iter().map(resolve_rule).collect()
}

/// Turn a wire rule into a [`FieldRule`]. Any override makes it a custom
/// rule that starts from the named type's lengths and pattern.
fn resolve_rule(spec: &FieldRuleSpec) -> Result<FieldRule, ServiceError> {
    let kind: SensitiveType = spec
        .kind
        .parse()
        .map_err(|e: sensitive::mask::UnknownSensitiveType| ServiceError::BadRequest(e.to_string()))?;

    let rule = if spec.is_custom() {
        MaskRule::custom(
            spec.prefix.unwrap_or(kind.prefix()),
            spec.suffix.unwrap_or(kind.suffix()),
            spec.regex.clone().unwrap_or_else(|| kind.regex().to_owned()),
            spec.must_match.unwrap_or(true),
        )
    } else {
        MaskRule::of(kind)
    };
    Ok(FieldRule::new(spec.path.clone(), rule))
}

fn to_service_error(err: &FieldError) -> ServiceError {
    let message = err.to_string();
    match err {
        FieldError::Mask(_) => ServiceError::BadRequest(message),
        FieldError::Envelope(e) => match e {
            EnvelopeError::UnknownAlgorithm(_)
            | EnvelopeError::UnknownKeyKind(_)
            | EnvelopeError::MalformedEnvelope(_)
            | EnvelopeError::IntegrityViolation(_) => ServiceError::BadRequest(message),
            EnvelopeError::MissingKeyMaterial { .. }
            | EnvelopeError::InvalidKeyLength { .. }
            | EnvelopeError::InvalidKeyEncoding(_)
            | EnvelopeError::UnsupportedAlgorithm(_) => ServiceError::Unavailable(message),
            EnvelopeError::Cipher(_) => ServiceError::EncryptionFailure(message),
        },
    }
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}
