//! # API REST
//!
//! REST API for cTAKES annotation processing.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! All processing is delegated to `ctakes-core` and `fhir`; handlers only translate requests
//! and errors.

#![warn(rust_2018_idioms)]

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use ctakes_core::{
    list_polarity, CoreConfig, CoreError, Polarity, PolarityResponse, Span, TransformerModel,
};
use fhir::{Bundle, FhirProjector, NlpSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

type ApiError = (StatusCode, &'static str);

/// Application state shared across REST API handlers.
///
/// Holds the configuration resolved at startup.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    source: Arc<NlpSource>,
}

impl AppState {
    pub fn new(cfg: CoreConfig, source: NlpSource) -> Self {
        Self {
            cfg: Arc::new(cfg),
            source: Arc::new(source),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// A document and the cTAKES REST response produced for it.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AnnotationsReq {
    pub document: String,
    #[schema(value_type = Object)]
    pub response: Value,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct FhirReq {
    pub document: String,
    #[schema(value_type = Object)]
    pub response: Value,
    pub subject_id: String,
    pub encounter_id: String,
    pub docref_id: String,
    /// `positive` (default), `negated` or `any`
    #[serde(default)]
    pub polarity: Option<String>,
}

#[derive(Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct SpanReq {
    pub begin: usize,
    pub end: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PolarityReq {
    /// Spans in the order they were sent to the transformer service
    pub spans: Vec<SpanReq>,
    pub statuses: Vec<i64>,
    /// `negation` (default) or `termexists`
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SpanPolarityRes {
    pub begin: usize,
    pub end: usize,
    pub polarity: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PolarityRes {
    pub polarities: Vec<SpanPolarityRes>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, annotations, fhir_bundle, polarity),
    components(schemas(
        HealthRes,
        AnnotationsReq,
        FhirReq,
        SpanReq,
        PolarityReq,
        SpanPolarityRes,
        PolarityRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST router with permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/annotations", post(annotations))
        .route("/fhir", post(fhir_bundle))
        .route("/polarity", post(polarity))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "cTAKES FHIR REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/annotations",
    request_body = AnnotationsReq,
    responses(
        (status = 200, description = "Canonical annotation JSON with character offsets"),
        (status = 400, description = "Malformed annotation response"),
        (status = 422, description = "Offsets do not match the document")
    )
)]
/// Parse and reconcile a cTAKES response
///
/// Returns the response in canonical form, with offsets converted to character indexes of
/// the document.
#[axum::debug_handler]
async fn annotations(
    State(state): State<AppState>,
    Json(req): Json<AnnotationsReq>,
) -> Result<Json<Value>, ApiError> {
    let index =
        ctakes_core::extract_value(&req.document, req.response, &state.cfg).map_err(core_error)?;
    Ok(Json(index.as_json()))
}

#[utoipa::path(
    post,
    path = "/fhir",
    request_body = FhirReq,
    responses(
        (status = 200, description = "FHIR collection Bundle"),
        (status = 400, description = "Bad request"),
        (status = 422, description = "Offsets do not match the document")
    )
)]
/// Project a cTAKES response onto FHIR resources
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - an id is blank,
/// - the polarity filter is not recognized,
/// - the annotation response is malformed.
#[axum::debug_handler]
async fn fhir_bundle(
    State(state): State<AppState>,
    Json(req): Json<FhirReq>,
) -> Result<Json<Bundle>, ApiError> {
    let polarity = polarity_filter(req.polarity.as_deref())?;

    let projector = match FhirProjector::new(&req.subject_id, &req.encounter_id, &req.docref_id) {
        Ok(projector) => projector.with_source((*state.source).clone()),
        Err(e) => {
            tracing::warn!("Invalid FHIR reference: {e}");
            return Err((StatusCode::BAD_REQUEST, "Missing subject, encounter or document id"));
        }
    };

    let index =
        ctakes_core::extract_value(&req.document, req.response, &state.cfg).map_err(core_error)?;
    Ok(Json(Bundle::collection(
        projector.project_index_with(&index, polarity),
    )))
}

#[utoipa::path(
    post,
    path = "/polarity",
    request_body = PolarityReq,
    responses(
        (status = 200, description = "Polarity per span, in request order", body = PolarityRes),
        (status = 400, description = "Bad request"),
        (status = 422, description = "Statuses do not fit the spans or the model")
    )
)]
/// Map a cNLP transformer response onto the spans that were sent
#[axum::debug_handler]
async fn polarity(
    State(_state): State<AppState>,
    Json(req): Json<PolarityReq>,
) -> Result<Json<PolarityRes>, ApiError> {
    let model: TransformerModel = match req.model.as_deref() {
        None => TransformerModel::default(),
        Some(name) => name.parse::<TransformerModel>().map_err(|e| {
            tracing::warn!("Invalid transformer model: {e}");
            (StatusCode::BAD_REQUEST, "Unknown transformer model")
        })?,
    };

    let spans = req
        .spans
        .iter()
        .map(|s| Span::new(s.begin, s.end))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::warn!("Invalid span: {e}");
            (StatusCode::BAD_REQUEST, "Invalid span")
        })?;

    let response = PolarityResponse {
        statuses: req.statuses,
    };
    let polarities = list_polarity(&spans, &response, model).map_err(core_error)?;

    Ok(Json(PolarityRes {
        polarities: spans
            .iter()
            .zip(polarities)
            .map(|(span, polarity)| SpanPolarityRes {
                begin: span.begin(),
                end: span.end(),
                polarity: polarity.to_string(),
            })
            .collect(),
    }))
}

/// `None` in the request means positive only; `any` disables the filter.
fn polarity_filter(value: Option<&str>) -> Result<Option<Polarity>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(Some(Polarity::Positive)),
        Some(v) if v.eq_ignore_ascii_case("any") => Ok(None),
        Some(v) => v.parse::<Polarity>().map(Some).map_err(|e| {
            tracing::warn!("Invalid polarity filter: {e}");
            (StatusCode::BAD_REQUEST, "Unknown polarity filter")
        }),
    }
}

fn core_error(e: CoreError) -> ApiError {
    tracing::warn!("Annotation processing error: {e}");
    match e {
        CoreError::MalformedAnnotation { .. } | CoreError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, "Malformed annotation response")
        }
        CoreError::ReconciliationMismatch { .. } | CoreError::InvalidOffset { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Annotation offsets do not match document",
        ),
        CoreError::SpanCountMismatch { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Status count does not match span count",
        ),
        CoreError::UnknownStatus { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Status outside the model's encoding",
        ),
    }
}
