use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{ErrorRes, HealthRes, HealthService};
use triage_core::{
    BiasDetail, CoreConfig, DepartmentFitScore, ExplanationRequest, FairnessReport, Gender,
    Jurisdiction, PatientIntake, PredictionLog, ResourceSnapshot, RiskLevel, RuleBackend,
    SyntheticPatient, TopFactor, TriageError, TriageRecord, TriageService,
    waittime::RandomWaitTimeEstimator,
};

/// Application state shared across REST API handlers
///
/// Holds the triage service and the startup-resolved configuration. The
/// configuration is read once in `main`; handlers never touch process env.
#[derive(Clone)]
struct AppState {
    triage_service: TriageService,
    cfg: Arc<CoreConfig>,
}

/// Triage request body: the intake form fields plus an optional live
/// resource snapshot from the resource-status provider. When absent, the
/// default snapshot is used.
#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
struct TriageReq {
    #[serde(flatten)]
    intake: PatientIntake,
    #[serde(default)]
    hospital_resources: Option<ResourceSnapshot>,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
struct SyntheticReq {
    number_of_patients: usize,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
struct FairnessReq {
    predictions: Vec<PredictionLog>,
    /// Overrides the configured deviation threshold when present.
    #[serde(default)]
    deviation_threshold_percentage: Option<f64>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
struct ExplanationRes {
    natural_explanation: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, triage, explain, synthetic_patients, fairness_report),
    components(schemas(
        HealthRes,
        ErrorRes,
        TriageReq,
        PatientIntake,
        Gender,
        ResourceSnapshot,
        TriageRecord,
        TopFactor,
        DepartmentFitScore,
        RiskLevel,
        ExplanationRequest,
        ExplanationRes,
        SyntheticReq,
        SyntheticPatient,
        FairnessReq,
        FairnessReport,
        BiasDetail,
        PredictionLog
    ))
)]
struct ApiDoc;

/// Main entry point for the triage application
///
/// Starts the REST server exposing the triage decision pipeline.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `DEPLOYMENT_COUNTRY`: jurisdiction for compliance checks (default: USA)
/// - `FAIRNESS_DEVIATION_THRESHOLD`: bias alert threshold in percent (default: 15)
/// - `BACKEND_TIMEOUT_SECS`: upper bound on one generative call (default: 30)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let jurisdiction = Jurisdiction::from_setting(
        &std::env::var("DEPLOYMENT_COUNTRY").unwrap_or_else(|_| "USA".into()),
    );
    let deviation_threshold = triage_core::config::deviation_threshold_from_env_value(
        std::env::var("FAIRNESS_DEVIATION_THRESHOLD").ok(),
    )
    .map_err(anyhow::Error::from)?;
    let backend_timeout = std::time::Duration::from_secs(
        std::env::var("BACKEND_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()?
            .unwrap_or(30),
    );

    let cfg = Arc::new(CoreConfig::new(
        jurisdiction,
        deviation_threshold,
        backend_timeout,
    )?);

    tracing::info!("++ Starting triage REST on {}", rest_addr);

    let triage_service = TriageService::new(
        cfg.clone(),
        Arc::new(RuleBackend::new()),
        Arc::new(RandomWaitTimeEstimator),
    );

    let app = Router::new()
        .route("/health", get(health))
        .route("/triage", post(triage))
        .route("/explain", post(explain))
        .route("/synthetic-patients", post(synthetic_patients))
        .route("/fairness/report", post(fairness_report))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            triage_service,
            cfg,
        });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Maps a pipeline error onto an HTTP status plus error body.
///
/// Policy rejections and validation failures are client errors; backend
/// failures surface as bad gateway with the cause text preserved.
fn error_response(err: TriageError) -> (StatusCode, Json<ErrorRes>) {
    let status = match &err {
        TriageError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TriageError::ConsentWithheld { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TriageError::ClassificationFailed(_)
        | TriageError::GenerationFailed(_)
        | TriageError::SynthesisFailed(_) => StatusCode::BAD_GATEWAY,
        TriageError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorRes {
            error: err.to_string(),
        }),
    )
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
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/triage",
    request_body = TriageReq,
    responses(
        (status = 200, description = "Assembled triage record", body = TriageRecord),
        (status = 400, description = "Invalid intake", body = ErrorRes),
        (status = 422, description = "Consent not provided", body = ErrorRes),
        (status = 502, description = "Classification backend failure", body = ErrorRes),
        (status = 504, description = "Classification backend timeout", body = ErrorRes)
    )
)]
/// Runs the triage pipeline for one patient intake
///
/// Validates the intake, checks consent, classifies risk, allocates a
/// department against the supplied (or default) resource snapshot and
/// returns the assembled record. The record is handed back to the caller;
/// persistence is the caller's concern.
async fn triage(
    State(state): State<AppState>,
    Json(req): Json<TriageReq>,
) -> Result<Json<TriageRecord>, (StatusCode, Json<ErrorRes>)> {
    let resources = req.hospital_resources.unwrap_or_default();

    match tokio::time::timeout(
        state.cfg.backend_timeout(),
        state.triage_service.triage(&req.intake, &resources),
    )
    .await
    {
        Ok(Ok(record)) => Ok(Json(record)),
        Ok(Err(e)) => {
            if e.is_policy_rejection() {
                tracing::info!("triage rejected: {}", e);
            } else {
                tracing::error!("triage error: {}", e);
            }
            Err(error_response(e))
        }
        Err(_elapsed) => {
            tracing::error!("triage timed out after {:?}", state.cfg.backend_timeout());
            Err((
                StatusCode::GATEWAY_TIMEOUT,
                Json(ErrorRes {
                    error: TriageError::ClassificationFailed(
                        "classification backend timed out".into(),
                    )
                    .to_string(),
                }),
            ))
        }
    }
}

#[utoipa::path(
    post,
    path = "/explain",
    request_body = ExplanationRequest,
    responses(
        (status = 200, description = "Natural language explanation", body = ExplanationRes),
        (status = 502, description = "Generation backend failure", body = ErrorRes),
        (status = 504, description = "Generation backend timeout", body = ErrorRes)
    )
)]
/// Composes a clinical narrative for a completed decision bundle
///
/// Invoked separately from `/triage`; a failure here never invalidates an
/// already-assembled record.
async fn explain(
    State(state): State<AppState>,
    Json(req): Json<ExplanationRequest>,
) -> Result<Json<ExplanationRes>, (StatusCode, Json<ErrorRes>)> {
    match tokio::time::timeout(
        state.cfg.backend_timeout(),
        state.triage_service.explain(&req),
    )
    .await
    {
        Ok(Ok(natural_explanation)) => Ok(Json(ExplanationRes {
            natural_explanation,
        })),
        Ok(Err(e)) => {
            tracing::error!("explanation error: {}", e);
            Err(error_response(e))
        }
        Err(_elapsed) => Err((
            StatusCode::GATEWAY_TIMEOUT,
            Json(ErrorRes {
                error: TriageError::GenerationFailed("generation backend timed out".into())
                    .to_string(),
            }),
        )),
    }
}

#[utoipa::path(
    post,
    path = "/synthetic-patients",
    request_body = SyntheticReq,
    responses(
        (status = 200, description = "Generated synthetic patients", body = [SyntheticPatient]),
        (status = 400, description = "Invalid count", body = ErrorRes),
        (status = 502, description = "Synthesis backend failure", body = ErrorRes)
    )
)]
/// Generates a batch of synthetic patients for ER rush simulation
async fn synthetic_patients(
    State(state): State<AppState>,
    Json(req): Json<SyntheticReq>,
) -> Result<Json<Vec<SyntheticPatient>>, (StatusCode, Json<ErrorRes>)> {
    match state
        .triage_service
        .synthesise_patients(req.number_of_patients)
        .await
    {
        Ok(patients) => Ok(Json(patients)),
        Err(e) => {
            tracing::error!("synthetic patient error: {}", e);
            Err(error_response(e))
        }
    }
}

#[utoipa::path(
    post,
    path = "/fairness/report",
    request_body = FairnessReq,
    responses(
        (status = 200, description = "Fairness monitoring report", body = FairnessReport),
        (status = 400, description = "Invalid threshold", body = ErrorRes)
    )
)]
/// Runs the fairness monitor over a batch of logged predictions
///
/// Uses the configured deviation threshold unless the request overrides it.
async fn fairness_report(
    State(state): State<AppState>,
    Json(req): Json<FairnessReq>,
) -> Result<Json<FairnessReport>, (StatusCode, Json<ErrorRes>)> {
    let report = match req.deviation_threshold_percentage {
        Some(threshold) => {
            let threshold = triage_types::Percentage::new(threshold).map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorRes {
                        error: format!("invalid deviation threshold: {}", e),
                    }),
                )
            })?;
            triage_core::fairness::monitor(&req.predictions, threshold)
        }
        None => state.triage_service.fairness_report(&req.predictions),
    };
    Ok(Json(report))
}
