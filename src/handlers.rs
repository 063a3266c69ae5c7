use crate::classifier::{Classifier, TreeEnsembleClassifier};
use crate::config::Config;
use crate::errors::AppError;
use crate::history::HistoryLogger;
use crate::models::{BorrowerRecord, HealthResponse, PredictionResponse, RiskTier};
use crate::render::{render_page, PageResult};
use crate::schema::{FeatureSpec, FEATURES, FEATURE_COUNT};
use crate::services::{PredictionOutcome, PredictionService};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Identity of the loaded model artifact.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub path: String,
    pub sha256: String,
}

/// Immutable application context shared by every handler.
///
/// Built once at startup; the classifier is never mutated afterwards.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// The loaded classifier.
    pub classifier: Arc<dyn Classifier>,
    /// Append-only prediction history.
    pub history: HistoryLogger,
    pub model: ModelInfo,
}

impl AppState {
    /// Loads the classifier artifact named in `config`.
    ///
    /// Fails with [`AppError::ModelNotFound`] if the artifact is absent.
    pub fn load(config: Config) -> Result<Self, AppError> {
        let classifier = TreeEnsembleClassifier::load(&config.model_path)?;
        let model = ModelInfo {
            path: classifier.path().display().to_string(),
            sha256: classifier.sha256().to_string(),
        };
        Ok(Self::with_classifier(config, Arc::new(classifier), model))
    }

    /// Builds the context around an already constructed classifier.
    pub fn with_classifier(
        config: Config,
        classifier: Arc<dyn Classifier>,
        model: ModelInfo,
    ) -> Self {
        let history = HistoryLogger::new(config.log_path.clone());
        Self {
            config,
            classifier,
            history,
            model,
        }
    }

    fn prediction_service(&self) -> PredictionService<'_> {
        PredictionService::new(self.classifier.as_ref(), &self.history)
    }

    /// Runs the pipeline for one submit.
    pub fn predict(&self, record: BorrowerRecord) -> Result<PredictionOutcome, AppError> {
        self.prediction_service().predict(record)
    }
}

/// OpenAPI description of the JSON endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(health, predict_api),
    components(schemas(BorrowerRecord, PredictionResponse, RiskTier, HealthResponse)),
    tags((name = "risk", description = "Default risk scoring"))
)]
pub struct ApiDoc;

/// Health check endpoint.
///
/// Returns the service status and the identity of the loaded model.
#[utoipa::path(
    get,
    path = "/health",
    tag = "risk",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "credit-risk-form".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_path: state.model.path.clone(),
        model_sha256: state.model.sha256.clone(),
        feature_count: FEATURE_COUNT,
    })
}

/// GET /
///
/// Renders the form. Query parameters prefill the controls; anything
/// missing takes the initial values.
pub async fn index(Query(record): Query<BorrowerRecord>) -> Html<String> {
    Html(render_page(&record, PageResult::Empty))
}

/// POST /predict
///
/// Form submit. Always re-renders the page with the submitted values so the
/// form stays usable after a warning or an error.
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    Form(record): Form<BorrowerRecord>,
) -> (StatusCode, Html<String>) {
    tracing::info!("POST /predict");

    match state.predict(record) {
        Ok(outcome) => (
            StatusCode::OK,
            Html(render_page(&record, PageResult::Outcome(&outcome))),
        ),
        Err(e) if e.is_warning() => (
            StatusCode::OK,
            Html(render_page(&record, PageResult::Warning(e.to_string()))),
        ),
        Err(e) => {
            let status = match e.root() {
                AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::error!("Prediction failed: {}", e);
            (
                status,
                Html(render_page(&record, PageResult::Error(e.to_string()))),
            )
        }
    }
}

/// POST /api/v1/predict
///
/// JSON variant of the form submit.
#[utoipa::path(
    post,
    path = "/api/v1/predict",
    tag = "risk",
    request_body = BorrowerRecord,
    responses(
        (status = 200, description = "Scored and (if possible) logged", body = PredictionResponse),
        (status = 400, description = "A value is outside its allowed range"),
        (status = 422, description = "Income must be greater than zero")
    )
)]
pub async fn predict_api(
    State(state): State<Arc<AppState>>,
    Json(record): Json<BorrowerRecord>,
) -> Result<Json<PredictionResponse>, AppError> {
    tracing::info!("POST /api/v1/predict");

    let outcome = state.predict(record)?;
    Ok(Json(outcome.to_response()))
}

/// GET /api/v1/schema
///
/// The ordered feature schema the model expects.
pub async fn feature_schema() -> Json<Vec<FeatureSpec>> {
    Json(FEATURES.to_vec())
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/v1/predict", post(predict_api))
        .route("/api/v1/schema", get(feature_schema))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 64KB is plenty for fourteen fields
                .layer(RequestBodyLimitLayer::new(64 * 1024)),
        );

    Router::new()
        .route("/health", get(health))
        .merge(routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
