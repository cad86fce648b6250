use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    catalog::ServiceType,
    inference::{
        self,
        patterns::{find_pattern, ArchitecturePattern, ARCHITECTURE_PATTERNS},
        InferenceError,
    },
    models::DiagramGraph,
};

type ApiError = (StatusCode, Json<serde_json::Value>);

// --- Payloads y Respuestas de la API ---

#[derive(Deserialize)]
pub struct DescriptionPayload {
    description: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagramSource {
    Ai,
    Rules,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(flatten)]
    diagram: DiagramGraph,
    source: DiagramSource,
    generated_at: String,
}

impl GenerateResponse {
    fn new(diagram: DiagramGraph, source: DiagramSource) -> Self {
        Self {
            diagram,
            source,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ServiceEntry {
    id: ServiceType,
    name: String,
    color: String,
    description: String,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/generate-diagram", post(generate_diagram_handler))
        .route("/api/infer", post(infer_handler))
        .route("/api/services", get(services_handler))
        .route("/api/patterns", get(patterns_handler))
        .route("/api/patterns/:id", get(pattern_handler))
        .route("/api/status", get(status_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

fn inference_error(err: InferenceError) -> ApiError {
    match err {
        InferenceError::EmptyInput => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "La descripción no puede estar vacía."})),
        ),
        other => {
            error!("Error de inferencia: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("Error al generar el diagrama: {}", other)})),
            )
        }
    }
}

fn run_rules(state: &AppState, description: &str) -> Result<DiagramGraph, ApiError> {
    inference::infer_with_catalog(description, state.catalog.as_ref()).map_err(inference_error)
}

// --- Handlers ---

/// Intenta primero con la IA (si está habilitada) y si falla usa las reglas.
#[axum::debug_handler]
async fn generate_diagram_handler(
    State(state): State<AppState>,
    Json(payload): Json<DescriptionPayload>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let description = payload.description;
    if description.trim().is_empty() {
        return Err(inference_error(InferenceError::EmptyInput));
    }

    if let Some(llm) = &state.llm_manager {
        info!(%request_id, "Generando diagrama con IA");
        match tokio::time::timeout(state.config.ai_timeout, llm.generate_diagram(&description))
            .await
        {
            Ok(Ok(diagram)) => {
                return Ok(Json(GenerateResponse::new(diagram, DiagramSource::Ai)));
            }
            Ok(Err(e)) => warn!(%request_id, "La IA falló, se usan las reglas: {}", e),
            Err(_) => warn!(
                %request_id,
                "La IA no respondió en {:?}, se usan las reglas",
                state.config.ai_timeout
            ),
        }
    }

    let diagram = run_rules(&state, &description)?;
    info!(%request_id, "Diagrama generado por reglas");
    Ok(Json(GenerateResponse::new(diagram, DiagramSource::Rules)))
}

#[axum::debug_handler]
async fn infer_handler(
    State(state): State<AppState>,
    Json(payload): Json<DescriptionPayload>,
) -> Result<Json<DiagramGraph>, ApiError> {
    run_rules(&state, &payload.description).map(Json)
}

#[axum::debug_handler]
async fn services_handler(State(state): State<AppState>) -> Json<Vec<ServiceEntry>> {
    let entries = ServiceType::ALL
        .iter()
        .filter_map(|service| {
            state.catalog.lookup(*service).map(|info| ServiceEntry {
                id: *service,
                name: info.name,
                color: info.color,
                description: info.description,
            })
        })
        .collect();
    Json(entries)
}

#[axum::debug_handler]
async fn patterns_handler() -> impl IntoResponse {
    Json(ARCHITECTURE_PATTERNS)
}

#[axum::debug_handler]
async fn pattern_handler(
    Path(id): Path<String>,
) -> Result<Json<&'static ArchitecturePattern>, ApiError> {
    find_pattern(&id).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Patrón desconocido: {}", id)})),
        )
    })
}

#[axum::debug_handler]
async fn status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "aiEnabled": state.llm_manager.is_some(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// --- Handler de Apagado ---

#[axum::debug_handler]
async fn shutdown_handler(
    State(state): State<AppState>,
) -> impl IntoResponse {
    info!("Petición de apagado recibida.");
    if let Some(sender) = state.shutdown_sender.lock().unwrap().take() {
        let _ = sender.send(());
    }
    StatusCode::OK
}
