//! Request handlers
//!
//! Field names in request and response bodies are a compatibility contract
//! with the existing frontend; do not rename them. Errors are structured
//! JSON with an `error` field and null prediction fields; stack traces
//! stay in the server log.

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::data::database::AggregateRecord;
use crate::features::head_to_head::HeadToHeadSummary;
use crate::predict::goals::GoalLine;
use crate::server::AppContext;
use crate::{predict, Fixture, TeamId, UpsBetError};

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub equipo_local_id: Option<i64>,
    pub equipo_visitante_id: Option<i64>,
    pub fecha: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub as_of: String,
    pub goles_local: GoalLine,
    pub goles_visitante: GoalLine,
    pub resultado_1x2: u8,
    pub model_version: String,
    pub features_used: Vec<String>,
    pub cut_note: String,
    pub prediction_note: String,
}

#[derive(Debug, Serialize)]
pub struct CornersResponse {
    pub corners_totales: f64,
    pub model_version: String,
    pub features_used: Vec<String>,
    pub prediction_note: String,
}

#[derive(Debug, Serialize)]
pub struct HistoricalDataResponse {
    pub resultados_historicos: ResultadosHistoricos,
    pub corners_historicos: CornersHistoricos,
    pub enfrentamiento_historico: EnfrentamientoHistorico,
}

#[derive(Debug, Serialize)]
pub struct ResultadosHistoricos {
    pub ataques_local_promedio: f64,
    pub ataques_visitante_promedio: f64,
    pub posesion_local_promedio: f64,
    pub posesion_visitante_promedio: f64,
    pub corners_local_promedio: f64,
    pub corners_visitante_promedio: f64,
    pub num_partidos_resultados: i64,
}

#[derive(Debug, Serialize)]
pub struct CornersHistoricos {
    pub corners_promedio_hist: f64,
    pub num_partidos_corners: i64,
}

#[derive(Debug, Serialize)]
pub struct EnfrentamientoHistorico {
    pub total_partidos: i64,
    pub posesion_local_promedio: f64,
    pub posesion_visitante_promedio: f64,
    pub corners_promedio: f64,
    pub goles_promedio: f64,
    pub tarjetas_promedio: f64,
    pub victorias_local: i64,
    pub victorias_visitante: i64,
    pub empates: i64,
}

/// POST /api/predict
pub async fn predict(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<PredictRequest>,
) -> ApiResult<PredictResponse> {
    match goals_outcome(&ctx, &req) {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            let status = error_status(&err);
            Err((
                status,
                Json(json!({
                    "error": public_message(&err, status),
                    "goles_local": Value::Null,
                    "goles_visitante": Value::Null,
                    "resultado_1x2": Value::Null,
                })),
            ))
        }
    }
}

/// POST /api/predict-corners
pub async fn predict_corners(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<PredictRequest>,
) -> ApiResult<CornersResponse> {
    match corners_outcome(&ctx, &req) {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            let status = error_status(&err);
            Err((
                status,
                Json(json!({
                    "error": public_message(&err, status),
                    "corners_totales": Value::Null,
                })),
            ))
        }
    }
}

/// POST /api/historical-data
pub async fn historical_data(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<PredictRequest>,
) -> ApiResult<HistoricalDataResponse> {
    match historical_outcome(&ctx, &req) {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            let status = error_status(&err);
            Err((
                status,
                Json(json!({ "error": public_message(&err, status) })),
            ))
        }
    }
}

/// GET /api/health
///
/// The service stays up with missing artifacts; this reports what loaded.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let models = &ctx.models;
    Json(json!({
        "status": "ok",
        "models_loaded": models.loaded(),
        "models_info": {
            "resultados_model": {
                "loaded": models.goals.is_some(),
                "type": models.goals.as_ref().map(|m| m.model_type.clone()),
                "file": ctx.config.models.goals_path,
            },
            "corners_model": {
                "loaded": models.corners.is_some(),
                "type": models.corners.as_ref().map(|m| m.model_type.clone()),
                "file": ctx.config.models.corners_path,
            },
            "corners_scaler": {
                "loaded": models.corners_scaler.is_some(),
                "type": models.corners_scaler.as_ref().map(|s| s.scaler_type.clone()),
                "file": ctx.config.models.corners_scaler_path,
            },
        },
        "timestamp": Local::now().to_rfc3339(),
    }))
}

/// GET /
pub async fn index(State(ctx): State<Arc<AppContext>>) -> Response {
    serve_static(&ctx.config.server.static_dir, "index.html").await
}

/// Static-file fallback for the frontend bundle.
pub async fn static_file(State(ctx): State<Arc<AppContext>>, uri: Uri) -> Response {
    let relative = uri.path().trim_start_matches('/');
    serve_static(&ctx.config.server.static_dir, relative).await
}

fn goals_outcome(ctx: &AppContext, req: &PredictRequest) -> crate::Result<PredictResponse> {
    let (home, away) = team_ids(req.equipo_local_id, req.equipo_visitante_id)?;
    let cutoff = effective_cutoff(req.fecha.as_deref())?;
    let fixture = Fixture::new(home, away, Some(cutoff))?;
    let model = ctx
        .models
        .goals
        .as_ref()
        .ok_or(UpsBetError::ModelUnavailable("results"))?;

    let prediction = predict::goals::predict(&ctx.db, model, &fixture)?;
    info!(
        %fixture,
        resultado_1x2 = prediction.resultado_1x2,
        "goals prediction served"
    );

    let as_of = cutoff.format("%Y-%m-%d").to_string();
    Ok(PredictResponse {
        cut_note: format!("Prediction computed using only data before {as_of}"),
        as_of,
        goles_local: prediction.home,
        goles_visitante: prediction.away,
        resultado_1x2: prediction.resultado_1x2,
        model_version: model.version.clone(),
        features_used: prediction.features_used,
        prediction_note: "Prediction generated by the trained goals regressors".to_string(),
    })
}

fn corners_outcome(ctx: &AppContext, req: &PredictRequest) -> crate::Result<CornersResponse> {
    let (home, away) = team_ids(req.equipo_local_id, req.equipo_visitante_id)?;
    let fixture = Fixture::new(home, away, None)?;
    let model = ctx
        .models
        .corners
        .as_ref()
        .ok_or(UpsBetError::ModelUnavailable("corners"))?;
    let scaler = ctx
        .models
        .corners_scaler
        .as_ref()
        .ok_or(UpsBetError::ModelUnavailable("corners"))?;

    let prediction = predict::corners::predict(&ctx.db, model, scaler, &fixture)?;
    info!(
        %fixture,
        corners_totales = prediction.corners_totales,
        "corners prediction served"
    );

    Ok(CornersResponse {
        corners_totales: prediction.corners_totales,
        model_version: model.version.clone(),
        features_used: prediction.features_used,
        prediction_note: "Prediction generated by the trained corners regressor".to_string(),
    })
}

fn historical_outcome(
    ctx: &AppContext,
    req: &PredictRequest,
) -> crate::Result<HistoricalDataResponse> {
    let (home, away) = team_ids(req.equipo_local_id, req.equipo_visitante_id)?;

    let result_data = ctx.db.result_averages(home, away, None)?;
    let corners_data = ctx.db.corner_averages(home, away)?;
    let rows = ctx.db.head_to_head(home, away)?;
    let summary = HeadToHeadSummary::from_matches(&rows);

    Ok(HistoricalDataResponse {
        resultados_historicos: resultados_section(result_data.as_ref()),
        corners_historicos: corners_section(corners_data.as_ref()),
        enfrentamiento_historico: enfrentamiento_section(summary),
    })
}

fn resultados_section(record: Option<&AggregateRecord>) -> ResultadosHistoricos {
    let get = |name: &str, default: f64| record.and_then(|r| r.get(name)).unwrap_or(default);
    ResultadosHistoricos {
        ataques_local_promedio: get("ataques_local", 0.0),
        ataques_visitante_promedio: get("ataques_visitante", 0.0),
        posesion_local_promedio: get("posesion_local", 50.0),
        posesion_visitante_promedio: get("posesion_visitante", 50.0),
        corners_local_promedio: get("corners_local", 0.0),
        corners_visitante_promedio: get("corners_visitante", 0.0),
        num_partidos_resultados: record.map(|r| r.matches).unwrap_or(0),
    }
}

fn corners_section(record: Option<&AggregateRecord>) -> CornersHistoricos {
    CornersHistoricos {
        corners_promedio_hist: record
            .and_then(|r| r.get("corners_vs_rival_hist"))
            .unwrap_or(0.0),
        num_partidos_corners: record.map(|r| r.matches).unwrap_or(0),
    }
}

fn enfrentamiento_section(summary: Option<HeadToHeadSummary>) -> EnfrentamientoHistorico {
    match summary {
        Some(s) => EnfrentamientoHistorico {
            total_partidos: s.total_partidos,
            posesion_local_promedio: s.posesion_local_promedio,
            posesion_visitante_promedio: s.posesion_visitante_promedio,
            corners_promedio: s.corners_promedio,
            goles_promedio: s.goles_promedio,
            tarjetas_promedio: s.tarjetas_promedio,
            victorias_local: s.victorias_local,
            victorias_visitante: s.victorias_visitante,
            empates: s.empates,
        },
        None => EnfrentamientoHistorico {
            total_partidos: 0,
            posesion_local_promedio: 50.0,
            posesion_visitante_promedio: 50.0,
            corners_promedio: 0.0,
            goles_promedio: 0.0,
            tarjetas_promedio: 0.0,
            victorias_local: 0,
            victorias_visitante: 0,
            empates: 0,
        },
    }
}

fn team_ids(local: Option<i64>, visitante: Option<i64>) -> crate::Result<(TeamId, TeamId)> {
    match (local, visitante) {
        (Some(local), Some(visitante)) => Ok((TeamId(local), TeamId(visitante))),
        _ => Err(UpsBetError::MissingTeams),
    }
}

/// Effective cutoff for the goals pipeline: the requested date clamped to
/// today, or today when no date was sent.
fn effective_cutoff(fecha: Option<&str>) -> crate::Result<NaiveDate> {
    let today = Local::now().date_naive();
    match fecha {
        Some(s) => {
            let requested = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| UpsBetError::InvalidDate(s.to_string()))?;
            Ok(requested.min(today))
        }
        None => Ok(today),
    }
}

fn error_status(err: &UpsBetError) -> StatusCode {
    match err {
        UpsBetError::Database(_)
        | UpsBetError::Io(_)
        | UpsBetError::Config(_)
        | UpsBetError::UnknownColumn(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn public_message(err: &UpsBetError, status: StatusCode) -> String {
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "request failed");
        "internal error".to_string()
    } else {
        err.to_string()
    }
}

async fn serve_static(dir: &str, relative: &str) -> Response {
    if relative.is_empty() || relative.split('/').any(|segment| segment == "..") {
        return StatusCode::NOT_FOUND.into_response();
    }
    let path = Path::new(dir).join(relative);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(&path))], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
