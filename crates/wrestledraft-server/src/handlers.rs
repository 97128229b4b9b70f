use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};
use wrestledraft_scoring::{
    Analysis, Diagnostics, Mismatch, RoundGrid, RunStatus, RunSummary, ScoringReport, run,
};
use wrestledraft_types::{
    Bracket, MatchRule, PlacementRecord, Roster, RosterEntry, Seed, TeamStanding, WeightClass,
    WinMethod, WrestlerResult,
};

use crate::report;
use crate::state::AppState;

/// One drafted wrestler in a `POST /v1/score` body.
#[derive(Debug, Deserialize)]
pub struct RosterRow {
    pub weight: String,
    pub name: String,
    pub school: String,
    #[serde(default)]
    pub seed: String,
    pub team: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub roster: Vec<RosterRow>,
    pub results: String,
}

/// A wrestler's result plus the bouts behind it.
#[derive(Serialize)]
pub struct WrestlerView<'a> {
    #[serde(flatten)]
    result: &'a WrestlerResult,
    bouts: Vec<BoutView<'a>>,
}

#[derive(Serialize)]
pub struct BoutView<'a> {
    round: &'static str,
    bracket: Bracket,
    method: WinMethod,
    method_text: &'a str,
    opponent: String,
    advancement: f64,
    bonus: f64,
    points: f64,
    placement_match: bool,
    rule: MatchRule,
}

#[derive(Serialize)]
struct DiagnosticsResponse<'a> {
    status: &'a RunStatus,
    summary: &'a RunSummary,
    diagnostics: &'a Diagnostics,
}

#[derive(Serialize)]
struct UpdateResponse<'a> {
    status: &'a RunStatus,
    summary: &'a RunSummary,
}

#[derive(Serialize)]
struct ScoreResponse<'a> {
    status: &'a RunStatus,
    standings: &'a [TeamStanding],
    wrestlers: Vec<WrestlerView<'a>>,
    placements: &'a [PlacementRecord],
    mismatches: &'a [Mismatch],
    analysis: &'a Analysis,
    summary: &'a RunSummary,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/standings", get(standings))
        .route("/v1/wrestlers", get(wrestlers))
        .route("/v1/wrestlers/{key}", get(wrestler))
        .route("/v1/rounds", get(rounds))
        .route("/v1/placements", get(placements))
        .route("/v1/mismatches", get(mismatches))
        .route("/v1/analysis", get(analysis))
        .route("/v1/diagnostics", get(diagnostics))
        .route("/v1/report", get(text_report))
        .route("/v1/update", post(update))
        .route("/v1/score", post(score))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn standings(State(state): State<AppState>) -> Json<Vec<TeamStanding>> {
    Json(state.snapshot().standings.clone())
}

async fn wrestlers(State(state): State<AppState>) -> Response {
    let report = state.snapshot();
    let views: Vec<WrestlerView<'_>> = report
        .wrestlers
        .iter()
        .map(|result| wrestler_view(&report, result))
        .collect();
    Json(views).into_response()
}

async fn wrestler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let report = state.snapshot();
    let result = report
        .wrestler(&key)
        .ok_or_else(|| ApiError::NotFound(format!("no result for {key}")))?;
    Ok(Json(wrestler_view(&report, result)).into_response())
}

async fn rounds(State(state): State<AppState>) -> Json<RoundGrid> {
    Json(state.snapshot().rounds.clone())
}

async fn placements(State(state): State<AppState>) -> Json<Vec<PlacementRecord>> {
    Json(state.snapshot().placements.clone())
}

async fn mismatches(State(state): State<AppState>) -> Json<Vec<Mismatch>> {
    Json(state.snapshot().mismatches.clone())
}

async fn analysis(State(state): State<AppState>) -> Json<Analysis> {
    Json(state.snapshot().analysis.clone())
}

async fn diagnostics(State(state): State<AppState>) -> Response {
    let report = state.snapshot();
    Json(DiagnosticsResponse {
        status: &report.status,
        summary: &report.summary,
        diagnostics: &report.diagnostics,
    })
    .into_response()
}

async fn text_report(State(state): State<AppState>) -> Response {
    let report = state.snapshot();
    let mut body = report::standings_table(&report.standings);
    body.push('\n');
    body.push_str(&report::detailed(&report));
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )],
        body,
    )
        .into_response()
}

async fn update(State(state): State<AppState>) -> Result<Response, ApiError> {
    let sources = Arc::clone(&state.sources);
    let config = Arc::clone(&state.config);
    let report = tokio::task::spawn_blocking(move || sources.score(&config))
        .await
        .map_err(|err| {
            error!("update task failed: {err}");
            ApiError::Internal
        })?;
    let report = state.replace(report);
    info!(
        "update complete: {} matches processed, {} missed",
        report.summary.matches_processed, report.summary.matches_missed
    );
    Ok(Json(UpdateResponse {
        status: &report.status,
        summary: &report.summary,
    })
    .into_response())
}

async fn score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Response, ApiError> {
    let roster = parse_roster_rows(request.roster)?;
    let config = Arc::clone(&state.config);
    let results = request.results;
    let report = tokio::task::spawn_blocking(move || run(&roster, &results, &config))
        .await
        .map_err(|err| {
            error!("score task failed: {err}");
            ApiError::Internal
        })?;
    Ok(Json(ScoreResponse {
        status: &report.status,
        standings: &report.standings,
        wrestlers: report
            .wrestlers
            .iter()
            .map(|result| wrestler_view(&report, result))
            .collect(),
        placements: &report.placements,
        mismatches: &report.mismatches,
        analysis: &report.analysis,
        summary: &report.summary,
    })
    .into_response())
}

fn parse_roster_rows(rows: Vec<RosterRow>) -> Result<Roster, ApiError> {
    let mut entries = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let weight = WeightClass::from_token(&row.weight).ok_or_else(|| {
            ApiError::bad_request(format!(
                "roster row {idx}: unknown weight class {:?}",
                row.weight
            ))
        })?;
        let name = row.name.trim();
        if name.is_empty() {
            return Err(ApiError::bad_request(format!(
                "roster row {idx}: wrestler name is empty"
            )));
        }
        entries.push(RosterEntry {
            team: row.team.trim().to_string(),
            weight,
            name: name.to_string(),
            school: row.school.trim().to_string(),
            seed: Seed::parse(&row.seed),
        });
    }
    Ok(Roster::new(entries))
}

fn wrestler_view<'a>(report: &'a ScoringReport, result: &'a WrestlerResult) -> WrestlerView<'a> {
    let bouts = result
        .matches
        .iter()
        .filter_map(|credited| {
            let event = report.event(credited.event)?;
            Some(BoutView {
                round: event.round.label,
                bracket: event.round.bracket,
                method: event.method,
                method_text: &event.method_text,
                opponent: format!("{} ({})", event.loser.name, event.loser.school),
                advancement: event.advancement(),
                bonus: event.bonus,
                points: event.total_points(),
                placement_match: event.is_placement_match(),
                rule: credited.rule,
            })
        })
        .collect();
    WrestlerView { result, bouts }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::NotFound(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(weight: &str, name: &str) -> RosterRow {
        RosterRow {
            weight: weight.into(),
            name: name.into(),
            school: " Iowa ".into(),
            seed: "#3".into(),
            team: "Big Cat".into(),
        }
    }

    #[test]
    fn roster_rows_become_entries() {
        let roster = parse_roster_rows(vec![row("285", " Ben Kueter ")]).unwrap();
        let entry = &roster.entries()[0];
        assert_eq!(entry.weight, WeightClass::W285);
        assert_eq!(entry.display_key(), "Ben Kueter (Iowa)");
        assert_eq!(entry.seed_rank(), Some(3));
    }

    #[test]
    fn roster_rows_reject_unknown_weights_and_blank_names() {
        let err = parse_roster_rows(vec![row("150", "X")]).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("150")));
        let err = parse_roster_rows(vec![row("125", "  ")]).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
