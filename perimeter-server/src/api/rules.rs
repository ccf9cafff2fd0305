//! Rule management endpoints.
//!
//! Path segments name the scope; request bodies carry provider rule payloads.
//! Malformed bodies answer 400, a missing rule on single-rule lookups answers
//! 404, everything else a backend reports answers 500.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::debug;

use perimeter_backend::FirewallRule;
use perimeter_rules::{Scope, ScopedRule, ScopedRuleSet};

use crate::error::ApiError;
use crate::state::AppState;

fn scope_from(project: String, service_project: String, application: String) -> Scope {
    Scope {
        project,
        service_project,
        application,
    }
}

fn decoded<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    Path((project, service_project, application)): Path<(String, String, String)>,
) -> Result<Json<ScopedRuleSet>, ApiError> {
    let scope = scope_from(project, service_project, application);
    let set = state.rules.list(&scope).await.map_err(ApiError::internal)?;
    Ok(Json(set))
}

pub async fn create_rules(
    State(state): State<Arc<AppState>>,
    Path((project, service_project, application)): Path<(String, String, String)>,
    payload: Result<Json<Vec<ScopedRule>>, JsonRejection>,
) -> Result<(StatusCode, Json<ScopedRuleSet>), ApiError> {
    let rules = decoded(payload)?;
    let scope = scope_from(project, service_project, application);
    debug!(project = %scope.project, count = rules.len(), "batch create requested");
    let set = state
        .rules
        .create_batch(&scope, rules)
        .await
        .map_err(ApiError::internal)?;
    Ok((StatusCode::CREATED, Json(set)))
}

pub async fn delete_rules(
    State(state): State<Arc<AppState>>,
    Path((project, service_project, application)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiError> {
    let scope = scope_from(project, service_project, application);
    state
        .rules
        .delete_batch(&scope)
        .await
        .map_err(ApiError::internal)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_rule(
    State(state): State<Arc<AppState>>,
    Path((project, service_project, application, rule)): Path<(String, String, String, String)>,
) -> Result<Json<ScopedRuleSet>, ApiError> {
    let scope = scope_from(project, service_project, application);
    let set = state
        .rules
        .get_rule(&scope, &rule)
        .await
        .map_err(ApiError::for_single_rule)?;
    Ok(Json(set))
}

pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    Path((project, service_project, application, rule)): Path<(String, String, String, String)>,
    payload: Result<Json<FirewallRule>, JsonRejection>,
) -> Result<(StatusCode, Json<ScopedRuleSet>), ApiError> {
    let definition = decoded(payload)?;
    let scope = scope_from(project, service_project, application);
    let set = state
        .rules
        .create_rule(&scope, &rule, definition)
        .await
        .map_err(ApiError::internal)?;
    Ok((StatusCode::CREATED, Json(set)))
}

pub async fn update_rule(
    State(state): State<Arc<AppState>>,
    Path((project, service_project, application, rule)): Path<(String, String, String, String)>,
    payload: Result<Json<FirewallRule>, JsonRejection>,
) -> Result<Json<ScopedRuleSet>, ApiError> {
    let definition = decoded(payload)?;
    let scope = scope_from(project, service_project, application);
    let set = state
        .rules
        .update_rule(&scope, &rule, definition)
        .await
        .map_err(ApiError::for_single_rule)?;
    Ok(Json(set))
}

pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    Path((project, service_project, application, rule)): Path<(String, String, String, String)>,
) -> Result<StatusCode, ApiError> {
    let scope = scope_from(project, service_project, application);
    state
        .rules
        .delete_rule(&scope, &rule)
        .await
        .map_err(ApiError::for_single_rule)?;
    Ok(StatusCode::NO_CONTENT)
}
