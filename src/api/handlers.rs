//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{PayrollSummary, PayslipView, PeriodView};

use super::request::{ActingUser, PeriodPath, parse_upsert_body};
use super::response::ApiErrorResponse;
use super::state::AppState;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payrolls/:year/:month", post(upsert_period_handler))
        .route("/payrolls/:year/:month/run", post(trigger_run_handler))
        .route("/payrolls/:year/:month/summary", get(summary_handler))
        .route("/payslips/:year/:month", get(payslip_handler))
        .with_state(state)
}

fn log_failure(correlation_id: Uuid, operation: &str, err: EngineError) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        operation,
        error = %err,
        "Request failed"
    );
    err.into()
}

/// Handler for `POST /payrolls/:year/:month`.
///
/// Creates or edits the period. The JSON body is optional.
async fn upsert_period_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    PeriodPath { year, month }: PeriodPath,
    body: Bytes,
) -> ApiResult<Json<PeriodView>> {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        year,
        month,
        actor = %actor,
        "Processing period upsert"
    );

    let request = parse_upsert_body(&body)?;
    let view = state
        .service()
        .upsert_period(year, month, &request, &actor)
        .await
        .map_err(|err| log_failure(correlation_id, "upsert_period", err))?;

    Ok(Json(view))
}

/// Handler for `POST /payrolls/:year/:month/run`.
///
/// Reserves the run and returns the `pending` period without waiting for it.
async fn trigger_run_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    PeriodPath { year, month }: PeriodPath,
) -> ApiResult<(StatusCode, Json<PeriodView>)> {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        year,
        month,
        actor = %actor,
        "Processing run trigger"
    );

    let view = state
        .service()
        .trigger_run(year, month, &actor)
        .await
        .map_err(|err| log_failure(correlation_id, "trigger_run", err))?;

    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// Handler for `GET /payrolls/:year/:month/summary`.
async fn summary_handler(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    PeriodPath { year, month }: PeriodPath,
) -> ApiResult<Json<PayrollSummary>> {
    let correlation_id = Uuid::new_v4();
    let start_time = Instant::now();

    let summary = state
        .service()
        .get_payroll_summary(year, month)
        .await
        .map_err(|err| log_failure(correlation_id, "get_payroll_summary", err))?;

    info!(
        correlation_id = %correlation_id,
        actor = %actor,
        employee_count = summary.employee_count,
        total_pay = %summary.total_pay,
        duration_us = start_time.elapsed().as_micros() as u64,
        "Summary served"
    );
    Ok(Json(summary))
}

/// Handler for `GET /payslips/:year/:month`.
///
/// Returns the caller's own payslip.
async fn payslip_handler(
    State(state): State<AppState>,
    ActingUser(employee_id): ActingUser,
    PeriodPath { year, month }: PeriodPath,
) -> ApiResult<Json<PayslipView>> {
    let correlation_id = Uuid::new_v4();

    let payslip = state
        .service()
        .get_payslip(&employee_id, year, month)
        .await
        .map_err(|err| log_failure(correlation_id, "get_payslip", err))?;

    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        year,
        month,
        "Payslip served"
    );
    Ok(Json(payslip))
}
