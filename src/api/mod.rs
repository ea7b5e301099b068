//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints for managing payroll periods,
//! triggering runs and reading payslips and summaries. Every route expects
//! the caller's id in the `x-user-id` header.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ActingUser, PeriodPath, USER_ID_HEADER};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
