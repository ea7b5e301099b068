//! Payroll Processing Engine
//!
//! This crate runs monthly payroll: it manages payroll periods, computes a
//! prorated payslip for every employee from their attendance, overtime and
//! reimbursement records, and commits each run atomically so that a period
//! is processed exactly once.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
