//! # REST API Interface Layer
//!
//! HTTP endpoints for loan servicing, mounted under `/api/v1/loans`:
//!
//! - `GET /` lists loans, oldest first
//! - `GET /:loan_id` reads one loan
//! - `POST /upload` creates a loan from a multipart application
//! - `PUT /:loan_id/repayments/:installment_number/pay` records a payment
//!
//! plus `GET /health` outside the API prefix. Every failure is answered with
//! the `ErrorResponse` envelope, `fail` for client errors and `error` for
//! server errors.

pub mod errors;
pub mod health_apis;
pub mod loan_apis;
pub mod mappers;
pub mod payment_apis;
pub mod upload;
