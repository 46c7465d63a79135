//! # Loan Servicing Backend
//!
//! Customers apply for a loan by uploading a bank document; the backend stores
//! the document, computes an equal-split repayment schedule and persists the
//! loan. Installments are then paid one at a time.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (axum REST handlers, multipart parsing, mappers)
//!     ↓
//! Domain Layer (schedule generation, loan and payment services)
//!     ↓
//! Storage Layer (SQLite loan repository, on-disk bank files)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{LoanService, PaymentConsistency, PaymentService};
use crate::io::rest::{health_apis, loan_apis, payment_apis};
use crate::storage::{BankFileStorage, DbConnection, DiskBankFileStore, LoanRepository, LoanStorage};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub loan_service: LoanService,
    pub payment_service: PaymentService,
}

impl AppState {
    /// Wire the services over a database connection and a bank file store
    pub fn new(
        db: DbConnection,
        bank_file_store: DiskBankFileStore,
        payment_consistency: PaymentConsistency,
    ) -> Self {
        let loan_storage: Arc<dyn LoanStorage> = Arc::new(LoanRepository::new(db));
        let bank_file_storage: Arc<dyn BankFileStorage> = Arc::new(bank_file_store);

        Self {
            loan_service: LoanService::new(loan_storage.clone(), bank_file_storage),
            payment_service: PaymentService::new(loan_storage, payment_consistency),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    info!("Setting up bank file store in {}", config.bank_files_dir);
    let bank_file_store = DiskBankFileStore::new(&config.bank_files_dir)?;

    info!(
        "Setting up application state (payment consistency: {})",
        config.payment_consistency
    );
    Ok(AppState::new(db, bank_file_store, config.payment_consistency))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Result<Router> {
    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any);

    let loan_routes = loan_apis::router().merge(payment_apis::router());

    Ok(Router::new()
        .nest("/api/v1/loans", loan_routes)
        .nest("/health", health_apis::router())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
