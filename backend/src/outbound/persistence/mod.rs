//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the directory and survey response ports,
//! backed by PostgreSQL via `diesel-async` and a `bb8` pool.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain records. Binding rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Atomic batches**: `DirectoryBatch` commits run in one transaction with
//!   compare-and-set link updates.
//!
//! # Example
//!
//! ```ignore
//! use orbsurvey::outbound::persistence::{DbPool, DieselDirectoryRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/orbsurvey")).await?;
//! let directory = DieselDirectoryRepository::new(pool);
//! ```

mod diesel_directory_repository;
mod diesel_survey_response_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_directory_repository::DieselDirectoryRepository;
pub use diesel_survey_response_repository::DieselSurveyResponseRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
