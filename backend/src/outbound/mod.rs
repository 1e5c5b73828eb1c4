//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **identity**: Identity Toolkit REST client for logins
//! - **memory**: process-local stand-ins used without a database
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod identity;
pub mod memory;
pub mod persistence;
