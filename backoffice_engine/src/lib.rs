//! Merchant Back Office Engine
//!
//! This library contains the storage layer for the merchant back office. It is split into two main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the bundled backend. You should never need to access
//!    the database directly; use the public API wrappers instead. The exception is the data types used in the
//!    database, which are defined in the `db_types` module and are public.
//! 2. The public-facing API wrappers ([`AuthApi`], [`CatalogApi`], [`CartApi`], [`OrderApi`], [`UserApi`]). These are
//!    generic over the storage backend; any type implementing the traits in [`traits`] can act as a backend for the
//!    back-office server, which is how the server's endpoint tests substitute mocks for the real store.

mod api;
mod db;

pub mod db_types;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase};

pub use api::{AuthApi, AuthApiError, BackOfficeApiError, CartApi, CatalogApi, OrderApi, UserApi};
