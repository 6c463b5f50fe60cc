//! Leads API Library
//!
//! CRUD backend for sales leads: validation of inbound payloads, a swappable
//! lead store (Postgres or in-memory) and the axum HTTP surface on top.
//!
//! # Modules
//!
//! - `api`: Router, middleware and OpenAPI document.
//! - `config`: Configuration management.
//! - `db`: Database connection, schema bootstrap and store selection.
//! - `db_storage`: Postgres lead repository.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `repository`: Repository trait and in-memory store.
//! - `services`: Lead orchestration.
//! - `validation`: Request/response shapes and their validation.

pub mod api;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;
