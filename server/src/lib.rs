//! Events catalog API: CRUD over PostgreSQL-backed events plus a
//! "similar events" query.

pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;
pub mod similarity;
pub mod store;
pub mod utils;
