//! Domain models, authentication, repository layer, statistics aggregation,
//! routing configuration, and error handling for the tasknest application.
//! The main binary wires these into the HTTP server.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod routes;
pub mod stats;
