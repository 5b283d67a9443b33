//! # Cattle marketplace server
//!
//! This crate hosts the HTTP front end of the cattle marketplace. It is responsible for:
//! * Registering accounts, logging users in and issuing bearer tokens.
//! * Authenticating requests under `/api` and enforcing role-based access on the admin routes.
//! * Translating requests into calls on the marketplace engine ([`cattle_engine`]) and the engine's results and errors
//!   into JSON responses.
//! * Storing uploaded photos and documents.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/auth/register` and `/auth/token`: Account registration and login.
//! * `/api/...`: The marketplace itself. See [routes](routes/index.html).
pub mod auth;
pub mod blob_store;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
