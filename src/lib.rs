//! Foglio: a blogging platform API server.
//!
//! Layers mirror the deployment shape: `domain` holds the content-block and
//! aggregate model, `application` the services and repository traits,
//! `infra` the Postgres and HTTP adapters, `config` the typed settings.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
