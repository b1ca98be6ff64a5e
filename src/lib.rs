// Concurrent container stats collection; library for the binary and tests.

pub mod collector;
pub mod config;
pub mod docker_repo;
pub mod error;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod version;
