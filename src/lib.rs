pub mod config;
pub mod render;

// Layered boundaries: use cases and ports, then their adapters
pub mod app;
pub mod infra;

// Domain data shapes shared across layers
pub mod domain;

pub mod catalog;
pub mod common;
pub mod observability;
