//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer, plus the HTTP surfaces.

/// Twitch Helix REST client adapter.
pub mod helix;

/// REST API and static file serving.
pub mod http;

/// Configuration loading.
pub mod config;

/// Health check HTTP endpoint.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
