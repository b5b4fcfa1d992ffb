//! # Heliotrope - Solar Plant Telemetry Driver
//!
//! A Rust driver for ShineMonitor-compatible solar monitoring portals,
//! polling inverter telemetry on a fixed schedule and republishing the
//! latest values to in-process consumers.
//!
//! ## Features
//!
//! - **Signed requests**: per-request SHA-1 signatures over a fresh salt
//! - **Session management**: transparent re-authentication on token expiry,
//!   with exactly one retry per refresh cycle
//! - **Atomic snapshots**: consumers always see a complete, single-cycle
//!   set of values; failed cycles keep the last known good snapshot
//! - **Async-first**: Tokio runtime, serialized refresh cycles
//! - **Configuration**: YAML-based configuration with validation
//!
//! ## Architecture
//!
//! The application follows a modular architecture with clear separation of
//! concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `signing`: Request signature computation
//! - `api`: Portal HTTP client and response classification
//! - `session`: Portal session store and staleness policy
//! - `persistence`: Session cache across restarts
//! - `monitor`: Refresh engine, schedule, and snapshot publication

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod persistence;
pub mod session;
pub mod signing;

// Re-export commonly used types
pub use config::Config;
pub use error::{HeliotropeError, Result};
pub use monitor::{MonitorStatus, PlantMonitor, PlantSnapshot};
