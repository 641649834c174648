//! ESP32 active probe-scan library
//!
//! This library drives an active Wi-Fi reconnaissance sweep: it injects
//! wildcard 802.11 probe requests while hopping through the 2.4 GHz channel
//! plan, sniffs probe requests and responses from nearby devices, and keeps a
//! deduplicated table of the stations it heard until the sweep is complete.
//!
//! ## Features
//!
//! - Bounds-checked 802.11 management frame parsing
//! - Fixed-capacity, allocation-free station table
//! - Probe/dwell timer state machine with a single-consumer event loop
//! - Embassy executor integration and an esp-radio sniffer adapter (`esp32`)
//!
//! The scan core is plain `no_std` logic behind the [`radio::Radio`] and
//! [`radio::TimerControl`] traits, so it runs on the host in tests. Everything
//! that touches the ESP32 lives behind the `esp32` feature.
//!
//! ## Example
//!
//! ```no_run
//! use probe_scan::{config::ScanConfig, runner, session::ScanSession, timer::DeadlineTimers};
//! # use probe_scan::{config::RadioConfig, error::RadioError, radio::Radio};
//! # struct MyRadio;
//! # impl Radio for MyRadio {
//! #     fn configure(&mut self, _: &RadioConfig) -> Result<(), RadioError> { Ok(()) }
//! #     fn set_promiscuous(&mut self, _: bool) -> Result<(), RadioError> { Ok(()) }
//! #     fn set_channel(&mut self, _: u8) -> Result<(), RadioError> { Ok(()) }
//! #     fn transmit(&mut self, _: &[u8]) -> Result<(), RadioError> { Ok(()) }
//! # }
//! # async fn demo(events: &'static runner::EventQueue) {
//! let mut session: ScanSession<_, _> =
//!     ScanSession::new(MyRadio, DeadlineTimers::new(), ScanConfig::default());
//!
//! if runner::run_scan(&mut session, events).await.is_ok() {
//!     for station in session.station_snapshot() {
//!         // hand the discovered stations to association
//!         let _ = station.address;
//!     }
//! }
//! # }
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

/// Scan timing, channel plan and radio settings
pub mod config;

/// Error types for radio commands and scan sessions
pub mod error;

/// 802.11 management frame parsing
pub mod frame;

/// Wildcard probe-request construction
pub mod probe;

/// Radio surface consumed by the scan coordinator
pub mod radio;

/// Single-consumer async event loop
pub mod runner;

/// Probe/dwell scan state machine
pub mod session;

/// Deduplicating station table
pub mod station;

/// Deadline-based one-shot timers
pub mod timer;

/// Memory allocation configuration
#[cfg(feature = "esp32")]
pub mod allocator;

/// esp-radio bring-up and the probe scan task
#[cfg(feature = "esp32")]
pub mod scanner;

/// Global static storage for WiFi components
#[cfg(feature = "esp32")]
pub mod types;
