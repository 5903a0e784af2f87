// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # aqwatch
//!
//! A terminal dashboard for a single air-quality sensor polled over HTTP.
//!
//! A background task fetches the sensor's JSON status document at a fixed
//! interval, classifies every outcome (success, DNS failure, timeout,
//! connection error, bad response), and hands it to the foreground render
//! loop, which shows the latest readings next to a rolling event log.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Application                           │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐ │
//! │  │  poll   │───▶│   app    │───▶│   ui    │───▶│ Terminal │ │
//! │  │ (fetch) │    │ (state)  │    │(render) │    │          │ │
//! │  └────┬────┘    └────┬─────┘    └─────────┘    └──────────┘ │
//! │       │              │                                       │
//! │       ▼              ▼                                       │
//! │  ┌─────────┐    ┌──────────┐                                 │
//! │  │ Resolve │    │ extract  │  Profile → Snapshot             │
//! │  │ Fetch   │    │ (flatten)│                                 │
//! │  └─────────┘    └──────────┘                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`poll`]**: the fetch loop — DNS resolution, one timeout-bounded
//!   HTTP GET per iteration, error classification, and a [`ResultSink`]
//!   invoked exactly once per attempt. Resolver and transport are trait
//!   seams for testing.
//! - **[`extract`]**: pure flattening of one raw JSON document into an
//!   ordered [`Snapshot`] of labelled readings, per configured [`Profile`]
//! - **[`app`]**: dashboard state — the latest snapshot and the rolling
//!   event log, mutated only via [`App::on_poll_result`]
//! - **[`ui`]**: terminal rendering using ratatui
//! - **[`config`]**: settings layered from defaults, TOML file, and
//!   environment
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use aqwatch::{Poller, PollOutcome, ResultSink};
//! use reqwest::Url;
//!
//! struct Printer;
//!
//! impl ResultSink for Printer {
//!     fn on_result(&self, outcome: PollOutcome) {
//!         println!("{:?}", outcome);
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let url = Url::parse("http://purpleair-1a9c/json").unwrap();
//! let poller = Poller::new(url, Duration::from_secs(5), Duration::from_secs(5));
//! poller.run(Printer).await; // never returns
//! # });
//! ```

pub mod app;
pub mod config;
pub mod events;
pub mod extract;
pub mod poll;
pub mod ui;

// Re-export main types for convenience
pub use app::{failure_snapshot, App, LinkState, LogLine};
pub use config::Settings;
pub use extract::{extract, Field, Profile, Scalar, Snapshot};
pub use poll::{
    DnsResolver, Fetch, FetchError, HttpFetcher, PollError, PollOutcome, Poller, Resolve,
    ResultSink,
};
