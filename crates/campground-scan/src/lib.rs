//! # Campground Scan
//!
//! This crate turns raw campground availability into bookable stays.
//! It normalizes upstream payloads, finds runs of consecutive open nights,
//! aggregates them per park, renders reports and polls until parks open up.

/// Types for campground scan operations
mod scan_types;
pub use scan_types::*;

/// Date parsing, formatting and window arithmetic
mod calendar;
pub use calendar::*;

/// Upstream payloads reduced to available nights per site
mod normalizer;
pub use normalizer::*;

/// Consecutive-night range search
mod compactor;
pub use compactor::*;

/// Per-park availability counts
mod aggregator;
pub use aggregator::*;

/// Human and JSON reports
mod output;
pub use output::*;

/// Exclusion list parsing
mod exclusions;
pub use exclusions::*;

/// Upstream providers behind one trait
mod sources;
pub use sources::*;

/// Park checks
mod executor;
pub use executor::*;

/// Retry-until-found loop
mod poller;
pub use poller::*;
