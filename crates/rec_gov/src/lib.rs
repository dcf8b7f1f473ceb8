//! # RecGov
//!
//! This crate provides clients for the campground reservation APIs polled by CampQuest:
//! the recreation.gov monthly availability grid and the ReserveCalifornia search grid.

/// Shared error and payload types returned by the upstream clients.
mod types;
pub use types::*;

/// Client for the recreation.gov internal camps API.
mod recreation_client;
pub use recreation_client::*;

/// Client for the ReserveCalifornia (UseDirect) API.
mod reserve_california_client;
pub use reserve_california_client::*;
