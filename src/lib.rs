//! # Watchtime
//!
//! Total watch time of a YouTube playlist, with speed-adjusted projections.
//!
//! ## Architecture
//!
//! - **extract**: Playlist identifier extraction from user input
//! - **duration**: ISO 8601 duration decoding and `h m s` formatting
//! - **fetch**: YouTube Data API client behind the `MetadataSource` trait
//! - **calculate**: Aggregation of item durations and speed projections
//! - **pipeline**: End-to-end analysis and the current-result session slot
//! - **api**: REST API endpoints
//! - **render**: Terminal output
//! - **config**: Configuration loading and validation
//! - **models**: Core data structures (ids, playlist pages, speeds, totals)

pub mod api;
pub mod calculate;
pub mod config;
pub mod duration;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod render;

pub use models::*;
