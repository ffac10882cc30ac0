//! Core data models for playlist watch-time analysis.

mod aggregate;
mod ids;
mod playlist;
mod speed;

pub use aggregate::*;
pub use ids::*;
pub use playlist::*;
pub use speed::*;
