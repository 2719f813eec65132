//! Tauri commands - frontend to backend bridge

mod calendar;
mod feature_flags;
mod health;
mod projects;
mod suggestions;
mod tracking;

pub use calendar::*;
pub use feature_flags::*;
pub use health::*;
pub use projects::*;
pub use suggestions::*;
pub use tracking::*;
