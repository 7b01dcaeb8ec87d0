//! Spellforge Core - Shared primitives for the spell simulation
//!
//! This crate provides the foundational types used by the simulation crates:
//! - Mathematical primitives (re-exported from glam)
//! - Entity identity and transforms
//! - Frame time with delta clamping and time scale
//! - Observer lists for outbound notifications

pub mod observer;
pub mod time;
pub mod types;

pub use glam::{Quat, Vec3};
pub use observer::{ListenerId, Observers};
pub use time::{GameTime, TimeConfig};
pub use types::{EntityId, Transform};
