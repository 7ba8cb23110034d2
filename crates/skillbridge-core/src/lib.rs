//! skillbridge-core: lesson progression, assessment grading and learner state.
//!
//! This crate defines the data model, the backend trait, and the pure rules
//! for unlocking, graduation, grading and progress aggregation that the SkillBridge
//! client and CLI build on.

pub mod assessment;
pub mod catalog;
pub mod community;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod grading;
pub mod mentorship;
pub mod model;
pub mod profile;
pub mod progress;
pub mod progression;
pub mod traits;

pub use error::LearningError;
