//! Version-independent machinery shared by every model type

pub(crate) mod choice;
pub mod config;
pub mod error;
pub(crate) mod hash;
pub mod validation;
pub mod visitor;

pub use config::ModelConfig;
pub use error::{Error, Result};
pub use visitor::{PathTracker, Primitive, Validate, Visitable, Visitor};
