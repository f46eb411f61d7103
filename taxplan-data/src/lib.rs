//! Batch inputs for the planning engine: client profiles from CSV and
//! recommendation responses captured to disk.

pub mod loader;
pub mod source;

pub use loader::{ClientProfileLoader, ClientProfileRecord, ProfileLoaderError};
pub use source::FileRecommendationSource;
