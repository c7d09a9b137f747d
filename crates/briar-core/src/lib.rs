pub mod error;
pub mod policy;
pub mod types;

pub use error::{BriarError, BriarResult};
pub use policy::ScoringPolicy;
pub use types::*;
