pub mod aggregate;
pub mod features;
pub mod form;
pub mod keystroke;
pub mod mouse;
pub mod session;

pub use aggregate::evaluate;
pub use features::extract_features;
