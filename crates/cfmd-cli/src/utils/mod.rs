//! Shared CLI helpers.

pub mod credentials;
pub mod logging;

pub use credentials::resolve_token;
pub use logging::initialize_logging;
