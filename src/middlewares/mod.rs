pub mod cors;
pub mod logging;

pub use cors::create_cors;
pub use logging::RequestLogger;
