pub mod config;
pub mod logging;
pub mod error;
pub mod middleware;
pub mod validation;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use middleware::*;
pub use validation::*;
