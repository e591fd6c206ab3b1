pub mod config;
pub mod constants;
pub mod error;
pub mod node;
pub mod shutdown;
pub mod telemetry;
pub mod types;

pub use constants::*;
pub use error::{CoreError, Result};
