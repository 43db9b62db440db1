pub mod config;
pub mod error;
pub mod models;

pub use config::{AppConfig, ExtractConfig, FetchConfig, ProfileConfig};
pub use error::{CoreError, Result};
pub use models::*;
