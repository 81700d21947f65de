pub mod env;
pub mod error;
pub mod settings;

pub use env::EnvManager;
pub use error::{ConfigError, Result};
pub use settings::FilterSettings;
