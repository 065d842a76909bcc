pub mod file_format;
pub mod log_setup;
pub mod serde;

pub use file_format::{FileExtensionError, SerdeFormat};
pub use log_setup::{setup_logging, LogConfig, LogSetupError};
pub use crate::serde::{deserialize, serialize, SerdeError};
