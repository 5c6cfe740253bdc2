pub mod error;
pub mod mode;
pub mod settings;

pub use error::ConfigError;
pub use mode::{ConnectionPolicy, OperationMode, Scope};
pub use settings::{ConnectTarget, Settings};
