pub mod config;
pub mod display;
pub mod error;
pub mod layout;
pub mod result;
pub mod state;

pub use config::{OBJECT_COUNT, ObjectParams, TrialConfig, ValidatedTrial};
pub use display::Display;
pub use error::{ConfigError, TrialError};
pub use result::TrialResult;
pub use state::{TrialController, TrialEvent};
