mod joystick;
mod store;

use thiserror::Error;

pub use joystick::{
    default_data0, default_data1, default_id, default_kind, validate_data0,
    validate_data1, validate_id, validate_kind, JoystickPrefs,
};
pub use store::PrefStore;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
