mod context;
mod wizard;

pub use context::JoystickContext;
pub use wizard::{
    ConfigureWizard, WizardState, WizardView, ALREADY_USED_TICKS, CONFIRM_TICKS,
    FINGER_FLASH_TICKS, NEUTRAL_SCAN_TICKS, WELCOME_TICKS,
};
