use log::info;

use ribbit_joystick::{Control, ListenOutcome, Result};

use crate::context::JoystickContext;

/// Ticks the welcome screen stays up before capture begins.
pub const WELCOME_TICKS: u32 = 50;
/// Ticks the "already used" notice stays up.
pub const ALREADY_USED_TICKS: u32 = 60;
/// Ticks the per-control confirmation stays up.
pub const CONFIRM_TICKS: u32 = 30;
/// Flash period of the pointing-finger indicator.
pub const FINGER_FLASH_TICKS: u32 = 10;
/// Ticks spent observing the controller at rest for calibration.
pub const NEUTRAL_SCAN_TICKS: u32 = 180;

/// Where the remapping dialog currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    /// Intro screen, counting down before capture starts.
    Welcome,
    /// About to observe the controller at rest; resets the observation.
    NeutralZoneStart,
    /// Observing the controller at rest.
    GettingNeutralZone,
    /// The rest observation was too noisy; waiting for the player to
    /// retry or push on regardless.
    LivelyNeutralZone,
    /// Waiting for the player to press something for the current control.
    GettingButton,
    /// The press clashed with an earlier control; notice on screen.
    AlreadyUsed,
    /// Confirming the capture that just happened.
    ConfirmingGotButton,
    /// Every control captured; waiting for the player to save.
    Finished,
    /// The player backed out; nothing was saved.
    Aborted,
}

/// What the dialog should render this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardView {
    pub state: WizardState,
    pub prompt: String,
    pub finger_visible: bool,
    pub okay_enabled: bool,
    pub back_enabled: bool,
}

/// The interactive remapping dialog, advanced once per frame.
///
/// The wizard owns only presentation state (countdowns, prompts, the
/// flashing finger); all capture semantics live in the context's session.
/// While the wizard runs, the context is silenced so capture presses do
/// not double as gameplay input.
pub struct ConfigureWizard {
    state: WizardState,
    tick: u32,
    finger_tick: u32,
    finger_visible: bool,
    manual_calibration: bool,
    all_done: bool,
    prompt: String,
}

impl ConfigureWizard {
    /// Opens a capture session and silences gameplay input. Fails when no
    /// device is bound.
    pub fn start(ctx: &mut JoystickContext) -> Result<ConfigureWizard> {
        ctx.start_configurer()?;
        ctx.set_silent(true);
        let manual_calibration = !ctx.neutral_zones_known();
        info!(
            "remapping wizard started (calibration {})",
            if manual_calibration { "manual" } else { "skipped" }
        );
        Ok(ConfigureWizard {
            state: WizardState::Welcome,
            tick: WELCOME_TICKS,
            finger_tick: FINGER_FLASH_TICKS,
            finger_visible: true,
            manual_calibration,
            all_done: false,
            prompt: "Preparing to configure your controller...".to_string(),
        })
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// One frame of the dialog. Call every tick while the dialog is open.
    pub fn advance(&mut self, ctx: &mut JoystickContext) -> WizardView {
        match self.state {
            WizardState::Welcome => {
                self.tick -= 1;
                if self.tick == 0 {
                    if self.manual_calibration {
                        self.enter_neutral_zone_start();
                    } else {
                        ctx.use_default_neutral_zones();
                        self.enter_getting_button(ctx);
                    }
                }
            }
            WizardState::NeutralZoneStart => {
                ctx.clear_neutral_zones();
                self.state = WizardState::GettingNeutralZone;
                self.tick = NEUTRAL_SCAN_TICKS;
                self.prompt =
                    "Let go of the controls and hold the controller still...".to_string();
            }
            WizardState::GettingNeutralZone => {
                ctx.tick_neutral_zones();
                self.tick -= 1;
                if self.tick == 0 {
                    if ctx.neutral_zones_dangerous() {
                        self.state = WizardState::LivelyNeutralZone;
                        self.prompt = "Your controller moved too much. \
                            Press Okay to continue anyway, or Back to try again."
                            .to_string();
                    } else {
                        self.enter_getting_button(ctx);
                    }
                }
            }
            WizardState::LivelyNeutralZone | WizardState::Finished | WizardState::Aborted => {
                // Waiting on the player; nothing advances by itself.
            }
            WizardState::GettingButton => {
                self.flash_finger();
                match ctx.listen_for_signal() {
                    ListenOutcome::StillListening => {}
                    ListenOutcome::Duplicate => {
                        self.state = WizardState::AlreadyUsed;
                        self.tick = ALREADY_USED_TICKS;
                        self.prompt = "You have already used that.".to_string();
                    }
                    ListenOutcome::Advanced => self.enter_confirming(ctx, false),
                    ListenOutcome::AllDone => self.enter_confirming(ctx, true),
                }
            }
            WizardState::AlreadyUsed => {
                self.tick -= 1;
                if self.tick == 0 {
                    self.enter_getting_button(ctx);
                }
            }
            WizardState::ConfirmingGotButton => {
                self.tick -= 1;
                if self.tick == 0 {
                    if self.all_done {
                        self.state = WizardState::Finished;
                        self.prompt = "All done! Press Okay to save.".to_string();
                    } else {
                        self.enter_getting_button(ctx);
                    }
                }
            }
        }
        self.view(ctx)
    }

    /// Handles the Back control. Inside capture it reopens the previous
    /// control; at the first control it falls back to recalibration when
    /// there was one. From the finished screen there is no way back, only
    /// save or cancel.
    pub fn back(&mut self, ctx: &mut JoystickContext) {
        match self.state {
            WizardState::LivelyNeutralZone => self.enter_neutral_zone_start(),
            WizardState::GettingButton
            | WizardState::AlreadyUsed
            | WizardState::ConfirmingGotButton => {
                self.all_done = false;
                if ctx.back() {
                    self.enter_getting_button(ctx);
                } else if self.manual_calibration {
                    self.enter_neutral_zone_start();
                }
            }
            WizardState::Welcome
            | WizardState::NeutralZoneStart
            | WizardState::GettingNeutralZone
            | WizardState::Finished
            | WizardState::Aborted => {}
        }
    }

    /// Handles the Okay control on screens that wait for it.
    pub fn proceed(&mut self, ctx: &mut JoystickContext) {
        if self.state == WizardState::LivelyNeutralZone {
            self.enter_getting_button(ctx);
        }
    }

    /// Saves the captured configuration. Only valid from the finished
    /// screen; the session is closed and gameplay input resumes.
    pub fn confirm(&mut self, ctx: &mut JoystickContext) -> Result<()> {
        if self.state != WizardState::Finished {
            return Ok(());
        }
        ctx.apply_configuration()?;
        ctx.stop_configurer();
        ctx.set_silent(false);
        info!("remapping wizard finished");
        Ok(())
    }

    /// Abandons the wizard. The session is discarded, nothing is saved,
    /// and gameplay input resumes.
    pub fn cancel(&mut self, ctx: &mut JoystickContext) {
        ctx.stop_configurer();
        ctx.set_silent(false);
        self.state = WizardState::Aborted;
        self.prompt = String::new();
        info!("remapping wizard cancelled");
    }

    fn enter_neutral_zone_start(&mut self) {
        self.state = WizardState::NeutralZoneStart;
        self.prompt =
            "Let go of the controls and hold the controller still...".to_string();
    }

    fn enter_getting_button(&mut self, ctx: &JoystickContext) {
        self.state = WizardState::GettingButton;
        self.finger_tick = FINGER_FLASH_TICKS;
        self.finger_visible = true;
        let name = ctx
            .current_capture_control()
            .map_or("?", Control::name);
        self.prompt = format!("Please press [{name}]");
    }

    fn enter_confirming(&mut self, ctx: &JoystickContext, all_done: bool) {
        // The session already advanced, so the captured control is the one
        // before the current slot.
        let captured = match ctx.current_capture_control() {
            Some(control) => Control::from_index(control.index().wrapping_sub(1)),
            None => Control::ALL.last().copied(),
        };
        let name = captured.map_or("?", Control::name);
        self.state = WizardState::ConfirmingGotButton;
        self.tick = CONFIRM_TICKS;
        self.all_done = all_done;
        self.prompt = format!("Got action for [{name}]");
    }

    fn flash_finger(&mut self) {
        self.finger_tick -= 1;
        if self.finger_tick == 0 {
            self.finger_tick = FINGER_FLASH_TICKS;
            self.finger_visible = !self.finger_visible;
        }
    }

    fn view(&self, ctx: &JoystickContext) -> WizardView {
        let capturing = matches!(
            self.state,
            WizardState::GettingButton
                | WizardState::AlreadyUsed
                | WizardState::ConfirmingGotButton
        );
        WizardView {
            state: self.state,
            prompt: self.prompt.clone(),
            finger_visible: self.state == WizardState::GettingButton && self.finger_visible,
            okay_enabled: matches!(
                self.state,
                WizardState::LivelyNeutralZone | WizardState::Finished
            ),
            back_enabled: self.state == WizardState::LivelyNeutralZone
                || (capturing
                    && (self.manual_calibration
                        || ctx.current_capture_control() != Some(Control::Up))),
        }
    }
}
