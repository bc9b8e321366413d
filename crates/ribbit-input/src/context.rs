use std::rc::Rc;

use log::{info, warn};

use ribbit_joystick::{
    Configurer, Control, DeviceBus, DeviceId, DeviceRegistry, Error, ListenOutcome,
    PlatformEvent, PlayerController, Result,
};
use ribbit_prefs::{JoystickPrefs, PrefStore};

/// Ties the device registry, the player's binding table, the persisted
/// settings and an optional capture session together behind one facade.
///
/// This is the surface the rest of the engine talks to: game code asks
/// the control predicates, menu code drives device selection and the
/// remapping wizard, and the event loop feeds attach/detach notifications
/// through [`JoystickContext::handle_platform_event`].
pub struct JoystickContext {
    registry: DeviceRegistry,
    player: PlayerController,
    session: Option<Configurer>,
    prefs: JoystickPrefs,
    silent: bool,
}

impl JoystickContext {
    /// Builds the context and binds the player to their preferred device:
    /// the saved model GUID when a matching device is attached, otherwise
    /// the first attached device, otherwise nothing.
    pub fn new(bus: Rc<dyn DeviceBus>, prefs: JoystickPrefs) -> JoystickContext {
        let mut registry = DeviceRegistry::new(bus);
        registry.reconcile();

        let mut player = PlayerController::new();
        let device = registry
            .find_by_guid(&prefs.chosen_joystick_guid)
            .or_else(|| registry.get(0));
        player.change_device(device, prefs.saved_bindings().as_ref());

        JoystickContext {
            registry,
            player,
            session: None,
            prefs,
            silent: false,
        }
    }

    pub fn prefs(&self) -> &JoystickPrefs {
        &self.prefs
    }

    /// Persists the current settings into a preference store.
    pub fn write_prefs(&self, store: &mut PrefStore) {
        self.prefs.write(store);
    }

    /// Suppresses the control predicates without unbinding anything. The
    /// wizard silences input so capture presses do not leak into gameplay.
    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    fn listening(&self) -> bool {
        !self.silent && self.prefs.use_joystick
    }

    pub fn up(&self) -> bool {
        self.listening() && self.player.up()
    }

    pub fn down(&self) -> bool {
        self.listening() && self.player.down()
    }

    pub fn left(&self) -> bool {
        self.listening() && self.player.left()
    }

    pub fn right(&self) -> bool {
        self.listening() && self.player.right()
    }

    pub fn button(&self, n: usize) -> bool {
        self.listening() && self.player.button(n)
    }

    /// Re-walks the platform device list. Run before showing a device
    /// menu. Clears the player's binding if their device went away.
    pub fn reconcile_devices(&mut self) -> bool {
        let changed = self.registry.reconcile();
        if let Some(id) = self.player.device_id() {
            if self.registry.find(id).is_none() {
                warn!("active device {id} vanished during reconciliation");
                self.abort_session_for_detach();
                self.player.clear();
            }
        }
        changed
    }

    pub fn device_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.registry.ids()
    }

    pub fn current_device_id(&self) -> Option<DeviceId> {
        self.player.device_id()
    }

    /// Applies a device-menu choice. `None` means the player picked "no
    /// joystick": the binding is dropped and joystick input is disabled
    /// until a device is selected again. Positions index the most recent
    /// reconciliation.
    pub fn select_device(&mut self, position: Option<usize>) -> Result<()> {
        match position {
            None => {
                info!("joystick input disabled by player");
                self.player.clear();
                self.prefs.use_joystick = false;
                Ok(())
            }
            Some(position) => {
                let device = self
                    .registry
                    .get(position)
                    .ok_or(Error::NoSuchDevice(position))?;
                self.prefs.use_joystick = true;
                self.prefs.chosen_joystick_guid = device.guid();
                self.prefs.chosen_joystick_name = device.name();
                self.player
                    .change_device(Some(device), self.prefs.saved_bindings().as_ref());
                Ok(())
            }
        }
    }

    /// Feeds one attach/detach notification through the subsystem.
    /// Returns whether the tracked device set changed.
    ///
    /// Detaching the player's active device aborts any capture session in
    /// flight and drops the binding table before the registry forgets the
    /// handle.
    pub fn handle_platform_event(&mut self, event: &PlatformEvent) -> bool {
        if let PlatformEvent::Detached { id } = event {
            if self.player.device_id() == Some(*id) {
                warn!("active device {id} detached");
                self.abort_session_for_detach();
                self.player.clear();
            }
        }
        self.registry.handle_event(event).is_some()
    }

    fn abort_session_for_detach(&mut self) {
        if self.session.take().is_some() {
            warn!("capture session aborted: device went away");
            self.silent = false;
        }
    }

    /// Opens a capture session against the player's current device.
    pub fn start_configurer(&mut self) -> Result<()> {
        let device = self.player.device().ok_or(Error::NoDevice)?;
        info!("starting capture session on {}", device.name());
        self.session = Some(Configurer::new(device));
        Ok(())
    }

    /// Discards the capture session, leaving the binding table and the
    /// persisted settings exactly as they were.
    pub fn stop_configurer(&mut self) {
        if self.session.take().is_some() {
            info!("capture session discarded");
        }
    }

    pub fn session_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn neutral_zones_known(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(Configurer::neutral_zones_known)
    }

    pub fn clear_neutral_zones(&mut self) {
        match &mut self.session {
            Some(session) => session.clear_neutral_zones(),
            None => warn!("clear_neutral_zones without a session"),
        }
    }

    pub fn tick_neutral_zones(&mut self) {
        match &mut self.session {
            Some(session) => session.tick_neutral_zones(),
            None => warn!("tick_neutral_zones without a session"),
        }
    }

    pub fn neutral_zones_dangerous(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(Configurer::neutral_zones_dangerous)
    }

    pub fn use_default_neutral_zones(&mut self) {
        match &mut self.session {
            Some(session) => session.use_default_neutral_zones(),
            None => warn!("use_default_neutral_zones without a session"),
        }
    }

    /// One capture polling pass. Without a session this keeps reporting
    /// that nothing happened, so a stale caller cannot corrupt state.
    pub fn listen_for_signal(&mut self) -> ListenOutcome {
        match &mut self.session {
            Some(session) => session.listen_for_signal(),
            None => {
                warn!("listen_for_signal without a session");
                ListenOutcome::StillListening
            }
        }
    }

    /// Steps the capture session back one control.
    pub fn back(&mut self) -> bool {
        match &mut self.session {
            Some(session) => session.back(),
            None => false,
        }
    }

    pub fn capture_complete(&self) -> bool {
        self.session.as_ref().is_some_and(Configurer::finished)
    }

    pub fn current_capture_control(&self) -> Option<Control> {
        self.session.as_ref()?.current_control()
    }

    /// Commits a completed capture session: the binding table is replaced
    /// and the settings record the new configuration under the device's
    /// model GUID. The session stays open; the caller decides when to
    /// [`JoystickContext::stop_configurer`].
    pub fn apply_configuration(&mut self) -> Result<()> {
        let session = self.session.as_ref().ok_or(Error::NoSession)?;
        let parts = session.bindings()?;
        let device = session.device();

        self.player.commit(&parts);
        self.prefs.use_joystick = true;
        self.prefs.configured_joystick_guid = device.guid();
        self.prefs.configured_joystick_name = device.name();
        self.prefs.parts = parts;
        info!("configuration applied for {}", device.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ribbit_joystick::{SignalSpec, VirtualBus, VirtualPad};

    fn context_with_pad() -> (JoystickContext, std::rc::Rc<VirtualPad>) {
        let bus = VirtualBus::new();
        let pad = VirtualPad::joystick(1, "model-x", "pad", 0, 7, 0);
        bus.plug(pad.clone());
        let ctx = JoystickContext::new(bus, JoystickPrefs::default());
        (ctx, pad)
    }

    #[test]
    fn adopts_first_device_when_nothing_is_chosen() {
        let (ctx, _pad) = context_with_pad();
        assert_eq!(ctx.current_device_id(), Some(1));
    }

    #[test]
    fn adopts_chosen_device_by_guid() {
        let bus = VirtualBus::new();
        bus.plug(VirtualPad::joystick(1, "model-x", "first", 0, 4, 1));
        bus.plug(VirtualPad::joystick(2, "model-y", "second", 0, 4, 1));
        let prefs = JoystickPrefs {
            chosen_joystick_guid: "model-y".to_string(),
            ..JoystickPrefs::default()
        };
        let ctx = JoystickContext::new(bus, prefs);
        assert_eq!(ctx.current_device_id(), Some(2));
    }

    #[test]
    fn predicates_are_gated_by_silence_and_preference() {
        let (mut ctx, pad) = context_with_pad();
        pad.press(0);
        assert!(ctx.button(0));
        ctx.set_silent(true);
        assert!(!ctx.button(0));
        ctx.set_silent(false);
        ctx.select_device(None).unwrap();
        assert!(!ctx.prefs().use_joystick);
        assert!(!ctx.button(0));
    }

    #[test]
    fn selecting_a_bad_position_is_an_error() {
        let (mut ctx, _pad) = context_with_pad();
        assert!(matches!(
            ctx.select_device(Some(9)),
            Err(Error::NoSuchDevice(9))
        ));
        // The previous binding survives a failed selection.
        assert_eq!(ctx.current_device_id(), Some(1));
    }

    #[test]
    fn reselecting_records_the_choice_in_prefs() {
        let (mut ctx, _pad) = context_with_pad();
        ctx.select_device(Some(0)).unwrap();
        assert!(ctx.prefs().use_joystick);
        assert_eq!(ctx.prefs().chosen_joystick_guid, "model-x");
        assert_eq!(ctx.prefs().chosen_joystick_name, "pad");
    }

    #[test]
    fn capture_session_round_trip_updates_prefs() {
        let (mut ctx, pad) = context_with_pad();
        ctx.start_configurer().unwrap();
        ctx.use_default_neutral_zones();

        for button in 0u8..7 {
            pad.release_all();
            pad.press(button);
            ctx.listen_for_signal();
        }
        assert!(ctx.capture_complete());
        ctx.apply_configuration().unwrap();
        ctx.stop_configurer();

        assert_eq!(ctx.prefs().configured_joystick_guid, "model-x");
        assert_eq!(ctx.prefs().parts[0], SignalSpec::button(0));
        assert_eq!(ctx.prefs().parts[6], SignalSpec::button(6));
        pad.release_all();
        pad.press(3);
        assert!(ctx.right());
    }

    #[test]
    fn discarded_session_leaves_prefs_untouched() {
        let (mut ctx, pad) = context_with_pad();
        let before = ctx.prefs().clone();
        ctx.start_configurer().unwrap();
        ctx.use_default_neutral_zones();
        pad.press(5);
        ctx.listen_for_signal();
        ctx.stop_configurer();

        assert_eq!(ctx.prefs(), &before);
        assert!(!ctx.session_active());
        // And polling a dead session stays inert.
        assert_eq!(ctx.listen_for_signal(), ListenOutcome::StillListening);
    }

    #[test]
    fn detach_of_active_device_aborts_session_and_binding() {
        let bus = VirtualBus::new();
        let pad = VirtualPad::joystick(1, "model-x", "pad", 0, 7, 0);
        bus.plug(pad.clone());
        let mut ctx = JoystickContext::new(bus.clone(), JoystickPrefs::default());
        let before = ctx.prefs().clone();

        ctx.start_configurer().unwrap();
        ctx.set_silent(true);
        pad.press(0);
        ctx.listen_for_signal();

        bus.unplug(1);
        ctx.handle_platform_event(&PlatformEvent::Detached { id: 1 });

        assert!(!ctx.session_active());
        assert_eq!(ctx.current_device_id(), None);
        assert_eq!(ctx.prefs(), &before);
        assert!(!ctx.button(0));
        assert!(ctx.device_ids().is_empty());
    }

    #[test]
    fn detach_of_other_device_is_transparent() {
        let bus = VirtualBus::new();
        bus.plug(VirtualPad::joystick(1, "model-x", "pad", 0, 7, 0));
        bus.plug(VirtualPad::joystick(2, "model-y", "other", 0, 7, 0));
        let mut ctx = JoystickContext::new(bus.clone(), JoystickPrefs::default());
        ctx.start_configurer().unwrap();

        bus.unplug(2);
        ctx.handle_platform_event(&PlatformEvent::Detached { id: 2 });
        assert!(ctx.session_active());
        assert_eq!(ctx.current_device_id(), Some(1));
    }

    #[test]
    fn reconciliation_detects_a_vanished_device() {
        // A missed detach event: the pad is gone from the bus but no
        // notification was ever delivered.
        let bus = VirtualBus::new();
        bus.plug(VirtualPad::joystick(3, "g", "p", 0, 4, 0));
        let mut ctx = JoystickContext::new(bus.clone(), JoystickPrefs::default());
        assert_eq!(ctx.current_device_id(), Some(3));

        bus.unplug(3);
        assert!(ctx.reconcile_devices());
        assert_eq!(ctx.current_device_id(), None);
        assert!(ctx.device_ids().is_empty());
    }
}
