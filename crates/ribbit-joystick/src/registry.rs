use std::rc::Rc;

use log::{info, warn};

use crate::device::{DeviceHandle, DeviceId, PlatformEvent};

/// Enumeration access to the platform's live device list. Implemented by
/// the SDL backend and by the virtual bus; the seam that lets the
/// registry be driven without real hardware.
pub trait DeviceBus {
    /// Number of devices the platform currently reports.
    fn device_count(&self) -> u32;
    /// Opens the device at the given enumeration position. `None` when
    /// opening fails (hardware race, permissions); callers skip the slot.
    fn open(&self, position: u32) -> Option<DeviceHandle>;
}

/// What an attach/detach event did to the tracked set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryChange {
    Added(DeviceId),
    Removed(DeviceId),
}

/// Tracks the set of currently open devices against the platform's live
/// list.
///
/// Attach/detach events may be dropped or coalesced by the platform, so
/// event handling alone is not trusted: [`DeviceRegistry::reconcile`]
/// re-walks the enumeration list and must be run before presenting the
/// device list to the user. Positions into the tracked list are only
/// meaningful against the most recent reconciliation.
pub struct DeviceRegistry {
    bus: Rc<dyn DeviceBus>,
    tracked: Vec<DeviceHandle>,
}

impl DeviceRegistry {
    pub fn new(bus: Rc<dyn DeviceBus>) -> DeviceRegistry {
        DeviceRegistry { bus, tracked: Vec::new() }
    }

    /// Synchronizes the tracked set with the platform's device list:
    /// prunes tracked handles that are no longer attached, then opens any
    /// enumerated device not already tracked (matched by instance id, not
    /// position — positions reshuffle on attach/detach). Returns whether
    /// the tracked set changed.
    pub fn reconcile(&mut self) -> bool {
        let mut changed = false;

        self.tracked.retain(|device| {
            if device.attached() {
                true
            } else {
                info!("pruning detached device {}", device.id());
                changed = true;
                false
            }
        });

        for position in 0..self.bus.device_count() {
            let Some(candidate) = self.bus.open(position) else {
                warn!("could not open device at position {position}, skipping");
                continue;
            };
            let id = candidate.id();
            if !self.tracked.iter().any(|device| device.id() == id) {
                info!("tracking device {} [{}]", id, candidate.name());
                self.tracked.push(candidate);
                changed = true;
            }
        }

        changed
    }

    /// Applies one attach/detach notification. Both directions are
    /// idempotent: attaching an already-tracked id or detaching an
    /// untracked id is a warned no-op.
    pub fn handle_event(&mut self, event: &PlatformEvent) -> Option<RegistryChange> {
        match event {
            PlatformEvent::Attached { position } => {
                let Some(candidate) = self.bus.open(*position) else {
                    warn!("attach event for position {position}, but it would not open");
                    return None;
                };
                let id = candidate.id();
                if self.tracked.iter().any(|device| device.id() == id) {
                    warn!("attach event for already-tracked device {id}");
                    return None;
                }
                info!("attached device {} [{}]", id, candidate.name());
                self.tracked.push(candidate);
                Some(RegistryChange::Added(id))
            }
            PlatformEvent::Detached { id } => {
                let before = self.tracked.len();
                self.tracked.retain(|device| device.id() != *id);
                if self.tracked.len() == before {
                    warn!("detach event for untracked device {id}");
                    return None;
                }
                info!("detached device {id}");
                Some(RegistryChange::Removed(*id))
            }
        }
    }

    /// Human-readable names, by tracked position. An unnameable device
    /// shows as "???".
    pub fn names(&self) -> Vec<String> {
        self.tracked
            .iter()
            .map(|device| {
                let name = device.name();
                if name.is_empty() {
                    "???".to_string()
                } else {
                    name
                }
            })
            .collect()
    }

    /// Instance ids, by tracked position; positions match `names()`.
    pub fn ids(&self) -> Vec<DeviceId> {
        self.tracked.iter().map(|device| device.id()).collect()
    }

    /// Handle at the given tracked-list position.
    pub fn get(&self, position: usize) -> Option<DeviceHandle> {
        self.tracked.get(position).cloned()
    }

    pub fn find(&self, id: DeviceId) -> Option<DeviceHandle> {
        self.tracked.iter().find(|device| device.id() == id).cloned()
    }

    pub fn find_by_guid(&self, guid: &str) -> Option<DeviceHandle> {
        if guid.is_empty() {
            return None;
        }
        self.tracked.iter().find(|device| device.guid() == guid).cloned()
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }
}
