//! Hardware identity to controller table.
//!
//! The registry guarantees that at most one live [`ServoController`] drives a
//! given hardware identity. It is an ordinary value owned by the application
//! (clone it to share), so independent tests get independent tables.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::controller::ServoController;
use crate::error::{ServoError, ServoResult};
use crate::hardware::HardwareInterface;

pub(crate) type ControllerTable = Mutex<HashMap<String, Arc<ServoController>>>;

/// Table of live controllers keyed by hardware identity.
///
/// | state  | operation                     | next state |
/// |--------|-------------------------------|------------|
/// | absent | [`create`](Self::create)      | live       |
/// | live   | [`create`](Self::create)      | live, [`ServoError::DuplicateHardware`] |
/// | live   | [`ServoController::dispose`]  | absent     |
///
/// # Examples
///
/// ```
/// use servokit_core::prelude::*;
/// use servokit_core::driver::mock::RecordingDriver;
///
/// let registry = ControllerRegistry::new();
/// let hardware = || HardwareInterface::new(RecordingDriver::new(), HardwareConfig::new("TEST1", 8));
///
/// let first = registry.create(hardware()?)?;
/// assert!(registry.create(hardware()?).is_err());
///
/// first.dispose();
/// let second = registry.create(hardware()?)?;
/// assert!(registry.get("TEST1").is_some_and(|live| std::sync::Arc::ptr_eq(&live, &second)));
/// # Ok::<(), servokit_core::ServoError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: Arc<ControllerTable>,
}

impl ControllerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the controller for `hardware` and register it.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::DuplicateHardware`] if a live controller already
    /// owns the hardware identity. The rejected interface is dropped without
    /// calling its driver's `dispose`.
    pub fn create(&self, hardware: HardwareInterface) -> ServoResult<Arc<ServoController>> {
        let name = hardware.unique_hardware_name().to_owned();
        let mut table = self.controllers.lock();
        match table.entry(name) {
            Entry::Occupied(entry) => Err(ServoError::duplicate_hardware(entry.key().as_str())),
            Entry::Vacant(slot) => {
                let controller = Arc::new(ServoController::new(
                    hardware,
                    Arc::downgrade(&self.controllers),
                ));
                debug!("Registered servo controller for hardware '{}'", slot.key());
                slot.insert(Arc::clone(&controller));
                Ok(controller)
            }
        }
    }

    /// Live controller for `unique_hardware_name`, if any.
    #[must_use]
    pub fn get(&self, unique_hardware_name: &str) -> Option<Arc<ServoController>> {
        self.controllers.lock().get(unique_hardware_name).cloned()
    }

    /// Whether a live controller owns `unique_hardware_name`.
    #[must_use]
    pub fn contains(&self, unique_hardware_name: &str) -> bool {
        self.controllers.lock().contains_key(unique_hardware_name)
    }

    /// Number of live controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.lock().len()
    }

    /// Whether no controller is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.lock().is_empty()
    }

    /// Hardware identities of the live controllers, sorted.
    #[must_use]
    pub fn hardware_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.controllers.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Remove `controller`'s entry if the table still maps its name to it.
pub(crate) fn release(table: &Weak<ControllerTable>, controller: &ServoController) -> bool {
    let Some(table) = table.upgrade() else {
        return false;
    };
    let name = controller.unique_hardware_name();
    let removed = {
        let mut table = table.lock();
        let is_current = table
            .get(name)
            .is_some_and(|live| std::ptr::eq(Arc::as_ptr(live), controller));
        if is_current { table.remove(name) } else { None }
    };
    if removed.is_some() {
        debug!("Removed servo controller for hardware '{name}' from registry");
    }
    removed.is_some()
}
