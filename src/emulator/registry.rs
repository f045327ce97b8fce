//! Installation of the emulation mode per adapter type.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::emulator::adapter::{CleanupHook, SavepointAdapter};
use crate::emulator::config::EmulatorConfig;
use crate::emulator::emulator::SavepointEmulator;
use crate::emulator::error::EmulatorResult;
use crate::emulator::notification::LifecycleCallbacks;

/// Records which adapter types run with savepoint emulation.
///
/// Thread-safe: clones share one registry.
#[derive(Clone, Default)]
pub struct EmulationRegistry {
    installed: Arc<RwLock<HashMap<TypeId, &'static str>>>,
}

impl EmulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register adapter type `A`. Returns `false` if it was already
    /// registered, in which case nothing changes.
    pub fn install<A: SavepointAdapter + 'static>(&self) -> bool {
        let mut installed = self.installed.write();
        if installed.contains_key(&TypeId::of::<A>()) {
            debug!(adapter = type_name::<A>(), "savepoint emulation already installed");
            return false;
        }
        installed.insert(TypeId::of::<A>(), type_name::<A>());
        info!(adapter = type_name::<A>(), "savepoint emulation installed");
        true
    }

    pub fn is_installed<A: 'static>(&self) -> bool {
        self.installed.read().contains_key(&TypeId::of::<A>())
    }

    /// Names of the registered adapter types, sorted.
    pub fn installed(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.installed.read().values().copied().collect();
        names.sort_unstable();
        names
    }

    /// Register `A` if needed and wrap `adapter` in an emulator.
    pub fn equip<A, C, H>(&self, adapter: A, callbacks: C, cleanup: H) -> SavepointEmulator<A, C, H>
    where
        A: SavepointAdapter + 'static,
        C: LifecycleCallbacks,
        H: CleanupHook,
    {
        self.install::<A>();
        SavepointEmulator::new(adapter, callbacks, cleanup)
    }

    /// Like [`equip`](Self::equip), applying `config`.
    pub fn equip_with_config<A, C, H>(
        &self,
        adapter: A,
        callbacks: C,
        cleanup: H,
        config: EmulatorConfig,
    ) -> EmulatorResult<SavepointEmulator<A, C, H>>
    where
        A: SavepointAdapter + 'static,
        C: LifecycleCallbacks,
        H: CleanupHook,
    {
        self.equip(adapter, callbacks, cleanup).with_config(config)
    }
}

impl std::fmt::Debug for EmulationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmulationRegistry")
            .field("installed", &self.installed())
            .finish()
    }
}
