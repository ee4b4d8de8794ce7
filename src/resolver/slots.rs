//! Per-type singleton slots
//!
//! One slot per config type, keyed by `TypeId`, holding the sources in
//! effect and the cached instance. The lock is only held for slot reads and
//! writes, never while sources are loaded.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use super::ConfigClass;
use crate::source::ConfigSources;

pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Slot {
    pub(crate) sources: Option<ConfigSources>,
    pub(crate) instance: Option<Instance>,
}

static SLOTS: Lazy<Mutex<HashMap<TypeId, Slot>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Run `f` on the slot for `T`, creating it from `T::default_sources()` first
/// if needed.
fn with_slot<T: ConfigClass, R>(f: impl FnOnce(&mut Slot) -> R) -> R {
    let key = TypeId::of::<T>();
    if !SLOTS.lock().contains_key(&key) {
        // Computed outside the lock: user code may itself touch the registry
        let defaults = T::default_sources();
        SLOTS
            .lock()
            .entry(key)
            .or_insert_with(|| Slot { sources: defaults, instance: None });
    }

    let mut slots = SLOTS.lock();
    let slot = slots
        .entry(key)
        .or_insert_with(|| Slot { sources: None, instance: None });
    f(slot)
}

pub(crate) fn sources<T: ConfigClass>() -> Option<ConfigSources> {
    with_slot::<T, _>(|slot| slot.sources.clone())
}

pub(crate) fn instance<T: ConfigClass>() -> Option<Arc<T>> {
    with_slot::<T, _>(|slot| slot.instance.clone()).and_then(|any| any.downcast::<T>().ok())
}

// The replaced instance is returned out of the closure and dropped after the
// lock is released: a `Drop` impl may itself touch the registry.

pub(crate) fn store<T: ConfigClass>(instance: Arc<T>) {
    let previous = with_slot::<T, _>(|slot| slot.instance.replace(instance as Instance));
    drop(previous);
}

pub(crate) fn clear_instance<T: ConfigClass>() {
    let previous = with_slot::<T, _>(|slot| slot.instance.take());
    drop(previous);
}

/// Replace the slot for `T`, returning what it held. The caller drops it
/// outside the lock.
pub(crate) fn replace<T: ConfigClass>(new: Slot) -> Slot {
    with_slot::<T, _>(|slot| std::mem::replace(slot, new))
}
