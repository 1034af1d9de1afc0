//! Ordered, registry-indexed behavior collection shared by game objects and scenes

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

use super::registry::{Hierarchy, RegistryError, TypeHierarchyRegistry, TypeKey};

struct Slot<B: ?Sized> {
    root: TypeKey,
    behavior: Rc<RefCell<B>>,
}

/// Behaviors in insertion order plus the registry that indexes them
///
/// `B` is the erased family (`dyn Component` or `dyn SceneComponent`), which is
/// also the registry floor.
pub(crate) struct BehaviorSet<B: ?Sized + 'static> {
    registry: TypeHierarchyRegistry,
    slots: Vec<Slot<B>>,
}

impl<B: ?Sized + 'static> BehaviorSet<B> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: TypeHierarchyRegistry::with_floor::<B>(),
            slots: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn check<T: Hierarchy>(&self) -> Result<(), RegistryError> {
        self.registry.check::<T>()
    }

    /// Register `typed` and append its erased handle
    pub(crate) fn insert<T: Hierarchy>(
        &mut self,
        typed: &Rc<RefCell<T>>,
        erased: Rc<RefCell<B>>,
    ) -> Result<(), RegistryError> {
        self.registry.register(typed)?;
        self.slots.push(Slot {
            root: TypeKey::of::<T>(),
            behavior: erased,
        });
        Ok(())
    }

    pub(crate) fn get<U: ?Sized + 'static>(&self) -> Option<Rc<RefCell<U>>> {
        self.registry.lookup::<U>()
    }

    pub(crate) fn contains(&self, id: TypeId) -> bool {
        self.registry.contains(id)
    }

    pub(crate) fn get_erased(&self, id: TypeId) -> Option<Rc<RefCell<B>>> {
        let root = self.registry.root_of(id)?;
        self.slots
            .iter()
            .find(|slot| slot.root == root)
            .map(|slot| Rc::clone(&slot.behavior))
    }

    /// Remove the behavior claiming `id`, unregistering it by its root type
    ///
    /// Insertion order of the remaining behaviors is preserved.
    pub(crate) fn remove(&mut self, id: TypeId) -> Option<Rc<RefCell<B>>> {
        let root = self.registry.root_of(id)?;
        if let Err(err) = self.registry.unregister(root) {
            log::error!("Registry rejected removal of {root}: {err}");
            return None;
        }
        let position = self.slots.iter().position(|slot| slot.root == root)?;
        Some(self.slots.remove(position).behavior)
    }

    /// Empty the set, returning the behaviors in insertion order
    pub(crate) fn drain(&mut self) -> Vec<Rc<RefCell<B>>> {
        self.registry.clear();
        self.slots.drain(..).map(|slot| slot.behavior).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Rc<RefCell<B>>> + '_ {
        self.slots.iter().map(|slot| &slot.behavior)
    }
}
