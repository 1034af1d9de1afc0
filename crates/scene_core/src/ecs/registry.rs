//! Type-hierarchy registry
//!
//! Maps every type in an object's declared lineage to a single entry, so the
//! object can be found in O(1) by its concrete type or by any family it
//! belongs to. Lineages are declared explicitly through [`Hierarchy`]; there is
//! no runtime reflection involved.
//!
//! A registered type claims its whole chain up to (but excluding) the
//! registry's floor type. Two objects whose chains overlap cannot be registered
//! at the same time; this is what keeps "give me my renderer" unambiguous.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

/// Runtime identity of a type, with its name kept for diagnostics
///
/// Equality and hashing only consider the [`TypeId`].
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key of `T`, which may be a concrete type or a `dyn Trait` family
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Underlying type id
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type name as reported by the compiler
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

type ViewFn<T> = Box<dyn Fn(&Rc<RefCell<T>>) -> Box<dyn Any>>;

struct Link<T: 'static> {
    key: TypeKey,
    view: ViewFn<T>,
}

/// Declared ancestry of a concrete type, most-derived first
///
/// The first link is always `T` itself. Each call to [`extends`](Self::extends)
/// appends the next ancestor together with the upcast that produces a handle of
/// that ancestor's type.
///
/// ```rust
/// use scene_core::ecs::{Lineage, TypeKey};
///
/// trait Shape {}
/// struct Circle;
/// impl Shape for Circle {}
///
/// let lineage = Lineage::<Circle>::new().extends::<dyn Shape>(|rc| rc);
/// let keys: Vec<TypeKey> = lineage.keys().collect();
/// assert_eq!(keys, vec![TypeKey::of::<Circle>(), TypeKey::of::<dyn Shape>()]);
/// ```
pub struct Lineage<T: 'static> {
    links: Vec<Link<T>>,
}

impl<T: 'static> Lineage<T> {
    /// Lineage containing only `T`
    pub fn new() -> Self {
        let view: ViewFn<T> = Box::new(|rc: &Rc<RefCell<T>>| Box::new(Rc::downgrade(rc)) as Box<dyn Any>);
        Self {
            links: vec![Link { key: TypeKey::of::<T>(), view }],
        }
    }

    /// Append the next ancestor `U`
    ///
    /// `upcast` is normally the identity closure `|rc| rc`; the unsizing
    /// coercion to `Rc<RefCell<dyn Family>>` happens at its return.
    #[must_use]
    pub fn extends<U: ?Sized + 'static>(mut self, upcast: fn(Rc<RefCell<T>>) -> Rc<RefCell<U>>) -> Self {
        let view: ViewFn<T> = Box::new(move |rc: &Rc<RefCell<T>>| {
            let ancestor: Rc<RefCell<U>> = upcast(Rc::clone(rc));
            Box::new(Rc::downgrade(&ancestor)) as Box<dyn Any>
        });
        self.links.push(Link { key: TypeKey::of::<U>(), view });
        self
    }

    /// Keys of the lineage, most-derived first
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.links.iter().map(|link| link.key)
    }
}

impl<T: 'static> Default for Lineage<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A type that declares its own lineage
pub trait Hierarchy: Sized + 'static {
    /// The ancestry of `Self`, ending at (and including) the floor type of the
    /// registries it will be registered in
    fn lineage() -> Lineage<Self>;
}

/// Why a registration was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The declared lineage never reaches the registry's floor type
    OutsideFloor {
        /// Floor type of the registry
        floor: &'static str,
    },
    /// A type of the chain already belongs to another entry
    Claimed {
        /// The contested type
        ancestor: &'static str,
        /// Root type of the entry that holds it
        holder: &'static str,
    },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideFloor { floor } => write!(f, "lineage does not descend from {floor}"),
            Self::Claimed { ancestor, holder } => write!(f, "{ancestor} is already claimed by {holder}"),
        }
    }
}

/// Registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The type's chain overlaps an existing entry, or leaves the floor
    #[error("Duplicate registration of {type_name}: {conflict}")]
    DuplicateRegistration {
        /// Type that was being registered
        type_name: &'static str,
        /// What blocked it
        conflict: Conflict,
    },

    /// Unregistration was attempted through an ancestor instead of the root
    #[error("Invalid root: {given} is not the root of its entry (registered as {root})")]
    InvalidRoot {
        /// Type that was presented
        given: &'static str,
        /// Root type of the entry
        root: &'static str,
    },

    /// No entry claims the type
    #[error("Type not registered: {0}")]
    NotRegistered(&'static str),
}

new_key_type! {
    struct EntryKey;
}

struct Entry {
    root: TypeKey,
    chain: Vec<TypeKey>,
    views: HashMap<TypeId, Box<dyn Any>>,
}

/// Registry mapping every type of an object's chain to the same entry
///
/// Entries hold weak handles only; the registry never keeps an object alive.
pub struct TypeHierarchyRegistry {
    floor: TypeKey,
    entries: SlotMap<EntryKey, Entry>,
    index: HashMap<TypeId, EntryKey>,
}

impl TypeHierarchyRegistry {
    /// Create a registry whose chains stop below `floor`
    pub fn new(floor: TypeKey) -> Self {
        Self {
            floor,
            entries: SlotMap::with_key(),
            index: HashMap::new(),
        }
    }

    /// Create a registry with `F` as floor type
    pub fn with_floor<F: ?Sized + 'static>() -> Self {
        Self::new(TypeKey::of::<F>())
    }

    /// Floor type of this registry
    pub fn floor(&self) -> TypeKey {
        self.floor
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lineage links below the floor, after checking every one of
    /// them is unclaimed
    fn claimable_depth<T: 'static>(&self, lineage: &Lineage<T>) -> Result<usize, RegistryError> {
        let root = TypeKey::of::<T>();
        let depth = lineage
            .keys()
            .position(|key| key == self.floor)
            .ok_or(RegistryError::DuplicateRegistration {
                type_name: root.name(),
                conflict: Conflict::OutsideFloor { floor: self.floor.name() },
            })?;

        for key in lineage.keys().take(depth) {
            if let Some(&holder) = self.index.get(&key.id()) {
                return Err(RegistryError::DuplicateRegistration {
                    type_name: root.name(),
                    conflict: Conflict::Claimed {
                        ancestor: key.name(),
                        holder: self.entries[holder].root.name(),
                    },
                });
            }
        }
        Ok(depth)
    }

    /// Check whether `T` could be registered right now, without registering it
    ///
    /// # Errors
    /// Returns the same [`RegistryError::DuplicateRegistration`] that
    /// [`register`](Self::register) would.
    pub fn check<T: Hierarchy>(&self) -> Result<(), RegistryError> {
        self.claimable_depth(&T::lineage()).map(|_| ())
    }

    /// Register `object` under its concrete type and every ancestor above the floor
    ///
    /// # Errors
    /// Fails with [`RegistryError::DuplicateRegistration`] if `T` does not
    /// descend from the floor or if any type of its chain is already claimed.
    /// The registry is left unchanged on failure.
    pub fn register<T: Hierarchy>(&mut self, object: &Rc<RefCell<T>>) -> Result<(), RegistryError> {
        let lineage = T::lineage();
        let depth = self.claimable_depth(&lineage)?;
        if depth == 0 {
            // Registering the floor type itself claims nothing.
            log::trace!("{} is the registry floor; nothing to claim", self.floor);
            return Ok(());
        }

        let claimed = &lineage.links[..depth];
        let entry = Entry {
            root: claimed[0].key,
            chain: claimed.iter().map(|link| link.key).collect(),
            views: claimed.iter().map(|link| (link.key.id(), (link.view)(object))).collect(),
        };
        log::trace!("Registered {} claiming {:?}", entry.root, entry.chain);

        let key = self.entries.insert(entry);
        for link in claimed {
            self.index.insert(link.key.id(), key);
        }
        Ok(())
    }

    /// Look up the object registered under `U`
    ///
    /// `U` may be the concrete type or any ancestor declared in its lineage.
    /// Returns `None` if nothing claims `U` or the object has been dropped.
    pub fn lookup<U: ?Sized + 'static>(&self) -> Option<Rc<RefCell<U>>> {
        let id = TypeId::of::<U>();
        let entry = self.entries.get(*self.index.get(&id)?)?;
        entry.views.get(&id)?.downcast_ref::<Weak<RefCell<U>>>()?.upgrade()
    }

    /// Whether any entry claims `id`
    pub fn contains(&self, id: TypeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Root type of the entry claiming `id`
    pub fn root_of(&self, id: TypeId) -> Option<TypeKey> {
        self.index.get(&id).map(|&key| self.entries[key].root)
    }

    /// Remove the entry whose root type is `root`
    ///
    /// # Errors
    /// Fails with [`RegistryError::InvalidRoot`] if `root` is only an ancestor
    /// within its entry, and with [`RegistryError::NotRegistered`] if nothing
    /// claims it. The registry is left unchanged on failure.
    pub fn unregister(&mut self, root: TypeKey) -> Result<(), RegistryError> {
        let key = *self
            .index
            .get(&root.id())
            .ok_or(RegistryError::NotRegistered(root.name()))?;

        let entry_root = self.entries[key].root;
        if entry_root != root {
            return Err(RegistryError::InvalidRoot {
                given: root.name(),
                root: entry_root.name(),
            });
        }

        if let Some(entry) = self.entries.remove(key) {
            for link in &entry.chain {
                self.index.remove(&link.id());
            }
            log::trace!("Unregistered {} releasing {:?}", entry.root, entry.chain);
        }
        Ok(())
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl fmt::Debug for TypeHierarchyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHierarchyRegistry")
            .field("floor", &self.floor)
            .field("roots", &self.entries.values().map(|entry| entry.root).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Base {}
    trait Shape: Base {
        fn sides(&self) -> u32;
    }
    trait Light: Base {}

    struct Square;
    struct Triangle;
    struct Lamp;
    struct Orphan;

    impl Base for Square {}
    impl Base for Triangle {}
    impl Base for Lamp {}
    impl Light for Lamp {}

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    impl Shape for Triangle {
        fn sides(&self) -> u32 {
            3
        }
    }

    impl Hierarchy for Square {
        fn lineage() -> Lineage<Self> {
            Lineage::<Self>::new().extends::<dyn Shape>(|rc| rc).extends::<dyn Base>(|rc| rc)
        }
    }

    impl Hierarchy for Triangle {
        fn lineage() -> Lineage<Self> {
            Lineage::<Self>::new().extends::<dyn Shape>(|rc| rc).extends::<dyn Base>(|rc| rc)
        }
    }

    impl Hierarchy for Lamp {
        fn lineage() -> Lineage<Self> {
            Lineage::<Self>::new().extends::<dyn Light>(|rc| rc).extends::<dyn Base>(|rc| rc)
        }
    }

    impl Hierarchy for Orphan {
        fn lineage() -> Lineage<Self> {
            Lineage::<Self>::new()
        }
    }

    fn registry() -> TypeHierarchyRegistry {
        TypeHierarchyRegistry::with_floor::<dyn Base>()
    }

    #[test]
    fn test_lookup_by_concrete_and_ancestor() {
        let mut registry = registry();
        let square = Rc::new(RefCell::new(Square));
        registry.register(&square).unwrap();

        let by_concrete = registry.lookup::<Square>().unwrap();
        let by_family = registry.lookup::<dyn Shape>().unwrap();

        assert!(Rc::ptr_eq(&by_concrete, &square));
        assert_eq!(by_family.borrow().sides(), 4);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_floor_is_not_indexed() {
        let mut registry = registry();
        registry.register(&Rc::new(RefCell::new(Square))).unwrap();

        assert!(!registry.contains(TypeId::of::<dyn Base>()));
        assert!(registry.lookup::<dyn Base>().is_none());
    }

    #[test]
    fn test_missing_type_is_not_found() {
        let registry = registry();
        assert!(registry.lookup::<Square>().is_none());
        assert!(registry.root_of(TypeId::of::<dyn Shape>()).is_none());
    }

    #[test]
    fn test_siblings_sharing_an_ancestor_are_exclusive() {
        let mut registry = registry();
        let square = Rc::new(RefCell::new(Square));
        registry.register(&square).unwrap();

        let err = registry.register(&Rc::new(RefCell::new(Triangle))).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateRegistration {
                type_name: std::any::type_name::<Triangle>(),
                conflict: Conflict::Claimed {
                    ancestor: std::any::type_name::<dyn Shape>(),
                    holder: std::any::type_name::<Square>(),
                },
            }
        );

        // The original registration is untouched and Triangle claimed nothing.
        assert!(Rc::ptr_eq(&registry.lookup::<Square>().unwrap(), &square));
        assert!(!registry.contains(TypeId::of::<Triangle>()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unrelated_families_coexist() {
        let mut registry = registry();
        let square = Rc::new(RefCell::new(Square));
        let lamp = Rc::new(RefCell::new(Lamp));
        registry.register(&square).unwrap();
        registry.register(&lamp).unwrap();

        assert!(registry.lookup::<dyn Light>().is_some());
        assert!(registry.lookup::<dyn Shape>().is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_same_type_twice_is_rejected() {
        let mut registry = registry();
        registry.register(&Rc::new(RefCell::new(Lamp))).unwrap();

        assert!(registry.check::<Lamp>().is_err());
        assert!(registry.register(&Rc::new(RefCell::new(Lamp))).is_err());
    }

    #[test]
    fn test_type_outside_floor_is_rejected() {
        let mut registry = registry();
        let err = registry.register(&Rc::new(RefCell::new(Orphan))).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::DuplicateRegistration { conflict: Conflict::OutsideFloor { .. }, .. }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_by_ancestor_fails_without_mutation() {
        let mut registry = registry();
        let square = Rc::new(RefCell::new(Square));
        registry.register(&square).unwrap();

        let err = registry.unregister(TypeKey::of::<dyn Shape>()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRoot { .. }));

        assert!(Rc::ptr_eq(&registry.lookup::<Square>().unwrap(), &square));
        assert!(registry.lookup::<dyn Shape>().is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_by_root_releases_whole_chain() {
        let mut registry = registry();
        registry.register(&Rc::new(RefCell::new(Square))).unwrap();
        registry.unregister(TypeKey::of::<Square>()).unwrap();

        assert!(registry.is_empty());
        assert!(!registry.contains(TypeId::of::<dyn Shape>()));

        // The family is free again for a sibling.
        let triangle = Rc::new(RefCell::new(Triangle));
        registry.register(&triangle).unwrap();
        assert_eq!(registry.lookup::<dyn Shape>().unwrap().borrow().sides(), 3);
    }

    #[test]
    fn test_unregister_unknown_type() {
        let mut registry = registry();
        assert_eq!(
            registry.unregister(TypeKey::of::<Lamp>()),
            Err(RegistryError::NotRegistered(std::any::type_name::<Lamp>()))
        );
    }

    #[test]
    fn test_registry_does_not_own_objects() {
        let mut registry = registry();
        let lamp = Rc::new(RefCell::new(Lamp));
        registry.register(&lamp).unwrap();

        assert_eq!(Rc::strong_count(&lamp), 1);
        drop(lamp);
        assert!(registry.lookup::<Lamp>().is_none());
    }

    #[test]
    fn test_registering_the_floor_claims_nothing() {
        struct Floor;
        impl Hierarchy for Floor {
            fn lineage() -> Lineage<Self> {
                Lineage::<Self>::new()
            }
        }

        let mut registry = TypeHierarchyRegistry::with_floor::<Floor>();
        registry.register(&Rc::new(RefCell::new(Floor))).unwrap();
        assert!(registry.is_empty());
    }
}
