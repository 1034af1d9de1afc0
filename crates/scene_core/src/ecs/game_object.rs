//! GameObject - the entity container
//!
//! A game object owns a [`Transform`] and an ordered set of [`Component`]s.
//! Components are indexed by a [`TypeHierarchyRegistry`](super::TypeHierarchyRegistry)
//! whose floor is `dyn Component`, so at most one component may claim any
//! type or family.
//!
//! [`GameObject`] is a cheap handle; clones refer to the same object. The
//! scene a game object belongs to is held weakly, as is the game object a
//! component belongs to, so there are no ownership cycles.
//!
//! # Mutation during traversal
//!
//! `update`, `draw` and the scene-membership cascade iterate the live
//! component list. Adding or removing a component on the same game object from
//! inside one of those hooks panics. Reading (`get_component`, `has_component`,
//! transform access) is allowed.
//!
//! # Dropping without `dispose`
//!
//! When the last handle goes away, components still attached are detached
//! (`on_detached` fires and their owner is cleared) but `dispose` is not called.

use std::any::TypeId;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use super::behavior::{self, Behavior};
use super::behavior_set::BehaviorSet;
use super::component::Component;
use super::error::CompositionError;
use super::registry::Hierarchy;
use super::transform::Transform;
use crate::scene::{Scene, WeakScene};

const DEFAULT_COMPONENT_CAPACITY: usize = 4;

struct GameObjectCore {
    name: String,
    transform: RefCell<Transform>,
    components: RefCell<BehaviorSet<dyn Component>>,
    scene: RefCell<Option<WeakScene>>,
    enabled: Cell<bool>,
    drawable: Cell<bool>,
    disposed: Cell<bool>,
}

/// Handle to an entity that owns a transform and a set of components
#[derive(Clone)]
pub struct GameObject {
    core: Rc<GameObjectCore>,
}

/// Non-owning handle to a [`GameObject`]
#[derive(Clone, Default)]
pub struct WeakGameObject {
    core: Weak<GameObjectCore>,
}

impl WeakGameObject {
    /// The game object, if it is still alive
    pub fn upgrade(&self) -> Option<GameObject> {
        self.core.upgrade().map(|core| GameObject { core })
    }
}

impl fmt::Debug for WeakGameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(object) => write!(f, "WeakGameObject({})", object.name()),
            None => f.write_str("WeakGameObject(<dropped>)"),
        }
    }
}

impl GameObject {
    /// Create a game object at the origin, outside of any scene
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_COMPONENT_CAPACITY)
    }

    /// Create a game object with room for `capacity` components
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            core: Rc::new(GameObjectCore {
                name: name.into(),
                transform: RefCell::new(Transform::default()),
                components: RefCell::new(BehaviorSet::with_capacity(capacity)),
                scene: RefCell::new(None),
                enabled: Cell::new(true),
                drawable: Cell::new(true),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Name used in logs and errors
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Non-owning handle to this game object
    pub fn downgrade(&self) -> WeakGameObject {
        WeakGameObject {
            core: Rc::downgrade(&self.core),
        }
    }

    /// Whether both handles refer to the same game object
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    /// The transform
    ///
    /// # Panics
    /// Panics if the transform is currently borrowed mutably.
    pub fn transform(&self) -> Ref<'_, Transform> {
        self.core.transform.borrow()
    }

    /// The transform, mutably
    ///
    /// # Panics
    /// Panics if the transform is currently borrowed.
    pub fn transform_mut(&self) -> RefMut<'_, Transform> {
        self.core.transform.borrow_mut()
    }

    /// Scene this game object belongs to
    pub fn scene(&self) -> Option<Scene> {
        self.core.scene.borrow().as_ref().and_then(WeakScene::upgrade)
    }

    /// Whether the scene calls `update` on this game object
    pub fn is_enabled(&self) -> bool {
        self.core.enabled.get()
    }

    /// Include or exclude from `update`
    pub fn set_enabled(&self, enabled: bool) {
        self.core.enabled.set(enabled);
    }

    /// Whether the scene calls `draw` on this game object
    pub fn is_drawable(&self) -> bool {
        self.core.drawable.get()
    }

    /// Include or exclude from `draw`
    pub fn set_drawable(&self, drawable: bool) {
        self.core.drawable.set(drawable);
    }

    /// Whether [`dispose`](Self::dispose) has run
    pub fn is_disposed(&self) -> bool {
        self.core.disposed.get()
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.core.components.borrow().len()
    }

    fn components_mut(&self) -> RefMut<'_, BehaviorSet<dyn Component>> {
        match self.core.components.try_borrow_mut() {
            Ok(components) => components,
            Err(_) => panic!("components of GameObject '{}' modified during traversal", self.core.name),
        }
    }

    /// Attach `component`
    ///
    /// If the component belongs to another game object it is removed from
    /// there first. Fires `on_attached`, then `on_added_to_scene` if this game
    /// object is in a scene.
    ///
    /// # Errors
    /// [`CompositionError::DuplicateComponent`] if a component of the same type
    /// or of any shared family is already attached; the component and its
    /// previous owner are left untouched. [`CompositionError::Disposed`] if
    /// this game object has been disposed.
    ///
    /// # Panics
    /// Panics when called while this game object's components are being traversed.
    pub fn add_component<T: Component + Hierarchy>(&self, component: Rc<RefCell<T>>) -> Result<(), CompositionError> {
        if self.is_disposed() {
            return Err(CompositionError::Disposed(self.core.name.clone()));
        }
        drop(self.components_mut());

        if let Err(err) = self.core.components.borrow().check::<T>() {
            log::warn!("Rejected component for GameObject '{}': {err}", self.core.name);
            return Err(CompositionError::DuplicateComponent(err));
        }

        let previous = component.borrow().base().game_object();
        if let Some(previous) = previous.filter(|previous| !previous.ptr_eq(self)) {
            log::debug!(
                "Moving {} from GameObject '{}' to '{}'",
                std::any::type_name::<T>(),
                previous.name(),
                self.core.name
            );
            previous.remove_component_by_id(TypeId::of::<T>());
        }

        let erased: Rc<RefCell<dyn Component>> = component.clone();
        self.components_mut()
            .insert(&component, erased)
            .map_err(CompositionError::DuplicateComponent)?;
        log::debug!("Attached {} to GameObject '{}'", std::any::type_name::<T>(), self.core.name);

        let in_scene = self.scene().is_some();
        behavior::attach(&mut *component.borrow_mut(), self.downgrade(), in_scene);
        Ok(())
    }

    /// Component registered under `U`, which may be its concrete type or any
    /// family it declares
    pub fn get_component<U: ?Sized + 'static>(&self) -> Option<Rc<RefCell<U>>> {
        self.core.components.borrow().get::<U>()
    }

    /// Same as [`get_component`](Self::get_component), named for call sites
    /// that branch on presence
    pub fn try_get_component<U: ?Sized + 'static>(&self) -> Option<Rc<RefCell<U>>> {
        self.get_component::<U>()
    }

    /// Whether any component claims `U`
    pub fn has_component<U: ?Sized + 'static>(&self) -> bool {
        self.has_component_id(TypeId::of::<U>())
    }

    /// Whether any component claims the type `id`
    pub fn has_component_id(&self, id: TypeId) -> bool {
        self.core.components.borrow().contains(id)
    }

    /// Component claiming the type `id`, as a `dyn Component`
    pub fn get_component_by_id(&self, id: TypeId) -> Option<Rc<RefCell<dyn Component>>> {
        self.core.components.borrow().get_erased(id)
    }

    /// Detach the component claiming `U`
    ///
    /// `U` may be any type of the component's chain; the whole component is
    /// removed. No-op returning `None` if nothing claims `U`.
    ///
    /// # Panics
    /// Panics when called while this game object's components are being traversed.
    pub fn remove_component<U: ?Sized + 'static>(&self) -> Option<Rc<RefCell<dyn Component>>> {
        self.remove_component_by_id(TypeId::of::<U>())
    }

    /// Detach the component claiming the type `id`
    ///
    /// Fires `on_removed_from_scene` if this game object is in a scene, then
    /// `on_detached`.
    ///
    /// # Panics
    /// Panics when called while this game object's components are being traversed.
    pub fn remove_component_by_id(&self, id: TypeId) -> Option<Rc<RefCell<dyn Component>>> {
        let removed = self.components_mut().remove(id)?;
        log::debug!("Detached component from GameObject '{}'", self.core.name);

        let in_scene = self.scene().is_some();
        behavior::detach(&mut *removed.borrow_mut(), in_scene);
        Some(removed)
    }

    /// Record the scene transition and cascade the membership hooks
    ///
    /// Leaving fires `on_removed_from_scene` while the old scene is still
    /// reachable; entering fires `on_added_to_scene` once the new scene is set.
    pub(crate) fn on_added_to_scene(&self, scene: Option<&Scene>) {
        let was_in_scene = self.core.scene.borrow().is_some();
        let components = self.core.components.borrow();

        if scene.is_none() && was_in_scene {
            for component in components.iter() {
                behavior::set_scene_membership(&mut *component.borrow_mut(), true, false);
            }
        }

        *self.core.scene.borrow_mut() = scene.map(Scene::downgrade);

        if scene.is_some() {
            for component in components.iter() {
                behavior::set_scene_membership(&mut *component.borrow_mut(), false, true);
            }
        }
    }

    /// Update every enabled component, in insertion order
    pub fn update(&self, delta_time: f32) {
        let components = self.core.components.borrow();
        for component in components.iter() {
            let mut component = component.borrow_mut();
            if component.base().is_enabled() {
                component.update(delta_time);
            }
        }
    }

    /// Draw every drawable component, in insertion order
    pub fn draw(&self) {
        let components = self.core.components.borrow();
        for component in components.iter() {
            let mut component = component.borrow_mut();
            if component.base().is_drawable() {
                component.draw();
            }
        }
    }

    /// Dispose every component, then leave the scene
    ///
    /// Each component is detached (scene-removal and detach hooks) before its
    /// `dispose` runs. Calling this again has no effect.
    ///
    /// # Panics
    /// Panics when called while this game object's components, or the game
    /// objects of its scene, are being traversed. Nothing is torn down in that
    /// case.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        drop(self.components_mut());
        let scene = self.scene();
        if let Some(scene) = &scene {
            scene.assert_not_traversing();
        }
        self.core.disposed.set(true);
        log::debug!("Disposing GameObject '{}'", self.core.name);

        let in_scene = scene.is_some();
        let components = self.components_mut().drain();
        for component in components {
            let mut component = component.borrow_mut();
            behavior::detach(&mut *component, in_scene);
            component.dispose();
        }

        if let Some(scene) = scene {
            scene.remove_game_object(self);
        }
    }
}

impl Drop for GameObjectCore {
    fn drop(&mut self) {
        let in_scene = self.scene.get_mut().is_some();
        for component in self.components.get_mut().drain() {
            if let Ok(mut component) = component.try_borrow_mut() {
                behavior::detach(&mut *component, in_scene);
            }
        }
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("name", &self.core.name)
            .field("components", &self.component_count())
            .field("enabled", &self.is_enabled())
            .field("drawable", &self.is_drawable())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
