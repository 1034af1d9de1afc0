//! Scene - root of the per-frame traversal
//!
//! A scene owns an ordered list of game objects and an ordered set of scene
//! components. Each frame the engine driver calls [`Scene::update`] then
//! [`Scene::draw`]; scene components always run before game objects.
//!
//! Like game objects, adding or removing members while the scene is traversing
//! that same list panics. [`Scene::dispose`] is the exception: it works on a
//! snapshot so game objects can remove themselves while being disposed.
//!
//! Dropping the last handle without disposing detaches the remaining scene
//! components and takes every member game object out of the scene, firing
//! `on_removed_from_scene` on their components. Nothing is disposed.

use std::any::TypeId;
use std::cell::{Cell, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::SceneConfig;
use crate::ecs::behavior::{self, Behavior};
use crate::ecs::behavior_set::BehaviorSet;
use crate::ecs::{CompositionError, GameObject, Hierarchy, SceneComponent};

struct SceneCore {
    name: String,
    objects: RefCell<Vec<GameObject>>,
    components: RefCell<BehaviorSet<dyn SceneComponent>>,
    disposed: Cell<bool>,
}

/// Handle to a scene; clones refer to the same scene
#[derive(Clone)]
pub struct Scene {
    core: Rc<SceneCore>,
}

/// Non-owning handle to a [`Scene`]
#[derive(Clone, Default)]
pub struct WeakScene {
    core: Weak<SceneCore>,
}

impl WeakScene {
    /// The scene, if it is still alive
    pub fn upgrade(&self) -> Option<Scene> {
        self.core.upgrade().map(|core| Scene { core })
    }
}

impl fmt::Debug for WeakScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(scene) => write!(f, "WeakScene({})", scene.name()),
            None => f.write_str("WeakScene(<dropped>)"),
        }
    }
}

impl Scene {
    /// Create an empty scene with default capacities
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(&SceneConfig {
            name: name.into(),
            ..SceneConfig::default()
        })
    }

    /// Create an empty scene from a configuration
    pub fn with_config(config: &SceneConfig) -> Self {
        log::debug!("Creating scene '{}'", config.name);
        Self {
            core: Rc::new(SceneCore {
                name: config.name.clone(),
                objects: RefCell::new(Vec::with_capacity(config.object_capacity)),
                components: RefCell::new(BehaviorSet::with_capacity(config.component_capacity)),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Name used in logs and errors
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Non-owning handle to this scene
    pub fn downgrade(&self) -> WeakScene {
        WeakScene {
            core: Rc::downgrade(&self.core),
        }
    }

    /// Whether both handles refer to the same scene
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    /// Whether [`dispose`](Self::dispose) has run
    pub fn is_disposed(&self) -> bool {
        self.core.disposed.get()
    }

    /// Member game objects, in insertion order
    pub fn game_objects(&self) -> Vec<GameObject> {
        self.core.objects.borrow().clone()
    }

    /// Number of member game objects
    pub fn game_object_count(&self) -> usize {
        self.core.objects.borrow().len()
    }

    /// Whether `object` is a member of this scene
    pub fn contains(&self, object: &GameObject) -> bool {
        self.core.objects.borrow().iter().any(|member| member.ptr_eq(object))
    }

    /// Number of attached scene components
    pub fn component_count(&self) -> usize {
        self.core.components.borrow().len()
    }

    fn objects_mut(&self) -> RefMut<'_, Vec<GameObject>> {
        match self.core.objects.try_borrow_mut() {
            Ok(objects) => objects,
            Err(_) => panic!("game objects of scene '{}' modified during traversal", self.core.name),
        }
    }

    fn components_mut(&self) -> RefMut<'_, BehaviorSet<dyn SceneComponent>> {
        match self.core.components.try_borrow_mut() {
            Ok(components) => components,
            Err(_) => panic!("components of scene '{}' modified during traversal", self.core.name),
        }
    }

    /// Panic if the game object list is currently being traversed
    pub(crate) fn assert_not_traversing(&self) {
        drop(self.objects_mut());
    }

    /// Append `object` and cascade `on_added_to_scene` to its components
    ///
    /// A game object that belongs to another scene is removed from it first.
    ///
    /// # Errors
    /// [`CompositionError::DuplicateGameObject`] if `object` is already a
    /// member of this scene; [`CompositionError::Disposed`] if the scene or the
    /// game object has been disposed.
    ///
    /// # Panics
    /// Panics when called while this scene's game objects are being traversed.
    pub fn add_game_object(&self, object: &GameObject) -> Result<(), CompositionError> {
        if self.is_disposed() {
            return Err(CompositionError::Disposed(self.core.name.clone()));
        }
        if object.is_disposed() {
            return Err(CompositionError::Disposed(object.name().to_string()));
        }
        drop(self.objects_mut());

        if let Some(current) = object.scene() {
            if current.ptr_eq(self) {
                log::warn!("GameObject '{}' added twice to scene '{}'", object.name(), self.core.name);
                return Err(CompositionError::DuplicateGameObject {
                    object: object.name().to_string(),
                    scene: self.core.name.clone(),
                });
            }
            current.remove_game_object(object);
        }

        self.objects_mut().push(object.clone());
        log::debug!("Added GameObject '{}' to scene '{}'", object.name(), self.core.name);
        object.on_added_to_scene(Some(self));
        Ok(())
    }

    /// Remove `object` and cascade `on_removed_from_scene` to its components
    ///
    /// Returns `false` if `object` is not a member.
    ///
    /// # Panics
    /// Panics when called while this scene's game objects are being traversed.
    pub fn remove_game_object(&self, object: &GameObject) -> bool {
        let removed = {
            let mut objects = self.objects_mut();
            let position = objects.iter().position(|member| member.ptr_eq(object));
            position.map(|position| objects.remove(position))
        };

        match removed {
            Some(object) => {
                log::debug!("Removed GameObject '{}' from scene '{}'", object.name(), self.core.name);
                object.on_added_to_scene(None);
                true
            }
            None => false,
        }
    }

    /// Attach a scene component
    ///
    /// A component attached to another scene is removed from it first. Fires
    /// `on_attached` then `on_added_to_scene`.
    ///
    /// # Errors
    /// [`CompositionError::DuplicateComponent`] if a scene component of the
    /// same type or family is already attached; [`CompositionError::Disposed`]
    /// if the scene has been disposed.
    ///
    /// # Panics
    /// Panics when called while this scene's components are being traversed.
    pub fn add_component<T: SceneComponent + Hierarchy>(&self, component: Rc<RefCell<T>>) -> Result<(), CompositionError> {
        if self.is_disposed() {
            return Err(CompositionError::Disposed(self.core.name.clone()));
        }
        drop(self.components_mut());

        if let Err(err) = self.core.components.borrow().check::<T>() {
            log::warn!("Rejected scene component for '{}': {err}", self.core.name);
            return Err(CompositionError::DuplicateComponent(err));
        }

        let previous = component.borrow().base().scene();
        if let Some(previous) = previous.filter(|previous| !previous.ptr_eq(self)) {
            log::debug!(
                "Moving {} from scene '{}' to '{}'",
                std::any::type_name::<T>(),
                previous.name(),
                self.core.name
            );
            previous.remove_component_by_id(TypeId::of::<T>());
        }

        let erased: Rc<RefCell<dyn SceneComponent>> = component.clone();
        self.components_mut()
            .insert(&component, erased)
            .map_err(CompositionError::DuplicateComponent)?;
        log::debug!("Attached {} to scene '{}'", std::any::type_name::<T>(), self.core.name);

        behavior::attach(&mut *component.borrow_mut(), self.downgrade(), true);
        Ok(())
    }

    /// Scene component registered under `U`
    pub fn get_component<U: ?Sized + 'static>(&self) -> Option<Rc<RefCell<U>>> {
        self.core.components.borrow().get::<U>()
    }

    /// Same as [`get_component`](Self::get_component)
    pub fn try_get_component<U: ?Sized + 'static>(&self) -> Option<Rc<RefCell<U>>> {
        self.get_component::<U>()
    }

    /// Whether any scene component claims `U`
    pub fn has_component<U: ?Sized + 'static>(&self) -> bool {
        self.has_component_id(TypeId::of::<U>())
    }

    /// Whether any scene component claims the type `id`
    pub fn has_component_id(&self, id: TypeId) -> bool {
        self.core.components.borrow().contains(id)
    }

    /// Scene component claiming the type `id`
    pub fn get_component_by_id(&self, id: TypeId) -> Option<Rc<RefCell<dyn SceneComponent>>> {
        self.core.components.borrow().get_erased(id)
    }

    /// Detach the scene component claiming `U`; no-op if absent
    ///
    /// # Panics
    /// Panics when called while this scene's components are being traversed.
    pub fn remove_component<U: ?Sized + 'static>(&self) -> Option<Rc<RefCell<dyn SceneComponent>>> {
        self.remove_component_by_id(TypeId::of::<U>())
    }

    /// Detach the scene component claiming the type `id`
    ///
    /// Fires `on_removed_from_scene` then `on_detached`.
    ///
    /// # Panics
    /// Panics when called while this scene's components are being traversed.
    pub fn remove_component_by_id(&self, id: TypeId) -> Option<Rc<RefCell<dyn SceneComponent>>> {
        let removed = self.components_mut().remove(id)?;
        log::debug!("Detached scene component from '{}'", self.core.name);
        behavior::detach(&mut *removed.borrow_mut(), true);
        Some(removed)
    }

    /// Update enabled scene components, then enabled game objects
    pub fn update(&self, delta_time: f32) {
        {
            let components = self.core.components.borrow();
            for component in components.iter() {
                let mut component = component.borrow_mut();
                if component.base().is_enabled() {
                    component.update(delta_time);
                }
            }
        }

        let objects = self.core.objects.borrow();
        for object in objects.iter().filter(|object| object.is_enabled()) {
            object.update(delta_time);
        }
    }

    /// Draw drawable scene components, then drawable game objects
    pub fn draw(&self) {
        {
            let components = self.core.components.borrow();
            for component in components.iter() {
                let mut component = component.borrow_mut();
                if component.base().is_drawable() {
                    component.draw();
                }
            }
        }

        let objects = self.core.objects.borrow();
        for object in objects.iter().filter(|object| object.is_drawable()) {
            object.draw();
        }
    }

    /// Dispose scene components, then every member game object
    ///
    /// Game objects are disposed from a snapshot of the member list, since each
    /// one removes itself from the scene while being disposed. Calling this
    /// again has no effect.
    ///
    /// # Panics
    /// Panics when called while this scene is being traversed.
    pub fn dispose(&self) {
        if self.core.disposed.replace(true) {
            return;
        }
        log::debug!("Disposing scene '{}'", self.core.name);

        let components = self.components_mut().drain();
        for component in components {
            let mut component = component.borrow_mut();
            behavior::detach(&mut *component, true);
            component.dispose();
        }

        let snapshot = self.game_objects();
        for object in &snapshot {
            object.dispose();
        }
        log::debug!("Scene '{}' disposed {} game objects", self.core.name, snapshot.len());
    }
}

impl Drop for SceneCore {
    fn drop(&mut self) {
        for component in self.components.get_mut().drain() {
            if let Ok(mut component) = component.try_borrow_mut() {
                behavior::detach(&mut *component, true);
            }
        }
        for object in self.objects.get_mut().drain(..) {
            object.on_added_to_scene(None);
        }
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.core.name)
            .field("game_objects", &self.game_object_count())
            .field("components", &self.component_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
