//! Component and scene component families
//!
//! Both are plain [`Behavior`]s; they differ only in the container that owns
//! them. Any behavior whose `Owner` is a [`WeakGameObject`] is a [`Component`],
//! any behavior whose `Owner` is a [`WeakScene`] is a [`SceneComponent`].

use super::behavior::{Behavior, BehaviorBase};
use super::game_object::{GameObject, WeakGameObject};
use crate::scene::{Scene, WeakScene};

/// Behavior owned by a [`GameObject`]
pub trait Component: Behavior<Owner = WeakGameObject> {}

impl<T: Behavior<Owner = WeakGameObject>> Component for T {}

/// Behavior owned directly by a [`Scene`]
pub trait SceneComponent: Behavior<Owner = WeakScene> {}

impl<T: Behavior<Owner = WeakScene>> SceneComponent for T {}

/// Base state embedded in every component
pub type ComponentBase = BehaviorBase<WeakGameObject>;

/// Base state embedded in every scene component
pub type SceneComponentBase = BehaviorBase<WeakScene>;

impl BehaviorBase<WeakGameObject> {
    /// Owning game object, if attached and still alive
    pub fn game_object(&self) -> Option<GameObject> {
        self.owner().and_then(WeakGameObject::upgrade)
    }

    /// Scene of the owning game object
    pub fn scene(&self) -> Option<Scene> {
        self.game_object().and_then(|object| object.scene())
    }
}

impl BehaviorBase<WeakScene> {
    /// Owning scene, if attached and still alive
    pub fn scene(&self) -> Option<Scene> {
        self.owner().and_then(WeakScene::upgrade)
    }
}
