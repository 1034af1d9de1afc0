//! Entity/component composition
//!
//! Provides the type-hierarchy registry, the behavior abstraction and the
//! game object container.

pub mod registry;
pub(crate) mod behavior;
pub(crate) mod behavior_set;
pub mod component;
pub mod error;
pub mod game_object;
pub mod transform;

pub use registry::{Conflict, Hierarchy, Lineage, RegistryError, TypeHierarchyRegistry, TypeKey};
pub use behavior::{Behavior, BehaviorBase};
pub use component::{Component, ComponentBase, SceneComponent, SceneComponentBase};
pub use error::CompositionError;
pub use game_object::{GameObject, WeakGameObject};
pub use transform::Transform;

#[cfg(test)]
pub(crate) mod tests;
