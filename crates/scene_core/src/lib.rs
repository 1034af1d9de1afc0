//! # Scene Core
//!
//! The entity/component composition core of the engine: the mechanism by which
//! independently developed behaviors (rendering, physics, audio, scripting) are
//! attached to runtime objects and traversed once per frame.
//!
//! ## Features
//!
//! - **Type-Hierarchy Registry**: O(1) lookup of a behavior by its concrete type
//!   or by any family it declares, with chain-wide exclusivity
//! - **Behaviors**: attachable units with lifecycle hooks and per-frame
//!   `update`/`draw`
//! - **GameObjects**: own a [`Transform`](ecs::Transform) and an ordered set of
//!   components
//! - **Scenes**: root of the per-frame traversal, own scene-level components
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use scene_core::prelude::*;
//!
//! #[derive(Default)]
//! struct Spinner {
//!     base: ComponentBase,
//! }
//!
//! impl Behavior for Spinner {
//!     type Owner = WeakGameObject;
//!
//!     fn base(&self) -> &ComponentBase { &self.base }
//!     fn base_mut(&mut self) -> &mut ComponentBase { &mut self.base }
//!
//!     fn update(&mut self, delta_time: f32) {
//!         if let Some(object) = self.base.game_object() {
//!             object.transform_mut().translate(Vec3::new(delta_time, 0.0, 0.0));
//!         }
//!     }
//! }
//!
//! impl Hierarchy for Spinner {
//!     fn lineage() -> Lineage<Self> {
//!         Lineage::<Self>::new().extends::<dyn Component>(|rc| rc)
//!     }
//! }
//!
//! let scene = Scene::new("Level");
//! let object = GameObject::new("Ship");
//! object.add_component(Rc::new(RefCell::new(Spinner::default()))).unwrap();
//! scene.add_game_object(&object).unwrap();
//!
//! scene.update(0.5);
//! scene.draw();
//! assert_eq!(object.transform().position.x, 0.5);
//!
//! scene.dispose();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        ecs::{
            Behavior, BehaviorBase, Component, ComponentBase, CompositionError,
            GameObject, Hierarchy, Lineage, SceneComponent, SceneComponentBase,
            Transform, TypeHierarchyRegistry, TypeKey, WeakGameObject,
        },
        foundation::math::{Mat4, Vec3},
        scene::{Scene, WeakScene},
    };
}
