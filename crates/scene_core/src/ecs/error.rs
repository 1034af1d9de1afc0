//! Composition errors surfaced by game objects and scenes

use thiserror::Error;

use super::registry::RegistryError;

/// Errors raised when composing game objects and scenes
///
/// All of them are programmer errors: the composition was invalid and nothing
/// was changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// A behavior of the same type or family is already attached
    #[error("Duplicate component: {0}")]
    DuplicateComponent(#[source] RegistryError),

    /// The game object is already a member of this scene
    #[error("GameObject '{object}' is already in scene '{scene}'")]
    DuplicateGameObject {
        /// Name of the game object
        object: String,
        /// Name of the scene
        scene: String,
    },

    /// The container has been disposed
    #[error("'{0}' has been disposed")]
    Disposed(String),
}
