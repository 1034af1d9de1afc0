//! Scene management
//!
//! The scene is the root of composition: it owns game objects and scene-level
//! components and drives their per-frame `update`/`draw`.

mod root;

pub use root::{Scene, WeakScene};
