//! Behavior base and lifecycle transitions
//!
//! A behavior is an attachable unit of per-frame logic. Concrete behaviors embed
//! a [`BehaviorBase`] and implement [`Behavior`], overriding only the hooks they
//! care about; every hook defaults to a no-op.
//!
//! Lifecycle: free-standing -> attached (`on_attached`) -> in a scene
//! (`on_added_to_scene`) -> out of the scene (`on_removed_from_scene`) ->
//! detached (`on_detached`) -> disposed (`dispose`). Containers drive every
//! transition; behaviors never change their own owner.

/// State every behavior carries, whatever its container
#[derive(Debug, Clone)]
pub struct BehaviorBase<W> {
    enabled: bool,
    drawable: bool,
    owner: Option<W>,
}

impl<W> Default for BehaviorBase<W> {
    fn default() -> Self {
        Self {
            enabled: true,
            drawable: true,
            owner: None,
        }
    }
}

impl<W> BehaviorBase<W> {
    /// Enabled, drawable and detached
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the owner calls `update`
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Include or exclude from `update`
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the owner calls `draw`
    pub fn is_drawable(&self) -> bool {
        self.drawable
    }

    /// Include or exclude from `draw`
    pub fn set_drawable(&mut self, drawable: bool) {
        self.drawable = drawable;
    }

    /// Back-reference to the current owner, `None` while detached
    pub fn owner(&self) -> Option<&W> {
        self.owner.as_ref()
    }

    /// Whether the behavior currently belongs to a container
    pub fn is_attached(&self) -> bool {
        self.owner.is_some()
    }
}

/// Lifecycle and per-frame hooks of an attachable behavior
///
/// `Owner` is the weak handle type of the container: a
/// [`WeakGameObject`](super::WeakGameObject) for components, a
/// [`WeakScene`](crate::scene::WeakScene) for scene components.
pub trait Behavior: 'static {
    /// Weak handle to the container this behavior can be attached to
    type Owner: Clone + 'static;

    /// Embedded base state
    fn base(&self) -> &BehaviorBase<Self::Owner>;

    /// Embedded base state, mutably
    fn base_mut(&mut self) -> &mut BehaviorBase<Self::Owner>;

    /// Called right after the owner is set
    fn on_attached(&mut self) {}

    /// Called right before the owner is cleared; the owner is still reachable
    fn on_detached(&mut self) {}

    /// Called once the behavior becomes part of a scene
    fn on_added_to_scene(&mut self) {}

    /// Called before the behavior leaves its scene; the scene is still reachable
    fn on_removed_from_scene(&mut self) {}

    /// Per-frame logic, only called while enabled
    fn update(&mut self, _delta_time: f32) {}

    /// Per-frame drawing, only called while drawable
    fn draw(&mut self) {}

    /// Release resources; called at most once, after the behavior was detached
    fn dispose(&mut self) {}
}

/// Move `behavior` to `owner`, firing `on_detached` for the previous owner
/// and `on_attached` for the new one
///
/// Both hooks fire even when `owner` is the current owner.
pub(crate) fn set_owner<B: Behavior + ?Sized>(behavior: &mut B, owner: Option<B::Owner>) {
    if behavior.base().owner.is_some() {
        behavior.on_detached();
    }
    let attaching = owner.is_some();
    behavior.base_mut().owner = owner;
    if attaching {
        behavior.on_attached();
    }
}

/// Fire the scene-membership hooks for a transition
pub(crate) fn set_scene_membership<B: Behavior + ?Sized>(behavior: &mut B, leaving: bool, entering: bool) {
    if leaving {
        behavior.on_removed_from_scene();
    }
    if entering {
        behavior.on_added_to_scene();
    }
}

/// Attach to `owner`, then join the scene if the owner is in one
pub(crate) fn attach<B: Behavior + ?Sized>(behavior: &mut B, owner: B::Owner, in_scene: bool) {
    set_owner(behavior, Some(owner));
    set_scene_membership(behavior, false, in_scene);
}

/// Leave the scene if the owner is in one, then detach
pub(crate) fn detach<B: Behavior + ?Sized>(behavior: &mut B, in_scene: bool) {
    set_scene_membership(behavior, in_scene, false);
    set_owner(behavior, None);
}
