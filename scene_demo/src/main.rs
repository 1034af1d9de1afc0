//! Scene composition demo
//!
//! Builds a small scene, runs a fixed number of frames and tears it down.
//! Pass a `.toml` or `.ron` scene config path as the first argument to
//! override the default scene settings.

use std::cell::RefCell;
use std::rc::Rc;

use scene_core::foundation::logging;
use scene_core::prelude::*;

const FRAME_COUNT: u32 = 120;
const DELTA_TIME: f32 = 1.0 / 60.0;

/// Family of components that submit something to draw
trait Drawable: Component {
    fn label(&self) -> &str;
}

/// Moves its game object at a constant velocity
struct Mover {
    base: ComponentBase,
    velocity: Vec3,
}

impl Mover {
    fn new(velocity: Vec3) -> Self {
        Self {
            base: ComponentBase::new(),
            velocity,
        }
    }
}

impl Behavior for Mover {
    type Owner = WeakGameObject;

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn update(&mut self, delta_time: f32) {
        if let Some(object) = self.base.game_object() {
            object.transform_mut().translate(self.velocity * delta_time);
        }
    }
}

impl Hierarchy for Mover {
    fn lineage() -> Lineage<Self> {
        Lineage::<Self>::new().extends::<dyn Component>(|rc| rc)
    }
}

/// Stand-in for a mesh renderer; counts its draw calls
struct MeshDrawer {
    base: ComponentBase,
    mesh: String,
    draw_calls: u32,
}

impl MeshDrawer {
    fn new(mesh: &str) -> Self {
        Self {
            base: ComponentBase::new(),
            mesh: mesh.to_string(),
            draw_calls: 0,
        }
    }
}

impl Behavior for MeshDrawer {
    type Owner = WeakGameObject;

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn on_added_to_scene(&mut self) {
        if let Some(scene) = self.base.scene() {
            log::info!("{} joined scene '{}'", self.mesh, scene.name());
        }
    }

    fn draw(&mut self) {
        self.draw_calls += 1;
        if let Some(object) = self.base.game_object() {
            let model = object.transform().to_matrix();
            log::trace!("Drawing {} with model matrix {model:?}", self.mesh);
        }
    }

    fn dispose(&mut self) {
        log::info!("Releasing {} after {} draw calls", self.mesh, self.draw_calls);
    }
}

impl Drawable for MeshDrawer {
    fn label(&self) -> &str {
        &self.mesh
    }
}

impl Hierarchy for MeshDrawer {
    fn lineage() -> Lineage<Self> {
        Lineage::<Self>::new()
            .extends::<dyn Drawable>(|rc| rc)
            .extends::<dyn Component>(|rc| rc)
    }
}

/// Scene-wide frame statistics
#[derive(Default)]
struct FrameStats {
    base: SceneComponentBase,
    frames: u32,
    elapsed: f32,
}

impl Behavior for FrameStats {
    type Owner = WeakScene;

    fn base(&self) -> &SceneComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneComponentBase {
        &mut self.base
    }

    fn update(&mut self, delta_time: f32) {
        self.frames += 1;
        self.elapsed += delta_time;
        if self.frames % 60 == 0 {
            log::info!("Frame {} ({:.2}s)", self.frames, self.elapsed);
        }
    }

    fn dispose(&mut self) {
        log::info!("Ran {} frames in {:.2}s of scene time", self.frames, self.elapsed);
    }
}

impl Hierarchy for FrameStats {
    fn lineage() -> Lineage<Self> {
        Lineage::<Self>::new().extends::<dyn SceneComponent>(|rc| rc)
    }
}

fn load_config() -> Result<SceneConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading scene config from {path}");
            SceneConfig::load_from_file(&path)
        }
        None => Ok(SceneConfig {
            name: "Demo".to_string(),
            ..SceneConfig::default()
        }),
    }
}

fn build_scene(config: &SceneConfig) -> Result<Scene, CompositionError> {
    let scene = Scene::with_config(config);
    scene.add_component(Rc::new(RefCell::new(FrameStats::default())))?;

    let ship = GameObject::new("Ship");
    ship.add_component(Rc::new(RefCell::new(Mover::new(Vec3::new(1.0, 0.0, 0.0)))))?;
    ship.add_component(Rc::new(RefCell::new(MeshDrawer::new("ship.obj"))))?;
    scene.add_game_object(&ship)?;

    let asteroid = GameObject::new("Asteroid");
    asteroid.add_component(Rc::new(RefCell::new(MeshDrawer::new("asteroid.obj"))))?;
    scene.add_game_object(&asteroid)?;

    // A second drawable on the same object is rejected by family.
    if let Err(err) = ship.add_component(Rc::new(RefCell::new(MeshDrawer::new("exhaust.obj")))) {
        log::warn!("{err}");
    }

    Ok(scene)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = load_config()?;
    let scene = build_scene(&config)?;
    log::info!("Built {scene:?}");

    for _ in 0..FRAME_COUNT {
        scene.update(DELTA_TIME);
        scene.draw();
    }

    for object in scene.game_objects() {
        let label = object
            .get_component::<dyn Drawable>()
            .map(|drawable| drawable.borrow().label().to_string())
            .unwrap_or_default();
        log::info!("{} [{label}] at {:?}", object.name(), object.transform().position);
    }

    scene.dispose();
    Ok(())
}
