//! End-to-end lifecycle scenarios across scenes, game objects and components

use std::cell::RefCell;
use std::rc::Rc;

use super::recorders::{AudioMixer, Beacon, Light, Log, MeshRenderer, Renderable, SpriteRenderer};
use crate::ecs::{Behavior, CompositionError, GameObject};
use crate::foundation::logging;
use crate::scene::Scene;

#[test]
fn test_renderer_joins_scene_and_draws_once() {
    logging::try_init();
    let log = Log::default();
    let scene = Scene::new("Level");
    let object = GameObject::new("Teapot");
    let renderer = MeshRenderer::shared(&log);

    object.add_component(renderer.clone()).unwrap();
    assert_eq!(log.entries(), ["MeshRenderer.attached"]);

    scene.add_game_object(&object).unwrap();
    assert_eq!(log.entries(), ["MeshRenderer.attached", "MeshRenderer.added_to_scene"]);

    log.clear();
    scene.draw();
    assert_eq!(log.entries(), ["MeshRenderer.draw"]);
    assert!(renderer.borrow().base().scene().unwrap().ptr_eq(&scene));
}

#[test]
fn test_removed_renderer_is_no_longer_drawn() {
    let log = Log::default();
    let scene = Scene::new("Level");
    let object = GameObject::new("Teapot");
    object.add_component(MeshRenderer::shared(&log)).unwrap();
    scene.add_game_object(&object).unwrap();
    scene.draw();

    assert!(object.remove_component::<MeshRenderer>().is_some());
    assert!(object.get_component::<MeshRenderer>().is_none());
    scene.draw();

    assert_eq!(log.count("MeshRenderer.draw"), 1);
    assert_eq!(log.count("MeshRenderer.detached"), 1);
    assert_eq!(log.count("MeshRenderer.removed_from_scene"), 1);
}

#[test]
fn test_duplicate_light_leaves_original_in_place() {
    let log = Log::default();
    let object = GameObject::new("Lamp Post");
    let original = Light::shared(&log);
    object.add_component(original.clone()).unwrap();

    let err = object.add_component(Light::shared(&log)).unwrap_err();

    assert!(matches!(err, CompositionError::DuplicateComponent(_)));
    assert!(Rc::ptr_eq(&object.get_component::<Light>().unwrap(), &original));
    assert_eq!(log.count("Light.attached"), 1);
}

#[test]
fn test_get_returns_most_recent_instance_until_removed() {
    let log = Log::default();
    let object = GameObject::new("Lamp Post");

    let first = Light::shared(&log);
    object.add_component(first.clone()).unwrap();
    assert!(Rc::ptr_eq(&object.get_component::<Light>().unwrap(), &first));

    object.remove_component::<Light>();
    let second = Light::shared(&log);
    object.add_component(second.clone()).unwrap();
    assert!(Rc::ptr_eq(&object.get_component::<Light>().unwrap(), &second));

    object.remove_component::<Light>();
    assert!(object.get_component::<Light>().is_none());
}

#[test]
fn test_family_conflict_across_siblings() {
    let log = Log::default();
    let object = GameObject::new("Billboard");
    object.add_component(SpriteRenderer::shared(&log)).unwrap();

    assert!(object.add_component(MeshRenderer::shared(&log)).is_err());
    assert_eq!(object.get_component::<dyn Renderable>().unwrap().borrow().layer(), 2);
}

#[test]
fn test_reparenting_moves_component_between_objects() {
    let log = Log::default();
    let first = GameObject::new("First");
    let second = GameObject::new("Second");
    let light = Light::shared(&log);

    first.add_component(light.clone()).unwrap();
    log.clear();

    second.add_component(light.clone()).unwrap();

    assert!(!first.has_component::<Light>());
    assert!(second.has_component::<Light>());
    assert_eq!(log.entries(), ["Light.detached", "Light.attached"]);
    assert!(light.borrow().base().game_object().unwrap().ptr_eq(&second));
}

#[test]
fn test_failed_reparent_keeps_previous_owner() {
    let log = Log::default();
    let first = GameObject::new("First");
    let second = GameObject::new("Second");
    let mesh = MeshRenderer::shared(&log);
    first.add_component(mesh.clone()).unwrap();
    second.add_component(SpriteRenderer::shared(&log)).unwrap();
    log.clear();

    assert!(second.add_component(mesh.clone()).is_err());

    assert!(first.has_component::<MeshRenderer>());
    assert!(mesh.borrow().base().game_object().unwrap().ptr_eq(&first));
    assert!(log.entries().is_empty());
}

#[test]
fn test_component_added_to_object_already_in_scene() {
    let log = Log::default();
    let scene = Scene::new("Level");
    let object = GameObject::new("Teapot");
    scene.add_game_object(&object).unwrap();

    object.add_component(Light::shared(&log)).unwrap();
    object.remove_component::<Light>();

    assert_eq!(
        log.entries(),
        ["Light.attached", "Light.added_to_scene", "Light.removed_from_scene", "Light.detached"]
    );
}

#[test]
fn test_membership_hooks_see_the_scene() {
    let scene = Scene::new("Hangar");
    let object = GameObject::new("Ship");
    let beacon = Rc::new(RefCell::new(Beacon::default()));
    object.add_component(beacon.clone()).unwrap();

    scene.add_game_object(&object).unwrap();
    assert_eq!(beacon.borrow().joined.as_deref(), Some("Hangar"));

    scene.remove_game_object(&object);
    assert_eq!(beacon.borrow().left.as_deref(), Some("Hangar"));
    assert!(object.scene().is_none());
}

#[test]
fn test_dispose_twice_is_idempotent() {
    let log = Log::default();
    let scene = Scene::new("Level");
    let object = GameObject::new("Teapot");
    object.add_component(Light::shared(&log)).unwrap();
    scene.add_game_object(&object).unwrap();

    object.dispose();
    object.dispose();

    assert_eq!(log.count("Light.disposed"), 1);
    assert_eq!(log.count("Light.removed_from_scene"), 1);
    assert_eq!(log.count("Light.detached"), 1);
    assert!(!scene.contains(&object));
    assert!(object.scene().is_none());
}

#[test]
fn test_dispose_order_within_scene() {
    let log = Log::default();
    let scene = Scene::new("Level");
    let object = GameObject::new("Teapot");
    object.add_component(MeshRenderer::shared(&log)).unwrap();
    object.add_component(Light::shared(&log)).unwrap();
    scene.add_game_object(&object).unwrap();
    log.clear();

    object.dispose();

    assert_eq!(
        log.entries(),
        [
            "MeshRenderer.removed_from_scene",
            "MeshRenderer.detached",
            "MeshRenderer.disposed",
            "Light.removed_from_scene",
            "Light.detached",
            "Light.disposed",
        ]
    );
}

#[test]
fn test_dropped_game_object_detaches_its_components() {
    let log = Log::default();
    let light = Light::shared(&log);
    let first = GameObject::new("First");
    first.add_component(light.clone()).unwrap();

    drop(first);

    assert!(!light.borrow().base().is_attached());
    assert_eq!(log.entries(), ["Light.attached", "Light.detached"]);

    log.clear();
    let second = GameObject::new("Second");
    second.add_component(light.clone()).unwrap();

    assert_eq!(log.entries(), ["Light.attached"]);
    assert!(light.borrow().base().game_object().unwrap().ptr_eq(&second));
}

#[test]
fn test_dropped_scene_releases_its_members() {
    let log = Log::default();
    let scene = Scene::new("Level");
    let object = GameObject::new("Ship");
    let mixer = AudioMixer::shared(&log);
    object.add_component(Light::shared(&log)).unwrap();
    scene.add_game_object(&object).unwrap();
    scene.add_component(mixer.clone()).unwrap();
    log.clear();

    drop(scene);

    assert_eq!(
        log.entries(),
        ["AudioMixer.removed_from_scene", "AudioMixer.detached", "Light.removed_from_scene"]
    );
    assert!(!mixer.borrow().base().is_attached());
    assert!(object.scene().is_none());
    assert_eq!(object.component_count(), 1);

    log.clear();
    let next = Scene::new("Next");
    next.add_game_object(&object).unwrap();
    assert_eq!(log.entries(), ["Light.added_to_scene"]);
}
