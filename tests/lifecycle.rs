use bevy_ecs::prelude::*;
use cubemap_skybox::components::AttachedCubemaps;
use cubemap_skybox::geometry::BoxGeometry;
use cubemap_skybox::mesh::Mesh;
use cubemap_skybox::{
    CubeTextureHandle, CubeTextureLoader, Cubemap, CubemapError, Object3D, ShaderLib,
};

fn host() -> (World, Schedule) {
    let mut world = World::default();
    world.insert_resource(ShaderLib::builtin());
    world.insert_resource(CubeTextureLoader::new());
    let mut schedule = Schedule::default();
    Cubemap::register(&mut world, &mut schedule).unwrap();
    (world, schedule)
}

fn spawn_cubemap(world: &mut World, attributes: &str) -> Entity {
    world.spawn(Cubemap::from_attributes(attributes).unwrap()).id()
}

fn skybox(world: &World, entity: Entity) -> Option<&Mesh> {
    world.get::<Object3D>(entity)?.get(Object3D::MESH)
}

fn texture_of(world: &World, entity: Entity) -> CubeTextureHandle {
    skybox(world, entity).unwrap().cube_texture().unwrap()
}

#[test]
fn register_fails_without_host() {
    let mut world = World::default();
    let mut schedule = Schedule::default();
    assert!(matches!(
        Cubemap::register(&mut world, &mut schedule),
        Err(CubemapError::HostUnavailable("ShaderLib"))
    ));

    world.insert_resource(ShaderLib::builtin());
    assert!(matches!(
        Cubemap::register(&mut world, &mut schedule),
        Err(CubemapError::HostUnavailable("CubeTextureLoader"))
    ));

    world.insert_resource(CubeTextureLoader::new());
    assert!(Cubemap::register(&mut world, &mut schedule).is_ok());
}

#[test]
fn attaching_builds_skybox_mesh() {
    let (mut world, mut schedule) = host();
    let entity = spawn_cubemap(&mut world, "folder: skies/day/; nameMap: posy=top negy=bottom");
    schedule.run(&mut world);

    let mesh = skybox(&world, entity).expect("skybox attached");
    assert_eq!(mesh.geometry, BoxGeometry::cube(5000));

    let texture = mesh.cube_texture().unwrap();
    let loader = world.resource::<CubeTextureLoader>();
    assert_eq!(
        loader.urls(texture).unwrap(),
        &[
            "skies/day/posx.jpg",
            "skies/day/negx.jpg",
            "skies/day/top.jpg",
            "skies/day/bottom.jpg",
            "skies/day/posz.jpg",
            "skies/day/negz.jpg",
        ]
        .map(String::from)
    );
    assert_eq!(world.resource::<AttachedCubemaps>().texture(entity), Some(texture));
}

#[test]
fn unchanged_cubemap_is_not_rebuilt() {
    let (mut world, mut schedule) = host();
    let entity = spawn_cubemap(&mut world, "folder: a/");
    schedule.run(&mut world);
    let first = texture_of(&world, entity);

    schedule.run(&mut world);
    schedule.run(&mut world);
    assert_eq!(texture_of(&world, entity), first);
    assert_eq!(world.resource::<CubeTextureLoader>().len(), 1);
}

#[test]
fn reconfiguring_replaces_mesh() {
    let (mut world, mut schedule) = host();
    let entity = spawn_cubemap(&mut world, "folder: a/");
    schedule.run(&mut world);
    let first = texture_of(&world, entity);

    world
        .get_mut::<Cubemap>(entity)
        .unwrap()
        .apply_attributes("folder: b/; edgeLength: 10")
        .unwrap();
    schedule.run(&mut world);

    let object3d = world.get::<Object3D>(entity).unwrap();
    assert_eq!(object3d.len(), 1);
    let mesh = object3d.get(Object3D::MESH).unwrap();
    assert_eq!(mesh.geometry, BoxGeometry::cube(10));

    let second = mesh.cube_texture().unwrap();
    assert_ne!(first, second);
    let loader = world.resource::<CubeTextureLoader>();
    assert!(!loader.contains(first));
    assert_eq!(loader.urls(second).unwrap()[0], "b/posx.jpg");
    assert_eq!(loader.len(), 1);
}

#[test]
fn removing_detaches_exactly_its_mesh() {
    let (mut world, mut schedule) = host();
    let other = Mesh::new(
        BoxGeometry::new(1.0, 1.0, 1.0),
        world.resource::<ShaderLib>().instantiate(ShaderLib::CUBE).unwrap(),
    );
    let entity = world
        .spawn((Cubemap::new("a/"), Object3D::with("marker", other.clone())))
        .id();
    schedule.run(&mut world);
    assert_eq!(world.get::<Object3D>(entity).unwrap().len(), 2);

    world.entity_mut(entity).remove::<Cubemap>();
    schedule.run(&mut world);

    let object3d = world.get::<Object3D>(entity).unwrap();
    assert!(object3d.get(Object3D::MESH).is_none());
    assert_eq!(object3d.get("marker"), Some(&other));
    assert!(world.resource::<CubeTextureLoader>().is_empty());
    assert!(world.resource::<AttachedCubemaps>().is_empty());
}

#[test]
fn despawning_releases_texture() {
    let (mut world, mut schedule) = host();
    let entity = spawn_cubemap(&mut world, "folder: a/");
    schedule.run(&mut world);
    assert_eq!(world.resource::<CubeTextureLoader>().len(), 1);

    world.despawn(entity);
    schedule.run(&mut world);
    assert!(world.resource::<CubeTextureLoader>().is_empty());
    assert!(world.resource::<AttachedCubemaps>().is_empty());
}

#[test]
fn readding_after_removal_attaches_again() {
    let (mut world, mut schedule) = host();
    let entity = spawn_cubemap(&mut world, "folder: a/");
    schedule.run(&mut world);

    world.entity_mut(entity).remove::<Cubemap>();
    schedule.run(&mut world);
    assert!(skybox(&world, entity).is_none());

    world.entity_mut(entity).insert(Cubemap::new("c/"));
    schedule.run(&mut world);
    let texture = texture_of(&world, entity);
    let loader = world.resource::<CubeTextureLoader>();
    assert_eq!(loader.len(), 1);
    assert_eq!(loader.urls(texture).unwrap()[5], "c/negz.jpg");
}

#[test]
fn skyboxes_get_independent_materials() {
    let (mut world, mut schedule) = host();
    let a = spawn_cubemap(&mut world, "folder: a/");
    let b = spawn_cubemap(&mut world, "folder: b/");
    schedule.run(&mut world);

    assert_ne!(texture_of(&world, a), texture_of(&world, b));
    let template = world.resource::<ShaderLib>().template(ShaderLib::CUBE).unwrap();
    assert_eq!(template.cube_texture("tCube"), None);
    assert!(template.depth_write);
}

#[test]
fn rejected_reconfiguration_keeps_skybox() {
    let (mut world, mut schedule) = host();
    let entity = spawn_cubemap(&mut world, "folder: a/");
    schedule.run(&mut world);
    let first = texture_of(&world, entity);

    assert!(world
        .get_mut::<Cubemap>(entity)
        .unwrap()
        .apply_attributes("edgeLength: nope")
        .is_err());
    schedule.run(&mut world);

    assert_eq!(texture_of(&world, entity), first);
    let loader = world.resource::<CubeTextureLoader>();
    assert!(loader.contains(first));
    assert_eq!(loader.len(), 1);
}

#[test]
fn identical_reconfiguration_keeps_skybox() {
    let (mut world, mut schedule) = host();
    let entity = spawn_cubemap(&mut world, "folder: a/; edgeLength: 10");
    schedule.run(&mut world);
    let first = texture_of(&world, entity);

    world
        .get_mut::<Cubemap>(entity)
        .unwrap()
        .apply_attributes("edgeLength: 10")
        .unwrap();
    schedule.run(&mut world);

    assert_eq!(texture_of(&world, entity), first);
    assert_eq!(world.resource::<CubeTextureLoader>().len(), 1);
    assert_eq!(
        world.resource::<AttachedCubemaps>().config(entity),
        world.get::<Cubemap>(entity)
    );
}
