//! End-to-end manager tests against the shipped assets and the headless device

use std::path::PathBuf;

use render_core::assets::{AssetError, ObjError};
use render_core::foundation::memory::{LinearAllocator, MemoryError};
use render_core::prelude::*;
use render_core::render::{DeviceError, ShaderStage};

fn asset_root() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))
}

fn fixture_root(name: &str) -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures")).join(name)
}

fn config() -> ResourceConfig {
    ResourceConfig::with_asset_root(asset_root())
}

#[test]
fn every_shader_key_is_usable_after_initialize() {
    let _ = render_core::foundation::logging::try_init();
    let mut device = HeadlessDevice::new();
    let mut shaders = ShaderManager::new(config());

    shaders.initialize(&mut device).unwrap();
    assert_eq!(shaders.state(), ManagerState::Ready);
    assert_eq!(device.program_count(), ShaderType::COUNT);

    for &key in ShaderType::ALL {
        let handle = shaders.get(key).unwrap().handle();
        let bound = shaders.use_program(key, &mut device).unwrap();
        assert_eq!(bound.handle(), handle);
        assert_eq!(device.bound_program(), Some(handle));
    }
    assert_eq!(device.bind_count(), ShaderType::COUNT);

    let base2 = shaders.get(ShaderType::BaseShader2).unwrap();
    assert_eq!(base2.uniform_location("uTransform"), Some(0));
    assert_eq!(base2.uniform_location("uTint"), Some(2));
    let model_view = shaders.get(ShaderType::ModelViewShader).unwrap();
    assert!(model_view.uniform_location("uProjection").is_some());
    assert!(model_view.uniform_location("uTint").is_none());

    shaders.release(&mut device);
}

#[test]
fn cube_mesh_is_uploaded() {
    let mut device = HeadlessDevice::new();
    let mut meshes = MeshManager::new(config());

    meshes.initialize(&mut device).unwrap();
    let cube = meshes.get(MeshType::Cube).unwrap();

    // Six quads, four corners each, two triangles each.
    assert_eq!(cube.vertex_count(), 24);
    assert_eq!(cube.index_count(), 36);
    assert_eq!(cube.bounds().min, [-0.5, -0.5, -0.5]);
    assert_eq!(cube.bounds().size(), [1.0, 1.0, 1.0]);
    assert_eq!(device.mesh_counts(cube.handle()), Some((24, 36)));

    let keys: Vec<_> = meshes.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, [MeshType::Cube]);
    meshes.release(&mut device);
}

#[test]
fn lookups_before_initialize_fail() {
    let mut device = HeadlessDevice::new();
    let shaders = ShaderManager::new(config());
    let meshes = MeshManager::new(config());

    assert!(matches!(
        shaders.get(ShaderType::BaseShader),
        Err(ResourceError::NotInitialized { manager: "ShaderManager" })
    ));
    assert!(matches!(
        shaders.use_program(ShaderType::BaseShader, &mut device),
        Err(ResourceError::NotInitialized { .. })
    ));
    assert!(matches!(
        meshes.get(MeshType::Cube),
        Err(ResourceError::NotInitialized { manager: "MeshManager" })
    ));
    assert_eq!(device.bind_count(), 0);
}

#[test]
fn reinitialize_leaves_table_unchanged() {
    let mut device = HeadlessDevice::new();
    let mut shaders = ShaderManager::new(config());
    shaders.initialize(&mut device).unwrap();
    let before: Vec<_> = shaders.iter().map(|(_, program)| program.clone()).collect();

    shaders.initialize(&mut device).unwrap();
    let mut arena = LinearAllocator::new(1024);
    shaders.initialize_with(&mut arena, &mut device).unwrap();

    let after: Vec<_> = shaders.iter().map(|(_, program)| program.clone()).collect();
    assert_eq!(before, after);
    assert_eq!(device.program_count(), ShaderType::COUNT);
    assert_eq!(arena.used(), 0);
    shaders.release(&mut device);
}

#[test]
fn undersized_arena_fails_initialization() {
    let mut device = HeadlessDevice::new();
    let mut config = config();
    config.shader_arena_bytes = 64;
    let mut shaders = ShaderManager::new(config);

    let err = shaders.initialize(&mut device).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Initialization {
            key: "BaseShader",
            source: AssetError::Memory(MemoryError::ArenaExhausted { .. }),
            ..
        }
    ));
    assert_eq!(shaders.state(), ManagerState::Uninitialized);
    assert!(shaders.get(ShaderType::BaseShader).is_err());
    assert_eq!(device.program_count(), 0);
}

#[test]
fn shared_arena_serves_both_managers() {
    let mut device = HeadlessDevice::new();
    let mut arena = LinearAllocator::new(64 * 1024);
    let mut shaders = ShaderManager::new(config());
    let mut meshes = MeshManager::new(config());

    shaders.initialize_with(&mut arena, &mut device).unwrap();
    let after_shaders = arena.used();
    meshes.initialize_with(&mut arena, &mut device).unwrap();
    assert!(arena.used() > after_shaders);

    // Resources do not borrow from the arena once built.
    arena.reset();
    drop(arena);
    assert!(meshes.get(MeshType::Cube).is_ok());
    assert!(shaders.use_program(ShaderType::ModelViewShader, &mut device).is_ok());

    meshes.release(&mut device);
    shaders.release(&mut device);
    assert_eq!(device.mesh_count(), 0);
    assert_eq!(device.program_count(), 0);
}

#[test]
fn failed_shader_releases_earlier_programs() {
    let mut device = HeadlessDevice::new();
    let mut shaders = ShaderManager::new(ResourceConfig::with_asset_root(fixture_root("broken_shader")));

    let err = shaders.initialize(&mut device).unwrap_err();
    match err {
        ResourceError::Initialization {
            manager: "ShaderManager",
            key: "BaseShader2",
            source:
                AssetError::Device(DeviceError::ShaderCompilation {
                    stage: ShaderStage::Fragment,
                    ..
                }),
        } => {}
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(device.program_count(), 0);
    assert_eq!(shaders.state(), ManagerState::Uninitialized);
}

#[test]
fn malformed_mesh_is_reported_with_its_path() {
    let mut device = HeadlessDevice::new();
    let root = fixture_root("broken_mesh");
    let mut meshes = MeshManager::new(ResourceConfig::with_asset_root(&root));

    match meshes.initialize(&mut device).unwrap_err() {
        ResourceError::Initialization {
            key: "Cube",
            source: AssetError::Obj {
                path,
                source: ObjError::InvalidFormat(_),
            },
            ..
        } => assert_eq!(path, root.join("models/cube.obj")),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!meshes.is_initialized());
    assert_eq!(device.mesh_count(), 0);
}

#[test]
fn missing_asset_root_is_an_io_error() {
    let mut device = HeadlessDevice::new();
    let mut meshes = MeshManager::new(ResourceConfig::with_asset_root(fixture_root("does_not_exist")));

    assert!(matches!(
        meshes.initialize(&mut device),
        Err(ResourceError::Initialization {
            source: AssetError::Io { .. },
            ..
        })
    ));
}
