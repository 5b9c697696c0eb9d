//! Asset check tool
//!
//! Initializes the mesh and shader managers from a resource config against
//! the headless device and logs what was loaded. Exits non-zero on the first
//! asset that fails to load.
//!
//! ```text
//! asset_check [config.toml | config.ron]
//! ```
//!
//! Without a config file the assets bundled with `render_core` are checked.

use render_core::foundation::logging;
use render_core::foundation::math::{utils, Mat2, Vec2};
use render_core::prelude::*;

/// Assets shipped with `render_core`, independent of the working directory
const BUNDLED_ASSET_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../crates/render_core/resources");

fn load_config(path: Option<&str>) -> Result<ResourceConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            log::info!("Loading resource config from {path}");
            ResourceConfig::load_from_file(path)?
        }
        None => ResourceConfig::with_asset_root(BUNDLED_ASSET_ROOT),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::try_init();

    let config = load_config(std::env::args().nth(1).as_deref())?;
    check_assets(config)
}

/// Initialize both managers, bind every program and log a summary
fn check_assets(config: ResourceConfig) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Asset root: {}", config.asset_root.display());

    let mut device = HeadlessDevice::new();
    let mut shaders = ShaderManager::new(config.clone());
    let mut meshes = MeshManager::new(config);

    shaders.initialize(&mut device)?;
    meshes.initialize(&mut device)?;

    for (key, _) in shaders.iter() {
        let program = shaders.use_program(key, &mut device)?;
        let uniforms: Vec<_> = program.uniforms().iter().map(|uniform| uniform.name.as_str()).collect();
        log::info!("{:<16} {:?} uniforms {:?}", key.name(), program.handle(), uniforms);
    }

    // Footprint of each mesh after a 45 degree turn, as the base shaders see it.
    let transform = Mat2::rotation(utils::deg_to_rad(45.0));
    for (key, mesh) in meshes.iter() {
        let bounds = mesh.bounds();
        let corner = transform * Vec2::new(bounds.max[0], bounds.max[1]);
        log::info!(
            "{:<16} {} vertices, {} indices, size {:?}, rotated corner ({:.3}, {:.3})",
            key.name(),
            mesh.vertex_count(),
            mesh.index_count(),
            bounds.size(),
            corner.x,
            corner.y
        );
    }

    log::info!(
        "Loaded {} shaders and {} meshes ({} bytes uploaded)",
        device.program_count(),
        device.mesh_count(),
        device.bytes_uploaded()
    );

    meshes.release(&mut device);
    shaders.release(&mut device);
    Ok(())
}
