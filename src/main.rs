use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cgmath::{Deg, Vector3};
use clap::Parser;

use planview::{
    app::PlanviewApp,
    assets::{AssetLoader, DefaultFetcher},
    builder::build_scene,
    config::ViewerConfig,
    gfx::camera::{CameraController, CameraManager, OrbitCamera},
    gfx::scene::Scene,
    layout::{check_references, LayoutDocument},
};

#[derive(Parser)]
#[command(name = "planview")]
#[command(about = "View a floorplan layout as a 3D scene")]
struct Cli {
    /// Layout JSON document
    layout: Option<PathBuf>,

    /// Viewer configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Layer to build
    #[arg(long)]
    layer: Option<String>,

    /// Where Space writes the screenshot
    #[arg(long)]
    screenshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        ViewerConfig::discover(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(layout) = cli.layout {
        config.layout_path = layout;
    }
    if let Some(layer) = cli.layer {
        config.layer = layer;
    }
    if let Some(screenshot) = cli.screenshot {
        config.screenshot.path = screenshot;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let document = LayoutDocument::from_path(&config.layout_path)
        .with_context(|| format!("failed to load layout {}", config.layout_path.display()))?;
    let layer = document
        .layer(&config.layer)
        .with_context(|| format!("cannot build {}", config.layout_path.display()))?;
    log::info!(
        "Loaded {} layer {}: {} vertices, {} walls, {} floors, {} items, {} holes",
        config.layout_path.display(),
        config.layer,
        layer.vertices.len(),
        layer.lines.len(),
        layer.areas.len(),
        layer.items.len(),
        layer.holes.len()
    );
    for issue in check_references(layer) {
        log::warn!("{issue}");
    }

    let camera = OrbitCamera::new(
        1.0,
        0.0,
        0.0,
        Vector3::new(0.0, 0.0, 0.0),
        config.window.width as f32 / config.window.height.max(1) as f32,
    )
    .with_projection(Deg(config.camera.fov_degrees), config.camera.near, config.camera.far);
    let controller = CameraController::new(
        config.camera.rotate_speed,
        config.camera.zoom_speed,
        config.camera.pan_speed,
    );
    let mut scene = Scene::new(CameraManager::new(camera, controller));

    let report = build_scene(layer, &mut scene, &config.scene_style());
    report.log_summary();

    let fetcher = DefaultFetcher::new(config.assets.timeout(), config.asset_base_dir())
        .context("failed to set up model downloads")?;
    let mut loader = AssetLoader::new(Arc::new(fetcher));
    for request in report.requests {
        loader.request(request);
    }

    PlanviewApp::new(scene, loader, config.window, config.screenshot)
        .context("failed to create event loop")?
        .run()
        .context("viewer stopped with an error")?;

    Ok(())
}
