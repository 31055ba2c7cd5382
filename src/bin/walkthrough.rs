//! Scripted viewer session
//!
//! Composes the initial pieces, selects one, flies there in first person
//! and back to the orbit view, logging the camera and the highlighted nodes
//! along the way. Pass `--window` to open the interactive window instead,
//! and `--models <dir>` to load OBJ files from disk.

use anyhow::Context;
use diorama::gfx::assets::{AssetCache, ObjAssetLoader};
use diorama::gfx::scene::ViewMode;
use diorama::{DioramaApp, ViewerConfig};

const FRAME_STEP: f32 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    diorama::init_logging();

    let mut args = std::env::args().skip(1);
    let mut windowed = false;
    let mut models = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--window" => windowed = true,
            "--models" => models = Some(args.next().context("--models needs a directory")?),
            other => anyhow::bail!("unknown argument '{}'", other),
        }
    }

    let cache = match models {
        Some(dir) => AssetCache::new(Box::new(ObjAssetLoader::new(dir))),
        None => AssetCache::placeholder(),
    };
    let mut app = DioramaApp::new(ViewerConfig::default(), cache)?;

    if windowed {
        app.run().context("event loop failed")?;
        return Ok(());
    }

    let mut now = 0.0;
    run_for(&mut app, &mut now, 3.5);
    log_camera(&app, "orbit intro done");

    app.toggle_selection("horsehead")?;
    log_selection(&app);

    app.set_view(ViewMode::FirstPerson)?;
    run_for(&mut app, &mut now, 2.5);
    log_camera(&app, "framed horsehead");

    app.toggle_selection("lionhead")?;
    run_for(&mut app, &mut now, 2.5);
    log_camera(&app, "framed lionhead");
    log_selection(&app);

    app.pointer_missed()?;
    run_for(&mut app, &mut now, 2.5);
    log_camera(&app, "overview");

    app.set_view(ViewMode::Orbit)?;
    run_for(&mut app, &mut now, 3.5);
    log_camera(&app, "back in orbit");
    log_selection(&app);

    log::info!(
        "templates cached: {} ({} hits, {} misses)",
        app.composer().cache().len(),
        app.composer().cache().hits(),
        app.composer().cache().misses()
    );
    Ok(())
}

fn run_for(app: &mut DioramaApp, now: &mut f32, seconds: f32) {
    let end = *now + seconds;
    while *now < end {
        if let Some(position) = app.frame(*now) {
            log::info!("camera reported resting position {:?}", position);
        }
        *now += FRAME_STEP;
    }
}

fn log_camera(app: &DioramaApp, label: &str) {
    let camera = app.composer().camera();
    log::info!(
        "{}: position {:?}, forward {:?}",
        label,
        camera.position,
        camera.forward()
    );
}

fn log_selection(app: &DioramaApp) {
    let registry = app.composer().registry();
    log::info!(
        "selected {:?}: {} highlighted node(s) {:?}",
        app.selected_id(),
        registry.len(),
        registry.selected()
    );
}
