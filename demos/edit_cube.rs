//! Scripted editing session over an STL model
//!
//! Loads a model (the bundled cube by default), resizes it by moving one
//! corner, recolors a face and prints the result.
//!
//! Usage: `edit_cube [model.stl] [config.json]`

use anyhow::{anyhow, Context, Result};
use stledit_core::{FaceId, Point3f};
use stledit_editor::{Axis, Command, EditMode, EditorConfig, PickTarget, Session};
use tracing::info;

const DEFAULT_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../assets/cube.stl");

fn init_logging() {
    // Default: WARN for everything, INFO for stledit crates.
    // Override with RUST_LOG (e.g. RUST_LOG=stledit_editor=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("stledit_editor=info".parse().unwrap_or_default())
        .add_directive("edit_cube=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let model = args.next().unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let config = match args.next() {
        Some(path) => EditorConfig::from_path(&path).with_context(|| format!("reading config {}", path))?,
        None => EditorConfig::default(),
    };

    let mut session = Session::new(config)?;
    session.load_path(&model).await;
    if let Some(err) = session.failure() {
        return Err(anyhow!("could not load {}: {}", model, err));
    }

    let editor = session.editor_mut().context("session is not ready")?;
    let swatch = *editor.palette().first().context("config palette is empty")?;
    let stats = editor.store().stats();
    println!("Loaded {}", model);
    println!("  faces:    {}", stats.face_count);
    println!("  vertices: {}", stats.vertex_count);
    println!("  edges:    {}", editor.edges().len());
    println!("  bounds:   {:?} .. {:?}", stats.bounds_min.coords, stats.bounds_max.coords);

    // Pick the corner furthest along +x+y+z and stretch the model along x.
    let corner = editor
        .store()
        .vertices()
        .iter()
        .max_by(|a, b| {
            let (sa, sb) = (a.position.coords.sum(), b.position.coords.sum());
            sa.total_cmp(&sb)
        })
        .map(|v| (v.id, v.position))
        .context("model has no vertices")?;
    info!(vertex = %corner.0, position = ?corner.1, "stretching from corner");

    let script = [
        Command::SwitchMode(EditMode::Vertex),
        Command::Pick(PickTarget::Vertex(corner.0)),
        Command::SetAxis {
            vertex_id: corner.0,
            axis: Axis::X,
            value: corner.1.x * 2.0,
        },
        Command::SwitchMode(EditMode::Face),
        Command::Pick(PickTarget::Face(FaceId(0))),
        Command::SetColor {
            face_id: FaceId(0),
            color: swatch,
        },
        // rejected: vertices cannot move in face mode
        Command::SetAxis {
            vertex_id: corner.0,
            axis: Axis::Y,
            value: 0.0,
        },
    ];
    for command in script {
        let outcome = editor.dispatch(command);
        match outcome.rejection() {
            None => println!("applied  {}", command.name()),
            Some(reason) => println!("rejected {}: {}", command.name(), reason),
        }
    }

    let stats = editor.store().stats();
    let moved: Point3f = editor
        .store()
        .vertex(corner.0)
        .map(|v| v.position)
        .context("corner vanished")?;
    println!("Corner {} is now at {:?}", corner.0, moved.coords);
    println!("New bounds: {:?} .. {:?}", stats.bounds_min.coords, stats.bounds_max.coords);

    let snapshot = editor.snapshot();
    println!(
        "Frame: {} face vertices, {} line vertices, face opacity {}",
        snapshot.face_buffer().len(),
        snapshot.edge_buffer().len(),
        snapshot.face_opacity
    );
    Ok(())
}
