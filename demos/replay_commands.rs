//! Replay a JSON command script against a model and print the final frame
//!
//! Usage: `replay_commands <model.stl> <commands.json>`
//!
//! The script is a JSON array of commands, for example
//! `[{"switch_mode": "vertex"}, {"set_axis": {"vertex_id": 0, "axis": "x", "value": 2.0}}]`.

use anyhow::{bail, Context, Result};
use stledit_editor::{Command, EditorConfig, Session};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(model), Some(script)) = (args.next(), args.next()) else {
        bail!("usage: replay_commands <model.stl> <commands.json>");
    };

    let json = tokio::fs::read_to_string(&script)
        .await
        .with_context(|| format!("reading {}", script))?;
    let commands: Vec<Command> =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", script))?;

    let mut session = Session::new(EditorConfig::default())?;
    session.load_path(&model).await;
    if let Some(err) = session.failure() {
        bail!("could not load {}: {}", model, err);
    }

    let mut rejected = 0;
    for (index, command) in commands.into_iter().enumerate() {
        if let Some(reason) = session.dispatch(command).rejection() {
            warn!(index, command = command.name(), %reason, "command rejected");
            rejected += 1;
        }
    }
    if rejected > 0 {
        eprintln!("{} command(s) rejected", rejected);
    }

    println!("{}", session.snapshot().to_json()?);
    Ok(())
}
