//! Molecule viewer binary.
//!
//! Usage: `molview [ASSET_ROOT] [--config FILE]`
//!
//! `ASSET_ROOT` is the directory holding `Nitrogen.glb` and `Oksigen.glb`
//! (default `assets`). `--config` reads a JSON [`ViewerConfig`]; an
//! explicit `ASSET_ROOT` overrides the one in the file.
//!
//! Run with `RUST_LOG=molview=debug` to trace loads and replays.

use anyhow::Context;
use molview::App;
use molview::viewer::ViewerConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("molview=info"))
        .init();

    let mut asset_root = None;
    let mut config_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(args.next().context("--config needs a file path")?);
            }
            "-h" | "--help" => {
                println!("Usage: molview [ASSET_ROOT] [--config FILE]");
                return Ok(());
            }
            _ => asset_root = Some(arg),
        }
    }

    let mut config = match config_path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            ViewerConfig::from_json_str(&json).with_context(|| format!("parsing config {path}"))?
        }
        None => ViewerConfig::default(),
    };
    if let Some(root) = asset_root {
        config = config.with_asset_root(root);
    }

    log::info!("Loading models from '{}'", config.asset_root);
    App::new(config).run()?;
    Ok(())
}
