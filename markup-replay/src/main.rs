//! # Markup Replay
//!
//! Command-line replay of scripted annotation sessions.

use anyhow::Context;
use clap::Parser;
use markup_core::{Canvas, SharedCanvas};
use markup_renderer::{save_raster, save_raster_to, Renderer};
use markup_replay::{CliArgs, ReplayConfig, Replayer, Script};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,markup_core=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    // Use JSON format for log collectors (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = ReplayConfig::resolve(&args)?;
    tracing::info!(
        "Canvas {}x{}, background {:?}",
        config.canvas.width,
        config.canvas.height,
        config.canvas.background
    );

    let script = Script::from_file(&args.script)?;
    let mut renderer =
        Renderer::new(config.render.clone()).context("Failed to create renderer")?;

    let shared = SharedCanvas::new(Canvas::new(config.canvas.clone()));
    renderer.install_text_measure(&shared);

    let base_dir = args
        .script
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_default();
    let summary = Replayer::new(shared.clone())
        .with_base_dir(base_dir)
        .run(&script)?;
    tracing::debug!("Summary: {}", serde_json::to_string(&summary)?);

    let image = if args.frame {
        renderer.render_image(&shared).context("Failed to render frame")?
    } else {
        renderer.flattened_raster(&shared)
    };

    let path = match args.output {
        Some(ref path) => {
            save_raster_to(&image, path, args.format)?;
            path.clone()
        }
        None => save_raster(&image, &args.out, args.format)?,
    };
    println!("{}", path.display());

    if args.status {
        let status = shared.read(Canvas::status);
        println!("{}", status.to_json()?);
    }

    Ok(())
}
