use anyhow::Context;
use clap::Parser;
use generator::profile::{build_hotspots, write_layer};
use gui_bridge::bridge;
use gui_bridge::catalog::LayerCatalog;
use log::info;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::ServerConfig;
use workflow::runner::{append_report, format_report, summarize_file};

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Layer API and offline tools for the FIRMS hotspot dashboard")]
struct Args {
    /// Load server settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding `<layer>.geojson` files
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Layer served by `/hotspots`
    #[arg(long)]
    hotspot_layer: Option<String>,
    /// Aggregate a GeoJSON file offline and print the summary
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Write a synthetic hotspot layer to this file
    #[arg(long)]
    generate: Option<PathBuf>,
    /// Number of generated hotspots, overriding `generator.count`
    #[arg(long)]
    count: Option<usize>,
    /// Generator seed, overriding `generator.seed`
    #[arg(long)]
    seed: Option<u64>,
    /// Serve the layer API until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .with_overrides(args.data_dir, args.bind, args.hotspot_layer);

    if let Some(path) = &args.generate {
        let generator = config.generator.clone().with_overrides(args.count, args.seed);
        let collection = build_hotspots(&generator)?;
        write_layer(path, &collection)?;
        info!(
            "generated {} hotspots into {}",
            collection.len(),
            path.display()
        );
    }

    if let Some(path) = &args.summary {
        let summary = summarize_file(path)?;
        let label = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("layer");
        let line = format_report(label, &summary);
        println!("{line}");
        if let Some(report) = &config.report {
            append_report(report, &line)?;
            info!("summary appended to {}", report.display());
        }
    }

    if args.serve {
        let catalog = Arc::new(LayerCatalog::new(
            config.data_dir.clone(),
            config.hotspot_layer.clone(),
        ));
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the layer API")?;
        runtime.block_on(bridge::serve(catalog, config.bind))?;
    }

    Ok(())
}
