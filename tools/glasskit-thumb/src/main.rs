use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glasskit_channel::{Method, MethodCall, MethodResponse, ThumbnailChannel};
use glasskit_thumbnail::{
    AssetDirectory, AssetLookup, AssetManifest, NoAssets, ThumbnailConfig,
};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "glasskit-thumb")]
#[command(about = "Generate first-frame video thumbnails the way the app plugin does", long_about = None)]
struct Cli {
    /// Directory holding bundled assets (e.g. flutter_assets)
    #[arg(long, global = true, conflicts_with = "manifest")]
    assets: Option<PathBuf>,
    /// JSON manifest mapping asset identifiers to files
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,
    /// JSON configuration, e.g. '{"defaultMaxWidth": 320}'
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the first frame of a video as a PNG
    Extract {
        /// Asset identifier or path of the video
        video: String,
        /// Maximum thumbnail width; non-positive values use the default
        #[arg(long, allow_negative_numbers = true)]
        max_width: Option<i64>,
        /// Output file (defaults to <video stem>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Send a raw method-call envelope and print the JSON response
    Call {
        /// e.g. '{"method": "getThumbnail", "arguments": {"videoPath": "a.mp4"}}'
        json: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(json) => ThumbnailConfig::from_json(json)?,
        None => ThumbnailConfig::default(),
    };
    let channel = ThumbnailChannel::new(asset_lookup(&cli)?).with_config(config);

    match cli.command {
        Commands::Extract {
            video,
            max_width,
            output,
        } => run_extract(&channel, &video, max_width, output),
        Commands::Call { json } => run_call(&channel, &json),
    }
}

fn asset_lookup(cli: &Cli) -> Result<Box<dyn AssetLookup>> {
    if let Some(manifest) = &cli.manifest {
        let manifest = AssetManifest::load(manifest)
            .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
        return Ok(Box::new(manifest));
    }
    if let Some(root) = &cli.assets {
        if !root.is_dir() {
            anyhow::bail!("Asset directory {} does not exist", root.display());
        }
        return Ok(Box::new(AssetDirectory::new(root)));
    }
    Ok(Box::new(NoAssets))
}

fn run_extract(
    channel: &ThumbnailChannel,
    video: &str,
    max_width: Option<i64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut arguments = json!({ "videoPath": video });
    if let Some(width) = max_width {
        arguments["maxWidth"] = json!(width);
    }
    let call = MethodCall::new(Method::GET_THUMBNAIL, arguments);

    println!("{} {}", "Extracting first frame of".bold(), video);
    match channel.handle_blocking(&call) {
        MethodResponse::Success { bytes } => {
            let output = output.unwrap_or_else(|| default_output(video));
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "{} {} ({} bytes)",
                "✅ Wrote".green().bold(),
                output.display(),
                bytes.len()
            );
            Ok(())
        }
        MethodResponse::Error { code, message } => {
            anyhow::bail!("{}: {message}", code.red().bold())
        }
        MethodResponse::NotImplemented => anyhow::bail!("getThumbnail is not implemented"),
    }
}

fn run_call(channel: &ThumbnailChannel, json: &str) -> Result<()> {
    let call = MethodCall::from_json(json).context("Invalid method-call envelope")?;
    let response = channel.handle_blocking(&call);
    let status = if response.is_success() {
        "ok".green().bold().to_string()
    } else {
        "failed".yellow().bold().to_string()
    };
    eprintln!("{} {status}", call.method.bold());
    println!("{}", response.to_json()?);
    Ok(())
}

fn default_output(video: &str) -> PathBuf {
    let stem = Path::new(video)
        .file_stem()
        .map_or_else(|| "thumbnail".into(), |s| s.to_string_lossy().into_owned());
    PathBuf::from(format!("{stem}.png"))
}
