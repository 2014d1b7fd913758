use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use scenelab_render::{DebugTextRenderer, ResizeSignal};
use scenelab_runtime::{Driver, DriverOptions, ManualTime};
use scenelab_tools::SceneInspector;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scenelab-cli", about = "Headless runner for the scenelab demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered demos
    List,
    /// Render frames of a demo as debug text
    Run {
        #[command(flatten)]
        host: HostArgs,
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u32,
        /// Simulated seconds between frames
        #[arg(long, default_value = "0.016")]
        step: f32,
    },
    /// Print version info, or the object list of a demo's scene after setup
    Info {
        /// Demo to inspect
        #[arg(short, long)]
        demo: Option<String>,
        #[arg(long, default_value = "static")]
        assets: PathBuf,
    },
}

/// Headless host the demo runs in.
#[derive(Args)]
struct HostArgs {
    /// Demo name, see `list`
    #[arg(short, long)]
    demo: String,
    /// Host width in logical pixels
    #[arg(long, default_value = "800")]
    width: u32,
    /// Host height in logical pixels
    #[arg(long, default_value = "600")]
    height: u32,
    /// Device pixel ratio
    #[arg(long, default_value = "1.0")]
    pixel_ratio: f32,
    /// Seed for random placement
    #[arg(long, default_value = "42")]
    seed: u64,
    /// Directory asset paths are resolved against
    #[arg(long, default_value = "static")]
    assets: PathBuf,
}

/// Started driver for `host.demo` on a text renderer and a hand-stepped clock.
fn headless(host: &HostArgs, time: &ManualTime) -> anyhow::Result<Driver<DebugTextRenderer>> {
    let demo = scenelab_demos::create(&host.demo)?;
    let mut driver = Driver::new(
        demo,
        DebugTextRenderer::new(),
        DriverOptions {
            assets_root: host.assets.clone(),
            seed: host.seed,
            host: ResizeSignal {
                width: host.width,
                height: host.height,
                scale_factor: host.pixel_ratio,
            },
            time: Box::new(time.clone()),
        },
    );
    driver
        .start()
        .with_context(|| format!("starting demo {}", host.demo))?;
    Ok(driver)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::List => {
            for name in scenelab_demos::all_names() {
                println!("{name}");
            }
        }
        Commands::Run { host, frames, step } => {
            let time = ManualTime::new();
            let mut driver = headless(&host, &time)?;
            for _ in 0..frames {
                if let Some(frame) = driver.tick()? {
                    print!("{frame}");
                }
                time.advance(step);
            }
            let timer = driver.timer();
            tracing::info!(
                frames = driver.frame_count(),
                average = ?timer.average(),
                max = ?timer.max(),
                "run finished"
            );
        }
        Commands::Info { demo: None, .. } => {
            println!("scenelab-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", scenelab_render::crate_info());
            println!("demos: {}", scenelab_demos::all_names().len());
        }
        Commands::Info {
            demo: Some(demo),
            assets,
        } => {
            let host = HostArgs {
                demo,
                width: 800,
                height: 600,
                pixel_ratio: 1.0,
                seed: 42,
                assets,
            };
            let driver = headless(&host, &ManualTime::new())?;
            let scene = &driver.context().scene;
            println!("{}", SceneInspector::summary(scene));
            for (id, _) in SceneInspector::list(scene) {
                if let Some(info) = SceneInspector::inspect(scene, id) {
                    println!("  {info}");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(demo: &str) -> HostArgs {
        HostArgs {
            demo: demo.to_string(),
            width: 640,
            height: 480,
            pixel_ratio: 2.0,
            seed: 1,
            assets: PathBuf::from("/nonexistent-scenelab-assets"),
        }
    }

    #[test]
    fn run_prints_sized_frames() {
        let time = ManualTime::new();
        let mut driver = headless(&args("shadows"), &time).unwrap();
        let frame = driver.tick().unwrap().unwrap();
        assert!(frame.contains("=== Frame 1 (640x480 @2.00, buffer 1280x960) ==="));
    }

    #[test]
    fn unknown_demo_is_reported() {
        let err = headless(&args("nope"), &ManualTime::new()).err().unwrap();
        assert!(err.to_string().contains("unknown demo"));
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "scenelab-cli",
            "run",
            "--demo",
            "particles",
            "--frames",
            "3",
            "--pixel-ratio",
            "1.5",
        ])
        .unwrap();
        let Commands::Run { host, frames, .. } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(frames, 3);
        assert_eq!(host.pixel_ratio, 1.5);
        assert_eq!(host.width, 800);
    }
}
