mod script;

use clap::{Parser, Subcommand};
use glowgrid_common::PALETTE;
use glowgrid_input::ReconfigureRequest;
use glowgrid_kernel::{Controller, GraphicsResources, MAX_CUBES, SceneConfig};
use glowgrid_render::{HeadlessBackend, RenderView, submit_frame};
use glowgrid_tools::SceneInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glowgrid-cli", about = "CLI tool for glowgrid layouts and headless runs")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default scene parameters
    Info,
    /// Print the grid positions for a cube count
    Layout {
        /// Number of cubes
        #[arg(short, long, default_value = "9")]
        count: i64,
        /// Distance between neighbouring cubes
        #[arg(short, long, default_value = "3.0")]
        spacing: f32,
    },
    /// Run the scene headless with a scripted command timeline
    Simulate {
        /// Number of ticks to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Number of cubes
        #[arg(short, long, default_value = "9")]
        count: i64,
        /// Distance between neighbouring cubes
        #[arg(short, long, default_value = "3.0")]
        spacing: f32,
        /// Timeline such as `press@10,release@40,click@12,move@5:0.5:-0.2`
        #[arg(long, default_value = "")]
        script: String,
        /// Print the last frame as the headless backend presents it
        #[arg(long)]
        dump: bool,
        /// Print every cube after the run
        #[arg(long)]
        cubes: bool,
    },
}

fn scene_config(count: i64, spacing: f32) -> SceneConfig {
    SceneConfig::default().merged(&ReconfigureRequest {
        count: Some(count),
        spacing: Some(spacing),
        ..ReconfigureRequest::default()
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = SceneConfig::default();
            println!("glowgrid-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "grid: count={} spacing={} max={}",
                config.grid.count, config.grid.spacing, MAX_CUBES
            );
            println!(
                "motion: rotation={} press x{} expansion x{} depth={}",
                config.motion.base_rotation,
                config.motion.press_multiplier,
                config.motion.expansion_factor,
                config.motion.depth
            );
            let palette: Vec<String> = PALETTE.iter().map(|c| c.to_string()).collect();
            println!("palette: {}", palette.join(" "));
        }
        Commands::Layout { count, spacing } => {
            let config = scene_config(count, spacing);
            println!(
                "Layout: count={} spacing={}",
                config.grid.count, config.grid.spacing
            );
            for (i, p) in config.grid.positions().iter().enumerate() {
                println!("  [{i:>4}] ({:.2}, {:.2})", p.x, p.y);
            }
        }
        Commands::Simulate {
            ticks,
            count,
            spacing,
            script,
            dump,
            cubes,
        } => {
            let steps = script::parse(&script)?;
            println!(
                "Simulate: ticks={ticks} count={count} spacing={spacing} steps={}",
                steps.len()
            );

            let mut backend = HeadlessBackend::new();
            let mut controller = Controller::new(scene_config(count, spacing));
            let report = controller.rebuild(&mut backend);
            tracing::debug!(?report, "initial build");

            let mut pending = steps.into_iter().peekable();
            for tick in 0..ticks {
                while let Some(step) = pending.next_if(|s| s.tick <= tick) {
                    controller.apply(step.command, &mut backend);
                }
                controller.tick();
                submit_frame(&mut backend, controller.store());
            }
            let skipped = pending.count();
            if skipped > 0 {
                tracing::warn!(skipped, "script steps scheduled after the last tick");
            }

            println!("{}", SceneInspector::summary(&controller));
            println!("Live cubes: {}", backend.live_cubes());
            if cubes {
                for index in 0..controller.store().len() {
                    if let Some(info) = SceneInspector::inspect_cube(&controller, index) {
                        println!("  {info}");
                    }
                }
            }
            if dump {
                print!("{}", backend.present(&RenderView::default()));
            }

            controller.shutdown(&mut backend);
        }
    }

    Ok(())
}

