mod app;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;

use archgrow::{GraphLoader, GraphSession, LayoutConfig, NavigationState};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Location to open: a full URL or a bare query such as `?arch=lamp`.
    #[arg(long, default_value = archgrow::navigation::DEFAULT_BASE)]
    location: String,

    /// Directory holding `<architecture><step>.json` datasets.
    #[arg(long, default_value = "json")]
    data_dir: PathBuf,

    #[arg(long, default_value_t = 1400.0)]
    width: f32,

    #[arg(long, default_value_t = 1000.0)]
    height: f32,

    /// Initial repulsion charge; more negative spreads nodes further.
    #[arg(long, default_value_t = -100.0, allow_negative_numbers = true)]
    charge: f32,

    /// Amount each "Decrease charge" subtracts.
    #[arg(long, default_value_t = 10.0)]
    charge_step: f32,

    /// Fraction of the remaining distance the root covers toward its anchor
    /// each tick.
    #[arg(long, default_value_t = 0.65)]
    anchor_smoothing: f32,

    /// Choices offered by the architecture selector.
    #[arg(long, value_delimiter = ',', default_value = "migration,lamp")]
    architectures: Vec<String>,

    /// Run the layout without a window and print the settled frame as JSON.
    #[arg(long)]
    headless: bool,

    #[arg(long, default_value_t = 2000)]
    max_ticks: usize,
}

impl Args {
    fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            width: self.width,
            height: self.height,
            charge: self.charge,
            charge_step: self.charge_step,
            anchor_smoothing: self.anchor_smoothing.clamp(0.0, 1.0),
            ..LayoutConfig::default()
        }
    }
}

fn run_headless(args: &Args, navigation: NavigationState) -> Result<()> {
    let loader = GraphLoader::new(args.data_dir.clone());
    let dataset = loader.fetch(&navigation)?;
    let resource = loader.resource_path(&navigation);

    let mut session = GraphSession::new(navigation, args.layout_config());
    session
        .load(&dataset)
        .with_context(|| format!("failed to build graph from {}", resource.display()))?;

    let ticks = session.run_until_settled(args.max_ticks);
    info!(ticks, settled = !session.layout().is_running(), "layout finished");

    let frame = serde_json::to_string_pretty(&session.frame()).context("failed to encode frame")?;
    println!("{frame}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let navigation = NavigationState::from_location(&args.location)?;
    info!(
        location = %navigation.location(),
        resource = %navigation.resource_key(),
        "starting"
    );

    if args.headless {
        return run_headless(&args, navigation);
    }

    let viewer = app::ViewerOptions {
        loader: GraphLoader::new(args.data_dir.clone()),
        layout: args.layout_config(),
        architectures: args.architectures.clone(),
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height + 40.0]),
        ..Default::default()
    };

    eframe::run_native(
        "archgrow",
        options,
        Box::new(move |cc| Ok(Box::new(app::ArchGrowApp::new(cc, viewer, navigation)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
