//! combo4 CLI Application

mod prompt;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use combo4_core::domain::{
    AppConfig, ComboError, DeviceSelector, FixedSelection, GenerationReport, Generator,
    ProbedDevice,
};
use combo4_infra::AplayInspector;
use prompt::StdinSelector;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "combo4")]
#[command(about = "Combine two stereo ALSA cards into one 4-channel device", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ~/.config/combo4/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List playback cards
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the hardware parameters of one card
    Probe {
        /// Card number from `combo4 list`
        card: u32,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate the combined device configuration (default)
    Generate(GenerateArgs),
}

#[derive(Args, Default)]
struct GenerateArgs {
    /// First card number (asked interactively when omitted)
    #[arg(long, requires = "second")]
    first: Option<u32>,

    /// Second card number (asked interactively when omitted)
    #[arg(long, requires = "first")]
    second: Option<u32>,

    /// Where to write the generated config
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = AppConfig::resolve(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Generate(GenerateArgs::default())) {
        Commands::List { json } => list(config, json).await,
        Commands::Probe { card, json } => probe(config, card, json).await,
        Commands::Generate(args) => {
            if let Some(output) = args.output {
                config.output_path = output;
            }
            let selector: Box<dyn DeviceSelector> = match (args.first, args.second) {
                (Some(first), Some(second)) => Box::new(FixedSelection { first, second }),
                _ => Box::new(StdinSelector),
            };
            generate(config, selector.as_ref()).await
        }
    }
}

fn generator(config: AppConfig) -> Generator {
    let inspector = AplayInspector::from_config(&config);
    Generator::new(Arc::new(inspector), config)
}

async fn list(config: AppConfig, json: bool) -> anyhow::Result<()> {
    let devices = generator(config).enumerate().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!("No playback cards found.");
    }
    for device in &devices {
        println!("{device}");
    }
    Ok(())
}

async fn probe(config: AppConfig, card: u32, json: bool) -> anyhow::Result<()> {
    let generator = generator(config);
    let device = generator
        .enumerate()
        .await
        .into_iter()
        .find(|d| d.index == card)
        .ok_or(ComboError::InvalidSelection(card))?;

    let capabilities = generator.probe(&device).await;

    if json {
        let value = serde_json::json!({
            "device": device,
            "capabilities": capabilities,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_probed(&ProbedDevice {
        device,
        capabilities,
    });
    Ok(())
}

fn print_probed(probed: &ProbedDevice) {
    let caps = &probed.capabilities;
    let join = |set: &std::collections::BTreeSet<String>| {
        set.iter().cloned().collect::<Vec<_>>().join(" ")
    };

    println!(
        "Card {} ({}): formats=[{}] access=[{}] rate={} channels={}",
        probed.device.index,
        probed.device.short_name,
        join(&caps.sample_formats),
        join(&caps.access_modes),
        caps.rate,
        caps.channels
    );
}

async fn generate(config: AppConfig, selector: &dyn DeviceSelector) -> anyhow::Result<()> {
    tracing::info!("Probing hardware capabilities (this may print some ALSA warnings)...");

    let report = generator(config).run(selector).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &GenerationReport) {
    println!("\n=== Hardware summary ===");
    print_probed(&report.first);
    print_probed(&report.second);

    println!("\n=== Selected common params ===");
    println!("Common rate:   {}", report.rate);
    println!("Common format: {}", report.format);

    let steps = report.next_steps();
    println!(
        "\nGenerated config written to: {}",
        report.output_path.display()
    );
    println!("To install it system-wide, run:");
    println!("  {}", steps[0]);
    println!("Then reboot (recommended):");
    println!("  {}", steps[1]);
    println!("\nAfter reboot, test:");
    for step in &steps[2..] {
        println!("  {step}");
    }
}
