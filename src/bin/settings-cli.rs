use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use site_settings::lifecycle::{initialize, StartupOptions};
use site_settings::static_files::collect_static;

#[derive(Parser)]
#[command(name = "settings-cli")]
#[command(about = "Inspect and validate environment-driven settings", long_about = None)]
struct Cli {
    /// Application root directory.
    #[arg(short, long, default_value = ".")]
    base_dir: PathBuf,

    /// Environment file to load before reading variables.
    #[arg(short, long)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved settings
    Show {
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Validate the environment and exit non-zero on any problem
    Check,
    /// Copy static assets into the static root
    CollectStatic,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Toml,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = initialize(&StartupOptions {
        base_dir: cli.base_dir,
        env_file: cli.env_file,
    })?;

    match cli.command {
        Commands::Show { format } => {
            let rendered = match format {
                Format::Json => serde_json::to_string_pretty(config.as_ref())?,
                Format::Toml => toml::to_string_pretty(config.as_ref())?,
            };
            println!("{}", rendered);
        }
        Commands::Check => {
            println!(
                "Configuration OK ({} posture, {} allowed host(s))",
                config.posture(),
                config.allowed_hosts.len()
            );
        }
        Commands::CollectStatic => {
            let report = collect_static(&config.static_assets)?;
            println!(
                "{} file(s) copied, {} unmodified, into {}",
                report.copied,
                report.unmodified,
                config.static_assets.root_path.display()
            );
        }
    }

    Ok(())
}
