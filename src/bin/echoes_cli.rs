//! Echoes CLI - bridge interface for the experience front-end
//!
//! Commands: themes, palette, generate
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when artwork is unavailable

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use echoes_artwork::{
    synthesis::{self, Conversation},
    ArtworkGenerator, ArtworkManifest, ArtworkRequest, ColorPipeline, GeneratorConfig, ThemeTable,
};

#[derive(Parser)]
#[command(name = "echoes-cli")]
#[command(about = "Echoes CLI - deterministic artwork from conversation themes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of JSON theme tables merged over the builtin themes
    #[arg(short, long)]
    themes_dir: Option<PathBuf>,

    /// Use the colorimetric OKLCH conversion instead of the analytic one
    #[arg(long)]
    exact_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List known themes and their colors
    Themes,

    /// Resolve the palette for a theme list
    Palette {
        /// Comma separated themes, order matters
        #[arg(short, long, value_delimiter = ',')]
        themes: Vec<String>,
    },

    /// Generate artwork
    Generate {
        /// JSON payload (ArtworkRequest)
        #[arg(short, long, conflicts_with = "agents")]
        payload: Option<String>,

        /// Comma separated agent ids; themes come from their conversations
        #[arg(short, long, value_delimiter = ',')]
        agents: Vec<String>,

        /// Explicit seed, used with --agents
        #[arg(short, long)]
        seed: Option<String>,

        /// Also write the PNG here
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Include the data URI in the JSON output
        #[arg(long)]
        data_uri: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "echoes_artwork=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => println!(r#"{{"success": false, "error": "{}"}}"#, e),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let themes = match &cli.themes_dir {
        Some(dir) => match ThemeTable::load_from_dir(dir) {
            Ok(table) => table,
            Err(e) => {
                print_json(&serde_json::json!({
                    "success": false,
                    "error": format!("Failed to load theme tables: {e}"),
                }));
                return ExitCode::FAILURE;
            }
        },
        None => ThemeTable::builtin(),
    };

    let config = GeneratorConfig {
        color_pipeline: if cli.exact_color { ColorPipeline::Exact } else { ColorPipeline::Analytic },
        ..GeneratorConfig::default()
    };
    let generator = ArtworkGenerator::new(config, themes);

    match cli.command {
        Commands::Themes => {
            let pipeline = generator.config().color_pipeline;
            let table = generator.themes();
            let themes: Vec<_> = table
                .labels()
                .map(|label| {
                    let spec = table.color_for(label);
                    serde_json::json!({
                        "theme": label,
                        "color": spec.to_string(),
                        "rgb": spec.to_rgb(pipeline).to_hex(),
                        "default": label == table.default_theme(),
                    })
                })
                .collect();

            print_json(&serde_json::Value::from(themes));
            ExitCode::SUCCESS
        }

        Commands::Palette { themes } => {
            let palette = generator.resolve_palette(&themes);
            print_json(&serde_json::json!({
                "themes": themes,
                "palette": palette.to_hex(),
            }));
            ExitCode::SUCCESS
        }

        Commands::Generate { payload, agents, seed, out, data_uri } => {
            let request = match payload {
                Some(payload) => match serde_json::from_str::<ArtworkRequest>(&payload) {
                    Ok(r) => r,
                    Err(e) => {
                        print_json(&serde_json::json!({
                            "success": false,
                            "error": format!("Invalid payload: {e}"),
                        }));
                        return ExitCode::FAILURE;
                    }
                },
                None => {
                    let conversations: Vec<_> = agents
                        .iter()
                        .filter_map(|id| {
                            let conversation = Conversation::with_agent(id);
                            if conversation.is_none() {
                                tracing::warn!(agent = %id, "unknown agent, skipping");
                            }
                            conversation
                        })
                        .collect();
                    synthesis::artwork_request(&conversations, seed)
                }
            };

            let Some(artwork) = generator.generate(&request) else {
                print_json(&serde_json::json!({
                    "success": false,
                    "error": "Artwork unavailable",
                }));
                return ExitCode::from(2);
            };

            if let Some(path) = &out {
                if let Err(e) = std::fs::write(path, &artwork.png) {
                    print_json(&serde_json::json!({
                        "success": false,
                        "error": format!("Failed to write {}: {e}", path.display()),
                    }));
                    return ExitCode::FAILURE;
                }
            }

            match ArtworkManifest::from_artwork(&artwork) {
                Ok(manifest) => {
                    let mut output = serde_json::json!({
                        "success": true,
                        "manifest": manifest,
                    });
                    if data_uri {
                        output["dataUri"] = serde_json::Value::from(artwork.data_uri());
                    }
                    print_json(&output);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_json(&serde_json::json!({
                        "success": false,
                        "error": e.to_string(),
                    }));
                    ExitCode::FAILURE
                }
            }
        }
    }
}
