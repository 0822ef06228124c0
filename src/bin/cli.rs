//! Chain TVL CLI
//!
//! Command-line interface for the chains page:
//! - Print the chains table, pie breakdown or dominance series
//! - Export the stacked dataset as CSV
//! - Capture a snapshot of the sources for offline runs
//! - Manage display preferences

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use chaintvl::aggregate::ExtraTvlToggles;
use chaintvl::config::{generate_default_config, Config};
use chaintvl::export::export_to_file;
use chaintvl::page::{build_chains_page, ChainsPage};
use chaintvl::present::format::{format_usd, to_percent};
use chaintvl::present::{token_list, DisplayMode, TOKEN_LIST_HEADERS};
use chaintvl::settings::{
    extra_tvl_toggles, keys, FilePreferenceStore, MenuEvent, MenuKind, PreferenceStore,
    SettingsMenu,
};
use chaintvl::sources::{DataSource, HttpDataSource, StaticDataSource};

#[derive(Parser)]
#[command(name = "chaintvl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "TVL rankings and dominance across chains")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read source data from a snapshot file instead of the network
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chains ranked by TVL
    Chains {
        /// Extra TVL to include (e.g. staking,pool2). Defaults to the saved preferences
        #[arg(short, long)]
        include: Option<String>,
        /// Show only the first N chains
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Latest top-N breakdown
    Pie,

    /// Chain dominance over time
    Dominance {
        /// percent or absolute
        #[arg(short, long, default_value = "percent")]
        mode: String,
        /// Number of most recent days to show
        #[arg(short, long, default_value = "7")]
        last: usize,
        /// Chains listed per day
        #[arg(short, long, default_value = "5")]
        top: usize,
    },

    /// Export the stacked dataset as CSV
    Export {
        /// Output file (default: dashboard.csv_filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save every source response to a snapshot file
    Snapshot {
        /// Output path
        output: PathBuf,
    },

    /// Display preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the options of a menu with their values
    List {
        /// defi or nfts
        #[arg(short, long, default_value = "defi")]
        menu: String,
    },
    /// Flip one option of a menu
    Toggle {
        key: String,
        /// defi or nfts
        #[arg(short, long, default_value = "defi")]
        menu: String,
    },
    /// Set a preference explicitly
    Set { key: String, value: bool },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "chaintvl=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    let json = cli.format == "json";

    match cli.command {
        Commands::Chains { include, limit } => {
            let toggles = match include {
                Some(list) => ExtraTvlToggles::try_parse_list(&list).map_err(anyhow::Error::msg)?,
                None => extra_tvl_toggles(&open_store(&config)?),
            };

            let page = load_page(&config, cli.snapshot.as_deref()).await?;
            let mut summaries = page.summaries_with(&toggles);
            if let Some(limit) = limit {
                summaries.truncate(limit);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                let rows: Vec<[String; 8]> = token_list(&summaries).iter().map(|r| r.cells()).collect();
                print_table(&TOKEN_LIST_HEADERS, &rows);
            }
        }

        Commands::Pie => {
            let page = load_page(&config, cli.snapshot.as_deref()).await?;
            let pie = page.pie();

            if json {
                println!("{}", serde_json::to_string_pretty(&pie)?);
            } else {
                let rows: Vec<[String; 4]> = pie
                    .slices
                    .iter()
                    .map(|s| {
                        [
                            s.name.clone(),
                            format_usd(s.value),
                            to_percent(s.share / 100.0, 2),
                            s.color.clone(),
                        ]
                    })
                    .collect();
                print_table(&["Chain", "TVL", "Share", "Color"], &rows);
                println!();
                println!("Total: {}", format_usd(pie.total));
            }
        }

        Commands::Dominance { mode, last, top } => {
            let mode: DisplayMode = mode.parse().map_err(anyhow::Error::msg)?;
            let page = load_page(&config, cli.snapshot.as_deref()).await?;
            let chart = page.dominance(mode);

            let skip = chart.points.len().saturating_sub(last);
            let points = &chart.points[skip..];

            if json {
                println!("{}", serde_json::to_string_pretty(points)?);
            } else if points.is_empty() {
                println!("No data");
            } else {
                for point in points {
                    let items: Vec<String> = point
                        .tooltip
                        .iter()
                        .take(top)
                        .map(|item| format!("{} {}", item.chain, item.text))
                        .collect();
                    println!("{:<20} {}", point.label, items.join(", "));
                }
            }
        }

        Commands::Export { output } => {
            let page = load_page(&config, cli.snapshot.as_deref()).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(&config.dashboard.csv_filename));

            export_to_file(&path, &page.dataset, &page.chains)
                .with_context(|| format!("Failed to export to {:?}", path))?;
            println!("Exported {} days to {:?}", page.dataset.len(), path);
        }

        Commands::Snapshot { output } => {
            let source = HttpDataSource::new(config.sources.to_source_config())?;
            let snapshot = StaticDataSource::capture(&source).await?;
            snapshot.save(&output)?;
            println!(
                "Saved {} chains and {} protocols to {:?}",
                snapshot.series.len(),
                snapshot.protocols.protocols.len(),
                output
            );
        }

        Commands::Settings { action } => {
            let store = open_store(&config)?;
            run_settings(action, &store, json)?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            if let Some(path) = output {
                std::fs::write(&path, &content)?;
                println!("Config written to {:?}", path);
            } else {
                print!("{}", content);
            }
        }
    }

    Ok(())
}

async fn load_page(config: &Config, snapshot: Option<&Path>) -> anyhow::Result<ChainsPage> {
    let source: Box<dyn DataSource> = match snapshot {
        Some(path) => Box::new(StaticDataSource::load(path)?),
        None => Box::new(HttpDataSource::new(config.sources.to_source_config())?),
    };

    let page = build_chains_page(source.as_ref(), &config.dashboard.page_settings())
        .await
        .context("Failed to build chains page")?;
    Ok(page)
}

fn open_store(config: &Config) -> anyhow::Result<FilePreferenceStore> {
    let path = config.preferences.resolved_path();
    FilePreferenceStore::open(&path).with_context(|| format!("Failed to open preferences {:?}", path))
}

fn run_settings(action: SettingsAction, store: &FilePreferenceStore, json: bool) -> anyhow::Result<()> {
    match action {
        SettingsAction::List { menu } => {
            let kind: MenuKind = menu.parse().map_err(anyhow::Error::msg)?;
            let mut menu = SettingsMenu::new(kind, store);
            menu.handle(MenuEvent::ButtonClicked)?;
            let toggles = menu.toggles();

            if json {
                println!("{}", serde_json::to_string_pretty(&toggles)?);
            } else {
                for toggle in toggles {
                    let mark = if toggle.enabled { "x" } else { " " };
                    println!("[{}] {:<16} {}", mark, toggle.name, toggle.help.unwrap_or(""));
                }
            }
        }

        SettingsAction::Toggle { key, menu } => {
            let kind: MenuKind = menu.parse().map_err(anyhow::Error::msg)?;
            let mut menu = SettingsMenu::new(kind, store);
            menu.handle(MenuEvent::ButtonClicked)?;
            menu.handle(MenuEvent::OptionToggled(key.clone()))?;
            menu.handle(MenuEvent::ClickedOutside)?;
            println!("{} = {}", key, store.get(&key));
        }

        SettingsAction::Set { key, value } => {
            if !keys::is_known(&key) {
                bail!("Unknown preference: {} (known: {})", key, keys::ALL.join(", "));
            }
            store.set(&key, value)?;
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}

fn print_table<const N: usize>(headers: &[&str; N], rows: &[[String; N]]) {
    if rows.is_empty() {
        println!("No data");
        return;
    }

    let mut widths: [usize; N] = [0; N];
    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = header.len();
    }
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(headers.to_vec()));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (N - 1)));
    for row in rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}
