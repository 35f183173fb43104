use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use studyplan_core::{NoopNotifier, Notifier, ReasoningClient, SchedulePlanner};
use tracing::info;

mod config;
mod llm;
mod logging;
mod menu;
mod notify;
mod preferences;
mod render;
mod state;

use config::{Config, Settings};
use llm::LlmClient;
use menu::Menu;
use notify::WebhookNotifier;
use preferences::PreferencesStore;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("STUDYPLAN_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "studyplan", version = VERSION, about = "Study planner with generated daily and weekly schedules")]
struct Cli {
    /// Config file (default: ~/.studyplan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `studyplan_core=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (default)
    Menu,

    /// Write a default config file if none exists
    InitConfig,

    /// Print the active study hours
    Hours,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(p) => p,
        None => state::config_path()?,
    };
    let cfg = config::load_config(&config_path)?;

    let filter = logging::build_filter(cli.log_level.as_deref(), cfg.log_level.as_deref())?;
    logging::setup_logging(&state::log_dir()?, filter)?;
    info!(version = VERSION, config = %config_path.display(), "studyplan starting");

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => run_menu(&cfg)?,

        Command::InitConfig => {
            if config::init_config(&config_path)? {
                println!("✓ Wrote {}", config_path.display());
            } else {
                println!("{} already exists", config_path.display());
            }
        }

        Command::Hours => {
            let store = PreferencesStore::new(state::preferences_path()?);
            println!("{}", render::hours_table(&store.load()));
        }
    }

    Ok(())
}

fn run_menu(cfg: &Config) -> Result<()> {
    let settings = Settings::resolve(cfg).context("invalid configuration")?;

    let client: Box<dyn ReasoningClient> = Box::new(LlmClient::from_settings(&settings));
    let notifier: Box<dyn Notifier> = match &settings.webhook_url {
        Some(url) => Box::new(WebhookNotifier::new(url.clone(), settings.webhook_timeout)),
        None => Box::new(NoopNotifier),
    };

    let store = PreferencesStore::new(state::preferences_path()?);
    let planner = SchedulePlanner::new(settings.planner.clone(), client, notifier).with_hours(store.load());
    info!(
        provider = ?settings.provider,
        model = settings.planner.model.as_str(),
        webhook = settings.webhook_url.is_some(),
        "planner ready"
    );

    let stdin = io::stdin();
    let mut menu = Menu::new(planner, store, settings.weekly_goal_hours, stdin.lock(), io::stdout());
    menu.run()
}
