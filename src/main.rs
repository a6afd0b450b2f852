use std::{path::PathBuf, sync::Arc};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use likesync::{cli, config, error, types::PkceToken, utils};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Snapshot all saved tracks into a dated file
    Import(ImportOptions),

    #[clap(about = "Create or fill the playlist of one month")]
    Playlist(PlaylistOptions),

    /// List the months present in a snapshot
    Months(MonthsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ImportOptions {
    /// Directory to write the snapshot to
    #[clap(long)]
    dir: Option<PathBuf>,

    /// Attempts per page before the import gives up
    #[clap(long, default_value_t = 3)]
    page_attempts: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistOptions {
    /// Month of the liked tracks (1-12)
    #[clap(long, value_parser = utils::parse_month)]
    month: u32,

    /// Year of the liked tracks (YYYY)
    #[clap(long, value_parser = utils::parse_year)]
    year: i32,

    /// Snapshot file; defaults to the latest snapshot
    #[clap(long)]
    file: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct MonthsOptions {
    /// Snapshot file; defaults to the latest snapshot
    #[clap(long)]
    file: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Import(opt) => cli::import(opt.dir, opt.page_attempts).await,
        Command::Playlist(opt) => cli::playlist(opt.month, opt.year, opt.file).await,
        Command::Months(opt) => cli::months(opt.file).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
