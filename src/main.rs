use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spyt::{
    cli, config, error, logging, oauth::Service, server::AppState, upstream, warning,
};

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
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in to Spotify or YouTube
    Auth(AuthOptions),

    /// List your Spotify playlists
    Playlists(PlaylistsOptions),

    /// Copy Spotify playlists to YouTube
    Export(ExportOptions),

    /// Forget a cached sign-in
    Logout(LogoutOptions),

    /// Run the local HTTP API
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    service: Service,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Page size (1-50)
    #[clap(long, default_value_t = 50)]
    limit: i64,

    /// Index of the first playlist
    #[clap(long, default_value_t = 0)]
    offset: i64,

    /// Fetch every page
    #[clap(long, conflicts_with_all = ["limit", "offset"])]
    all: bool,

    /// Print JSON instead of a table
    #[clap(long)]
    json: bool,

    /// Save the listed playlists as JSON to this file
    #[clap(long)]
    save: Option<PathBuf>,

    /// Only show these playlist ids (comma separated or repeated)
    #[clap(long, value_delimiter = ',', num_args = 1..)]
    ids: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ExportOptions {
    /// Spotify playlist ids to export
    #[clap(required_unless_present = "all")]
    ids: Vec<String>,

    /// Export every playlist
    #[clap(long, conflicts_with = "ids")]
    all: bool,

    /// Print the results as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct LogoutOptions {
    target: cli::LogoutTarget,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }
    if let Err(e) = logging::init_tracing() {
        warning!("Logging disabled. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
        Command::Logout(opt) => cli::logout(opt.target).await,
        command => run(command).await,
    }
}

async fn run(command: Command) {
    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => error!(
            "{}. Add it to {}",
            e,
            config::data_dir().join(".env").display()
        ),
    };
    let http = match upstream::http_client() {
        Ok(http) => http,
        Err(e) => error!("Cannot create HTTP client. Err: {}", e),
    };
    let state = AppState::new(config, http).with_persisted_sessions();

    match command {
        Command::Auth(opt) => cli::auth(state, opt.service).await,
        Command::Playlists(opt) => {
            let options = cli::ListOptions {
                limit: opt.limit,
                offset: opt.offset,
                all: opt.all,
                json: opt.json,
                save: opt.save,
                ids: opt.ids,
            };
            cli::playlists(&state, options).await
        }
        Command::Export(opt) => cli::export(&state, opt.ids, opt.all, opt.json).await,
        Command::Serve => cli::serve(state).await,
        Command::Logout(_) | Command::Completions(_) => {}
    }
}
