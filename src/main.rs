use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use spotauth::{cli, config, error, management::TokenAuthority};

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
    /// Sign in with Spotify in the browser
    Login,

    /// Print the Spotify sign-in URL
    Url,

    /// Print a valid access token, refreshing it if needed
    Token,

    /// Refresh the access token if it is about to expire
    Refresh,

    /// Show the current session state
    Status,

    /// Forget the stored credential
    Logout,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spotauth=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let config = match config::AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    if let Command::Url = cli.command {
        cli::url(&config);
        return;
    }

    let authority = match TokenAuthority::from_config(&config).await {
        Ok(authority) => authority,
        Err(e) => error!("Cannot load stored credential: {}", e),
    };

    match cli.command {
        Command::Login => cli::login(authority, &config).await,
        Command::Token => cli::token(&authority).await,
        Command::Refresh => cli::refresh(&authority).await,
        Command::Status => cli::status(&authority).await,
        Command::Logout => cli::logout(&authority).await,
        Command::Url | Command::Completions(_) => {}
    }
}
