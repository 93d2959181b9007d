//! `orgdesk` — administration console for the organization backend.
//!
//! # Usage
//!
//! ```
//! orgdesk --url http://localhost:8080 --user admin --password secret
//! orgdesk tree --search platform
//! orgdesk memberships primary 42 d17
//! orgdesk permissions grant admin org_dept_write
//! ```

mod app;
mod commands;
mod render;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use commands::{MembershipCommand, PermissionCommand};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
  },
};
use orgdesk_client::{ApiClient, ApiConfig};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_CONFIG: &str = "~/.config/orgdesk/config.toml";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "orgdesk", version, about = "Organization administration console")]
struct Args {
  /// Path to a TOML config file (url, user, password).
  #[arg(short, long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the backend (default: http://localhost:8080).
  #[arg(long, global = true, env = "ORGDESK_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, global = true, env = "ORGDESK_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, global = true, env = "ORGDESK_PASSWORD", hide_env_values = true)]
  password: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Browse the organization tree interactively (default).
  Browse,

  /// Print the organization tree.
  Tree {
    /// Only keep nodes matching this text, plus their ancestors.
    #[arg(short, long)]
    search: Option<String>,

    /// Print the built tree as JSON.
    #[arg(long)]
    json: bool,
  },

  /// Inspect or edit an employee's department memberships.
  Memberships {
    #[command(subcommand)]
    command: MembershipCommand,
  },

  /// Inspect or edit a role's permissions.
  Permissions {
    #[command(subcommand)]
    command: PermissionCommand,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Settings read from the config file and `ORGDESK_*` variables.
///
/// Keys match the flag names, so `user` in the file, `ORGDESK_USER` and
/// `--user` all set the same thing.
#[derive(Deserialize, Default)]
struct Settings {
  #[serde(default)]
  url:      Option<String>,
  #[serde(default)]
  user:     Option<String>,
  /// Older spelling of `user`; `user` wins when both are set.
  #[serde(default)]
  username: Option<String>,
  #[serde(default)]
  password: Option<String>,
}

impl Settings {
  fn user(&mut self) -> Option<String> {
    self.user.take().or_else(|| self.username.take())
  }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
  let path = path
    .map(Path::to_path_buf)
    .unwrap_or_else(|| expand_tilde(Path::new(DEFAULT_CONFIG)));
  read_settings(&path, config::Environment::with_prefix("ORGDESK"))
}

/// The file at `path` (if any), overridden by `env`.
fn read_settings(path: &Path, env: config::Environment) -> Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(env)
    .build()
    .with_context(|| format!("reading config file {}", path.display()))?
    .try_deserialize()
    .context("parsing settings")
}

/// CLI flags override settings, which override defaults.
fn api_config(args: &Args, mut settings: Settings) -> ApiConfig {
  let user = settings.user();
  let pick = |flag: &Option<String>, setting: Option<String>| {
    flag
      .clone()
      .or(setting)
      .filter(|s| !s.is_empty())
  };
  ApiConfig {
    base_url: pick(&args.url, settings.url)
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    username: pick(&args.user, user).unwrap_or_default(),
    password: pick(&args.password, settings.password).unwrap_or_default(),
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Logging ──────────────────────────────────────────────────────────────────

fn env_filter() -> EnvFilter {
  EnvFilter::builder()
    .with_default_directive(LevelFilter::WARN.into())
    .from_env_lossy()
}

/// Log to stderr, or to a file while the TUI owns the terminal.
fn init_tracing(interactive: bool) -> Result<()> {
  if interactive {
    let path = std::env::temp_dir().join("orgdesk.log");
    let file = File::create(&path)
      .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
      .with_env_filter(env_filter())
      .with_ansi(false)
      .with_writer(Mutex::new(file))
      .init();
  } else {
    tracing_subscriber::fmt()
      .with_env_filter(env_filter())
      .with_writer(io::stderr)
      .init();
  }
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let mut args = Args::parse();
  let command = args.command.take().unwrap_or(Command::Browse);
  init_tracing(matches!(command, Command::Browse))?;

  let settings = load_settings(args.config.as_deref())?;
  let client = ApiClient::new(api_config(&args, settings))?;

  match command {
    Command::Browse => browse(client).await,
    Command::Tree { search, json } => {
      commands::tree(&client, search.as_deref(), json).await
    }
    Command::Memberships { command } => {
      commands::memberships(&client, command).await
    }
    Command::Permissions { command } => {
      commands::permissions(&client, command).await
    }
  }
}

async fn browse(client: ApiClient) -> Result<()> {
  let mut app = App::new(client);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.request_tree();
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.drain_inbox();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}
