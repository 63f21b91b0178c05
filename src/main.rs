use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use shelltalk::audit::AuditLogger;
use shelltalk::config::Config;
use shelltalk::error::AppResult;
use shelltalk::exec::{CommandExecutor, FailureHints};
use shelltalk::{DialogueEngine, InteractiveShell};
use std::io;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "shelltalk")]
#[command(version)]
#[command(about = "Turn plain-language requests into shell commands", long_about = None)]
struct Cli {
    /// Directory to run commands in (defaults to the current directory)
    #[arg(long, global = true, value_parser = parse_dir)]
    dir: Option<PathBuf>,

    /// Answer from the built-in offline patterns instead of a language model
    #[arg(long, global = true)]
    offline: bool,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive session (default)
    Shell,

    /// Manage the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Store an API key in the config file
    SetKey { key: String },

    /// Remove the stored API key
    ClearKey,

    /// Print the config file location
    Path,
}

fn parse_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("'{}' is not a directory", value))
    }
}

fn init_tracing(verbose: bool) {
    // Logs go to stderr so they never mix with command output
    let filter = if verbose {
        EnvFilter::new("shelltalk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: tracing subscriber already installed");
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Some(Commands::Config { ref action }) => run_config(action),
        Some(Commands::Shell) | None => run_shell(&cli).await,
    };

    if let Err(e) = result {
        let friendly = FailureHints::explain_app_error(&e);
        eprintln!("{} {}", "Error:".red().bold(), friendly.simple_message);
        if let Some(suggestion) = friendly.suggestion {
            eprintln!("{} {}", "Hint:".yellow(), suggestion);
        }
        eprintln!("{}", friendly.raw_error.as_str().dim());
        std::process::exit(1);
    }
}

fn run_config(action: &ConfigAction) -> AppResult<()> {
    let path = Config::config_path()?;

    match action {
        ConfigAction::SetKey { key } => {
            let mut config = Config::load_or_default()?;
            config.set_api_key(key, &path)?;
            println!("API key saved to {}", path.display());
        }
        ConfigAction::ClearKey => {
            let mut config = Config::load_or_default()?;
            config.clear_api_key(&path)?;
            println!("API key removed from {}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}

async fn run_shell(cli: &Cli) -> AppResult<()> {
    let config = Config::load_or_default()?;
    let offline = cli.offline || Config::offline_from_env() || config.behavior.offline;

    let working_dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    debug!(dir = %working_dir.display(), offline, "starting session");

    let engine = DialogueEngine::from_config(&config, offline)?;
    let executor = CommandExecutor::in_dir(&working_dir).with_timeout(config.execution.timeout());

    let mut shell = InteractiveShell::new(engine, executor, working_dir)
        .with_confirmation(config.behavior.confirm_before_execute);

    if config.behavior.log_commands {
        match AuditLogger::new() {
            Ok(audit) => shell = shell.with_audit(audit),
            Err(e) => warn!(error = %e, "audit log disabled"),
        }
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();
    shell.run(stdin, &mut stdout).await
}
