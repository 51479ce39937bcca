//! `inovoid`: terminal client for the Inovoid blog.
//!
//! Signs in against the hosted backend and drives the same view layer a
//! browser page would: notification badge and panel, session guard, theme.

mod commands;
mod config;
mod session_file;

use clap::{Parser, Subcommand};

use commands::Runtime;

/// Inovoid CLI tool.
#[derive(Parser, Debug)]
#[command(name = "inovoid", about = "Inovoid CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.inovoid/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the backend project URL and anon key to the config file.
    Configure {
        #[arg(long)]
        url: String,
        #[arg(long = "anon-key")]
        anon_key: String,
    },

    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        /// Password. Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and forget the saved session.
    Logout,

    /// Create an account.
    Signup {
        #[arg(long)]
        email: String,
        /// Full name shown on posts.
        #[arg(long)]
        name: String,
    },

    /// Show the signed-in user.
    Whoami,

    /// Notification inbox.
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },

    /// Light/dark theme preference.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum NotificationAction {
    /// List the most recent notifications.
    List,
    /// Mark one notification as read.
    Read { id: String },
    /// Mark every notification as read.
    #[command(name = "read-all")]
    ReadAll,
    /// Follow new notifications until Ctrl-C.
    Watch,
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    Show,
    Toggle,
    /// Set the theme: light or dark.
    Set { theme: String },
}

fn prompt_new_password() -> anyhow::Result<String> {
    let pw = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if pw != confirm {
        anyhow::bail!("Passwords do not match.");
    }
    if pw.is_empty() {
        anyhow::bail!("Password cannot be empty.");
    }
    Ok(pw)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::AppConfig::default_path);

    match cli.command {
        Commands::Configure { url, anon_key } => {
            let config = config::AppConfig {
                supabase_url: url,
                supabase_anon_key: anon_key,
            };
            config.validate()?;
            config.save(&config_path)?;
            println!("Config saved to {}.", config_path.display());
        }

        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            let rt = Runtime::open(&config_path)?;
            commands::auth::login(&rt, &email, &password).await?;
        }

        Commands::Logout => {
            let rt = Runtime::open(&config_path)?;
            commands::auth::logout(&rt).await?;
        }

        Commands::Signup { email, name } => {
            let password = prompt_new_password()?;
            let rt = Runtime::open(&config_path)?;
            commands::auth::signup(&rt, &email, &name, &password).await?;
        }

        Commands::Whoami => {
            let rt = Runtime::open(&config_path)?;
            commands::auth::whoami(&rt).await?;
        }

        Commands::Notifications { action } => {
            let rt = Runtime::open(&config_path)?;
            match action {
                NotificationAction::List => {
                    commands::notifications::list(&rt, cli.output == "json").await?;
                }
                NotificationAction::Read { id } => {
                    commands::notifications::read(&rt, &id).await?;
                }
                NotificationAction::ReadAll => {
                    commands::notifications::read_all(&rt).await?;
                }
                NotificationAction::Watch => {
                    commands::notifications::watch(&rt).await?;
                }
            }
        }

        Commands::Theme { action } => match action {
            ThemeAction::Show => commands::theme::show(&config_path)?,
            ThemeAction::Toggle => commands::theme::toggle(&config_path)?,
            ThemeAction::Set { theme } => commands::theme::set(&config_path, &theme)?,
        },

        Commands::Version => {
            println!("inovoid cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
