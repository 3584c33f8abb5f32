use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kbpick_core::listing::SortField;
use kbpick_infrastructure::KbPickPaths;

mod commands;
mod context;
mod logging;
mod render;
mod repl;

use commands::listing::LsArgs;
use context::AppContext;

#[derive(Parser)]
#[command(name = "kbpick")]
#[command(about = "kbpick - browse connected storage and index files into a knowledge base", long_about = None)]
struct Cli {
    /// Directory holding config.toml and the session file
    #[arg(long, global = true, env = "KBPICK_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Also write logs to a daily file under the data directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show session and configuration state
    Status,
    /// List storage connections
    Connections,
    /// List a folder of a connection
    Ls {
        /// Connection id (defaults to the first connection)
        #[arg(long)]
        connection: Option<String>,
        /// Folder names from the root, separated by '/'
        path: Option<String>,
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
        /// Sort by `name` or `modified`
        #[arg(long, default_value = "name")]
        sort: SortField,
        #[arg(long)]
        desc: bool,
        /// Knowledge base whose statuses are shown next to each row
        #[arg(long = "kb")]
        knowledge_base: Option<String>,
    },
    /// Create a knowledge base from resources and start syncing it
    Index {
        #[arg(long)]
        connection: String,
        #[arg(required = true)]
        resource_ids: Vec<String>,
    },
    /// Remove resources from a knowledge base
    Unindex {
        #[arg(long = "kb")]
        knowledge_base: Option<String>,
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Knowledge-base commands
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },
    /// Interactive browser (the default)
    Browse,
    /// Configuration file commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config.toml
    Init,
}

#[derive(Subcommand)]
enum KbAction {
    /// List a knowledge base folder with statuses
    Ls {
        #[arg(long = "kb")]
        knowledge_base: Option<String>,
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logs_dir = if cli.log_file {
        let dir = KbPickPaths::new(cli.config_dir.as_deref()).logs_dir()?;
        std::fs::create_dir_all(&dir)?;
        Some(dir)
    } else {
        None
    };
    let _guard = logging::init_logging(logs_dir.as_deref());

    let command = cli.command.unwrap_or(Commands::Browse);
    if let Commands::Config {
        action: ConfigAction::Init,
    } = command
    {
        return commands::config::init(&KbPickPaths::new(cli.config_dir.as_deref()));
    }

    let ctx = AppContext::load(cli.config_dir).await?;

    match command {
        Commands::Login { email, password } => commands::auth::login(&ctx, email, password).await?,
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Status => commands::auth::status(&ctx)?,
        Commands::Connections => commands::listing::connections(&ctx).await?,
        Commands::Ls {
            connection,
            path,
            search,
            sort,
            desc,
            knowledge_base,
        } => {
            commands::listing::ls(
                &ctx,
                LsArgs {
                    connection,
                    path,
                    search,
                    sort,
                    desc,
                    knowledge_base,
                },
            )
            .await?
        }
        Commands::Index {
            connection,
            resource_ids,
        } => commands::indexing::index(&ctx, connection, resource_ids).await?,
        Commands::Unindex {
            knowledge_base,
            paths,
        } => commands::indexing::unindex(&ctx, knowledge_base, paths).await?,
        Commands::Kb { action } => match action {
            KbAction::Ls {
                knowledge_base,
                path,
            } => commands::listing::kb_ls(&ctx, knowledge_base, path).await?,
        },
        Commands::Browse => repl::run(&ctx).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
