mod client;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use newsdesk::{config::DEFAULT_CONFIG_PATH, Config};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Search API key, overriding the configuration
    #[arg(long, env = "NYT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the header date
    Date {
        /// Format this day instead of today (YYYY-MM-DD)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Print the search API key served by the backend
    Key,
    /// Search for articles
    Search {
        /// Defaults to the front page query
        query: Option<String>,
    },
    /// Render the front page as HTML
    Front {
        #[arg(short, long)]
        /// Search for this instead of the configured query
        query: Option<String>,
        #[arg(short, long)]
        /// Write the page here instead of stdout
        output: Option<PathBuf>,
    },
    /// Show who is logged in
    Whoami,
    /// List the comments on an article
    Comments {
        /// Title of the article
        title: String,
    },
    /// Comment on an article
    Comment {
        /// Title of the article
        title: String,
        /// Read from stdin when omitted
        content: Option<String>,
        #[arg(short, long)]
        /// Reply to this comment
        parent: Option<String>,
    },
    /// Delete the comment with the given ID
    Delete { id: String },
    /// Black out a user's comment on an article (moderators only)
    Redact {
        /// Title of the article
        title: String,
        /// Email of the comment's author
        user: String,
    },
    /// Replace a user's comment on an article with a removal notice
    /// (moderators only)
    Remove {
        /// Title of the article
        title: String,
        /// Email of the comment's author
        user: String,
    },
    /// Print where to sign in
    Login,
    /// End the session
    Logout,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config).into_diagnostic()?;
    if cli.api_key.is_some() {
        config.client.api_key = cli.api_key;
    }

    match cli.command {
        Command::Date { on } => client::date(on),
        Command::Key => client::key(config.client).await?,
        Command::Search { query } => {
            let query = query.unwrap_or_else(|| config.page.query.clone());
            client::search(config.client, query).await?
        }
        Command::Front { query, output } => client::front(config, query, output).await?,
        Command::Whoami => client::whoami(config.client).await?,
        Command::Comments { title } => client::comments(config.client, title).await?,
        Command::Comment {
            title,
            content,
            parent,
        } => client::comment(config.client, title, content, parent).await?,
        Command::Delete { id } => client::delete(config.client, id).await?,
        Command::Redact { title, user } => client::redact(config.client, title, user).await?,
        Command::Remove { title, user } => client::remove(config.client, title, user).await?,
        Command::Login => client::login(config.client)?,
        Command::Logout => client::logout(config.client).await?,
    }

    Ok(())
}
