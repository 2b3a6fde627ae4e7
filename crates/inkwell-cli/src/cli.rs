//! Argument parsing and command dispatch for the `inkwell` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;

use crate::client::{AppContext, CliResult, parse_url};
use crate::commands::articles::{handle_article, handle_articles, handle_search};
use crate::commands::comments::{handle_comment, handle_comments};
use crate::commands::navigate::handle_navigate;
use crate::commands::session::{handle_login, handle_logout, handle_whoami};
use crate::output::report_navigation;
use crate::telemetry::{LogFormat, LoggingConfig, init_logging};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_BASE_PATH: &str = "/api";
const DEFAULT_STATE_DIR: &str = ".inkwell";

/// Parses CLI arguments, executes the requested command, and reports the
/// outcome. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: cli.log_level.as_str(),
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let result = match AppContext::from_cli(&cli) {
        Ok(ctx) => {
            let outcome = dispatch(&ctx, cli.command, cli.output).await;
            report_navigation(ctx.terminal.take_navigation());
            outcome
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn dispatch(ctx: &AppContext, command: Command, format: OutputFormat) -> CliResult<()> {
    match command {
        Command::Login(args) => handle_login(ctx, args).await,
        Command::Logout => handle_logout(ctx),
        Command::Whoami => handle_whoami(ctx, format).await,
        Command::Articles(args) => handle_articles(ctx, args, format).await,
        Command::Article(args) => handle_article(ctx, args, format).await,
        Command::Search(args) => handle_search(ctx, args, format).await,
        Command::Comments(args) => handle_comments(ctx, args, format).await,
        Command::Comment(args) => handle_comment(ctx, args, format).await,
        Command::Navigate(args) => handle_navigate(ctx, args, format).await,
    }
}

#[derive(Parser)]
#[command(name = "inkwell", about = "Command-line client for an Inkwell blog server")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "INKWELL_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "INKWELL_BASE_PATH",
        default_value = DEFAULT_BASE_PATH,
        help = "Path prefix added to every API request"
    )]
    pub(crate) base_path: String,
    #[arg(
        long,
        global = true,
        env = "INKWELL_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "INKWELL_STATE_DIR",
        default_value = DEFAULT_STATE_DIR,
        help = "Directory holding the persisted session"
    )]
    pub(crate) state_dir: PathBuf,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "INKWELL_LOG_FORMAT", value_enum)]
    pub(crate) log_format: Option<LogFormat>,
    #[arg(
        long,
        global = true,
        env = "INKWELL_LOG_LEVEL",
        default_value = crate::telemetry::DEFAULT_LOG_LEVEL
    )]
    pub(crate) log_level: String,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sign in and persist the session.
    Login(LoginArgs),
    /// Forget the persisted session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List articles on the home page.
    Articles(ArticleListArgs),
    /// Show one article.
    Article(ArticleArgs),
    /// Search articles by keyword.
    Search(SearchArgs),
    /// List comments on an article.
    Comments(CommentListArgs),
    /// Post a comment on an article.
    Comment(CommentArgs),
    /// Evaluate the route guard for a screen path.
    Navigate(NavigateArgs),
}

#[derive(Args, Default)]
pub(crate) struct LoginArgs {
    #[arg(long, conflicts_with = "phone", required_unless_present = "phone")]
    pub(crate) username: Option<String>,
    #[arg(long, env = "INKWELL_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
    #[arg(long, requires = "code", help = "Sign in with a phone number and SMS code")]
    pub(crate) phone: Option<String>,
    #[arg(long)]
    pub(crate) code: Option<String>,
}

#[derive(Args, Default)]
pub(crate) struct ArticleListArgs {
    #[arg(long)]
    pub(crate) page: Option<u32>,
    #[arg(long)]
    pub(crate) page_size: Option<u32>,
    #[arg(long)]
    pub(crate) category: Option<i64>,
    #[arg(long)]
    pub(crate) state: Option<String>,
}

#[derive(Args)]
pub(crate) struct ArticleArgs {
    #[arg(help = "Article identifier")]
    pub(crate) id: i64,
}

#[derive(Args, Default)]
pub(crate) struct SearchArgs {
    #[arg(help = "Keyword to search for")]
    pub(crate) keyword: String,
    #[arg(long)]
    pub(crate) page: Option<u32>,
    #[arg(long)]
    pub(crate) page_size: Option<u32>,
}

#[derive(Args, Default)]
pub(crate) struct CommentListArgs {
    #[arg(help = "Article identifier")]
    pub(crate) article_id: i64,
    #[arg(long)]
    pub(crate) page: Option<u32>,
    #[arg(long)]
    pub(crate) page_size: Option<u32>,
}

#[derive(Args, Default)]
pub(crate) struct CommentArgs {
    #[arg(help = "Article identifier")]
    pub(crate) article_id: i64,
    #[arg(help = "Comment text")]
    pub(crate) content: String,
    #[arg(long, help = "Reply to this comment")]
    pub(crate) parent: Option<i64>,
}

#[derive(Args, Default)]
pub(crate) struct NavigateArgs {
    #[arg(help = "Screen path, e.g. /admin/article/manage")]
    pub(crate) path: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}
