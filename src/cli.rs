use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::{config::StoreOverrides, rank::DEFAULT_RANK_LIMIT};

#[derive(Debug, Parser)]
#[command(
    name = "spacefind",
    about = "Find wiki pages by approximate title"
)]
pub struct Cli {
    /// Wiki base URL (overrides CONFLUENCE_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Account name (overrides CONFLUENCE_USERNAME)
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// API key or password (overrides CONFLUENCE_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn store_overrides(&self) -> StoreOverrides {
        StoreOverrides {
            url: self.url.clone(),
            username: self.username.clone(),
            api_key: self.api_key.clone(),
            insecure: self.insecure,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a loosely typed title to a single page
    Resolve(TitleArgs),
    /// List the pages that best match a partial title
    Find(FindArgs),
    /// Resolve a title and print a preview of the page
    Get(TitleArgs),
    /// Show the slug and normalized key of a title (offline)
    Slug(SlugArgs),
    /// List all spaces
    Spaces(JsonArgs),
    /// List all pages in a space
    Pages(PagesArgs),
    /// Create a page
    Create(CreateArgs),
    /// Replace the title and body of a page
    Update(UpdateArgs),
    /// Start MCP server for AI agent integration
    Mcp,
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

#[derive(Debug, Parser)]
pub struct TitleArgs {
    /// Space name or key
    pub space: String,

    /// Page title, typos allowed
    pub title: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct FindArgs {
    /// Space name or key
    pub space: String,

    /// Partial or approximate title
    pub title: String,

    /// Number of matches to return
    #[arg(short = 'n', long, default_value_t = DEFAULT_RANK_LIMIT)]
    pub count: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct SlugArgs {
    /// Any title
    pub title: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct PagesArgs {
    /// Space name or key
    pub space: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CreateArgs {
    /// Space name or key
    pub space: String,

    /// Title of the new page
    pub title: String,

    /// Storage-format HTML body
    #[arg(long)]
    pub body: String,

    /// Id of the parent page
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Debug, Parser)]
pub struct UpdateArgs {
    /// Id of the page to update
    pub page_id: String,

    /// New title
    pub title: String,

    /// Storage-format HTML body
    #[arg(long)]
    pub body: String,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "spacefind",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_find_defaults() {
        let cli = Cli::parse_from(["spacefind", "find", "ENG", "q3 plan"]);
        match cli.command {
            Command::Find(args) => {
                assert_eq!(args.space, "ENG");
                assert_eq!(args.title, "q3 plan");
                assert_eq!(args.count, DEFAULT_RANK_LIMIT);
                assert!(!args.json);
            }
            _ => panic!("expected find command"),
        }
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn global_flags_after_the_subcommand() {
        let cli = Cli::parse_from([
            "spacefind",
            "get",
            "Engineering",
            "Runbook",
            "--url",
            "https://wiki.example.com",
            "--insecure",
            "-vv",
        ]);
        let overrides = cli.store_overrides();
        assert_eq!(overrides.url.as_deref(), Some("https://wiki.example.com"));
        assert!(overrides.insecure);
        assert!(overrides.api_key.is_none());
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn create_takes_an_optional_parent() {
        let cli = Cli::parse_from([
            "spacefind",
            "create",
            "ENG",
            "Postmortem",
            "--body",
            "<p>x</p>",
            "--parent",
            "42",
        ]);
        match cli.command {
            Command::Create(args) => {
                assert_eq!(args.body, "<p>x</p>");
                assert_eq!(args.parent.as_deref(), Some("42"));
            }
            _ => panic!("expected create command"),
        }
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["spacefind", "search", "x"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
