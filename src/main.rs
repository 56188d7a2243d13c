use clap::Parser;
use serde::Serialize;
use serde_json::json;
use spacefind::{
    cli::{Cli, Command, FindArgs, TitleArgs},
    config::{StoreConfig, StoreOverrides},
    confluence::ConfluenceClient,
    error::{self, Error},
    mcp,
    normalize::NormalizedTitle,
    resolve::Resolution,
    tools::{self, PageTools},
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("SPACEFIND_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let overrides = cli.store_overrides();

    match cli.command {
        Command::Slug(args) => {
            cmd_slug(&args.title, args.json)?;
        }
        Command::Completions(args) => {
            args.generate();
        }
        Command::Mcp => {
            mcp::run_mcp(connect(&overrides)?)?;
        }
        Command::Resolve(args) => {
            cmd_resolve(&connect(&overrides)?, &args)?;
        }
        Command::Find(args) => {
            cmd_find(&connect(&overrides)?, &args)?;
        }
        Command::Get(args) => {
            let tools = connect(&overrides)?;
            let view = tools.page_content(&args.space, &args.title)?;
            if args.json {
                print_json(&view)?;
            } else {
                println!("{}", tools::format_page(&view));
            }
        }
        Command::Spaces(args) => {
            let spaces = connect(&overrides)?.spaces()?;
            if args.json {
                print_json(&spaces)?;
            } else {
                println!("{}", tools::format_spaces(&spaces));
            }
        }
        Command::Pages(args) => {
            let pages = connect(&overrides)?.pages(&args.space)?;
            if args.json {
                print_json(&pages)?;
            } else {
                println!("{}", tools::format_pages(&pages, &args.space));
            }
        }
        Command::Create(args) => {
            let link = connect(&overrides)?.create_page(
                &args.space,
                &args.title,
                &args.body,
                args.parent.as_deref(),
            )?;
            println!("{}", tools::format_link(&link, "created"));
        }
        Command::Update(args) => {
            let link = connect(&overrides)?.update_page(
                &args.page_id,
                &args.title,
                &args.body,
            )?;
            println!("{}", tools::format_link(&link, "updated"));
        }
    }

    Ok(())
}

/// Build the tool layer over the HTTP client. Only commands that talk to
/// the wiki call this, so `slug` works without credentials.
fn connect(overrides: &StoreOverrides) -> error::Result<PageTools> {
    let client = ConfluenceClient::new(StoreConfig::resolve(overrides)?)?;
    let base_url = client.config().base_url.clone();
    let page_size = client.config().page_size;
    tracing::debug!(?client, "connected");
    Ok(PageTools::new(Box::new(client), &base_url).with_page_size(page_size))
}

fn print_json(value: &impl Serialize) -> error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_slug(title: &str, json: bool) -> error::Result<()> {
    let normalized = NormalizedTitle::new(title);
    if json {
        print_json(&json!({
            "title": title,
            "slug": normalized.slug,
            "norm_key": normalized.norm_key,
        }))?;
    } else {
        println!("slug: {}", normalized.slug);
        println!("key: {}", normalized.norm_key);
    }
    Ok(())
}

fn cmd_resolve(tools: &PageTools, args: &TitleArgs) -> error::Result<()> {
    let (space_key, resolution) = tools.resolve(&args.space, &args.title)?;
    let hit = match resolution {
        Resolution::Resolved(hit) => hit,
        Resolution::NotFound => {
            return Err(Error::NotFound {
                kind: "page",
                name: format!("{} (space {space_key})", args.title),
            });
        }
    };

    if args.json {
        print_json(&json!({
            "space": space_key,
            "id": hit.document.id,
            "title": hit.document.title,
            "kind": hit.kind,
            "score": hit.score,
            "url": tools.page_url(&hit.document.id),
        }))?;
    } else {
        let score = hit
            .score
            .map(|s| format!("{s:.3}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{score}\t{}\t{}",
            hit.kind, hit.document.id, hit.document.title
        );
    }
    Ok(())
}

fn cmd_find(tools: &PageTools, args: &FindArgs) -> error::Result<()> {
    let matches = tools.find_pages(&args.space, &args.title, args.count)?;
    if args.json {
        print_json(&matches)?;
        return Ok(());
    }

    if matches.is_empty() {
        eprintln!("No pages match '{}'", args.title);
        return Ok(());
    }
    for m in &matches {
        println!("{:.3}\t{}\t{}", m.score, m.document.id, m.document.title);
    }
    Ok(())
}
