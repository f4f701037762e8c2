//! wikistore CLI: a file-backed wiki page tree from the command line.
//!
//! Commands: init, add, show, edit, history, ls, rm, watch, completions.
//! Results are printed as JSON on stdout; logs go to stderr.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use tracing::{debug, Level};

use wikistore_core::config::{WikiConfig, CONFIG_FILE};
use wikistore_core::path::WikiPath;
use wikistore_core::property::{PageProperty, LAST_MODIFYING_USER};
use wikistore_editing::{add_child_page, AddChildRequest};
use wikistore_store::{open_root, PageEvent, PageWatcher, WikiFilePage, WikiPage};

#[derive(Parser)]
#[command(name = "wikistore")]
#[command(version)]
#[command(about = "File-backed wiki page store")]
struct Cli {
    /// Config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a page tree and a default config file
    Init {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Create a child page
    Add {
        /// Parent page path, empty for the root
        resource: String,
        name: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Static, Test or Suite; inferred from the name when omitted
        #[arg(long, default_value = "")]
        page_type: String,
        #[arg(long)]
        help_text: Option<String>,
        #[arg(long)]
        suites: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Print a page
    Show {
        path: String,
        #[arg(long)]
        version: Option<String>,
    },
    /// Replace a page's content, keeping its properties
    Edit {
        path: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// List stored versions, newest first
    History { path: String },
    /// List child pages
    Ls {
        #[arg(default_value = "")]
        path: String,
    },
    /// Delete a page and its descendants
    Rm { path: String },
    /// Print page change events
    Watch {
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Serialize)]
struct PageView<'a> {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    content: &'a str,
    properties: &'a PageProperty,
    last_modified: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct ChildView {
    name: String,
    path: String,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum WatchView {
    Changed { page: String },
    Removed { page: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Init { dir } => init(&dir),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "wikistore", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let config = WikiConfig::load(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            debug!(root = %config.root.display(), versions = ?config.versions, "loaded config");
            let root = open_root(&config)?;
            run_on_tree(&root, config, command)
        }
    }
}

fn run_on_tree(root: &WikiFilePage, config: WikiConfig, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Init { .. } | Commands::Completions { .. } => {
            bail!("command does not operate on a page tree")
        }
        Commands::Add {
            resource,
            name,
            content,
            page_type,
            help_text,
            suites,
            author,
        } => {
            let request = AddChildRequest {
                resource,
                page_name: name,
                page_content: content,
                page_type,
                help_text,
                suites,
                author: author.or(config.author),
            };
            let response = add_child_page(root, &request);
            print_json(&response)?;
            if response.status >= 400 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Show { path, version } => {
            let mut page = find_page(root, &path)?;
            if let Some(version) = &version {
                page = page.version(version)?;
            }
            let data = page.data()?;
            print_json(&PageView {
                path: page.path().qualified_name(),
                version: page.version_name(),
                content: data.content(),
                properties: data.properties(),
                last_modified: data.last_modified(),
            })?;
        }
        Commands::Edit {
            path,
            content,
            author,
        } => {
            let page = find_page(root, &path)?;
            let mut data = page.data()?;
            data.set_content(content);
            data.properties_mut().set_last_modified(Some(Utc::now()));
            match author.or(config.author) {
                Some(author) => data.properties_mut().set_text(LAST_MODIFYING_USER, author),
                None => {
                    data.properties_mut().remove(LAST_MODIFYING_USER);
                }
            }
            let info = page.commit(&data)?;
            print_json(&info)?;
        }
        Commands::History { path } => {
            let page = find_page(root, &path)?;
            print_json(&page.versions()?)?;
        }
        Commands::Ls { path } => {
            let page = find_page(root, &path)?;
            let children: Vec<ChildView> = page
                .children()?
                .iter()
                .map(|child| ChildView {
                    name: child.name().to_string(),
                    path: child.path().qualified_name(),
                })
                .collect();
            print_json(&children)?;
        }
        Commands::Rm { path } => {
            let page = find_page(root, &path)?;
            if page.is_root() {
                bail!("refusing to remove the root page");
            }
            page.remove()?;
            print_json(&serde_json::json!({ "removed": page.path().qualified_name() }))?;
        }
        Commands::Watch { seconds } => watch(root, seconds)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn init(dir: &Path) -> Result<ExitCode> {
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }
    let config = WikiConfig::default();
    std::fs::create_dir_all(dir.join(&config.root))
        .with_context(|| format!("creating {}", dir.join(&config.root).display()))?;
    std::fs::write(&config_path, config.to_toml()?)
        .with_context(|| format!("writing {}", config_path.display()))?;

    print_json(&serde_json::json!({
        "config": config_path,
        "root": dir.join(&config.root),
    }))?;
    Ok(ExitCode::SUCCESS)
}

/// Resolve `path` against the root and load the page, which must exist.
fn find_page(root: &WikiFilePage, path: &str) -> Result<WikiFilePage> {
    let Some(resolved) = WikiPath::parse(path)?.resolve(&WikiPath::root()) else {
        bail!("backward search paths are not supported here: {path}");
    };
    match root.page_at(&resolved)? {
        Some(page) => Ok(page),
        None => bail!("page not found: {path}"),
    }
}

fn watch(root: &WikiFilePage, seconds: Option<u64>) -> Result<()> {
    let watcher = PageWatcher::start(root.dir())?;
    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));
    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(());
        }
        let Some(event) = watcher.recv_timeout(Duration::from_millis(200)) else {
            continue;
        };
        let view = match event {
            PageEvent::Changed(page) => WatchView::Changed {
                page: page.qualified_name(),
            },
            PageEvent::Removed(page) => WatchView::Removed {
                page: page.qualified_name(),
            },
        };
        println!("{}", serde_json::to_string(&view)?);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
