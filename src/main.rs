//! Loupe main entry point
//!
//! This is the command-line interface for the Loupe site search engine.

use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use loupe::config::{load_config_or_default, Config};
use loupe::storage::{ProjectRecord, SqliteStorage};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Loupe: a local crawler and search engine
///
/// Loupe registers projects with their domain scope, crawls each site one
/// URL at a time into a SQLite index, and answers ranked full-text queries
/// over everything it has indexed.
#[derive(Parser, Debug)]
#[command(name = "loupe")]
#[command(version = "0.9.0")]
#[command(about = "A local crawler and search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if absent)
    #[arg(
        short,
        long,
        global = true,
        value_name = "CONFIG",
        default_value = "loupe.toml"
    )]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the configuration and the database
    Check,

    /// Create a project with its domain allow-list
    AddProject {
        /// Project name (must be unique)
        name: String,

        /// Domains the project may crawl, comma separated;
        /// a leading dot allows subdomains (".example.com")
        #[arg(long, required = true, value_delimiter = ',')]
        domains: Vec<String>,

        /// Override the configured link depth limit
        #[arg(long)]
        max_depth: Option<u32>,

        /// Override the configured politeness delay (milliseconds)
        #[arg(long)]
        crawl_delay_ms: Option<u64>,

        /// Override whether crawls consult robots.txt (true/false)
        #[arg(long)]
        respect_robots: Option<bool>,
    },

    /// Register a site under a project
    AddSite {
        /// Project name or ID the site belongs to
        #[arg(long)]
        project: String,

        /// The site's base URL
        url: String,
    },

    /// Crawl a registered site
    Crawl {
        /// ID of the site to crawl
        site: i64,

        /// Page budget for this run
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1000))]
        max_pages: Option<u32>,
    },

    /// Search the index
    Search(SearchArgs),

    /// Suggest query completions for a prefix
    Suggest {
        /// Partial query (at least two characters)
        query: String,

        /// Restrict suggestions to one project (name or ID)
        #[arg(long)]
        project: Option<String>,
    },

    /// Show registered sites and index statistics
    Status {
        /// Show a single site instead of all of them
        #[arg(long)]
        site: Option<i64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent crawl runs
    History {
        /// Restrict to one project (name or ID)
        #[arg(long)]
        project: Option<String>,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the crawl queue
    Queue {
        /// Restrict to one project (name or ID)
        #[arg(long)]
        project: Option<String>,

        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the term index from stored documents
    Reindex {
        /// Reindex one site
        #[arg(long, conflicts_with = "project", required_unless_present = "project")]
        site: Option<i64>,

        /// Reindex every site of a project (name or ID)
        #[arg(long)]
        project: Option<String>,
    },

    /// Remove orphaned postings and refresh planner statistics
    Optimize,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// The search query; quoted phrases must appear verbatim
    query: String,

    /// Restrict results to one project (name or ID)
    #[arg(long)]
    project: Option<String>,

    /// Filter by content type (html, text, image, media)
    #[arg(long)]
    content_type: Option<String>,

    /// Filter by site ID
    #[arg(long)]
    site: Option<i64>,

    /// Filter by document language (fr, en)
    #[arg(long)]
    language: Option<String>,

    /// Only documents indexed on or after this date (YYYY-MM-DD)
    #[arg(long)]
    date_from: Option<String>,

    /// Only documents indexed on or before this date (YYYY-MM-DD)
    #[arg(long)]
    date_to: Option<String>,

    /// Result order: relevance, date, title or pagerank
    #[arg(long, default_value = "relevance")]
    sort: String,

    /// 1-based result page
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Results per page
    #[arg(long)]
    per_page: Option<u32>,

    /// Treat the whole query as one exact phrase
    #[arg(long)]
    exact_phrase: bool,

    /// Disable synonym expansion
    #[arg(long)]
    no_synonyms: bool,

    /// Print the full response as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_or_default(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Commands::Check => handle_check(&config, &cli.config)?,
        Commands::AddProject {
            name,
            domains,
            max_depth,
            crawl_delay_ms,
            respect_robots,
        } => handle_add_project(
            &config,
            &name,
            &domains,
            max_depth,
            crawl_delay_ms,
            respect_robots,
        )?,
        Commands::AddSite { project, url } => handle_add_site(&config, &project, &url)?,
        Commands::Crawl { site, max_pages } => handle_crawl(config, site, max_pages).await?,
        Commands::Search(args) => handle_search(&config, args)?,
        Commands::Suggest { query, project } => {
            handle_suggest(&config, &query, project.as_deref())?
        }
        Commands::Status { site, json } => handle_status(&config, site, json)?,
        Commands::History { project, json } => handle_history(&config, project.as_deref(), json)?,
        Commands::Queue { project, json } => handle_queue(&config, project.as_deref(), json)?,
        Commands::Reindex { site, project } => handle_reindex(&config, site, project.as_deref())?,
        Commands::Optimize => handle_optimize(&config)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("loupe=info,warn"),
            1 => EnvFilter::new("loupe=debug,info"),
            2 => EnvFilter::new("loupe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Opens the configured database, creating the schema on first use
fn open_db(config: &Config) -> Result<SqliteStorage> {
    use loupe::storage::open_storage;
    use std::path::Path;

    Ok(open_storage(Path::new(&config.database.path))?)
}

/// Resolves a project argument that may be a numeric ID or a name
fn resolve_project(storage: &SqliteStorage, reference: &str) -> Result<ProjectRecord> {
    use loupe::storage::Store;
    use loupe::LoupeError;

    let project = if let Ok(id) = reference.parse::<i64>() {
        storage.get_project(id)?
    } else {
        storage.get_project_by_name(reference)?
    };

    Ok(project.ok_or_else(|| LoupeError::ProjectNotFound(reference.to_string()))?)
}

/// Handles `check`: validates the configuration and opens the database
fn handle_check(config: &Config, config_path: &std::path::Path) -> Result<()> {
    use loupe::config::compute_config_hash;
    use loupe::storage::Store;

    println!("=== Loupe Check ===\n");

    println!("Configuration: {}", config_path.display());
    if config_path.exists() {
        println!("Config hash: {}", compute_config_hash(config_path)?);
    } else {
        println!("Config file absent, using built-in defaults");
    }
    println!("\nCrawler:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Crawl delay: {}ms", config.crawler.crawl_delay_ms);
    println!("  Default page budget: {}", config.crawler.default_max_pages);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!(
        "  Max content length: {} bytes",
        config.crawler.max_content_length
    );
    println!("  Max links per page: {}", config.crawler.max_links_per_page);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);

    println!("\nUser agent: {}", config.user_agent.agent_string());

    println!("\nSearch:");
    println!("  Default per page: {}", config.search.default_per_page);
    println!("  Max per page: {}", config.search.max_per_page);
    println!("  Snippet length: {}", config.search.snippet_length);

    let storage = open_db(config)?;
    let sites = storage.list_sites()?;
    let stats = storage.index_statistics()?;

    println!("\nDatabase: {}", config.database.path);
    println!("  Sites: {}", sites.len());
    println!("  Documents: {}", stats.total_documents);
    println!("  Distinct terms: {}", stats.distinct_terms);

    println!("\n✓ Configuration is valid");
    println!("✓ Database ready");

    Ok(())
}

/// Handles `add-project`: creates a project with validated settings
fn handle_add_project(
    config: &Config,
    name: &str,
    domains: &[String],
    max_depth: Option<u32>,
    crawl_delay_ms: Option<u64>,
    respect_robots: Option<bool>,
) -> Result<()> {
    use loupe::config::{validate_crawl_settings, validate_domain};
    use loupe::storage::Store;
    use std::time::Duration;

    for domain in domains {
        validate_domain(domain)?;
    }

    let mut settings = config.default_crawl_settings();
    if let Some(depth) = max_depth {
        settings.max_depth = depth;
    }
    if let Some(delay) = crawl_delay_ms {
        settings.crawl_delay = Duration::from_millis(delay);
    }
    if let Some(robots) = respect_robots {
        settings.respect_robots = robots;
    }
    validate_crawl_settings(&settings)?;

    let mut storage = open_db(config)?;
    if storage.get_project_by_name(name)?.is_some() {
        bail!("A project named '{}' already exists", name);
    }

    let project_id = storage.create_project(name, domains, &settings)?;
    tracing::info!("Created project '{}' with id {}", name, project_id);

    println!("✓ Created project '{}' (id {})", name, project_id);
    println!("  Domains: {}", domains.join(", "));
    println!("  Max depth: {}", settings.max_depth);
    println!("  Crawl delay: {}ms", settings.crawl_delay.as_millis());
    println!("  Respect robots.txt: {}", settings.respect_robots);

    Ok(())
}

/// Handles `add-site`: registers a site's base URL under a project
fn handle_add_site(config: &Config, project: &str, url: &str) -> Result<()> {
    use loupe::storage::Store;
    use loupe::url::normalize_url;
    use loupe::LoupeError;

    let normalized = normalize_url(url)?;
    let domain = normalized
        .host_str()
        .ok_or_else(|| anyhow!("URL '{}' has no host", url))?
        .to_string();

    let mut storage = open_db(config)?;
    let project = resolve_project(&storage, project)?;

    if storage.find_site_by_url(normalized.as_str())?.is_some() {
        return Err(LoupeError::DuplicateSite {
            url: normalized.to_string(),
        }
        .into());
    }

    let site_id = storage.create_site(project.id, &domain, normalized.as_str())?;
    tracing::info!("Registered site {} under project '{}'", site_id, project.name);

    println!("✓ Registered site {} (id {})", normalized, site_id);
    println!("  Project: {}", project.name);
    println!("  Domain: {}", domain);
    println!("  Crawl it with: loupe crawl {}", site_id);

    Ok(())
}

/// Handles `crawl`: runs a full crawl of one site
async fn handle_crawl(config: Config, site_id: i64, max_pages: Option<u32>) -> Result<()> {
    use loupe::crawler::Crawler;
    use loupe::state::CancelToken;
    use loupe::storage::RunStatus;
    use std::sync::{Arc, Mutex};

    let storage = Arc::new(Mutex::new(open_db(&config)?));

    // Ctrl-C stops the run after the current URL instead of killing it
    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current URL");
            signal_token.cancel();
        }
    });

    let crawler = Crawler::new(Arc::new(config), storage, cancel)?;
    let report = crawler.crawl_site(site_id, max_pages).await?;

    println!("\n=== Crawl Report ===\n");
    println!("Site {} (run {})", report.site_id, report.history_id);
    println!("Status: {}", report.status.to_db_string());
    println!("  URLs crawled:   {}", report.counters.urls_crawled);
    println!("  Indexed:        {}", report.counters.urls_successful);
    println!("  Failed:         {}", report.counters.urls_failed);
    println!("  Skipped:        {}", report.counters.urls_skipped);
    println!("  Discovered:     {}", report.counters.urls_discovered);
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());

    if !report.errors.is_empty() {
        println!("\nErrors ({}):", report.errors.len());
        for error in report.errors.iter().take(10) {
            println!("  - {}", error);
        }
        if report.errors.len() > 10 {
            println!("  ... and {} more", report.errors.len() - 10);
        }
    }

    if report.status == RunStatus::Failed {
        bail!("crawl of site {} failed", site_id);
    }

    Ok(())
}

/// Handles `search`: runs a query and prints the ranked results
fn handle_search(config: &Config, args: SearchArgs) -> Result<()> {
    use loupe::report::print_search;
    use loupe::search::{execute, SearchOptions, SortOrder};

    let sort: SortOrder = args.sort.parse().map_err(|e: String| anyhow!(e))?;

    let storage = open_db(config)?;
    let project_id = match &args.project {
        Some(reference) => Some(resolve_project(&storage, reference)?.id),
        None => None,
    };

    let options = SearchOptions {
        project_id,
        content_type: args.content_type,
        site_id: args.site,
        language: args.language,
        date_from: args.date_from,
        date_to: args.date_to,
        sort,
        page: args.page,
        per_page: args.per_page,
        include_synonyms: !args.no_synonyms,
        exact_phrase: args.exact_phrase,
    };

    let response = execute(&storage, &config.search, &args.query, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_search(&response);
    }

    Ok(())
}

/// Handles `suggest`: prints completions for a partial query
fn handle_suggest(config: &Config, query: &str, project: Option<&str>) -> Result<()> {
    use loupe::search::suggestions;

    let storage = open_db(config)?;
    let project_id = match project {
        Some(reference) => Some(resolve_project(&storage, reference)?.id),
        None => None,
    };

    let found = suggestions(&storage, query, project_id)?;
    if found.is_empty() {
        println!("No suggestions for \"{}\"", query);
    } else {
        for suggestion in &found {
            println!("{}", suggestion);
        }
    }

    Ok(())
}

/// Handles `status`: prints sites and index statistics
fn handle_status(config: &Config, site: Option<i64>, json: bool) -> Result<()> {
    use loupe::report::{load_status, print_status};

    let storage = open_db(config)?;
    let report = load_status(&storage, site)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_status(&report);
    }

    Ok(())
}

/// Handles `history`: prints recent crawl runs, newest first
fn handle_history(config: &Config, project: Option<&str>, json: bool) -> Result<()> {
    use loupe::report::{print_history, HISTORY_LIMIT};
    use loupe::storage::Store;

    let storage = open_db(config)?;
    let project_id = match project {
        Some(reference) => Some(resolve_project(&storage, reference)?.id),
        None => None,
    };

    let records = storage.list_history(project_id, HISTORY_LIMIT)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No crawl runs recorded");
    } else {
        print_history(&records);
    }

    Ok(())
}

/// Handles `queue`: prints a snapshot of pending and finished queue entries
fn handle_queue(config: &Config, project: Option<&str>, json: bool) -> Result<()> {
    use loupe::report::{print_queue, QUEUE_LIMIT};
    use loupe::storage::Store;

    let storage = open_db(config)?;
    let project_id = match project {
        Some(reference) => Some(resolve_project(&storage, reference)?.id),
        None => None,
    };

    let rows = storage.queue_snapshot(project_id, QUEUE_LIMIT)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_queue(&rows);
    }

    Ok(())
}

/// Handles `reindex`: rebuilds the term index for a site or a project
fn handle_reindex(config: &Config, site: Option<i64>, project: Option<&str>) -> Result<()> {
    use loupe::index::{reindex_project, reindex_site};

    let mut storage = open_db(config)?;

    let summary = match (site, project) {
        (Some(site_id), None) => {
            println!("Reindexing site {}...", site_id);
            reindex_site(&mut storage, site_id)?
        }
        (None, Some(reference)) => {
            let project = resolve_project(&storage, reference)?;
            println!("Reindexing project '{}'...", project.name);
            reindex_project(&mut storage, project.id)?
        }
        _ => bail!("pass exactly one of --site or --project"),
    };

    println!(
        "✓ Reindexed {} documents ({} postings)",
        summary.documents, summary.postings
    );
    if summary.failures > 0 {
        println!("  {} documents failed to reindex", summary.failures);
    }

    Ok(())
}

/// Handles `optimize`: prunes orphaned postings and refreshes statistics
fn handle_optimize(config: &Config) -> Result<()> {
    use loupe::index::optimize;

    let mut storage = open_db(config)?;
    let summary = optimize(&mut storage)?;

    println!(
        "✓ Index optimized ({} orphaned postings removed)",
        summary.orphans_removed
    );

    Ok(())
}
