use clap::{Parser, Subcommand};
use shelfmark::config::{self, SiteConfig};
use shelfmark::covers::{CoverLookup, GoogleBooks};
use shelfmark::pipeline::{self, BuildOptions};
use shelfmark::{covers, output, scaffold, serve};
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

static VERSION: LazyLock<String> = LazyLock::new(|| {
    let version = env!("CARGO_PKG_VERSION");
    let revision = env!("SHELFMARK_REVISION");
    if revision.is_empty() || revision.trim_start_matches('v') == version {
        version.to_string()
    } else {
        format!("{version} ({revision})")
    }
});

#[derive(Parser)]
#[command(name = "shelfmark")]
#[command(about = "Static site generator for markdown reading notes")]
#[command(long_about = "\
Static site generator for markdown reading notes

Every markdown file in the source directory becomes one entry. A header
fenced by --- lines carries its metadata:

  posts/
  └── piranesi.md
        ---
        title: Piranesi
        date: 2024-03-02
        summary: A house of endless halls.
        cover:                    # blank: filled by `build --covers`
        rating: 4.5               # 0-5, half steps
        tags: fantasy, review
        ---

        ## Thoughts
        ...

Output:

  dist/
  ├── index.html                  # Home: every entry, newest first
  ├── rss.xml                     # RSS 2.0 feed
  └── posts/piranesi/index.html   # One page per entry

Environment: SITE_URL (absolute links in the feed), PORT (serve),
RUST_LOG (diagnostics, default warn).

Run 'shelfmark gen-config' to generate a documented shelfmark.toml.")]
#[command(version = VERSION.as_str())]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Markdown source directory (overrides paths.source)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory (overrides paths.output)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the home page, entry pages and feed
    Build {
        /// Look up covers for entries with a blank `cover:` line
        #[arg(long)]
        covers: bool,
    },
    /// Create a new entry from the review template
    New {
        /// Title of the book or post
        title: String,
        /// File name (defaults to the slug of the title)
        #[arg(long)]
        slug: Option<String>,
        /// Cover image URL
        #[arg(long)]
        cover: Option<String>,
        /// Rating, 0-5 [default: 4]
        #[arg(long)]
        rating: Option<String>,
    },
    /// Look up a cover for one entry and write it into its header
    FetchCover {
        /// Title to search for
        title: String,
        /// File name of the entry (defaults to the slug of the title)
        #[arg(long)]
        slug: Option<String>,
        /// Replace a cover that is already set
        #[arg(long)]
        force: bool,
    },
    /// Serve the output directory for preview
    Serve {
        /// Port (overrides serve.port and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print a stock shelfmark.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site = load_site_config(&cli)?;

    match cli.command {
        Command::Build { covers } => {
            let opts = BuildOptions {
                enrich_covers: covers || site.covers.auto_enrich,
            };
            let catalog = if opts.enrich_covers {
                Some(catalog(&site)?)
            } else {
                None
            };
            let report = pipeline::build(
                &site,
                &opts,
                catalog.as_ref().map(|c| c as &dyn CoverLookup),
            )?;
            output::print_build_output(&report, &site.paths);
        }
        Command::New {
            title,
            slug,
            cover,
            rating,
        } => {
            let entry = scaffold::NewEntry {
                title,
                slug,
                cover,
                rating,
            };
            let path = scaffold::create_entry(&site.paths.source, &entry)?;
            output::print_new_entry(&path);
        }
        Command::FetchCover { title, slug, force } => {
            let outcome = covers::fetch_cover(
                &site.paths.source,
                &title,
                slug.as_deref(),
                force,
                &catalog(&site)?,
            )?;
            output::print_fetch_outcome(&outcome);
        }
        Command::Serve { port } => {
            let port = port.unwrap_or(site.serve.port);
            serve::serve(&site.paths.output, port, &site.paths.index_document)?;
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Config file, then environment, then command-line paths.
fn load_site_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut site = config::load_config(&cli.config)?;
    if let Some(source) = &cli.source {
        site.paths.source = source.clone();
    }
    if let Some(output) = &cli.output {
        site.paths.output = output.clone();
    }
    Ok(site)
}

fn catalog(site: &SiteConfig) -> Result<GoogleBooks, covers::CoverError> {
    GoogleBooks::new(Duration::from_secs(site.covers.timeout_secs))
}
