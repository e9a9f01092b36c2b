use clap::{Parser, Subcommand};
use media_articles::config::{self, DirectoryConfig, MediaConfig};
use media_articles::snapshot::{self, ArticlePage, OutputPaths};
use media_articles::store::ArticleStore;
use media_articles::types::{Article, Category};
use media_articles::{output, scan};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "media-articles")]
#[command(about = "Article content pipeline for the media section")]
#[command(long_about = "\
Article content pipeline for the media section

Articles are markdown files with a YAML frontmatter block, one directory per
category. The build writes a JSON snapshot the site reads at build time.

Content structure:

  config.toml                      # Project config (optional)
  content/
  ├── case-studies/                # 導入事例
  │   └── manufacturing-ai.md
  ├── technical/                   # 技術解説
  │   └── rag-search.md
  └── news/                        # お知らせ
      └── anniversary.md

Frontmatter:

  ---
  title: RAG活用で企業内検索精度を大幅向上する実装手法
  category: 技術解説              # optional, defaults to the directory
  date: 2025-07-08
  excerpt: 検索拡張生成の設計と実装のポイントを解説します。
  slug: rag-search                 # optional, defaults to the file name
  author: 技術チーム               # optional
  tags: [RAG, LLM]                 # optional
  featured: false                  # optional
  ---

Files that fail validation are skipped and logged; run 'check' to list them.
Run 'media-articles gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root holding config.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Content directory (overrides content_dir from config.toml)
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content and write the article snapshot
    Build,
    /// Validate content without writing anything
    Check,
    /// List articles, newest first
    List {
        /// Only articles in this category (label or directory name)
        #[arg(long)]
        category: Option<String>,
        /// Maximum number of articles to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print one article as JSON, with content and rendered HTML
    Show {
        /// Article slug
        slug: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Build => {
            let (media_config, content_root) = load_project(&cli)?;
            println!("==> Scanning {}", content_root.display());
            let store = ArticleStore::load(&content_root, &media_config.directories);
            let paths = OutputPaths {
                snapshot: media_config.snapshot_path(&cli.root),
                pages_dir: media_config.pages_dir(&cli.root),
            };
            let report = snapshot::build(&store, &paths)?;
            output::print_build_output(&report, &cli.root);
            println!("==> Build complete");
        }
        Command::Check => {
            let (media_config, content_root) = load_project(&cli)?;
            println!("==> Checking {}", content_root.display());
            let report = scan::scan(&content_root, &media_config.directories)?;
            let store = ArticleStore::collect(report.drafts.clone());
            output::print_check_output(&report, &store);
            if report.is_clean() {
                println!("==> Content is valid");
            } else {
                println!(
                    "==> {} file(s) and {} directory(ies) skipped",
                    report.skipped_files.len(),
                    report.skipped_dirs.len()
                );
                std::process::exit(1);
            }
        }
        Command::List { category, limit } => {
            let (media_config, content_root) = load_project(&cli)?;
            let store = ArticleStore::load(&content_root, &media_config.directories);
            let articles: Vec<&Article> = match category {
                Some(name) => {
                    let category = resolve_category(name, &media_config.directories)?;
                    let mut articles = store.by_category(category);
                    if let Some(limit) = *limit {
                        articles.truncate(limit);
                    }
                    articles
                }
                None => store
                    .latest(limit.unwrap_or(media_config.listing.latest_limit))
                    .iter()
                    .collect(),
            };
            output::print_article_list(&articles);
        }
        Command::Show { slug } => {
            let (media_config, content_root) = load_project(&cli)?;
            let store = ArticleStore::load(&content_root, &media_config.directories);
            let article = store
                .by_slug(slug)
                .ok_or_else(|| format!("no article with slug '{slug}'"))?;
            println!("{}", serde_json::to_string_pretty(&ArticlePage::new(article))?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Route `log` records through env_logger; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Load `config.toml` from the project root and resolve the content root.
fn load_project(cli: &Cli) -> Result<(MediaConfig, PathBuf), config::ConfigError> {
    let media_config = config::load_config(&cli.root)?;
    let content_root = match &cli.content {
        Some(dir) => dir.clone(),
        None => media_config.content_root(&cli.root),
    };
    Ok((media_config, content_root))
}

/// Accept a category label, a stock directory name, or a configured one.
fn resolve_category(name: &str, dirs: &DirectoryConfig) -> Result<Category, String> {
    name.parse::<Category>().or_else(|err| {
        Category::ALL
            .into_iter()
            .find(|c| dirs.dir_for(*c) == name.trim())
            .ok_or(err)
    })
}
