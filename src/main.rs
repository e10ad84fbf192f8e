use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rsent::default_keywords;
use rsent::{
    init_tracing_once, load_records, render_charts, save_records, score_and_store, CleanedPost, CollectOptions,
    CollectionStats, Collector, LexiconScorer, Preprocessor, RedditSearchClient, RunOutcome, SqliteStore,
    StoreOptions,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

const WRITE_BUF: usize = 256 * 1024;

#[derive(Parser, Debug)]
#[command(name = "rsent")]
#[command(about = "Collect, clean and score Reddit posts about a brand")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search Reddit and write the raw posts
    Collect {
        #[command(flatten)]
        search: SearchArgs,
        #[arg(short, long, default_value = "reddit_posts.csv")]
        output: PathBuf,
    },
    /// Clean a raw batch and write the cleaned batch plus a summary
    Preprocess {
        #[arg(short, long, default_value = "reddit_posts.csv")]
        input: PathBuf,
        #[arg(short, long, default_value = "reddit_posts_cleaned.csv")]
        output: PathBuf,
        #[arg(long)]
        summary: Option<PathBuf>,
        #[arg(long)]
        brand: Option<String>,
        #[command(flatten)]
        quality: QualityArgs,
    },
    /// Load a cleaned batch into SQLite
    Import {
        #[arg(short, long, default_value = "reddit_posts_cleaned.csv")]
        input: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Score every stored post and write the sentiment columns
    Sentiment {
        #[command(flatten)]
        store: StoreArgs,
        /// VADER-format lexicon file replacing the built-in one
        #[arg(long)]
        lexicon: Option<PathBuf>,
        #[arg(long)]
        no_progress: bool,
    },
    /// Render PNG charts for the scored posts
    Charts {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long, default_value = "charts")]
        out_dir: PathBuf,
    },
    /// collect → preprocess → import → sentiment → charts
    Run {
        #[command(flatten)]
        search: SearchArgs,
        #[command(flatten)]
        quality: QualityArgs,
        #[command(flatten)]
        store: StoreArgs,
        /// Reuse an existing raw batch instead of searching
        #[arg(long)]
        skip_collect: bool,
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        #[arg(long)]
        lexicon: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[arg(long, default_value = "Nike")]
    brand: String,
    /// Search keyword; repeat for several (defaults to the built-in brand set)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,
    /// Subreddit to search; repeat for several
    #[arg(short, long = "subreddit", default_value = "all")]
    subreddits: Vec<String>,
    #[arg(long, default_value_t = 1000)]
    max_posts: usize,
    #[arg(long, default_value = "relevance")]
    sort: String,
    #[arg(long, default_value = "month")]
    time_filter: String,
    #[arg(long, default_value_t = 1000)]
    page_delay_ms: u64,
    #[arg(long, env = "RSENT_USER_AGENT")]
    user_agent: Option<String>,
    #[arg(long)]
    no_progress: bool,
}

impl SearchArgs {
    fn options(&self) -> CollectOptions {
        let keywords = if self.keywords.is_empty() { default_keywords() } else { self.keywords.clone() };
        let mut opts = CollectOptions::default()
            .with_brand(self.brand.clone())
            .with_keywords(keywords)
            .with_subreddits(&self.subreddits)
            .with_max_posts(self.max_posts)
            .with_sort(self.sort.clone())
            .with_time_filter(self.time_filter.clone())
            .with_page_delay(Duration::from_millis(self.page_delay_ms))
            .with_progress(!self.no_progress);
        if let Some(ua) = &self.user_agent {
            opts = opts.with_user_agent(ua.clone());
        }
        opts
    }
}

#[derive(Args, Debug)]
struct QualityArgs {
    /// Cleaned full text must be longer than this many characters
    #[arg(long, default_value_t = 10)]
    min_text_len: usize,
    #[arg(long, default_value_t = 3)]
    min_word_count: usize,
    #[arg(long, default_value_t = -50, allow_hyphen_values = true)]
    min_score: i64,
}

#[derive(Args, Debug)]
struct StoreArgs {
    #[arg(long, env = "RSENT_DB", default_value = "reddit_posts.db")]
    db: PathBuf,
    #[arg(long, default_value = "posts")]
    table: String,
}

impl StoreArgs {
    fn options(&self) -> StoreOptions {
        StoreOptions::default().with_db_path(&self.db).with_table(self.table.clone())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_once();

    // stage failures are reported, not turned into a failing exit code
    if let Err(e) = dispatch(cli.command) {
        tracing::error!("{e:#}");
    }
    Ok(())
}

fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Collect { search, output } => collect(&search.options(), &output).map(|_| ()),
        Command::Preprocess { input, output, summary, brand, quality } => {
            let mut pre = preprocessor(&input, &output, &quality);
            if let Some(s) = summary {
                pre = pre.summary(s);
            }
            if let Some(b) = brand {
                pre = pre.brand(b);
            }
            report_preprocess(&pre.run(), pre.options().brand.as_deref());
            Ok(())
        }
        Command::Import { input, store } => import(&input, &store.options()),
        Command::Sentiment { store, lexicon, no_progress } => sentiment(&store.options(), lexicon.as_deref(), !no_progress),
        Command::Charts { store, out_dir } => charts(&store.options(), &out_dir),
        Command::Run { search, quality, store, skip_collect, data_dir, lexicon } => {
            let opts = search.options();
            let raw_path = data_dir.join("reddit_posts.csv");
            let cleaned_path = data_dir.join("reddit_posts_cleaned.csv");

            if !skip_collect && collect(&opts, &raw_path)? == 0 {
                tracing::warn!("No posts collected; stopping");
                return Ok(());
            }
            let pre = preprocessor(&raw_path, &cleaned_path, &quality).brand(&opts.brand);
            let outcome = pre.run();
            report_preprocess(&outcome, pre.options().brand.as_deref());
            if !outcome.is_saved() {
                return Ok(());
            }
            let store_opts = store.options();
            import(&cleaned_path, &store_opts)?;
            sentiment(&store_opts, lexicon.as_deref(), opts.progress)?;
            charts(&store_opts, &data_dir.join("charts"))
        }
    }
}

fn preprocessor(input: &Path, output: &Path, q: &QualityArgs) -> Preprocessor {
    Preprocessor::new()
        .input(input)
        .output(output)
        .min_text_len(q.min_text_len)
        .min_word_count(q.min_word_count)
        .min_score(q.min_score)
}

fn report_preprocess(outcome: &RunOutcome, brand: Option<&str>) {
    match outcome {
        RunOutcome::Saved { batch, paths } => {
            println!("{}", batch.summary(brand));
            println!("Cleaned data: {}", paths.output.display());
            println!("Summary: {}", paths.summary.display());
        }
        RunOutcome::SaveFailed { batch, error } => {
            println!("Cleaned {} posts but could not save them: {error}", batch.cleaned_count());
        }
        RunOutcome::LoadFailed(e) => println!("Nothing preprocessed: {e}"),
    }
}

fn collect(opts: &CollectOptions, output: &Path) -> Result<usize> {
    let client = RedditSearchClient::new(opts).context("build HTTP client")?;
    let report = Collector::new(client, opts.clone()).collect();
    if report.failed_searches > 0 {
        tracing::warn!(
            failed = report.failed_searches,
            total = report.total_searches,
            "Some searches failed"
        );
    }
    if report.is_empty() {
        println!("No posts collected");
        return Ok(0);
    }
    save_records(output, &report.posts, WRITE_BUF).with_context(|| format!("save {}", output.display()))?;
    println!("Data saved to {}", output.display());
    println!("{}", CollectionStats::from_posts(&report.posts));
    Ok(report.posts.len())
}

fn import(input: &Path, store_opts: &StoreOptions) -> Result<()> {
    let posts: Vec<CleanedPost> = load_records(input).with_context(|| format!("load {}", input.display()))?;
    let mut store = SqliteStore::open(store_opts).context("open store")?;
    let tally = store.upsert_posts(&posts)?;
    println!("Stored {} posts in {} ({} failed)", tally.succeeded, store.table(), tally.failed);
    Ok(())
}

fn sentiment(store_opts: &StoreOptions, lexicon: Option<&Path>, progress: bool) -> Result<()> {
    let scorer = match lexicon {
        Some(p) => LexiconScorer::from_lexicon_file(p)?,
        None => LexiconScorer::builtin(),
    };
    let mut store = SqliteStore::open(store_opts).context("open store")?;
    let texts = store.fetch_texts()?;
    tracing::info!("Fetched {} rows for scoring", texts.len());
    let tally = score_and_store(&texts, &scorer, &mut store, progress);
    println!("{} rows updated successfully, {} rows failed", tally.succeeded, tally.failed);
    Ok(())
}

fn charts(store_opts: &StoreOptions, out_dir: &Path) -> Result<()> {
    let store = SqliteStore::open(store_opts).context("open store")?;
    let rows = store.fetch_scored()?;
    for path in render_charts(&rows, out_dir)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
