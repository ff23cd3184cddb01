mod utils;

use {
    std::{path::PathBuf, sync::Arc},
    anyhow::{Result, bail},
    clap::Parser,
    colored::Colorize,
    tracing::info,
    yt_comments_core::{
        config::Config,
        export::write_csv_file,
        pipeline::{CancelFlag, RunOptions, run},
        scorer::SentimentScorer,
        youtube::{YoutubeClient, video_id_from_url},
    },
    crate::utils::init_logging,
};

#[derive(Parser, Debug)]
#[command(
    name = "yt-comments",
    about = "Fetch the comments of a video and surface the most negative ones"
)]
struct Args {
    /// Video url or bare video id to analyze.
    #[arg(short, long)]
    url: Option<String>,

    /// Also analyze replies to top level comments.
    #[arg(short = 'r', long)]
    include_replies: bool,

    /// How many negative comments to show.
    #[arg(long)]
    top: Option<usize>,

    /// Per-comment display truncation in characters; 0 disables truncation.
    #[arg(long)]
    max_len: Option<usize>,

    /// Transport size limit applied to --chat output.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Write the full scored table to this CSV file.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Emit chat-style chunked output (2-decimal scores, one chunk per
    /// outbound message) instead of the colorized report.
    #[arg(long)]
    chat: bool,

    /// Read configuration from this file instead of ./config.toml.
    #[arg(short = 'c', long, value_name = "FILE")]
    config_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config_file {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let url = match &args.url {
        Some(url) => url,
        None => bail!("missing url parameter, pass -u/--url <video url or id>"),
    };
    let video_id = video_id_from_url(url)?;

    let pipeline_config = config.pipeline();
    let max_comment_len = match args.max_len {
        Some(0) => None,
        Some(n) => Some(n),
        None => Some(pipeline_config.max_comment_len()),
    };
    let options = RunOptions {
        include_replies: args.include_replies || pipeline_config.include_replies(),
        max_comment_len,
        top: args.top.unwrap_or_else(|| pipeline_config.top()),
        max_chunk_size: args
            .chunk_size
            .unwrap_or_else(|| pipeline_config.max_chunk_size()),
    };

    let source = YoutubeClient::new(&config.youtube())?;
    let scorer = build_scorer(&config).await?;

    let output = run(&source, scorer, &video_id, options, &CancelFlag::new()).await?;

    if let Some(path) = &args.output {
        write_csv_file(&output.table, path)?;
        info!("wrote {} rows to {}", output.table.len(), path.display());
    }

    if args.chat {
        info!("report split into {} chunk(s)", output.chunks.len());
        for (index, chunk) in output.chunks.iter().enumerate() {
            if index > 0 {
                println!("{}", "---- next message ----".dimmed());
            }
            println!("{}", chunk);
        }
    } else {
        print_report(&output.report);
    }

    Ok(())
}

#[cfg(feature = "bert")]
async fn build_scorer(config: &Config) -> Result<Arc<dyn SentimentScorer>> {
    use yt_comments_core::scorer::BertSentimentScorer;

    let threshold = config
        .scorer()
        .neutral_threshold()
        .unwrap_or(BertSentimentScorer::DEFAULT_NEUTRAL_THRESHOLD);
    Ok(Arc::new(BertSentimentScorer::new(threshold).await?))
}

#[cfg(not(feature = "bert"))]
async fn build_scorer(config: &Config) -> Result<Arc<dyn SentimentScorer>> {
    use yt_comments_core::scorer::LexiconScorer;

    info!("using the lexicon scorer; build with --features bert for the transformer model");
    Ok(match config.scorer().neutral_threshold() {
        Some(threshold) => Arc::new(LexiconScorer::new(threshold)),
        None => Arc::new(LexiconScorer::default()),
    })
}

fn print_report(report: &str) {
    for line in report.lines() {
        if line.starts_with("negative comment #") {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
}
