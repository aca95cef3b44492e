use anyhow::Result;
use clap::{Parser, ValueEnum};

use comment_graph_analyzer::data::{self, json, parquet};
use comment_graph_analyzer::{analyze, storage, viz, AnalysisConfig, ClosenessDirection};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// Comment-thread pages as returned by the platform API
    Threads,
    /// JSON array of already flattened comment records
    Records,
    /// Parquet comment table
    Parquet,
}

#[derive(Parser, Debug)]
#[clap(
    name = "comment-graph-analyzer",
    about = "Reply graph, centrality and community analysis of video comments"
)]
struct Cli {
    /// Path to the comment input
    #[clap(long)]
    input: String,

    /// Input format
    #[clap(long, value_enum, default_value = "threads")]
    format: InputFormat,

    /// Output directory for results
    #[clap(long, default_value = "comment_analysis")]
    output_dir: String,

    /// Number of top-degree authors in the visualization subgraph
    #[clap(long, default_value = "50")]
    top_n: usize,

    /// Number of authors sampled for community detection
    #[clap(long, default_value = "500")]
    sample_size: usize,

    /// Number of centrality rows shown and saved as the top table
    #[clap(long, default_value = "10")]
    table_rows: usize,

    /// Direction of the shortest paths used for closeness centrality
    #[clap(long, value_enum, default_value = "outgoing")]
    closeness: ClosenessDirection,

    /// Split the community sample even when it already holds separate reply groups
    #[clap(long)]
    split_disconnected: bool,

    /// Skip visualization exports
    #[clap(long)]
    skip_viz: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting comment interaction analysis");
    log::info!("Input: {} ({:?})", args.input, args.format);
    log::info!("Output: {}", args.output_dir);

    // 1. Load and normalize comments
    let (records, normalize_stats) = match args.format {
        InputFormat::Threads => data::normalize_threads(&json::load_threads_json(&args.input)?),
        InputFormat::Records => data::normalize_records(json::load_records_json(&args.input)?),
        InputFormat::Parquet => data::normalize_records(parquet::load_comment_table(&args.input)?),
    };

    // 2. Analyze
    let config = AnalysisConfig::new(args.top_n, args.sample_size, args.table_rows)
        .with_closeness_direction(args.closeness)
        .with_split_disconnected_sample(args.split_disconnected);

    let report = analyze(&records, &config)?;

    for (rank, row) in report.top_authors(config.table_rows).iter().enumerate() {
        log::info!(
            "#{:<3} {:<30} degree {:.4}  in {:.4}  out {:.4}  betweenness {:.4}  closeness {:.4}",
            rank + 1,
            row.author,
            row.degree_centrality,
            row.in_degree_centrality,
            row.out_degree_centrality,
            row.betweenness_centrality,
            row.closeness_centrality
        );
    }
    log::info!(
        "Detected {} communities among {} sampled authors",
        report.communities.count,
        report.communities.sampled_nodes
    );

    // 3. Save results
    storage::save_results(&report, &config, Some(&normalize_stats), &args.output_dir)?;

    // 4. Export visualization data if requested
    if !args.skip_viz {
        viz::generate_visualizations(&report.subgraph, &report.communities, &args.output_dir)?;
    }

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
