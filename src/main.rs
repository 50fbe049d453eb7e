use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use scan_segmenter::config::{CliArgs, PipelineConfig};
use scan_segmenter::pipeline::{self, Pipeline};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing; logs go to stderr so --json output stays clean
    let filter = if args.verbose {
        EnvFilter::new("scan_segmenter=debug")
    } else {
        EnvFilter::new("scan_segmenter=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config =
        PipelineConfig::try_from(args).context("Invalid command line arguments")?;

    // Configure rayon thread pool
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure rayon thread pool")?;
    }

    match Pipeline::run(&config) {
        Ok(summary) => {
            if config.json {
                let json = serde_json::to_string_pretty(&summary)
                    .context("Failed to serialise summary")?;
                println!("{json}");
            } else {
                pipeline::print_summary(&summary);
                println!();
                println!("Done in {:.2}s", summary.duration.as_secs_f64());
            }
            Ok(())
        }
        Err(e) => {
            error!(%e, "Pipeline failed");
            Err(anyhow::anyhow!(e)).context("scan-segmenter pipeline failed")
        }
    }
}
