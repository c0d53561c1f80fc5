use anyhow::Context;
use clap::Parser;
use rna_enrich::core::litscan::DEFAULT_LITSCAN_ENDPOINT;
use rna_enrich::utils::logger;
use rna_enrich::LitScanClient;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "litscan")]
#[command(about = "Look up publications for a set of gene names")]
struct Args {
    /// Gene names, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    genes: Vec<String>,

    #[arg(long, default_value = DEFAULT_LITSCAN_ENDPOINT)]
    endpoint: String,

    #[arg(long, default_value = "30")]
    timeout_seconds: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🔍 Looking up publications for {} gene(s)", args.genes.len());

    let client = LitScanClient::new(
        args.endpoint.clone(),
        Duration::from_secs(args.timeout_seconds),
    )
    .context("failed to build HTTP client")?;

    let publications = client
        .lookup(&args.genes)
        .await
        .context("literature lookup failed")?;

    if publications.is_empty() {
        println!("No publications found");
        return Ok(());
    }

    println!("📚 Found {} publication(s):", publications.len());
    for publication in &publications {
        println!("  {} ({})", publication.title, publication.pmcid);
        println!("    {}", publication.link);
    }

    Ok(())
}
