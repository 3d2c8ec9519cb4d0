mod cli;
mod export;
mod pubmed;
mod screen;

pub const USER_AGENT: &str = concat!("pubmed-screen/", env!("CARGO_PKG_VERSION"));

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::info;

use cli::{Cli, Command};
use pubmed::{PubMedClient, SearchClient};
use screen::{overlap, planner};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-request timeout covering connect and response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pubmed_screen=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    run(cli)
        .await
        .inspect_err(|e| tracing::error!("{e}"))
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Search {
            first,
            second,
            output,
            max_results,
        } => {
            let pairs = planner::plan(first, second)?;
            let mut client = PubMedClient::new(http_client()?, cli.api_key());
            info!(
                searches = pairs.len(),
                interval_ms = client.limiter().min_interval().as_millis() as u64,
                "starting screen"
            );
            search(&pairs, &mut client, *max_results, output).await
        }
        Command::Compare { first, second } => compare(first, second),
        Command::Query { term, max_results } => {
            let mut client = PubMedClient::new(http_client()?, cli.api_key());
            let result = client.query(term, *max_results).await?;
            info!(term = %result.term, "query complete");
            println!("{}", result.url);
            println!("{}", result.count);
            println!("{}", result.ids.join(" "));
            println!("{}", result.query_translation);
            Ok(())
        }
    }
}

fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()
}

async fn search(
    pairs: &[planner::QueryPair],
    client: &mut impl SearchClient,
    max_results: u32,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = screen::screen(pairs, client, max_results).await?;

    for (row, dedup) in report.summary.iter().zip(&report.dedup) {
        println!(
            "{:>4}  {:<40} {:>8} citations {:>8} new",
            dedup.search_number, row.terms, row.count, dedup.non_duplicates
        );
    }

    let files = export::write_report(output, &report)?;
    println!("Summary saved as {}", files.summary.display());
    println!("PMIDs saved as {}", files.identifiers.display());
    Ok(())
}

fn compare(first: &Path, second: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let a = export::read_identifier_table(first)?;
    let b = export::read_identifier_table(second)?;
    let o = overlap::compare(a.iter().map(String::as_str), b.iter().map(String::as_str))?;

    println!("% Search 1 in search 2: {:.2}", o.first_in_second);
    println!("% Search 2 in search 1: {:.2}", o.second_in_first);
    println!("Overall % overlap: {:.2}", o.of_union);
    info!(shared = o.shared, union = o.union, "overlap computed");
    Ok(())
}
