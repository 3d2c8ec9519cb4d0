use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::pubmed::MAX_RESULTS;

const API_KEY_ENV: &str = "NCBI_API_KEY";
const DEFAULT_QUERY_RESULTS: u32 = 200;

#[derive(Parser, Debug)]
#[command(
    name = "pubmed-screen",
    about = "Screen PubMed keyword combinations: result counts, duplicates, and search overlap",
    version,
    long_about = None
)]
pub struct Cli {
    /// NCBI API key, raises the request rate from 3 to 10 per second [env: NCBI_API_KEY]
    #[arg(short = 'k', long, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search every pairing of two keyword sets and export counts and PMIDs
    ///
    /// Keywords within a set are separated by ';'. A trailing '@' tags a keyword
    /// as a MeSH term; a trailing '*' is expanded by PubMed.
    Search {
        /// First set of keywords, e.g. "Asthma@;Wheez*"
        #[arg(long)]
        first: String,

        /// Second set of keywords, e.g. "Dopamine;Dopamine Agents@"
        #[arg(long)]
        second: String,

        /// Base path for the output tables (`<BASE>_search_summary.csv`, `<BASE>_citation_IDs.csv`)
        #[arg(short, long)]
        output: PathBuf,

        /// PMIDs to retrieve per search
        #[arg(long, default_value_t = MAX_RESULTS)]
        max_results: u32,
    },

    /// Compare the PMIDs of two exported `_citation_IDs.csv` tables
    Compare {
        /// Identifier table of the first search
        first: PathBuf,
        /// Identifier table of the second search
        second: PathBuf,
    },

    /// Run a single raw ESearch query and print the result
    Query {
        /// PubMed query, e.g. "asthma[mh] AND dopamine[mh]"
        term: String,

        /// PMIDs to retrieve
        #[arg(long, default_value_t = DEFAULT_QUERY_RESULTS)]
        max_results: u32,
    },
}

impl Cli {
    /// `--api-key` if given, else `NCBI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.clone(), std::env::var(API_KEY_ENV).ok())
    }
}

fn resolve_api_key(flag: Option<String>, env: Option<String>) -> Option<String> {
    [flag, env]
        .into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}
