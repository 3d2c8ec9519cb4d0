use tracing::info;

use super::planner::QueryPair;
use crate::pubmed::{PubMedError, SearchClient};

/// One row of the search summary, in plan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub url: String,
    pub terms: String,
    pub count: u64,
    /// Prefix sum of `count` up to and including this row.
    pub cumulative: u64,
}

/// Per-query summary rows plus the identifier list returned for each row.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub rows: Vec<SummaryRow>,
    pub identifiers: Vec<Vec<String>>,
}

/// Issue one query per pair, strictly in order, one at a time.
///
/// The first failing query aborts the whole run; rows and identifier lists
/// are positionally linked, so a partial result is never returned.
pub async fn run(
    pairs: &[QueryPair],
    client: &mut impl SearchClient,
    max_results: u32,
) -> Result<Aggregation, PubMedError> {
    let mut out = Aggregation::default();
    let mut cumulative = 0u64;

    for (i, pair) in pairs.iter().enumerate() {
        let terms = pair.terms();
        info!(search = i + 1, of = pairs.len(), %terms, "searching");

        let result = client.query(&pair.query(), max_results).await?;

        cumulative += result.count;
        println!("{}", progress_line(result.count));

        out.rows.push(SummaryRow {
            url: pair.browse_url(),
            terms,
            count: result.count,
            cumulative,
        });
        out.identifiers.push(result.ids);
    }

    Ok(out)
}

fn progress_line(count: u64) -> String {
    match count {
        0 => "No citations found.".to_string(),
        n => format!("{n} citations found."),
    }
}
