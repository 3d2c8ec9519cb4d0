//! Screening pipeline: plan keyword pairs, run them in order, count new PMIDs per search.

pub mod aggregate;
pub mod dedup;
#[cfg(test)]
pub(crate) mod mock;
pub mod overlap;
pub mod planner;

use tracing::info;

use crate::pubmed::{PubMedError, SearchClient};
use aggregate::SummaryRow;
use dedup::DedupRow;
use planner::QueryPair;

#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Search(#[from] PubMedError),
}

/// Everything a completed run exports.
#[derive(Debug)]
pub struct ScreenReport {
    pub summary: Vec<SummaryRow>,
    pub dedup: Vec<DedupRow>,
    /// Identifier list per summary row, same order.
    pub identifiers: Vec<Vec<String>>,
}

/// Run every planned pair through `client`, then deduplicate the results.
pub async fn screen(
    pairs: &[QueryPair],
    client: &mut impl SearchClient,
    max_results: u32,
) -> Result<ScreenReport, ScreenError> {
    if pairs.is_empty() {
        return Err(ScreenError::InvalidArgument("no query pairs to run".into()));
    }

    let agg = aggregate::run(pairs, client, max_results).await?;
    let dedup = dedup::deduplicate(&agg.identifiers);

    info!(
        searches = agg.rows.len(),
        total = agg.rows.last().map_or(0, |r| r.cumulative),
        unique = dedup.last().map_or(0, |r| r.cumulative),
        "screen complete"
    );

    Ok(ScreenReport {
        summary: agg.rows,
        dedup,
        identifiers: agg.identifiers,
    })
}
