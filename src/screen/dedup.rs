use std::collections::HashSet;

use tracing::debug;

/// Identifiers seen so far in one deduplication pass. Only ever grows.
#[derive(Debug, Default)]
pub struct IdentifierLedger {
    seen: HashSet<String>,
}

impl IdentifierLedger {
    /// Records `id` and returns `true` if this is its first appearance.
    pub fn admit(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupRow {
    /// 1-based, aligned with the summary rows.
    pub search_number: usize,
    pub non_duplicates: u64,
    pub cumulative: u64,
}

/// Count, per row, the identifiers not seen in any earlier row or earlier in
/// the same row. Identifiers are compared as whole strings.
///
/// A fresh ledger is used on every call, so the output depends only on row
/// order and the order of identifiers within each row.
pub fn deduplicate(rows: &[Vec<String>]) -> Vec<DedupRow> {
    let mut ledger = IdentifierLedger::default();
    let mut cumulative = 0u64;

    let out: Vec<DedupRow> = rows
        .iter()
        .enumerate()
        .map(|(i, ids)| {
            let fresh = ids.iter().filter(|id| ledger.admit(id)).count() as u64;
            cumulative += fresh;
            DedupRow {
                search_number: i + 1,
                non_duplicates: fresh,
                cumulative,
            }
        })
        .collect();

    debug!(rows = rows.len(), unique = ledger.len(), "deduplicated");
    out
}
