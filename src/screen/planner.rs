use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::ScreenError;

/// Separates alternative keywords within one term set.
pub const TERM_DELIMITER: char = ';';
/// Trailing marker that tags a keyword as a MeSH heading.
pub const MESH_MARKER: char = '@';
pub const MESH_SUFFIX: &str = "[MeSH Terms]";

const BROWSE_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov/?term=";

/// Unreserved characters plus `/` stay literal in the browse URL.
const BROWSE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// One keyword after tag processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    /// Keyword with any MeSH marker removed; used for display.
    pub keyword: String,
    /// Expression submitted to the search service.
    pub fill: String,
}

impl SearchTerm {
    /// `"Asthma@"` becomes `Asthma[MeSH Terms]`; anything else, wildcards
    /// included, passes through untouched.
    pub fn parse(raw: &str) -> Self {
        if raw.ends_with(MESH_MARKER) {
            let keyword = raw.replace(MESH_MARKER, "");
            let fill = format!("{keyword}{MESH_SUFFIX}");
            Self { keyword, fill }
        } else {
            Self {
                keyword: raw.to_string(),
                fill: raw.to_string(),
            }
        }
    }
}

/// Split a `;`-separated term set. Blank entries are dropped.
pub fn split_terms(input: &str) -> Vec<SearchTerm> {
    input
        .split(TERM_DELIMITER)
        .map(str::trim)
        .map(SearchTerm::parse)
        .filter(|t| !t.keyword.trim().is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPair {
    pub first: SearchTerm,
    pub second: SearchTerm,
}

impl QueryPair {
    /// Boolean-AND query submitted to ESearch.
    pub fn query(&self) -> String {
        format!("{} AND {}", self.first.fill, self.second.fill)
    }

    /// Human-readable pair label for the summary table.
    pub fn terms(&self) -> String {
        format!("{} AND {}", self.first.keyword, self.second.keyword)
    }

    /// PubMed web search URL for the same query.
    pub fn browse_url(&self) -> String {
        format!(
            "{BROWSE_BASE}{}",
            utf8_percent_encode(&self.query(), BROWSE_ENCODE_SET)
        )
    }
}

/// Expand two term sets into their cartesian product, row-major: every
/// second-set term for the first first-set term, then the next, and so on.
pub fn plan(first: &str, second: &str) -> Result<Vec<QueryPair>, ScreenError> {
    let first = split_terms(first);
    let second = split_terms(second);
    if first.is_empty() {
        return Err(ScreenError::InvalidArgument("first term set is empty".into()));
    }
    if second.is_empty() {
        return Err(ScreenError::InvalidArgument("second term set is empty".into()));
    }

    Ok(first
        .iter()
        .flat_map(|a| {
            second.iter().map(move |b| QueryPair {
                first: a.clone(),
                second: b.clone(),
            })
        })
        .collect())
}
