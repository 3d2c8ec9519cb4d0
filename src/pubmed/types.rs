use serde::Deserialize;

/// Response body of `GET esearch.fcgi?retmode=json`.
#[derive(Debug, Deserialize)]
pub struct ESearchResponse {
    pub esearchresult: Option<ESearchResult>,
}

/// The `esearchresult` object. Every field is optional here; presence is
/// checked in `parse::into_query_result`.
#[derive(Debug, Deserialize)]
pub struct ESearchResult {
    pub count: Option<CountField>,
    pub idlist: Option<Vec<String>>,
    pub querytranslation: Option<String>,
    #[serde(rename = "ERROR")]
    pub error: Option<String>,
}

/// ESearch reports `count` as a decimal string; a bare number is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CountField {
    Text(String),
    Number(u64),
}

/// Outcome of one keyword query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Query string as submitted.
    pub term: String,
    /// Request URL actually sent.
    pub url: String,
    /// Total number of matching records (not capped by `retmax`).
    pub count: u64,
    /// PMIDs in the order the service returned them, at most `retmax` of them.
    pub ids: Vec<String>,
    /// The service's canonical rewrite of `term`.
    pub query_translation: String,
}
