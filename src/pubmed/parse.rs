use super::PubMedError;
use super::types::{CountField, ESearchResponse, QueryResult};

/// Decode an ESearch JSON body into a [`QueryResult`].
///
/// Missing `count`/`idlist`, a non-numeric count, or a service-side `ERROR`
/// all surface as [`PubMedError::MalformedResponse`].
pub fn parse_esearch(body: &str, term: &str, url: &str) -> Result<QueryResult, PubMedError> {
    let response: ESearchResponse = serde_json::from_str(body)
        .map_err(|e| PubMedError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let result = response
        .esearchresult
        .ok_or_else(|| malformed("missing `esearchresult`"))?;

    if let Some(err) = result.error.filter(|e| !e.is_empty()) {
        return Err(PubMedError::MalformedResponse(format!("service error: {err}")));
    }

    let count = match result.count.ok_or_else(|| malformed("missing `count`"))? {
        CountField::Number(n) => n,
        CountField::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| PubMedError::MalformedResponse(format!("non-numeric count: {s:?}")))?,
    };
    let ids = result.idlist.ok_or_else(|| malformed("missing `idlist`"))?;

    Ok(QueryResult {
        term: term.to_string(),
        url: url.to_string(),
        count,
        ids,
        query_translation: result.querytranslation.unwrap_or_default(),
    })
}

fn malformed(what: &str) -> PubMedError {
    PubMedError::MalformedResponse(what.to_string())
}
