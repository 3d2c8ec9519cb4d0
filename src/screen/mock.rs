use std::collections::VecDeque;

use crate::pubmed::types::QueryResult;
use crate::pubmed::{PubMedError, SearchClient};

/// Scripted [`SearchClient`] that replays queued responses and records calls.
pub(crate) struct MockSearch {
    responses: VecDeque<Result<(u64, Vec<String>), PubMedError>>,
    queries: Vec<String>,
    max_results: Vec<u32>,
}

impl MockSearch {
    pub(crate) fn with_results(results: Vec<(u64, Vec<&str>)>) -> Self {
        Self {
            responses: results
                .into_iter()
                .map(|(count, ids)| Ok((count, ids.into_iter().map(String::from).collect())))
                .collect(),
            queries: Vec::new(),
            max_results: Vec::new(),
        }
    }

    /// Each response carries `count` and an identifier list of that length.
    pub(crate) fn with_counts(counts: &[u64]) -> Self {
        let mut next = 0u64;
        let responses = counts
            .iter()
            .map(|&count| {
                let ids = (next..next + count).map(|n| n.to_string()).collect();
                next += count;
                Ok((count, ids))
            })
            .collect();
        Self {
            responses,
            queries: Vec::new(),
            max_results: Vec::new(),
        }
    }

    pub(crate) fn failing_at(counts: &[u64], index: usize, error: PubMedError) -> Self {
        let mut mock = Self::with_counts(counts);
        mock.responses[index] = Err(error);
        mock
    }

    pub(crate) fn captured_queries(&self) -> &[String] {
        &self.queries
    }

    pub(crate) fn captured_max_results(&self) -> &[u32] {
        &self.max_results
    }
}

impl SearchClient for MockSearch {
    async fn query(&mut self, term: &str, max_results: u32) -> Result<QueryResult, PubMedError> {
        self.queries.push(term.to_string());
        self.max_results.push(max_results);
        let (count, ids) = self.responses.pop_front().unwrap_or_else(|| {
            Err(PubMedError::MalformedResponse("mock exhausted".into()))
        })?;
        Ok(QueryResult {
            term: term.to_string(),
            url: format!("https://mock.test/esearch.fcgi?term={term}"),
            count,
            ids,
            query_translation: term.to_string(),
        })
    }
}
