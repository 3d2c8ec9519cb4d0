use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum OverlapError {
    #[error("cannot compute overlap: the {0} search has no identifiers")]
    DegenerateInput(&'static str),
}

/// Overlap between two searches' identifier sets, percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub first_in_second: f64,
    pub second_in_first: f64,
    pub of_union: f64,
    pub shared: usize,
    pub union: usize,
}

/// Compare two identifier collections. Duplicates within a collection collapse.
pub fn compare<'a>(
    first: impl IntoIterator<Item = &'a str>,
    second: impl IntoIterator<Item = &'a str>,
) -> Result<Overlap, OverlapError> {
    let a: HashSet<&str> = first.into_iter().collect();
    let b: HashSet<&str> = second.into_iter().collect();
    if a.is_empty() {
        return Err(OverlapError::DegenerateInput("first"));
    }
    if b.is_empty() {
        return Err(OverlapError::DegenerateInput("second"));
    }

    let shared = a.intersection(&b).count();
    let union = a.len() + b.len() - shared;
    let pct = |n: usize| shared as f64 / n as f64 * 100.0;

    Ok(Overlap {
        first_in_second: pct(a.len()),
        second_in_first: pct(b.len()),
        of_union: pct(union),
        shared,
        union,
    })
}
