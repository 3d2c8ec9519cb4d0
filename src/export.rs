//! Flat CSV tables for a completed screen, and reading identifier tables back.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::screen::ScreenReport;

pub const SUMMARY_SUFFIX: &str = "_search_summary.csv";
pub const IDENTIFIER_SUFFIX: &str = "_citation_IDs.csv";
/// Prefix older tables put in front of every PMID.
const PMID_PREFIX: &str = "PMID:";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
    #[serde(rename = "")]
    index: usize,
    #[serde(rename = "URL")]
    url: &'a str,
    #[serde(rename = "Terms")]
    terms: &'a str,
    #[serde(rename = "Number of Titles")]
    count: u64,
    #[serde(rename = "Cum Sum")]
    cum_sum: u64,
    #[serde(rename = "Search Number")]
    search_number: usize,
    #[serde(rename = "Number of Non-Duplicates")]
    non_duplicates: u64,
    #[serde(rename = "Cum Non-Dup")]
    cum_non_dup: u64,
}

/// Paths written by [`write_report`].
#[derive(Debug)]
pub struct ExportedFiles {
    pub summary: PathBuf,
    pub identifiers: PathBuf,
}

pub fn summary_path(base: &Path) -> PathBuf {
    with_suffix(base, SUMMARY_SUFFIX)
}

pub fn identifier_path(base: &Path) -> PathBuf {
    with_suffix(base, IDENTIFIER_SUFFIX)
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write the summary and identifier tables next to `base`.
///
/// Both tables go to temporary siblings first and are renamed into place only
/// once both are complete. If the second rename fails, the new summary is
/// removed and any summary from an earlier run is restored, so the pair on
/// disk is always either the old one or the new one.
pub fn write_report(base: &Path, report: &ScreenReport) -> Result<ExportedFiles, ExportError> {
    let files = ExportedFiles {
        summary: summary_path(base),
        identifiers: identifier_path(base),
    };
    let summary_tmp = with_suffix(&files.summary, ".tmp");
    let identifiers_tmp = with_suffix(&files.identifiers, ".tmp");

    let written = write_summary(&summary_tmp, report)
        .and_then(|()| write_identifiers(&identifiers_tmp, &report.identifiers))
        .and_then(|()| commit(&files, &summary_tmp, &identifiers_tmp));

    if let Err(e) = written {
        for tmp in [&summary_tmp, &identifiers_tmp] {
            let _ = fs::remove_file(tmp);
        }
        return Err(e);
    }

    info!(
        summary = %files.summary.display(),
        identifiers = %files.identifiers.display(),
        "tables written"
    );
    Ok(files)
}

/// Rename both temporaries into place, rolling the summary back if the
/// identifier table cannot follow it.
fn commit(
    files: &ExportedFiles,
    summary_tmp: &Path,
    identifiers_tmp: &Path,
) -> Result<(), ExportError> {
    let backup = with_suffix(&files.summary, ".bak");
    let had_previous = files.summary.exists();
    if had_previous {
        persist(&files.summary, &backup)?;
    }

    if let Err(e) = persist(summary_tmp, &files.summary) {
        if had_previous {
            let _ = fs::rename(&backup, &files.summary);
        }
        return Err(e);
    }

    if let Err(e) = persist(identifiers_tmp, &files.identifiers) {
        warn!(
            summary = %files.summary.display(),
            "identifier table not written, rolling back summary"
        );
        let _ = fs::remove_file(&files.summary);
        if had_previous {
            let _ = fs::rename(&backup, &files.summary);
        }
        return Err(e);
    }

    if had_previous {
        let _ = fs::remove_file(&backup);
    }
    Ok(())
}

fn write_summary(path: &Path, report: &ScreenReport) -> Result<(), ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_err)?;

    for (index, (row, dedup)) in report.summary.iter().zip(&report.dedup).enumerate() {
        wtr.serialize(SummaryRecord {
            index,
            url: &row.url,
            terms: &row.terms,
            count: row.count,
            cum_sum: row.cumulative,
            search_number: dedup.search_number,
            non_duplicates: dedup.non_duplicates,
            cum_non_dup: dedup.cumulative,
        })
        .map_err(csv_err)?;
    }

    wtr.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One column per search, one identifier per cell; shorter columns are
/// padded with empty cells.
fn write_identifiers(path: &Path, columns: &[Vec<String>]) -> Result<(), ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(csv_err)?;

    let header = std::iter::once(String::new()).chain((0..columns.len()).map(|i| i.to_string()));
    wtr.write_record(header).map_err(csv_err)?;

    let depth = columns.iter().map(Vec::len).max().unwrap_or(0);
    for row in 0..depth {
        let cells = std::iter::once(row.to_string()).chain(
            columns
                .iter()
                .map(|col| col.get(row).cloned().unwrap_or_default()),
        );
        wtr.write_record(cells).map_err(csv_err)?;
    }

    wtr.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn persist(tmp: &Path, dest: &Path) -> Result<(), ExportError> {
    debug!(from = %tmp.display(), to = %dest.display(), "rename");
    fs::rename(tmp, dest).map_err(|source| ExportError::Io {
        path: dest.to_path_buf(),
        source,
    })
}

/// Flatten an identifier table into one list: every non-empty cell except the
/// header row and the leading index column. A leading `PMID:` is dropped so
/// prefixed and bare tables compare equal.
pub fn read_identifier_table(path: &Path) -> Result<Vec<String>, ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut ids = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        ids.extend(
            record
                .iter()
                .skip(1)
                .map(normalize_id)
                .filter(|cell| !cell.is_empty())
                .map(String::from),
        );
    }
    debug!(path = %path.display(), count = ids.len(), "identifier table read");
    Ok(ids)
}

fn normalize_id(cell: &str) -> &str {
    let cell = cell.trim();
    cell.strip_prefix(PMID_PREFIX).map_or(cell, str::trim_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::aggregate::SummaryRow;
    use crate::screen::dedup::DedupRow;

    fn sample_report() -> ScreenReport {
        ScreenReport {
            summary: vec![
                SummaryRow {
                    url: "https://pubmed.ncbi.nlm.nih.gov/?term=x%20AND%20p".into(),
                    terms: "x AND p".into(),
                    count: 5,
                    cumulative: 5,
                },
                SummaryRow {
                    url: "https://pubmed.ncbi.nlm.nih.gov/?term=y%20AND%20p".into(),
                    terms: "y AND p".into(),
                    count: 3,
                    cumulative: 8,
                },
            ],
            dedup: vec![
                DedupRow {
                    search_number: 1,
                    non_duplicates: 5,
                    cumulative: 5,
                },
                DedupRow {
                    search_number: 2,
                    non_duplicates: 2,
                    cumulative: 7,
                },
            ],
            identifiers: vec![
                ["1", "2", "3", "4", "5"].map(String::from).to_vec(),
                ["3", "6", "8"].map(String::from).to_vec(),
            ],
        }
    }

    #[test]
    fn paths_share_the_base() {
        let base = Path::new("/tmp/out/asthma");
        assert_eq!(
            summary_path(base),
            PathBuf::from("/tmp/out/asthma_search_summary.csv")
        );
        assert_eq!(
            identifier_path(base),
            PathBuf::from("/tmp/out/asthma_citation_IDs.csv")
        );
    }

    #[test]
    fn summary_table_has_merged_columns() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");

        let files = write_report(&base, &sample_report()).unwrap();
        let text = fs::read_to_string(&files.summary).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            ",URL,Terms,Number of Titles,Cum Sum,Search Number,Number of Non-Duplicates,Cum Non-Dup"
        );
        assert_eq!(
            lines[1],
            "0,https://pubmed.ncbi.nlm.nih.gov/?term=x%20AND%20p,x AND p,5,5,1,5,5"
        );
        assert_eq!(
            lines[2],
            "1,https://pubmed.ncbi.nlm.nih.gov/?term=y%20AND%20p,y AND p,3,8,2,2,7"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn identifier_table_is_column_per_search() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");

        let files = write_report(&base, &sample_report()).unwrap();
        let text = fs::read_to_string(&files.identifiers).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines, [",0,1", "0,1,3", "1,2,6", "2,3,8", "3,4,", "4,5,"]);
    }

    #[test]
    fn no_temporary_files_remain() {
        let dir = tempfile::tempdir().unwrap();
        write_report(&dir.path().join("run"), &sample_report()).unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["run_citation_IDs.csv", "run_search_summary.csv"]);
    }

    #[test]
    fn failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("missing").join("run");

        let err = write_report(&base, &sample_report()).unwrap_err();

        assert!(matches!(err, ExportError::Csv { .. }), "got: {err:?}");
        assert!(!summary_path(&base).exists());
        assert!(!identifier_path(&base).exists());
    }

    #[test]
    fn identifier_table_reads_back_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_report(&dir.path().join("run"), &sample_report()).unwrap();

        let ids = read_identifier_table(&files.identifiers).unwrap();

        assert_eq!(ids, ["1", "3", "2", "6", "3", "8", "4", "5"]);
    }

    #[test]
    fn reads_tables_with_blank_padding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(&path, ",0,1\n0,PMID:1,PMID:9\n1,PMID:2,\n").unwrap();

        let ids = read_identifier_table(&path).unwrap();

        assert_eq!(ids, ["1", "9", "2"]);
    }

    #[test]
    fn prefixed_and_bare_tables_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join("legacy.csv");
        fs::write(&legacy, ",0\n0,PMID:3\n1,PMID:6\n2,PMID:42\n").unwrap();
        let files = write_report(&dir.path().join("run"), &sample_report()).unwrap();

        let old = read_identifier_table(&legacy).unwrap();
        let new = read_identifier_table(&files.identifiers).unwrap();
        let o = crate::screen::overlap::compare(
            old.iter().map(String::as_str),
            new.iter().map(String::as_str),
        )
        .unwrap();

        assert_eq!(o.shared, 2);
        assert!((o.first_in_second - 200.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn blocked_identifier_rename_removes_new_summary() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");
        let blocker = identifier_path(&base);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let err = write_report(&base, &sample_report()).unwrap_err();

        assert!(matches!(err, ExportError::Io { .. }), "got: {err:?}");
        assert!(!summary_path(&base).exists());
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["run_citation_IDs.csv"]);
    }

    #[test]
    fn blocked_identifier_rename_restores_previous_summary() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");
        fs::write(summary_path(&base), "previous run\n").unwrap();
        let blocker = identifier_path(&base);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        write_report(&base, &sample_report()).unwrap_err();

        assert_eq!(
            fs::read_to_string(summary_path(&base)).unwrap(),
            "previous run\n"
        );
        assert!(!with_suffix(&summary_path(&base), ".bak").exists());
    }

    #[test]
    fn rerun_replaces_previous_tables() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");
        fs::write(summary_path(&base), "previous run\n").unwrap();

        write_report(&base, &sample_report()).unwrap();

        let text = fs::read_to_string(summary_path(&base)).unwrap();
        assert!(text.starts_with(",URL,"));
        assert!(!with_suffix(&summary_path(&base), ".bak").exists());
    }

    #[test]
    fn missing_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_identifier_table(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.to_string().contains("nope.csv"));
    }
}
