use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::stats::{CategorySummary, INLINE_LABEL_MIN_SHARE};
use crate::traits::Clock;

#[derive(Serialize)]
struct CsvRow<'a> {
    category: &'a str,
    count: usize,
    percent: f64,
}

/// Write one `category,count,percent` row per summary entry.
pub fn write_csv<W: Write>(summary: &CategorySummary, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    if summary.entries.is_empty() {
        wtr.write_record(["category", "count", "percent"])
            .context("Failed to write CSV header")?;
    }

    for entry in &summary.entries {
        wtr.serialize(CsvRow {
            category: &entry.category,
            count: entry.count,
            percent: entry.percent,
        })
        .context("Failed to serialize summary entry")?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Write the summary, sample size included, as pretty JSON.
pub fn write_json<W: Write>(summary: &CategorySummary, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, summary).context("Failed to serialize summary")?;
    writeln!(writer).context("Failed to write JSON output")?;
    Ok(())
}

/// Plain-text rendition for terminals.
///
/// Entries too small for an inline pie label are marked with `*`.
pub fn write_text<W: Write>(summary: &CategorySummary, mut writer: W) -> Result<()> {
    let mut any_unlabeled = false;
    for entry in &summary.entries {
        let marker = if entry.shows_inline_label() {
            ""
        } else {
            any_unlabeled = true;
            " *"
        };
        writeln!(
            writer,
            "{:<20} {:>5}  {:>4}{}",
            entry.category,
            entry.count,
            entry.percent_label(),
            marker
        )
        .context("Failed to write summary line")?;
    }
    if any_unlabeled {
        writeln!(
            writer,
            "* under {:.0}% of loans, unlabeled on the pie chart",
            INLINE_LABEL_MIN_SHARE * 100.0
        )
        .context("Failed to write summary line")?;
    }
    writeln!(writer, "Sample size: {}", summary.total_sample_size)
        .context("Failed to write summary line")?;
    Ok(())
}

/// Export the summary to a timestamped CSV file in `output_dir`.
///
/// # Returns
/// The path to the created CSV file on success.
pub fn export_csv<C: Clock>(
    summary: &CategorySummary,
    output_dir: &Path,
    clock: &C,
) -> Result<PathBuf> {
    let export_time = clock.now_utc();
    let filename = format!(
        "category_stats_{}.csv",
        export_time.format("%Y%m%d_%H%M%S")
    );
    let output_path = output_dir.join(filename);

    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    write_csv(summary, file)?;

    tracing::info!("Exported category summary to {}", output_path.display());
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::CategorySummaryEntry;

    fn sample() -> CategorySummary {
        CategorySummary {
            entries: vec![
                CategorySummaryEntry {
                    category: "Fiction".to_string(),
                    count: 3,
                    percent: 0.75,
                },
                CategorySummaryEntry {
                    category: "uncategorized".to_string(),
                    count: 1,
                    percent: 0.25,
                },
            ],
            total_sample_size: 4,
        }
    }

    #[test]
    fn test_csv_rows() {
        let mut out = Vec::new();
        write_csv(&sample(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["category,count,percent", "Fiction,3,0.75", "uncategorized,1,0.25"]);
    }

    #[test]
    fn test_csv_empty_summary_has_header_only() {
        let empty = CategorySummary {
            entries: Vec::new(),
            total_sample_size: 0,
        };
        let mut out = Vec::new();
        write_csv(&empty, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "category,count,percent\n");
    }

    #[test]
    fn test_json_carries_sample_size() {
        let mut out = Vec::new();
        write_json(&sample(), &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["total_sample_size"], 4);
        assert_eq!(value["entries"][0]["category"], "Fiction");
        assert_eq!(value["entries"][1]["count"], 1);
    }

    #[test]
    fn test_text_lists_entries_and_total() {
        let mut out = Vec::new();
        write_text(&sample(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Fiction"));
        assert!(text.contains("75%"));
        assert!(text.ends_with("Sample size: 4\n"));
        assert!(!text.contains('*'), "no slice is below the label threshold");
    }

    #[test]
    fn test_text_marks_slices_too_small_to_label() {
        let summary = CategorySummary {
            entries: vec![
                CategorySummaryEntry {
                    category: "Fiction".to_string(),
                    count: 19,
                    percent: 0.95,
                },
                CategorySummaryEntry {
                    category: "Comics".to_string(),
                    count: 1,
                    percent: 0.05,
                },
            ],
            total_sample_size: 20,
        };
        let mut out = Vec::new();
        write_text(&summary, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(!lines[0].ends_with('*'));
        assert!(lines[1].starts_with("Comics"));
        assert!(lines[1].ends_with("5% *"));
        assert_eq!(lines[2], "* under 7% of loans, unlabeled on the pie chart");
        assert_eq!(lines[3], "Sample size: 20");
    }
}
