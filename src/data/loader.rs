use std::path::Path;

use serde::Deserialize;

use crate::error::{XyError, XyResult};

use super::model::{Sample, SampledFunction};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a data set from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – first two columns are x and y, an optional header row
/// * `.json` – `{ "x": [...], "y": [...] }` or `[[x, y], ...]`
/// * anything else – whitespace separated two-column text
///
/// Any malformed data row fails the whole load.
pub fn load_file(path: &Path) -> XyResult<SampledFunction> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let function = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        _ => parse_text(&read_to_string(path)?)?,
    };
    log::debug!(
        "loaded {} samples from {}, x in {}",
        function.len(),
        path.display(),
        function.xrange()
    );
    Ok(function)
}

fn read_to_string(path: &Path) -> XyResult<String> {
    std::fs::read_to_string(path).map_err(|source| XyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Plain text
// ---------------------------------------------------------------------------

/// Parse two-column text:
///
/// ```text
/// # x     y
/// 0.      10.
/// 1.      12.
/// ```
///
/// Blank lines and lines starting with `#` are skipped. Every other line
/// must begin with two numbers; further columns are ignored.
pub fn parse_text(text: &str) -> XyResult<SampledFunction> {
    let mut samples = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let x = fields.next().and_then(parse_real);
        let y = fields.next().and_then(parse_real);
        match (x, y) {
            (Some(x), Some(y)) => samples.push(Sample { x, y }),
            _ => {
                return Err(XyError::Format {
                    line: i + 1,
                    content: trimmed.to_string(),
                })
            }
        }
    }

    SampledFunction::new(samples)
}

/// A finite real number. `nan` and `inf` parse as `f64` but are not data.
fn parse_real(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// The first row is taken as a header when it has at least two cells and
/// none of them is a number.
fn load_csv(path: &Path) -> XyResult<SampledFunction> {
    let file = std::fs::File::open(path).map_err(|source| XyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(file);

    let mut samples = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let x = record.get(0).and_then(parse_real);
        let y = record.get(1).and_then(parse_real);
        match (x, y) {
            (Some(x), Some(y)) => samples.push(Sample { x, y }),
            _ if row_no == 0 && is_header(&record) => continue,
            _ => {
                let line = record
                    .position()
                    .map_or(row_no + 1, |p| p.line() as usize);
                return Err(XyError::Format {
                    line,
                    content: record.iter().collect::<Vec<_>>().join(","),
                });
            }
        }
    }

    SampledFunction::new(samples)
}

fn is_header(record: &csv::StringRecord) -> bool {
    record.len() >= 2 && record.iter().all(|f| f.parse::<f64>().is_err())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonData {
    Columns { x: Vec<f64>, y: Vec<f64> },
    Pairs(Vec<(f64, f64)>),
}

fn load_json(path: &Path) -> XyResult<SampledFunction> {
    let text = read_to_string(path)?;
    let samples: Vec<Sample> = match serde_json::from_str::<JsonData>(&text)? {
        JsonData::Columns { x, y } => {
            if x.len() != y.len() {
                return Err(XyError::LengthMismatch {
                    x: x.len(),
                    y: y.len(),
                });
            }
            x.into_iter().zip(y).map(Sample::from).collect()
        }
        JsonData::Pairs(pairs) => pairs.into_iter().map(Sample::from).collect(),
    };
    // `line` is the 1-based position of the offending sample
    if let Some(i) = samples
        .iter()
        .position(|s| !(s.x.is_finite() && s.y.is_finite()))
    {
        return Err(XyError::Format {
            line: i + 1,
            content: format!("{} {}", samples[i].x, samples[i].y),
        });
    }
    SampledFunction::new(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_with_comments_tabs_and_extra_columns() {
        let f = parse_text("# x\ty\n\n0\t10\n1  12   99\n  2 14\n").unwrap();
        assert_eq!(f.len(), 3);
        assert_eq!(f.samples()[1], Sample::new(1.0, 12.0));
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let err = parse_text("0 1\n1 2\n3\n4 5\n").unwrap_err();
        match err {
            XyError::Format { line, content } => {
                assert_eq!(line, 3);
                assert_eq!(content, "3");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            parse_text("0 1\nabc def\n"),
            Err(XyError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn non_finite_values_are_malformed() {
        for text in ["0 0\n1 1\nnan 2\n", "0 0\n1 NaN\n", "0 0\ninf 1\n", "0 0\n1 -infinity\n"] {
            assert!(
                matches!(parse_text(text), Err(XyError::Format { .. })),
                "accepted {text:?}"
            );
        }
        assert!(matches!(
            parse_text("0 0\n1 1\nnan 2\n"),
            Err(XyError::Format { line: 3, .. })
        ));
    }

    #[test]
    fn comments_only_is_empty() {
        assert!(matches!(parse_text("# nothing\n\n"), Err(XyError::Empty)));
    }
}
