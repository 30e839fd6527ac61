// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::HelipadRecord;
use crate::HelipadError;
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const MIN_COLUMNS: usize = 8;
const NUMERIC_COLUMNS: [(usize, &str); 4] = [
    (3, "latitude"),
    (4, "longitude"),
    (5, "elevation"),
    (6, "declination"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    TooFewColumns(usize),
    InvalidNumber { column: &'static str },
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedLine {
    pub line_number: usize, // 1-based
    pub reason: SkipReason,
}

/// Counters for one load. `total` only counts non-blank lines, so
/// `total == accepted + skipped` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub total: usize,
    pub accepted: usize,
    pub skipped: usize,
    pub blank: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: Vec<HelipadRecord>,
    pub stats: LoadStats,
    pub skipped: Vec<SkippedLine>,
    /// Set when the input file did not exist; `records` is empty in that case.
    pub source_missing: bool,
}

impl LoadReport {
    fn push_line(&mut self, line_number: usize, line: &str) {
        if line.is_empty() {
            self.stats.blank += 1;
            return;
        }

        self.stats.total += 1;
        match parse_line(line) {
            Ok(record) => {
                trace!("Loaded helipad {} at {}, {}", record.ident, record.lat, record.lon);
                self.records.push(record);
                self.stats.accepted += 1;
            }
            Err(reason) => {
                debug!("Skipped line {} ({:?}): {}", line_number, reason, line);
                self.skipped.push(SkippedLine {
                    line_number,
                    reason,
                });
                self.stats.skipped += 1;
            }
        }
    }
}

pub struct CsvLoader;

impl CsvLoader {
    /// Loads helipads from a CSV file. A missing file is reported through
    /// `LoadReport::source_missing` rather than as an error.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<LoadReport, HelipadError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Helipad CSV not found — path={}", path.display());
                return Ok(LoadReport {
                    source_missing: true,
                    ..LoadReport::default()
                });
            }
            Err(e) => return Err(HelipadError::from_io(path, e)),
        };

        let report =
            Self::parse(BufReader::new(file)).map_err(|e| HelipadError::from_io(path, e))?;
        info!(
            "Loaded helipad CSV — path={} accepted={} skipped={} blank={}",
            path.display(),
            report.stats.accepted,
            report.stats.skipped,
            report.stats.blank
        );
        Ok(report)
    }

    /// Parses any line-oriented source. `\n`, `\r\n` and a bare `\r` all end a line.
    pub fn parse<R: BufRead>(mut reader: R) -> io::Result<LoadReport> {
        let mut report = LoadReport::default();
        let mut buf = Vec::with_capacity(256);
        let mut line_number = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let text = String::from_utf8_lossy(&buf);
            let chunk = text.strip_suffix('\n').unwrap_or(&text);
            let chunk = chunk.strip_suffix('\r').unwrap_or(chunk);
            for raw in chunk.split('\r') {
                line_number += 1;
                let mut line = raw.trim();
                if line_number == 1 {
                    line = line.trim_start_matches('\u{feff}').trim_start();
                }
                report.push_line(line_number, line);
            }
        }

        Ok(report)
    }
}

/// Parses one trimmed, non-blank line into a record.
pub fn parse_line(line: &str) -> Result<HelipadRecord, SkipReason> {
    let fields = split_line(line).map_err(|e| SkipReason::Malformed(e.to_string()))?;
    if fields.len() < MIN_COLUMNS {
        return Err(SkipReason::TooFewColumns(fields.len()));
    }

    let mut numbers = [0.0f64; 4];
    for (slot, (idx, column)) in numbers.iter_mut().zip(NUMERIC_COLUMNS) {
        *slot = parse_number(&fields[idx]).ok_or(SkipReason::InvalidNumber { column })?;
    }
    let [lat, lon, elevation_m, mag_var] = numbers;

    Ok(HelipadRecord {
        kind: fields[0].trim().to_string(),
        name: fields[1].trim().to_string(),
        ident: fields[2].trim().to_string(),
        lat,
        lon,
        elevation_m,
        mag_var,
        tags: unquote(&fields[7]),
        description: fields.get(8).map(|s| unquote(s)).unwrap_or_default(),
        scenery_path: None,
    })
}

fn split_line(line: &str) -> Result<Vec<String>, csv::Error> {
    let line = tighten_separators(line);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    rdr.read_record(&mut record)?;
    Ok(record.iter().map(|f| f.to_string()).collect())
}

/// Drops spaces and tabs around commas outside quotes. The csv reader only honours a
/// quote that opens a field, so `, "a, b"` would otherwise split at the inner comma.
/// Every field is trimmed afterwards, so nothing meaningful is lost.
fn tighten_separators(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                out.push(c);
            }
            ',' if !in_quotes => {
                let kept = out.trim_end_matches([' ', '\t']).len();
                out.truncate(kept);
                out.push(c);
                while matches!(chars.peek(), Some(' ' | '\t')) {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strips one pair of surrounding double quotes left over after CSV splitting.
fn unquote(field: &str) -> String {
    let s = field.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}
