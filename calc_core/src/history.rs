//! # Calculation History
//!
//! The history store keeps `(expression, result, mode)` records produced by
//! the calculators and the plotter. Only rendered [`DisplayString`]s are
//! stored, never raw numeric outcomes.
//!
//! Histories persist as JSON with atomic saves: the file is written to a
//! `.tmp` sibling, synced, then renamed over the target, so an interrupted
//! save never leaves a truncated history behind.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::engine::CalculatorMode;
//! use calc_core::format::DisplayString;
//! use calc_core::history::{History, HistoryEntry};
//!
//! let mut history = History::new();
//! history.add(HistoryEntry::new("2+2", DisplayString::new("4"), CalculatorMode::Engineering));
//! history.record_graph("x^2");
//!
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.graph_entries().count(), 1);
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::engine::CalculatorMode;
use crate::errors::{CalcError, CalcResult};
use crate::format::DisplayString;
use crate::radix::Radix;

/// Current schema version for history files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Result stored for plotter entries
pub const GRAPH_RESULT: &str = "graph";

/// `"<expr> (<BASE>)"` as stored for programmer entries.
static RADIX_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(([A-Za-z]+)\)\s*$").expect("radix suffix pattern is valid"));

/// One stored calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,

    /// Expression as the user typed it (programmer entries carry a
    /// `" (HEX)"`-style suffix)
    pub expression: String,

    /// Rendered result
    pub result: DisplayString,

    pub timestamp: DateTime<Utc>,

    /// Calculator that produced the entry
    pub calculator_type: CalculatorMode,
}

impl HistoryEntry {
    pub fn new(expression: impl Into<String>, result: DisplayString, calculator_type: CalculatorMode) -> Self {
        HistoryEntry {
            id: Uuid::new_v4(),
            expression: expression.into(),
            result,
            timestamp: Utc::now(),
            calculator_type,
        }
    }

    /// Entry for a programmer-mode calculation, tagged with its radix.
    pub fn programmer(expression: &str, radix: Radix, result: DisplayString) -> Self {
        HistoryEntry::new(
            format!("{} ({})", expression, radix.name()),
            result,
            CalculatorMode::Programmer,
        )
    }

    /// Entry for a plotted function
    pub fn graph(function: impl Into<String>) -> Self {
        HistoryEntry::new(function, DisplayString::new(GRAPH_RESULT), CalculatorMode::Graph)
    }

    pub fn is_graph(&self) -> bool {
        self.calculator_type == CalculatorMode::Graph
    }
}

/// Split a stored programmer expression into the bare expression and its
/// radix. Only a trailing suffix naming a radix is removed; without one the
/// text is kept whole and the radix is decimal.
///
/// ```rust
/// use calc_core::history::split_programmer_expression;
/// use calc_core::radix::Radix;
///
/// let (expr, radix) = split_programmer_expression("FF+1 (HEX)");
/// assert_eq!(expr, "FF+1");
/// assert_eq!(radix, Radix::Hex);
/// ```
pub fn split_programmer_expression(stored: &str) -> (String, Radix) {
    let tagged = RADIX_SUFFIX.captures(stored).and_then(|caps| {
        let suffix = caps.get(0)?;
        let radix = Radix::from_name(caps.get(1)?.as_str())?;
        Some((suffix.start(), radix))
    });
    match tagged {
        Some((start, radix)) => (stored[..start].trim().to_string(), radix),
        None => (stored.trim().to_string(), Radix::Dec),
    }
}

/// Ordered collection of history entries, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// Schema version (for migration compatibility)
    pub version: String,

    entries: Vec<HistoryEntry>,
}

impl Default for History {
    fn default() -> Self {
        History::new()
    }
}

impl History {
    pub fn new() -> Self {
        History {
            version: SCHEMA_VERSION.to_string(),
            entries: Vec::new(),
        }
    }

    /// Insert an entry, keeping the newest first.
    pub fn add(&mut self, entry: HistoryEntry) -> Uuid {
        let id = entry.id;
        let position = self
            .entries
            .iter()
            .position(|existing| existing.timestamp <= entry.timestamp)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
        id
    }

    /// Store a plotted function
    pub fn record_graph(&mut self, function: impl Into<String>) -> Uuid {
        self.add(HistoryEntry::graph(function))
    }

    /// Remove an entry by id, returning it if it existed.
    pub fn remove(&mut self, id: &Uuid) -> Option<HistoryEntry> {
        let index = self.entries.iter().position(|entry| entry.id == *id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: &Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == *id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries, newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Plotter entries only, newest first
    pub fn graph_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(|entry| entry.is_graph())
    }

    /// Drop every plotter entry
    pub fn clear_graph(&mut self) {
        self.entries.retain(|entry| !entry.is_graph());
    }

    /// Keep only the newest `limit` entries. A limit of 0 keeps everything.
    pub fn truncate(&mut self, limit: usize) {
        if limit > 0 {
            self.entries.truncate(limit);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Save a history to `path` with atomic write semantics.
pub fn save_history(history: &History, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(history).map_err(|e| CalcError::serialization(e.to_string()))?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), entries = history.len(), "saved history");
    Ok(())
}

/// Load a history from `path`, validating its schema version.
pub fn load_history(path: &Path) -> CalcResult<History> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let history: History = serde_json::from_str(&contents).map_err(|e| {
        CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    validate_version(&history.version)?;

    debug!(path = %path.display(), entries = history.len(), "loaded history");
    Ok(history)
}

/// Load a history, treating a missing file as an empty history.
pub fn load_history_or_default(path: &Path) -> CalcResult<History> {
    if !path.exists() {
        return Ok(History::new());
    }
    load_history(path)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };

    if file_major != current_major {
        warn!(file_version, "history file has a different major version");
        return Err(mismatch());
    }

    // 0.x: a newer minor may contain breaking changes
    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::env::temp_dir;
    use std::path::PathBuf;

    fn temp_history_path(name: &str) -> PathBuf {
        temp_dir().join(format!("calc_core_test_history_{}.json", name))
    }

    fn entry(expression: &str, result: &str) -> HistoryEntry {
        HistoryEntry::new(expression, DisplayString::new(result), CalculatorMode::Engineering)
    }

    #[test]
    fn test_newest_first() {
        let mut history = History::new();
        let mut older = entry("1+1", "2");
        older.timestamp = Utc::now() - Duration::seconds(60);
        let newer = entry("2+2", "4");

        history.add(newer.clone());
        history.add(older.clone());

        assert_eq!(history.entries()[0].id, newer.id);
        assert_eq!(history.entries()[1].id, older.id);
    }

    #[test]
    fn test_add_remove_entry() {
        let mut history = History::new();
        let id = history.add(entry("2+2", "4"));
        assert_eq!(history.len(), 1);
        assert!(history.get(&id).is_some());

        let removed = history.remove(&id);
        assert!(removed.is_some());
        assert!(history.is_empty());
        assert!(history.remove(&id).is_none());
    }

    #[test]
    fn test_graph_entries() {
        let mut history = History::new();
        history.add(entry("2+2", "4"));
        history.record_graph("x^2");

        let graphs: Vec<_> = history.graph_entries().collect();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].result.as_str(), GRAPH_RESULT);
        assert!(graphs[0].is_graph());

        history.clear_graph();
        assert_eq!(history.len(), 1);
        assert_eq!(history.graph_entries().count(), 0);
    }

    #[test]
    fn test_truncate() {
        let mut history = History::new();
        for i in 0..5 {
            history.add(entry(&i.to_string(), &i.to_string()));
        }
        history.truncate(0);
        assert_eq!(history.len(), 5);
        history.truncate(3);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_programmer_entry_suffix() {
        let stored = HistoryEntry::programmer("FF+1", Radix::Hex, DisplayString::new("100"));
        assert_eq!(stored.expression, "FF+1 (HEX)");
        assert_eq!(stored.calculator_type, CalculatorMode::Programmer);

        assert_eq!(split_programmer_expression(&stored.expression), ("FF+1".to_string(), Radix::Hex));
        assert_eq!(split_programmer_expression("101 (bin)"), ("101".to_string(), Radix::Bin));
        assert_eq!(split_programmer_expression("42"), ("42".to_string(), Radix::Dec));
        assert_eq!(split_programmer_expression("7 (XYZ)"), ("7 (XYZ)".to_string(), Radix::Dec));
        assert_eq!(split_programmer_expression("1+(FF)"), ("1+(FF)".to_string(), Radix::Dec));
        assert_eq!(split_programmer_expression("1+(FF) (HEX)"), ("1+(FF)".to_string(), Radix::Hex));
        assert_eq!(
            split_programmer_expression("(1+1)*2 (OCT)"),
            ("(1+1)*2".to_string(), Radix::Oct)
        );
    }

    #[test]
    fn test_entry_serialization() {
        let stored = entry("2+2", "4");
        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"calculator_type\":\"engineering\""));
        assert!(json.contains("\"result\":\"4\""));

        let roundtrip: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, stored);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_history_path("roundtrip");

        let mut history = History::new();
        history.add(entry("sin(30)", "0.5"));
        history.add(HistoryEntry::programmer("FF", Radix::Hex, DisplayString::new("FF")));
        save_history(&history, &path).unwrap();

        let loaded = load_history(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.entries(), history.entries());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_history_path("atomic");
        let tmp_path = path.with_extension("json.tmp");

        save_history(&History::new(), &path).unwrap();

        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let path = temp_history_path("missing");
        let _ = fs::remove_file(&path);
        assert_eq!(load_history(&path).unwrap_err().error_code(), "FILE_ERROR");
        assert!(load_history_or_default(&path).unwrap().is_empty());
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
