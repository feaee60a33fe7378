// Stored correlation results, keyed by dataset or method name.
//
// On disk this is a JSON object of `{ "name": { "statistic": f64, "pvalue": f64 } }`.
// Key order in the file is the display order, and it survives a load/save
// round trip. Computed CorrelationResults drop straight into the table.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::stats::CorrelationResult;

/// Ordered mapping from dataset name to its correlation result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    entries: Vec<(String, CorrelationResult)>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read results from {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid results file {}", path.display()))
    }

    /// Parse a table from JSON text, keeping key order.
    pub fn from_json(raw: &str) -> Result<Self> {
        let object: Map<String, Value> =
            serde_json::from_str(raw).context("Result table must be a JSON object")?;

        let mut table = Self::new();
        for (name, value) in object {
            let result: CorrelationResult = serde_json::from_value(value)
                .with_context(|| format!("Entry '{name}' is not {{statistic, pvalue}}"))?;
            table.insert(&name, result);
        }
        Ok(table)
    }

    /// Serialize to pretty JSON in table order.
    pub fn to_json(&self) -> Result<String> {
        let mut object = Map::new();
        for (name, result) in &self.entries {
            object.insert(name.clone(), serde_json::to_value(result)?);
        }
        serde_json::to_string_pretty(&Value::Object(object)).context("Failed to serialize results")
    }

    /// Write the table to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write results to {}", path.display()))
    }

    /// Insert or replace. A replaced entry keeps its position.
    pub fn insert(&mut self, name: &str, result: CorrelationResult) {
        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = result,
            None => self.entries.push((name.to_string(), result)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CorrelationResult> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, result)| result)
    }

    /// Entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CorrelationResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(statistic: f64, pvalue: f64) -> CorrelationResult {
        CorrelationResult { statistic, pvalue }
    }

    #[test]
    fn test_from_json_keeps_file_order() {
        let raw = r#"{
            "wordsim": {"statistic": 0.41, "pvalue": 1e-8},
            "simlex": {"statistic": 0.22, "pvalue": 0.003},
            "sts": {"statistic": 0.35, "pvalue": 0.02}
        }"#;
        let table = ResultTable::from_json(raw).unwrap();
        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["wordsim", "simlex", "sts"]);
        assert_eq!(table.get("simlex"), Some(&result(0.22, 0.003)));
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        assert!(ResultTable::from_json(r#"{"a": {"statistic": 0.1}}"#).is_err());
        assert!(ResultTable::from_json(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut table = ResultTable::new();
        table.insert("a", result(0.1, 0.5));
        table.insert("b", result(0.2, 0.5));
        table.insert("a", result(0.9, 0.01));
        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(table.get("a"), Some(&result(0.9, 0.01)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("results.json");

        let mut table = ResultTable::new();
        table.insert("zeta", result(-0.12, 0.4));
        table.insert("alpha", result(0.67, 2.5e-12));
        table.save(&path).unwrap();

        let loaded = ResultTable::load(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ResultTable::load(Path::new("/nonexistent/results.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read results"));
    }

    #[test]
    fn test_empty_table() {
        let table = ResultTable::from_json("{}").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.to_json().unwrap(), "{}");
    }
}
