//! Datasets: named JSON record arrays read from disk

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// A named batch of JSON objects. The name doubles as the target
/// collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    records: Vec<Value>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, records: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Read a file holding a single JSON array
    pub async fn from_file(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let name = name.into();
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let records: Vec<Value> = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            "Read {} records for '{}' from {}",
            records.len(),
            name,
            path.display()
        );
        Ok(Self { name, records })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record must be a JSON object
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name.contains('$') || self.name.starts_with("system.") {
            return Err(Error::InvalidConfig(format!(
                "invalid collection name '{}'",
                self.name
            )));
        }

        match self.records.iter().position(|r| !r.is_object()) {
            Some(index) => Err(Error::MalformedRecord {
                dataset: self.name.clone(),
                index,
                reason: format!("expected an object, found {}", kind(&self.records[index])),
            }),
            None => Ok(()),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Where a dataset is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSource {
    pub name: String,
    pub path: PathBuf,
}

impl DatasetSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// `<dir>/<name>.json` for each name
    pub fn in_dir<S: AsRef<str>>(dir: &Path, names: &[S]) -> Vec<Self> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                Self::new(name, dir.join(format!("{}.json", name)))
            })
            .collect()
    }

    pub async fn read(&self) -> Result<Dataset> {
        Dataset::from_file(&self.name, &self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.json");
        std::fs::write(&path, r#"[{"id": "a.py"}, {"id": "b.py", "loc": 12}]"#).unwrap();

        let dataset = Dataset::from_file("nodes", &path).await.unwrap();
        assert_eq!(dataset.name(), "nodes");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[1]["loc"], 12);
        assert!(dataset.validate().is_ok());
    }

    #[tokio::test]
    async fn test_from_file_requires_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.json");
        std::fs::write(&path, r#"{"source": "a", "target": "b"}"#).unwrap();
        assert!(matches!(
            Dataset::from_file("edges", &path).await,
            Err(Error::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DatasetSource::new("nodes", dir.path().join("nodes.json"));
        assert!(matches!(source.read().await, Err(Error::Io(_))));
    }

    #[test]
    fn test_validate_rejects_non_objects() {
        let dataset = Dataset::new("edges", vec![json!({"source": "a"}), json!(3)]);
        match dataset.validate() {
            Err(Error::MalformedRecord { dataset, index, .. }) => {
                assert_eq!(dataset, "edges");
                assert_eq!(index, 1);
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        assert!(Dataset::new("", vec![]).validate().is_err());
        assert!(Dataset::new("sys$tem", vec![]).validate().is_err());
        assert!(Dataset::new("nodes", vec![]).validate().is_ok());
    }

    #[test]
    fn test_sources_in_dir() {
        let sources = DatasetSource::in_dir(Path::new("/data"), &["nodes", "edges"]);
        assert_eq!(sources[0].path, PathBuf::from("/data/nodes.json"));
        assert_eq!(sources[1].name, "edges");
    }
}
