use crate::domain::snapshot::ProductRecord;
use crate::store::StoreError;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Product key -> last known record. Ordered so the file diffs cleanly.
pub type ProductState = BTreeMap<String, ProductRecord>;

/// JSON file holding the last observed state of every product.
/// Read once at cycle start, written once at cycle end; last write wins.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empty state when nothing has been persisted yet.
    pub fn load(&self) -> Result<ProductState, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ProductState::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(ProductState::new());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: self.path.display().to_string(),
            source,
        })
    }

    pub fn save(&self, state: &ProductState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state).map_err(|source| StoreError::Json {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::Price;
    use crate::tests::utils::temp_path;
    use rust_decimal::Decimal;

    #[test]
    fn missing_file_is_empty_state() {
        let store = StateStore::new(temp_path("state_missing", "json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let store = StateStore::new(temp_path("state_roundtrip", "json"));
        let mut state = ProductState::new();
        state.insert(
            "Widget".to_string(),
            ProductRecord {
                price: Price::Variants(vec![Decimal::new(10, 0), Decimal::new(12, 0)]),
                available: false,
                quantity_hint: Some("2".to_string()),
            },
        );
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn reads_flat_state_written_by_earlier_versions() {
        let path = temp_path("state_legacy", "json");
        fs::write(
            &path,
            r#"{"Widget":{"price":10,"available":true,"quantity":null},
                "Gadget":{"price":[5.5,7],"available":false,"quantity":"3"},
                "Broken":{"price":null,"available":false}}"#,
        )
        .unwrap();

        let state = StateStore::new(&path).load().unwrap();
        assert_eq!(state["Widget"].price, Price::Scalar(Decimal::new(10, 0)));
        assert!(state["Widget"].available);
        assert_eq!(
            state["Gadget"].price,
            Price::Variants(vec![Decimal::new(55, 1), Decimal::new(7, 0)])
        );
        assert_eq!(state["Gadget"].quantity_hint.as_deref(), Some("3"));
        assert_eq!(state["Broken"].price, Price::Absent);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = temp_path("state_corrupt", "json");
        fs::write(&path, "{not json").unwrap();
        let err = StateStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        let _ = fs::remove_file(path);
    }
}
