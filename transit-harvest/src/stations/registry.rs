//! Station id lookup.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::domain::StationId;

use super::error::StationError;

/// Column holding the display name.
const NAME_COLUMN: usize = 0;
/// Column holding the station identifier.
const ID_COLUMN: usize = 3;

/// The stations to harvest, in file order, with their display names.
///
/// Rows are `;`-delimited without a header. Duplicate ids keep their first
/// position and first name.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    ids: Vec<StationId>,
    names: HashMap<StationId, String>,
}

impl StationRegistry {
    /// Load a station file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let path = path.as_ref();
        let reader = reader_builder()
            .from_path(path)
            .map_err(|source| StationError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader, path)
    }

    /// Parse station rows from any reader.
    pub fn from_reader(input: impl Read) -> Result<Self, StationError> {
        Self::from_csv(reader_builder().from_reader(input), Path::new("<input>"))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Self, StationError> {
        let mut registry = Self::default();

        for row in reader.records() {
            let row = row.map_err(|source| StationError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            if row.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let raw_id = row.get(ID_COLUMN).ok_or(StationError::ShortRow {
                line,
                found: row.len(),
            })?;
            let id = StationId::parse(raw_id).map_err(|e| StationError::InvalidId {
                line,
                message: e.to_string(),
            })?;
            let name = row.get(NAME_COLUMN).unwrap_or_default().trim().to_string();

            registry.insert(id, name);
        }

        Ok(registry)
    }

    fn insert(&mut self, id: StationId, name: String) {
        if self.names.contains_key(&id) {
            return;
        }
        self.ids.push(id.clone());
        self.names.insert(id, name);
    }

    /// Station ids in file order, without duplicates.
    pub fn ids(&self) -> &[StationId] {
        &self.ids
    }

    /// Display name for a station, if it has a non-empty one.
    pub fn name_of(&self, id: &StationId) -> Option<&str> {
        self.names
            .get(id)
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// `"Name (id)"` when the name is known, otherwise just the id.
    pub fn describe(&self, id: &StationId) -> String {
        match self.name_of(id) {
            Some(name) => format!("{name} ({id})"),
            None => id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Append another registry's stations after this one's.
    pub fn merge(&mut self, other: StationRegistry) {
        let StationRegistry { ids, mut names } = other;
        for id in ids {
            let name = names.remove(&id).unwrap_or_default();
            self.insert(id, name);
        }
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(b';').has_headers(false).flexible(true);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Stuttgart Hauptbahnhof (tief);Stuttgart;S-Bahn;de:08111:6118\n\
Stadtmitte;Stuttgart;S-Bahn;de:08111:6056\n\
\n\
Hauptbahnhof again;Stuttgart;S-Bahn;de:08111:6118\n\
;Esslingen;S-Bahn;de:08116:7800\n";

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    #[test]
    fn parses_ids_in_order_without_duplicates() {
        let registry = StationRegistry::from_reader(SAMPLE.as_bytes()).unwrap();

        let ids: Vec<&str> = registry.ids().iter().map(StationId::as_str).collect();
        assert_eq!(ids, ["de:08111:6118", "de:08111:6056", "de:08116:7800"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn names_keep_first_occurrence() {
        let registry = StationRegistry::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(
            registry.name_of(&id("de:08111:6118")),
            Some("Stuttgart Hauptbahnhof (tief)")
        );
        assert_eq!(registry.name_of(&id("de:08116:7800")), None);
        assert_eq!(registry.name_of(&id("de:00000:0")), None);
    }

    #[test]
    fn describe_falls_back_to_id() {
        let registry = StationRegistry::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(
            registry.describe(&id("de:08111:6056")),
            "Stadtmitte (de:08111:6056)"
        );
        assert_eq!(registry.describe(&id("de:08116:7800")), "de:08116:7800");
    }

    #[test]
    fn short_row_is_an_error() {
        let err = StationRegistry::from_reader("A;B;C\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StationError::ShortRow { line: 1, found: 3 }));
    }

    #[test]
    fn blank_id_is_an_error() {
        let err = StationRegistry::from_reader("A;B;C;  \n".as_bytes()).unwrap_err();
        assert!(matches!(err, StationError::InvalidId { line: 1, .. }));
    }

    #[test]
    fn empty_input_is_empty_registry() {
        let registry = StationRegistry::from_reader("".as_bytes()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn merge_appends_new_stations_only() {
        let mut lf = StationRegistry::from_reader("A;x;y;S1\nB;x;y;S2\n".as_bytes()).unwrap();
        let hf = StationRegistry::from_reader("B2;x;y;S2\nC;x;y;S3\n".as_bytes()).unwrap();

        lf.merge(hf);

        let ids: Vec<&str> = lf.ids().iter().map(StationId::as_str).collect();
        assert_eq!(ids, ["S1", "S2", "S3"]);
        assert_eq!(lf.name_of(&id("S2")), Some("B"));
        assert_eq!(lf.name_of(&id("S3")), Some("C"));
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let registry = StationRegistry::load(file.path()).unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StationRegistry::load(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, StationError::Read { .. }));
        assert!(err.to_string().contains("nope.csv"));
    }
}
