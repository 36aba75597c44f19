use serde::Deserialize;

use crate::{Location, Poem};

/// Failure to decode one of the two bundled documents.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("cannot parse locations document")]
    Locations(#[source] serde_json::Error),
    #[error("cannot parse poems document")]
    Poems(#[source] serde_json::Error),
}

/// The locations document is emitted either as a bare array or wrapped in
/// `{ "locations": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LocationsDocument {
    Wrapped { locations: Vec<Location> },
    Bare(Vec<Location>),
}

impl LocationsDocument {
    fn into_vec(self) -> Vec<Location> {
        match self {
            Self::Wrapped { locations } | Self::Bare(locations) => locations,
        }
    }
}

/// Decode a locations document in either shape.
pub fn parse_locations(json: &str) -> Result<Vec<Location>, DatasetError> {
    serde_json::from_str::<LocationsDocument>(json)
        .map(LocationsDocument::into_vec)
        .map_err(DatasetError::Locations)
}

pub fn parse_poems(json: &str) -> Result<Vec<Poem>, DatasetError> {
    serde_json::from_str(json).map_err(DatasetError::Poems)
}

/// Immutable in-memory store of every location and poem.
///
/// Source order is preserved; every ordering produced by the query layer
/// falls back to it for ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    locations: Vec<Location>,
    poems: Vec<Poem>,
}

impl Dataset {
    pub fn new(locations: Vec<Location>, poems: Vec<Poem>) -> Self {
        Self { locations, poems }
    }

    pub fn from_json(locations_json: &str, poems_json: &str) -> Result<Self, DatasetError> {
        let locations = parse_locations(locations_json)?;
        let poems = parse_poems(poems_json)?;
        tracing::debug!(
            locations = locations.len(),
            poems = poems.len(),
            "dataset loaded"
        );
        Ok(Self::new(locations, poems))
    }

    /// Every location, including those no poem mentions.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn poems(&self) -> &[Poem] {
        &self.poems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POEMS: &str = r#"[{"id":1,"title":"春望","author":"杜甫","contents":"国破山河在","type":"五言律诗","locations":["changan"]}]"#;

    #[test]
    fn test_accepts_wrapped_locations_document() {
        let locations = r#"{"locations":[{"id":"changan","name":"长安","type":"city","coordinates":[108.9,34.3]}]}"#;
        let ds = Dataset::from_json(locations, POEMS).unwrap();
        assert_eq!(ds.locations().len(), 1);
        assert_eq!(ds.poems().len(), 1);
    }

    #[test]
    fn test_accepts_bare_locations_array() {
        let locations = r#"[{"id":"changan","name":"长安","type":"city"},{"id":"taishan","name":"泰山","type":"mountain"}]"#;
        let ds = Dataset::from_json(locations, "[]").unwrap();
        assert_eq!(ds.locations()[1].id, "taishan");
        assert!(ds.poems().is_empty());
    }

    #[test]
    fn test_reports_which_document_failed() {
        let err = Dataset::from_json("{", POEMS).unwrap_err();
        assert!(matches!(err, DatasetError::Locations(_)));

        let err = Dataset::from_json("[]", r#"[{"id":"x"}]"#).unwrap_err();
        assert!(matches!(err, DatasetError::Poems(_)));
    }
}
