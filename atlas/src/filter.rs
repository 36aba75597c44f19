use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Dataset, Location, LocationType, UnknownLocationType};

/// The type selector of the map page: everything, or one [`LocationType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Only(LocationType),
}

impl TypeFilter {
    pub fn matches(&self, location: &Location) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => location.kind == *kind,
        }
    }

    pub fn label_zh(&self) -> &'static str {
        match self {
            Self::All => "全部",
            Self::Only(kind) => kind.label_zh(),
        }
    }

    /// "all" followed by the seven types, in button order.
    pub fn choices() -> impl Iterator<Item = TypeFilter> {
        std::iter::once(Self::All).chain(LocationType::ALL.into_iter().map(Self::Only))
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(kind) => f.write_str(kind.as_str()),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = UnknownLocationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Literal substring match against name, aliases and modern name.
///
/// An empty query matches everything.
pub fn matches_search(location: &Location, query: &str) -> bool {
    query.is_empty()
        || location.name.contains(query)
        || location.aliases.iter().any(|a| a.contains(query))
        || location.modern_name.contains(query)
}

/// Selection and filter inputs of the map page.
///
/// Each field has exactly one setter; the filtered list is never stored and
/// is recomputed by [`FilterState::derive`] whenever it is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    selected: Option<String>,
    active_type: TypeFilter,
    search_query: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a location by id, or clear the selection with `None`.
    ///
    /// The selection does not have to be part of the filtered list.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id.map(str::to_string);
    }

    pub fn set_type(&mut self, filter: TypeFilter) {
        self.active_type = filter;
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn active_type(&self) -> TypeFilter {
        self.active_type
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// The selected location, if its id exists in the dataset.
    pub fn selected<'a>(&self, dataset: &'a Dataset) -> Option<&'a Location> {
        self.selected_id().and_then(|id| dataset.location_by_id(id))
    }

    pub fn is_selected(&self, location: &Location) -> bool {
        self.selected_id() == Some(location.id.as_str())
    }

    pub fn matches(&self, location: &Location) -> bool {
        self.active_type.matches(location) && matches_search(location, &self.search_query)
    }

    /// Locations with poems that pass the type and search predicates, in
    /// dataset order.
    pub fn derive<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Location> {
        dataset
            .locations_with_poems()
            .filter(|l| self.matches(l))
            .collect()
    }
}
