use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod dataset;
pub mod filter;
pub mod markers;
pub mod popup;
pub mod query;

pub use dataset::{Dataset, DatasetError, parse_locations, parse_poems};
pub use filter::{FilterState, TypeFilter};
pub use markers::{MapSurface, Marker, MarkerCommand, MarkerStyle, MarkerSync, Viewport};
pub use popup::{PoemExcerpt, PopupContent};
pub use query::{AuthorProfile, Stats};

// ── Location type ─────────────────────────────────────────────────────────

/// The fixed classification of a place name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    City,
    Mountain,
    River,
    Lake,
    Region,
    /// Territory outside the Tang borders of the time.
    Foreign,
    Landmark,
}

impl LocationType {
    pub const ALL: [LocationType; 7] = [
        Self::City,
        Self::Mountain,
        Self::River,
        Self::Lake,
        Self::Region,
        Self::Foreign,
        Self::Landmark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Mountain => "mountain",
            Self::River => "river",
            Self::Lake => "lake",
            Self::Region => "region",
            Self::Foreign => "foreign",
            Self::Landmark => "landmark",
        }
    }

    /// Chinese label for lists and legends.
    pub fn label_zh(&self) -> &'static str {
        match self {
            Self::City => "城市",
            Self::Mountain => "山川",
            Self::River => "河流",
            Self::Lake => "湖泊",
            Self::Region => "地区",
            Self::Foreign => "域外",
            Self::Landmark => "名胜",
        }
    }

    /// Single glyph drawn inside a map marker.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::City => "城",
            Self::Mountain => "山",
            Self::River => "河",
            Self::Lake => "湖",
            Self::Region => "域",
            Self::Foreign => "外",
            Self::Landmark => "胜",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::City => "#DC143C",
            Self::Mountain => "#228B22",
            Self::River => "#4169E1",
            Self::Lake => "#00CED1",
            Self::Region => "#9370DB",
            Self::Foreign => "#FF8C00",
            Self::Landmark => "#FFD700",
        }
    }

    pub fn description_zh(&self) -> &'static str {
        match self {
            Self::City => "唐诗中提及的城市与都邑，包括长安、洛阳、金陵等",
            Self::Mountain => "唐诗中描绘的名山大川，包括泰山、华山、终南山等",
            Self::River => "唐诗中歌咏的江河水系，包括黄河、长江、渭河等",
            Self::Lake => "唐诗中描写的湖泊水域，包括洞庭湖、太湖等",
            Self::Region => "唐诗中涉及的地理区域，包括江南、关中、巴蜀等",
            Self::Foreign => "唐代疆域以外的地区（注：此分类依据唐代疆域，与现代中国领土无关）",
            Self::Landmark => "唐诗中提及的著名建筑与名胜，包括黄鹤楼、鹳雀楼等",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown location type {0:?}")]
pub struct UnknownLocationType(pub String);

impl FromStr for LocationType {
    type Err = UnknownLocationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownLocationType(s.to_string()))
    }
}

// ── Poem reference embedded in a location ─────────────────────────────────

/// Summary of a poem as stored on the location that it mentions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoemRef {
    pub poem_id: u32,
    pub title: String,
    pub author: String,
    pub content: String,
    /// Lines of the poem in which the place name occurs.
    #[serde(default)]
    pub relevant_lines: Vec<String>,
    /// The name or alias that matched, e.g. "京华".
    #[serde(default)]
    pub keyword: String,
}

// ── Location ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationType,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub modern_name: String,
    /// `[longitude, latitude]` as stored; see [`Location::lon_lat`].
    #[serde(default)]
    pub coordinates: Vec<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub poems: Vec<PoemRef>,
}

impl Location {
    /// The `(longitude, latitude)` pair, if the record carries a usable one.
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_slice() {
            [lon, lat] if lon.is_finite() && lat.is_finite() => Some((*lon, *lat)),
            _ => None,
        }
    }

    pub fn has_poems(&self) -> bool {
        !self.poems.is_empty()
    }

    /// True if `name` is this location's name or one of its aliases.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// "长安（西安）" style heading.
    pub fn display_name(&self) -> String {
        if self.modern_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}（{}）", self.name, self.modern_name)
        }
    }
}

// ── Poem ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poem {
    pub id: u32,
    pub title: String,
    pub author: String,
    #[serde(alias = "content")]
    pub contents: String,
    /// Form label such as 五言律诗.
    #[serde(rename = "type", default)]
    pub form: String,
    /// Ids of the locations this poem mentions.
    #[serde(default)]
    pub locations: Vec<String>,
}

impl Poem {
    pub fn has_locations(&self) -> bool {
        !self.locations.is_empty()
    }

    /// First line of the text, used for list previews.
    pub fn first_line(&self) -> &str {
        self.contents.lines().next().unwrap_or("")
    }
}
