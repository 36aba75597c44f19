//! Data-integrity checks for the bundled dataset.
//!
//! The query layer tolerates every problem reported here (dangling ids are
//! dropped, locations without coordinates stay off the map, duplicate names
//! resolve to the first location). This pass makes them visible.

use std::collections::{HashMap, HashSet};

use poem_atlas::Dataset;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum Issue {
    /// A poem lists a location id that does not exist.
    DanglingLocation { poem_id: u32, location_id: String },
    /// A location embeds a poem id that does not exist.
    DanglingPoem { location_id: String, poem_id: u32 },
    /// Both records exist but only one side records the link.
    OneSidedLink {
        poem_id: u32,
        location_id: String,
        recorded_by: Side,
    },
    MissingCoordinates { location_id: String },
    /// Several locations answer to the same name or alias.
    NameCollision { name: String, location_ids: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Poem,
    Location,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub locations_checked: usize,
    pub poems_checked: usize,
    pub issues: Vec<Issue>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn check(dataset: &Dataset) -> Report {
    let mut issues = Vec::new();
    check_links(dataset, &mut issues);
    check_coordinates(dataset, &mut issues);
    check_names(dataset, &mut issues);

    for issue in &issues {
        tracing::warn!(?issue, "integrity");
    }

    Report {
        locations_checked: dataset.locations().len(),
        poems_checked: dataset.poems().len(),
        issues,
    }
}

fn check_links(dataset: &Dataset, issues: &mut Vec<Issue>) {
    for poem in dataset.poems() {
        for location_id in &poem.locations {
            match dataset.location_by_id(location_id) {
                None => issues.push(Issue::DanglingLocation {
                    poem_id: poem.id,
                    location_id: location_id.clone(),
                }),
                Some(loc) if !loc.poems.iter().any(|p| p.poem_id == poem.id) => {
                    issues.push(Issue::OneSidedLink {
                        poem_id: poem.id,
                        location_id: location_id.clone(),
                        recorded_by: Side::Poem,
                    })
                }
                Some(_) => {}
            }
        }
    }

    for loc in dataset.locations() {
        let mut reported = HashSet::new();
        for poem_ref in &loc.poems {
            if !reported.insert(poem_ref.poem_id) {
                continue;
            }
            match dataset.poem_by_id(poem_ref.poem_id) {
                None => issues.push(Issue::DanglingPoem {
                    location_id: loc.id.clone(),
                    poem_id: poem_ref.poem_id,
                }),
                Some(poem) if !poem.locations.contains(&loc.id) => {
                    issues.push(Issue::OneSidedLink {
                        poem_id: poem.id,
                        location_id: loc.id.clone(),
                        recorded_by: Side::Location,
                    })
                }
                Some(_) => {}
            }
        }
    }
}

fn check_coordinates(dataset: &Dataset, issues: &mut Vec<Issue>) {
    issues.extend(
        dataset
            .locations()
            .iter()
            .filter(|l| l.lon_lat().is_none())
            .map(|l| Issue::MissingCoordinates {
                location_id: l.id.clone(),
            }),
    );
}

fn check_names(dataset: &Dataset, issues: &mut Vec<Issue>) {
    let mut order: Vec<&str> = Vec::new();
    let mut owners: HashMap<&str, Vec<&str>> = HashMap::new();

    for loc in dataset.locations() {
        for name in std::iter::once(&loc.name).chain(&loc.aliases) {
            let ids = owners.entry(name.as_str()).or_insert_with(|| {
                order.push(name.as_str());
                Vec::new()
            });
            if !ids.contains(&loc.id.as_str()) {
                ids.push(loc.id.as_str());
            }
        }
    }

    for name in order {
        let ids = &owners[name];
        if ids.len() > 1 {
            issues.push(Issue::NameCollision {
                name: name.to_string(),
                location_ids: ids.iter().map(|s| s.to_string()).collect(),
            });
        }
    }
}
