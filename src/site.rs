//! Route table, sitemap and the `build` output directory.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use poem_atlas::popup::escape_markup;
use poem_atlas::{Dataset, Location, LocationType};
use serde::Serialize;

use crate::config::Config;

/// Every page of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Locations,
    Poems,
    LocationType(LocationType),
    Author(String),
    Location(String),
    Poem(u32),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::About => "/about".to_string(),
            Self::Locations => "/locations".to_string(),
            Self::Poems => "/poems".to_string(),
            Self::LocationType(kind) => format!("/locations/type/{kind}"),
            Self::Author(name) => format!("/poems/author/{}", urlencoding::encode(name)),
            Self::Location(id) => format!("/locations/{}", urlencoding::encode(id)),
            Self::Poem(id) => format!("/poems/{id}"),
        }
    }

    /// Sitemap priority, highest for the map itself.
    pub fn priority(&self) -> &'static str {
        match self {
            Self::Home => "1.0",
            Self::Locations | Self::Poems => "0.9",
            Self::About | Self::LocationType(_) | Self::Author(_) => "0.8",
            Self::Location(_) => "0.7",
            Self::Poem(_) => "0.6",
        }
    }
}

/// All routes in sitemap order: static pages, type pages, authors,
/// locations with poems, poems.
pub fn routes(dataset: &Dataset) -> Vec<Route> {
    let mut routes = vec![Route::Home, Route::About, Route::Locations, Route::Poems];
    routes.extend(LocationType::ALL.into_iter().map(Route::LocationType));
    routes.extend(dataset.authors().into_iter().map(|a| Route::Author(a.to_string())));
    routes.extend(dataset.locations_with_poems().map(|l| Route::Location(l.id.clone())));
    routes.extend(dataset.poems().iter().map(|p| Route::Poem(p.id)));
    routes
}

pub fn sitemap_xml(base_url: &str, routes: &[Route]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    let base_url = escape_markup(base_url);
    for route in routes {
        let _ = writeln!(
            xml,
            "  <url><loc>{base_url}{}</loc><changefreq>monthly</changefreq><priority>{}</priority></url>",
            escape_markup(&route.path()),
            route.priority()
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

// ═══════════════════════════════════════════════════════════════════════
//  BUILD: data files for the frontend + sitemap
// ═══════════════════════════════════════════════════════════════════════

/// The wrapped `{ "locations": [...] }` document shape.
#[derive(Serialize)]
pub(crate) struct LocationsOut<'a> {
    pub locations: &'a [Location],
}

#[derive(Debug)]
pub struct BuildSummary {
    pub files: Vec<PathBuf>,
    pub routes: usize,
}

pub fn build(dataset: &Dataset, config: &Config, out_dir: &Path) -> anyhow::Result<BuildSummary> {
    let data_dir = out_dir.join("data");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("cannot create {}", data_dir.display()))?;

    let mut files = Vec::new();
    files.push(write_json(
        &data_dir.join("locations.json"),
        &LocationsOut {
            locations: dataset.locations(),
        },
    )?);
    files.push(write_json(&data_dir.join("poems.json"), dataset.poems())?);
    files.push(write_json(&data_dir.join("stats.json"), &dataset.stats())?);

    let routes = routes(dataset);
    let sitemap = out_dir.join("sitemap.xml");
    std::fs::write(&sitemap, sitemap_xml(&config.base_url, &routes))
        .with_context(|| format!("cannot write {}", sitemap.display()))?;
    tracing::info!(path = %sitemap.display(), routes = routes.len(), "sitemap written");
    files.push(sitemap);

    Ok(BuildSummary {
        files,
        routes: routes.len(),
    })
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> anyhow::Result<PathBuf> {
    let json = serde_json::to_string_pretty(data).context("JSON serialization failed")?;
    std::fs::write(path, &json).with_context(|| format!("cannot write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = json.len(), "written");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dataset() -> Dataset {
        let locations = r#"{"locations":[
            {"id":"changan","name":"长安","type":"city","coordinates":[108.94,34.34],
             "poems":[{"poem_id":1,"title":"春望","author":"杜甫","content":"国破山河在"}]},
            {"id":"taishan","name":"泰山","type":"mountain","coordinates":[117.1,36.25]}
        ]}"#;
        let poems = r#"[
            {"id":1,"title":"春望","author":"杜甫","contents":"国破山河在","locations":["changan"]},
            {"id":2,"title":"望岳","author":"杜甫","contents":"岱宗夫如何","locations":[]}
        ]"#;
        Dataset::from_json(locations, poems).unwrap()
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::LocationType(LocationType::Lake).path(), "/locations/type/lake");
        assert_eq!(Route::Location("changan".into()).path(), "/locations/changan");
        assert_eq!(Route::Poem(12).path(), "/poems/12");
        assert_eq!(Route::Author("李白".into()).path(), "/poems/author/%E6%9D%8E%E7%99%BD");
    }

    #[test]
    fn test_routes_skip_locations_without_poems() {
        let routes = routes(&dataset());
        assert_eq!(routes.len(), 4 + 7 + 1 + 1 + 2);
        assert!(routes.contains(&Route::Location("changan".into())));
        assert!(!routes.contains(&Route::Location("taishan".into())));
        assert_eq!(routes[11], Route::Author("杜甫".into()));
    }

    #[test]
    fn test_sitemap_lists_absolute_urls() {
        let xml = sitemap_xml("https://example.org", &[Route::Home, Route::Poem(3)]);
        assert!(xml.contains("<loc>https://example.org/</loc>"));
        assert!(xml.contains("<loc>https://example.org/poems/3</loc><changefreq>monthly</changefreq><priority>0.6</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_path_segments_are_percent_encoded() {
        assert_eq!(Route::Location("a-b_c.d~e".into()).path(), "/locations/a-b_c.d~e");
        assert_eq!(Route::Location("a b/c".into()).path(), "/locations/a%20b%2Fc");
    }

    #[test]
    fn test_sitemap_escapes_base_url() {
        let xml = sitemap_xml("https://example.org/?a=1&b=2", &[Route::About]);
        assert!(xml.contains("<loc>https://example.org/?a=1&amp;b=2/about</loc>"));
        assert!(!xml.contains("a=1&b"));
    }

    #[test]
    fn test_build_writes_data_and_sitemap() {
        let out = tempfile::tempdir().unwrap();
        let config = Config::new("data", "https://example.org");
        let summary = build(&dataset(), &config, out.path()).unwrap();

        assert_eq!(summary.files.len(), 4);
        assert_eq!(summary.routes, 15);
        for file in &summary.files {
            assert!(file.exists(), "{} missing", file.display());
        }

        let written = std::fs::read_to_string(out.path().join("data/locations.json")).unwrap();
        let poems = std::fs::read_to_string(out.path().join("data/poems.json")).unwrap();
        let reloaded = Dataset::from_json(&written, &poems).unwrap();
        assert_eq!(reloaded, dataset());

        let stats: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.path().join("data/stats.json")).unwrap()).unwrap();
        assert_eq!(stats["total_locations"], 1);
        assert_eq!(stats["by_type"]["city"], 1);
    }
}
