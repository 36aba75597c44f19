use std::path::{Path, PathBuf};

use anyhow::Context;
use poem_atlas::Dataset;

pub const LOCATIONS_FILE: &str = "analyzed_locations.json";
pub const POEMS_FILE: &str = "poems.json";
pub const DEFAULT_BASE_URL: &str = "https://poetrymap.quanl.ai";

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Site origin used for absolute sitemap URLs, without trailing slash.
    pub base_url: String,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            data_dir: data_dir.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn locations_path(&self) -> PathBuf {
        self.data_dir.join(LOCATIONS_FILE)
    }

    pub fn poems_path(&self) -> PathBuf {
        self.data_dir.join(POEMS_FILE)
    }

    pub fn load_dataset(&self) -> anyhow::Result<Dataset> {
        let locations = read_to_string(&self.locations_path())?;
        let poems = read_to_string(&self.poems_path())?;
        let dataset = Dataset::from_json(&locations, &poems)
            .with_context(|| format!("invalid dataset in {}", self.data_dir.display()))?;
        tracing::info!(
            locations = dataset.locations().len(),
            poems = dataset.poems().len(),
            dir = %self.data_dir.display(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

fn read_to_string(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}
