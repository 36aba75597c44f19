use std::sync::Arc;

use leptos::prelude::*;
use serde::Deserialize;

// Re-export shared types from poem_atlas
pub use poem_atlas::{Dataset, FilterState, Location, LocationType, Poem, PopupContent, TypeFilter};

/// Written by `poetry_map build` next to the page.
const LOCATIONS_URL: &str = "/data/locations.json";
const POEMS_URL: &str = "/data/poems.json";

// ── data/locations.json ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LocationsJson {
    pub locations: Vec<Location>,
}

/// The dataset as seen by every page: `None` while loading.
pub type DatasetSignal = RwSignal<Option<Result<Arc<Dataset>, String>>>;

async fn fetch_json<T: for<'de> Deserialize<'de>>(url: &str) -> Result<T, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("{url}: {e}"))?;
    if !resp.ok() {
        return Err(format!("{url}: HTTP {}", resp.status()));
    }
    resp.json::<T>().await.map_err(|e| format!("{url}: {e}"))
}

pub async fn fetch_dataset() -> Result<Dataset, String> {
    let locations: LocationsJson = fetch_json(LOCATIONS_URL).await?;
    let poems: Vec<Poem> = fetch_json(POEMS_URL).await?;
    Ok(Dataset::new(locations.locations, poems))
}

pub fn use_dataset() -> DatasetSignal {
    expect_context::<DatasetSignal>()
}

/// Render `f` once the dataset is available, with loading and error states
/// handled the same way on every page.
pub fn with_dataset<F, V>(data: DatasetSignal, f: F) -> impl IntoView
where
    F: Fn(&Dataset) -> V + Send + Sync + 'static,
    V: IntoView + 'static,
{
    move || match data.get() {
        None => view! { <p class="loading">"数据加载中…"</p> }.into_any(),
        Some(Err(e)) => view! { <p class="error">{e}</p> }.into_any(),
        Some(Ok(ds)) => f(&ds).into_any(),
    }
}

/// Colored dot for a location type.
pub fn type_dot(kind: LocationType) -> impl IntoView {
    view! { <span class="type-dot" style=format!("background-color:{}", kind.color())></span> }
}
