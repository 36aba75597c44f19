//! Leaflet-backed [`MapSurface`].
//!
//! Leaflet itself is loaded by `index.html`; the glue below keeps one
//! `L.Marker` per location id so the synchronizer can address markers by id.

use poem_atlas::{MapSurface, Marker, MarkerStyle};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub const MAP_CONTAINER_ID: &str = "poetry-map";
const TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> &copy; <a href=\"https://carto.com/\">CARTO</a>";
/// Central China.
const INITIAL_CENTER: (f64, f64) = (35.0, 108.0);
const INITIAL_ZOOM: u8 = 5;
const MIN_ZOOM: u8 = 3;
const MAX_ZOOM: u8 = 12;

#[wasm_bindgen(inline_js = "
export function poetry_map_create(container, lat, lon, zoom, minZoom, maxZoom, tileUrl, attribution) {
    const map = L.map(container, { center: [lat, lon], zoom, minZoom, maxZoom });
    L.tileLayer(tileUrl, { attribution, subdomains: 'abcd', maxZoom }).addTo(map);
    return { map, markers: new Map() };
}

function poetry_map_icon(html, size) {
    return L.divIcon({
        html,
        className: 'custom-marker',
        iconSize: [size, size],
        iconAnchor: [size / 2, size],
        popupAnchor: [0, -size],
    });
}

export function poetry_map_add_marker(handle, id, lat, lon, iconHtml, size, popupHtml, onClick) {
    const marker = L.marker([lat, lon], { icon: poetry_map_icon(iconHtml, size) }).addTo(handle.map);
    marker.bindPopup(popupHtml, { maxWidth: 300, className: 'custom-popup' });
    marker.on('click', () => onClick(id));
    handle.markers.set(id, marker);
}

export function poetry_map_remove_marker(handle, id) {
    const marker = handle.markers.get(id);
    if (marker) {
        marker.remove();
        handle.markers.delete(id);
    }
}

export function poetry_map_set_icon(handle, id, iconHtml, size) {
    const marker = handle.markers.get(id);
    if (marker) marker.setIcon(poetry_map_icon(iconHtml, size));
}

export function poetry_map_set_view(handle, lat, lon, zoom) {
    handle.map.setView([lat, lon], zoom, { animate: true });
}

export function poetry_map_open_popup(handle, id) {
    const marker = handle.markers.get(id);
    if (marker) marker.openPopup();
}

export function poetry_map_close_popup(handle) {
    handle.map.closePopup();
}

export function poetry_map_destroy(handle) {
    handle.markers.clear();
    handle.map.remove();
}
")]
extern "C" {
    type MapHandle;

    #[wasm_bindgen(catch)]
    fn poetry_map_create(
        container: &str,
        lat: f64,
        lon: f64,
        zoom: u8,
        min_zoom: u8,
        max_zoom: u8,
        tile_url: &str,
        attribution: &str,
    ) -> Result<MapHandle, JsValue>;

    fn poetry_map_add_marker(
        handle: &MapHandle,
        id: &str,
        lat: f64,
        lon: f64,
        icon_html: &str,
        size: u32,
        popup_html: &str,
        on_click: &js_sys::Function,
    );
    fn poetry_map_remove_marker(handle: &MapHandle, id: &str);
    fn poetry_map_set_icon(handle: &MapHandle, id: &str, icon_html: &str, size: u32);
    fn poetry_map_set_view(handle: &MapHandle, lat: f64, lon: f64, zoom: u8);
    fn poetry_map_open_popup(handle: &MapHandle, id: &str);
    fn poetry_map_close_popup(handle: &MapHandle);
    fn poetry_map_destroy(handle: &MapHandle);
}

pub struct LeafletSurface {
    handle: MapHandle,
    /// Shared by every marker; receives the clicked location id.
    on_click: Closure<dyn FnMut(String)>,
}

impl LeafletSurface {
    /// Attach a map to the `#poetry-map` element. Fails if Leaflet is missing
    /// or the element is not in the document yet.
    pub fn attach(on_click: impl FnMut(String) + 'static) -> Result<Self, String> {
        let (lat, lon) = INITIAL_CENTER;
        let handle = poetry_map_create(
            MAP_CONTAINER_ID,
            lat,
            lon,
            INITIAL_ZOOM,
            MIN_ZOOM,
            MAX_ZOOM,
            TILE_URL,
            TILE_ATTRIBUTION,
        )
        .map_err(|e| format!("地图初始化失败: {e:?}"))?;
        Ok(Self {
            handle,
            on_click: Closure::new(on_click),
        })
    }
}

impl MapSurface for LeafletSurface {
    fn add_marker(&mut self, marker: &Marker) {
        poetry_map_add_marker(
            &self.handle,
            &marker.id,
            marker.lat,
            marker.lon,
            &marker.style.icon_html(),
            marker.style.size,
            &marker.popup_html,
            self.on_click.as_ref().unchecked_ref(),
        );
    }

    fn remove_marker(&mut self, id: &str) {
        poetry_map_remove_marker(&self.handle, id);
    }

    fn restyle_marker(&mut self, id: &str, style: &MarkerStyle) {
        poetry_map_set_icon(&self.handle, id, &style.icon_html(), style.size);
    }

    fn set_view(&mut self, lat: f64, lon: f64, zoom: u8) {
        poetry_map_set_view(&self.handle, lat, lon, zoom);
    }

    fn open_popup(&mut self, id: &str) {
        poetry_map_open_popup(&self.handle, id);
    }

    fn close_popup(&mut self) {
        poetry_map_close_popup(&self.handle);
    }
}

impl Drop for LeafletSurface {
    fn drop(&mut self) {
        poetry_map_destroy(&self.handle);
    }
}
