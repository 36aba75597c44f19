//! Map marker synchronization.
//!
//! [`MarkerSync`] is a reducer: given the filtered list and the selection it
//! returns the [`MarkerCommand`]s that bring the live map in line, and
//! remembers the resulting marker set for the next pass. Applying commands is
//! left to a [`MapSurface`], so the whole state machine runs without a map.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::{Location, LocationType, PopupContent};

/// Windows narrower than this are treated as compact (phone-sized).
pub const COMPACT_BREAKPOINT_PX: f64 = 768.0;
/// Zoom level used when centering on a selected marker.
pub const FOCUS_ZOOM: u8 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Viewport {
    /// Compact viewports show details in the side panel instead of popups.
    pub compact: bool,
}

impl Viewport {
    pub fn from_width(width_px: f64) -> Self {
        Self {
            compact: width_px < COMPACT_BREAKPOINT_PX,
        }
    }
}

// ── Marker style ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub color: &'static str,
    pub glyph: &'static str,
    /// Icon edge length in pixels.
    pub size: u32,
    pub font_px: u32,
    pub selected: bool,
}

impl MarkerStyle {
    pub fn new(kind: LocationType, selected: bool) -> Self {
        Self {
            color: kind.color(),
            glyph: kind.glyph(),
            size: if selected { 40 } else { 32 },
            font_px: if selected { 14 } else { 12 },
            selected,
        }
    }

    fn border(&self) -> &'static str {
        if self.selected {
            "3px solid white"
        } else {
            "2px solid rgba(255,255,255,0.7)"
        }
    }

    /// Teardrop pin with the type glyph, for a div-based map icon.
    pub fn icon_html(&self) -> String {
        format!(
            "<div class=\"marker-pin\" style=\"width:{size}px;height:{size}px;background:{color};\
             border:{border};\"><span style=\"font-size:{font}px;\">{glyph}</span></div>",
            size = self.size,
            color = self.color,
            border = self.border(),
            font = self.font_px,
            glyph = self.glyph,
        )
    }
}

// ── Markers and commands ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub style: MarkerStyle,
    pub popup_html: String,
}

impl Marker {
    /// `None` when the location has no usable coordinate pair.
    pub fn for_location(location: &Location, selected: bool) -> Option<Self> {
        let (lon, lat) = location.lon_lat()?;
        Some(Self {
            id: location.id.clone(),
            lat,
            lon,
            style: MarkerStyle::new(location.kind, selected),
            popup_html: PopupContent::for_location(location).to_html(),
        })
    }

    /// Same place and content, whatever the style.
    fn same_content(&self, other: &Marker) -> bool {
        self.lat == other.lat && self.lon == other.lon && self.popup_html == other.popup_html
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MarkerCommand {
    Create(Marker),
    Remove { id: String },
    Restyle { id: String, style: MarkerStyle },
    Recenter { lat: f64, lon: f64, zoom: u8 },
    OpenPopup { id: String },
    ClosePopup,
}

/// The map widget as seen by the synchronizer.
pub trait MapSurface {
    fn add_marker(&mut self, marker: &Marker);
    fn remove_marker(&mut self, id: &str);
    fn restyle_marker(&mut self, id: &str, style: &MarkerStyle);
    fn set_view(&mut self, lat: f64, lon: f64, zoom: u8);
    fn open_popup(&mut self, id: &str);
    fn close_popup(&mut self);
}

impl MarkerCommand {
    pub fn apply<S: MapSurface + ?Sized>(&self, surface: &mut S) {
        match self {
            Self::Create(marker) => surface.add_marker(marker),
            Self::Remove { id } => surface.remove_marker(id),
            Self::Restyle { id, style } => surface.restyle_marker(id, style),
            Self::Recenter { lat, lon, zoom } => surface.set_view(*lat, *lon, *zoom),
            Self::OpenPopup { id } => surface.open_popup(id),
            Self::ClosePopup => surface.close_popup(),
        }
    }
}

pub fn apply_all<S: MapSurface + ?Sized>(commands: &[MarkerCommand], surface: &mut S) {
    for command in commands {
        command.apply(surface);
    }
}

// ── Synchronizer ──────────────────────────────────────────────────────────

enum Action {
    Create,
    /// Same id, different place or popup: drop and re-add.
    Replace,
    Restyle,
}

#[derive(Debug, Clone, Default)]
pub struct MarkerSync {
    markers: BTreeMap<String, Marker>,
    /// Selection seen by the last [`MarkerSync::transition`].
    selected: Option<String>,
    viewport: Viewport,
}

impl MarkerSync {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.markers.get(id)
    }

    /// One full pass: reconcile markers, then react to a selection change.
    pub fn update(&mut self, filtered: &[&Location], selected: Option<&Location>) -> Vec<MarkerCommand> {
        let mut commands = self.reconcile(filtered, selected);
        commands.extend(self.transition(selected));
        commands
    }

    /// Make the marker set match `filtered` exactly.
    ///
    /// The desired set is rebuilt from scratch on every call. Markers that
    /// stay keep their identity and are only restyled when their style
    /// changed, so a repeated call returns no commands.
    pub fn reconcile(&mut self, filtered: &[&Location], selected: Option<&Location>) -> Vec<MarkerCommand> {
        let selected_id = selected.map(|l| l.id.as_str());

        let mut seen = HashSet::new();
        let mut desired = Vec::with_capacity(filtered.len());
        for &location in filtered {
            let selected = selected_id == Some(location.id.as_str());
            let Some(marker) = Marker::for_location(location, selected) else {
                continue;
            };
            if seen.insert(location.id.as_str()) {
                desired.push(marker);
            }
        }

        let mut commands = Vec::new();
        let stale: Vec<String> = self
            .markers
            .keys()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            self.markers.remove(&id);
            commands.push(MarkerCommand::Remove { id });
        }

        let (mut created, mut restyled) = (0usize, 0usize);
        for marker in desired {
            let action = match self.markers.get(&marker.id) {
                None => Action::Create,
                Some(existing) if !existing.same_content(&marker) => Action::Replace,
                Some(existing) if existing.style != marker.style => Action::Restyle,
                Some(_) => continue,
            };
            match action {
                Action::Restyle => {
                    restyled += 1;
                    commands.push(MarkerCommand::Restyle {
                        id: marker.id.clone(),
                        style: marker.style.clone(),
                    });
                }
                Action::Replace => {
                    created += 1;
                    commands.push(MarkerCommand::Remove { id: marker.id.clone() });
                    commands.push(MarkerCommand::Create(marker.clone()));
                }
                Action::Create => {
                    created += 1;
                    commands.push(MarkerCommand::Create(marker.clone()));
                }
            }
            self.markers.insert(marker.id.clone(), marker);
        }

        tracing::debug!(
            markers = self.markers.len(),
            created,
            restyled,
            commands = commands.len(),
            "markers reconciled"
        );
        commands
    }

    /// React to the selection moving to `selected`.
    ///
    /// Nothing happens unless the selection changed. Clearing it closes the
    /// popup; selecting a location that has a marker recenters on it and,
    /// outside compact viewports, opens its popup. A selection without a
    /// marker (filtered out, or no coordinates) is accepted silently.
    pub fn transition(&mut self, selected: Option<&Location>) -> Vec<MarkerCommand> {
        let next = selected.map(|l| l.id.clone());
        if next == self.selected {
            return Vec::new();
        }
        self.selected = next;

        let Some(id) = self.selected.as_deref() else {
            return vec![MarkerCommand::ClosePopup];
        };
        let Some(marker) = self.markers.get(id) else {
            return Vec::new();
        };

        let mut commands = vec![MarkerCommand::Recenter {
            lat: marker.lat,
            lon: marker.lon,
            zoom: FOCUS_ZOOM,
        }];
        if !self.viewport.compact {
            commands.push(MarkerCommand::OpenPopup { id: marker.id.clone() });
        }
        commands
    }

    /// Handle a click on marker `id`: report the selection through
    /// `on_select` and, on compact viewports, close the popup the map
    /// widget opened by itself.
    pub fn click(&self, id: &str, on_select: impl FnOnce(&str)) -> Vec<MarkerCommand> {
        if !self.markers.contains_key(id) {
            return Vec::new();
        }
        on_select(id);
        if self.viewport.compact {
            vec![MarkerCommand::ClosePopup]
        } else {
            Vec::new()
        }
    }
}
