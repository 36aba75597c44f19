use leptos::ev;
use leptos::prelude::*;
use poem_atlas::markers::apply_all;
use poem_atlas::popup::highlight_lines;
use poem_atlas::query::{distinct_poem_count, rank_by_poem_count};
use poem_atlas::{MarkerSync, Viewport};

use crate::leaflet::{LeafletSurface, MAP_CONTAINER_ID};
use crate::types::{Dataset, FilterState, Location, LocationType, TypeFilter, type_dot, use_dataset, with_dataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    List,
    Detail,
}

fn current_viewport() -> Viewport {
    window()
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .map(Viewport::from_width)
        .unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════
//  MAP PAGE: filter bar + Leaflet map + sidebar
// ═══════════════════════════════════════════════════════════════════════

#[component]
pub fn MapPage() -> impl IntoView {
    let data = use_dataset();
    let filter = RwSignal::new(FilterState::new());
    let tab = RwSignal::new(Tab::List);
    let map_error: RwSignal<Option<String>> = RwSignal::new(None);
    let map_ready = RwSignal::new(false);

    let sync = StoredValue::new(MarkerSync::new(current_viewport()));
    let surface: StoredValue<Option<LeafletSurface>, LocalStorage> = StoredValue::new_local(None);

    // Attach the map once the container is in the document.
    Effect::new(move |_| {
        if surface.with_value(Option::is_some) {
            return;
        }
        let on_click = move |id: String| {
            let commands = sync.with_value(|s| {
                s.click(&id, |id| {
                    filter.update(|f| f.select(Some(id)));
                    tab.set(Tab::Detail);
                })
            });
            surface.update_value(|s| {
                if let Some(s) = s.as_mut() {
                    apply_all(&commands, s);
                }
            });
        };
        match LeafletSurface::attach(on_click) {
            Ok(s) => {
                surface.set_value(Some(s));
                map_ready.set(true);
            }
            Err(e) => {
                leptos::logging::warn!("{e}");
                map_error.set(Some(e));
            }
        }
    });

    // Every filter or selection change runs one synchronizer pass.
    Effect::new(move |_| {
        if !map_ready.get() {
            return;
        }
        let Some(Ok(ds)) = data.get() else {
            return;
        };
        let state = filter.get();
        let filtered = state.derive(&ds);
        let commands = sync
            .try_update_value(|s| s.update(&filtered, state.selected(&ds)))
            .unwrap_or_default();
        surface.update_value(|s| {
            if let Some(s) = s.as_mut() {
                apply_all(&commands, s);
            }
        });
    });

    let resize = window_event_listener(ev::resize, move |_| {
        sync.update_value(|s| s.set_viewport(current_viewport()));
    });
    on_cleanup(move || resize.remove());

    view! {
        <div>
            <FilterBar filter=filter/>
            {move || map_error.get().map(|e| view! { <p class="error">{e}</p> })}
            <div class="map-layout">
                <div id=MAP_CONTAINER_ID></div>
                <Sidebar filter=filter tab=tab/>
            </div>
        </div>
    }
}

// ── Filter bar ───────────────────────────────────────────────────────────────

#[component]
fn FilterBar(filter: RwSignal<FilterState>) -> impl IntoView {
    view! {
        <div class="filter-bar">
            <input
                type="text"
                placeholder="搜索地名..."
                prop:value=move || filter.with(|f| f.search_query().to_string())
                on:input=move |ev| {
                    let query = event_target_value(&ev);
                    filter.update(|f| f.set_search(query));
                }
            />
            {TypeFilter::choices()
                .map(|choice| {
                    let active = move || filter.with(|f| f.active_type() == choice);
                    view! {
                        <button
                            class="type-button"
                            class:active=active
                            on:click=move |_| filter.update(|f| f.set_type(choice))
                        >
                            {choice.label_zh()}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

// ── Sidebar ──────────────────────────────────────────────────────────────────

#[component]
fn Sidebar(filter: RwSignal<FilterState>, tab: RwSignal<Tab>) -> impl IntoView {
    let data = use_dataset();
    let tab_button = move |which: Tab, label: &'static str| {
        view! {
            <button class:active=move || tab.get() == which on:click=move |_| tab.set(which)>
                {label}
            </button>
        }
    };

    view! {
        <aside class="sidebar">
            <div class="tabs">
                {tab_button(Tab::List, "地点列表")}
                {tab_button(Tab::Detail, "诗句详情")}
            </div>
            <div class="panel">
                {with_dataset(data, move |ds| {
                    let state = filter.get();
                    match tab.get() {
                        Tab::List => location_list(ds, &state, filter, tab).into_any(),
                        Tab::Detail => match state.selected(ds) {
                            Some(loc) => view! { <LocationDetail location=loc.clone()/> }.into_any(),
                            None => view! {
                                <div class="empty">
                                    <p>"请在地图上选择一个地点"</p>
                                    <p>"或从列表中点击查看"</p>
                                </div>
                            }
                            .into_any(),
                        },
                    }
                })}
            </div>
        </aside>
    }
}

pub fn legend() -> impl IntoView {
    view! {
        <div class="legend">
            {LocationType::ALL
                .into_iter()
                .map(|kind| view! { <div>{type_dot(kind)} {kind.label_zh()}</div> })
                .collect_view()}
        </div>
    }
}

fn location_list(
    ds: &Dataset,
    state: &FilterState,
    filter: RwSignal<FilterState>,
    tab: RwSignal<Tab>,
) -> impl IntoView + use<> {
    let filtered = state.derive(ds);
    let poem_count = distinct_poem_count(filtered.iter().copied());
    let ranked = rank_by_poem_count(filtered.iter().copied());

    view! {
        <div>
            {legend()}
            <p>"共 " <strong>{ranked.len()}</strong> " 个地点，涉及 " <strong>{poem_count}</strong> " 首诗"</p>
            {ranked
                .into_iter()
                .map(|loc| {
                    let id = loc.id.clone();
                    let selected = state.is_selected(loc);
                    let aliases = alias_preview(loc);
                    view! {
                        <button
                            class="location-item"
                            class:selected=selected
                            on:click=move |_| {
                                filter.update(|f| f.select(Some(&id)));
                                tab.set(Tab::Detail);
                            }
                        >
                            {type_dot(loc.kind)}
                            <span>{loc.name.clone()}</span>
                            " "
                            <span class="poem-author">"(" {loc.modern_name.clone()} ")"</span>
                            <span class="count-badge">{loc.poems.len()} "首"</span>
                            {aliases.map(|a| view! { <div class="aliases">"别称：" {a}</div> })}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

/// First three aliases, with an ellipsis when there are more.
fn alias_preview(loc: &Location) -> Option<String> {
    if loc.aliases.is_empty() {
        return None;
    }
    let mut text = loc.aliases.iter().take(3).cloned().collect::<Vec<_>>().join("、");
    if loc.aliases.len() > 3 {
        text.push_str("...");
    }
    Some(text)
}

// ── Detail panel ─────────────────────────────────────────────────────────────

#[component]
pub fn LocationDetail(location: Location) -> impl IntoView {
    let expanded: RwSignal<Option<u32>> = RwSignal::new(None);
    let aliases = (!location.aliases.is_empty()).then(|| location.aliases.join("、"));

    view! {
        <div>
            <h2>{type_dot(location.kind)} {location.display_name()}</h2>
            <p>{location.description.clone()}</p>
            {aliases.map(|a| view! { <p>"诗中别称：" <strong>{a}</strong></p> })}
            <p>"共有 " <strong>{location.poems.len()}</strong> " 首诗提及此地"</p>
            {location
                .poems
                .iter()
                .map(|poem| {
                    let poem_id = poem.poem_id;
                    let lines: Vec<(String, bool)> = highlight_lines(&poem.content, &poem.relevant_lines)
                        .into_iter()
                        .map(|(l, hit)| (l.to_string(), hit))
                        .collect();
                    let relevant = poem.relevant_lines.clone();
                    view! {
                        <div
                            class="poem-card"
                            on:click=move |_| expanded.update(|e| {
                                *e = if *e == Some(poem_id) { None } else { Some(poem_id) }
                            })
                        >
                            <div class="poem-title">"《" {poem.title.clone()} "》"</div>
                            <div class="poem-author">{poem.author.clone()}</div>
                            {relevant
                                .into_iter()
                                .map(|l| view! { <div class="highlighted-line">{l}</div> })
                                .collect_view()}
                            {move || (expanded.get() == Some(poem_id)).then(|| {
                                let lines = lines.clone();
                                view! {
                                    <div class="poem-content">
                                        {lines
                                            .into_iter()
                                            .map(|(line, hit)| view! { <div class=("highlighted-line", hit)>{line}</div> })
                                            .collect_view()}
                                    </div>
                                }
                            })}
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}
