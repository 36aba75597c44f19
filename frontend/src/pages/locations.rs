use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;
use poem_atlas::query::TOP_LOCATIONS;

use crate::types::{Location, LocationType, type_dot, use_dataset, with_dataset};

fn location_href(loc: &Location) -> String {
    format!("/locations/{}", loc.id)
}

fn aliases_short(loc: &Location) -> String {
    loc.aliases.iter().take(3).cloned().collect::<Vec<_>>().join("、")
}

fn location_card(loc: &Location) -> impl IntoView + use<> {
    let aliases = (!loc.aliases.is_empty()).then(|| aliases_short(loc));
    let name = loc.name.clone();
    let modern_name = loc.modern_name.clone();
    let count = loc.poems.len();
    view! {
        <A href=location_href(loc)>
            <div class="stat-card">
                <div>
                    <strong>{name}</strong>
                    <span class="count-badge">{count} "首"</span>
                </div>
                <div class="poem-author">{modern_name}</div>
                {aliases.map(|a| view! { <div class="aliases">"别称：" {a}</div> })}
            </div>
        </A>
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  /locations: stats, legend, top list, all locations by type
// ═══════════════════════════════════════════════════════════════════════

#[component]
pub fn LocationsPage() -> impl IntoView {
    let data = use_dataset();

    view! {
        <div>
            <h2>"地点列表"</h2>
            {with_dataset(data, |ds| {
                let stats = ds.stats();
                let most_cited = stats.top_locations.first().map_or(0, |l| l.poems.len());
                view! {
                    <div class="stats-grid">
                        <div class="stat-card">
                            <div class="num">{stats.total_locations}</div>
                            <div class="label">"地点总数"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{stats.total_poems}</div>
                            <div class="label">"相关诗词"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{stats.by_type.len()}</div>
                            <div class="label">"地点类型"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{most_cited}</div>
                            <div class="label">"最多引用"</div>
                        </div>
                    </div>

                    <div class="filter-bar">
                        {LocationType::ALL
                            .into_iter()
                            .map(|kind| {
                                let count = stats.by_type.get(&kind).copied().unwrap_or(0);
                                view! {
                                    <A href=format!("/locations/type/{kind}")>
                                        {type_dot(kind)} {kind.label_zh()} " (" {count} ")"
                                    </A>
                                }
                            })
                            .collect_view()}
                    </div>
                    <p class="empty">"注：「域外」指唐代疆域以外的地区，此分类依据唐代疆域划分，与现代中国领土无关。"</p>

                    <h3>"引用最多的地点（前 " {TOP_LOCATIONS} "）"</h3>
                    <ol>
                        {stats
                            .top_locations
                            .iter()
                            .map(|loc| {
                                let name = loc.name.clone();
                                view! {
                                <li>
                                    {type_dot(loc.kind)}
                                    <A href=location_href(loc)>{name}</A>
                                    " " <span class="poem-author">{loc.modern_name.clone()} " · " {aliases_short(loc)}</span>
                                    <span class="count-badge">{loc.poems.len()} "首"</span>
                                </li>
                                }
                            })
                            .collect_view()}
                    </ol>

                    {ds.group_by_type()
                        .into_iter()
                        .map(|(kind, locs)| view! {
                            <section>
                                <h3>{type_dot(kind)} {kind.label_zh()} " (" {locs.len()} ")"</h3>
                                <div class="card-grid">
                                    {poem_atlas::query::rank_by_poem_count(locs)
                                        .into_iter()
                                        .map(location_card)
                                        .collect_view()}
                                </div>
                            </section>
                        })
                        .collect_view()}
                }
            })}
        </div>
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  /locations/type/:kind
// ═══════════════════════════════════════════════════════════════════════

#[component]
pub fn LocationTypePage() -> impl IntoView {
    let data = use_dataset();
    let params = use_params_map();

    view! {
        <div>
            {with_dataset(data, move |ds| {
                let raw = params.with(|p| p.get("kind")).unwrap_or_default();
                let Ok(kind) = raw.parse::<LocationType>() else {
                    return view! { <p class="error">"未知地点类型「" {raw} "」"</p> }.into_any();
                };
                let locs = ds.locations_of_type(kind);
                view! {
                    <nav class="poem-author">
                        <A href="/">"首页"</A> " / " <A href="/locations">"地点"</A> " / " {kind.label_zh()}
                    </nav>
                    <h2>{type_dot(kind)} {kind.label_zh()}</h2>
                    <p>{kind.description_zh()}</p>
                    <p>"共 " <strong>{locs.len()}</strong> " 个地点"</p>
                    <div class="card-grid">{locs.into_iter().map(location_card).collect_view()}</div>
                }
                .into_any()
            })}
        </div>
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  /locations/:id
// ═══════════════════════════════════════════════════════════════════════

#[component]
pub fn LocationPage() -> impl IntoView {
    let data = use_dataset();
    let params = use_params_map();

    view! {
        <div>
            {with_dataset(data, move |ds| {
                let id = params.with(|p| p.get("id")).unwrap_or_default();
                match ds.location_by_id(&id).filter(|l| l.has_poems()) {
                    None => view! { <p class="error">"地点未找到：" {id}</p> }.into_any(),
                    Some(loc) => location_detail(loc).into_any(),
                }
            })}
        </div>
    }
}

fn location_detail(loc: &Location) -> impl IntoView + use<> {
    let aliases = (!loc.aliases.is_empty()).then(|| loc.aliases.join("、"));
    let kind = loc.kind;
    let coords = loc
        .lon_lat()
        .map(|(lon, lat)| format!("坐标：{lon}, {lat}"))
        .unwrap_or_else(|| "坐标未知".to_string());

    view! {
        <nav class="poem-author">
            <A href="/">"首页"</A> " / " <A href="/locations">"地点"</A> " / " {loc.name.clone()}
        </nav>
        <h2>{loc.name.clone()}</h2>
        <div class="poem-author">{loc.modern_name.clone()}</div>
        <A href=format!("/locations/type/{kind}")>{type_dot(kind)} {kind.label_zh()}</A>
        <p>{loc.description.clone()}</p>
        {aliases.map(|a| view! { <p>"诗中别称：" <strong>{a}</strong></p> })}
        <p class="poem-author">{coords} " • 共 " <strong>{loc.poems.len()}</strong> " 首诗提及"</p>

        <h3>"相关诗词"</h3>
        {loc.poems
            .iter()
            .map(|poem| {
                let relevant = poem.relevant_lines.clone();
                let title = poem.title.clone();
                view! {
                    <article class="poem-card">
                        <A href=format!("/poems/{}", poem.poem_id)>
                            <span class="poem-title">"《" {title} "》"</span>
                        </A>
                        " " <span class="poem-author">{poem.author.clone()}</span>
                        {(!relevant.is_empty()).then(|| view! {
                            <div>
                                <div class="poem-author">"相关诗句："</div>
                                {relevant.into_iter().map(|l| view! { <div class="highlighted-line">{l}</div> }).collect_view()}
                            </div>
                        })}
                        <div class="poem-content">{poem.content.clone()}</div>
                    </article>
                }
            })
            .collect_view()}
        <p><A href="/locations">"返回地点列表"</A></p>
    }
}
