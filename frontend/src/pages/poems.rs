use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use crate::types::{Dataset, Poem, type_dot, use_dataset, with_dataset};

/// Location chips shown on a poem card before collapsing into "+N".
const CARD_LOCATIONS: usize = 3;

fn author_href(author: &str) -> String {
    format!("/poems/author/{}", String::from(js_sys::encode_uri_component(author)))
}

/// Route params arrive percent-encoded for non-ASCII author names.
fn decode_param(raw: &str) -> String {
    js_sys::decode_uri_component(raw)
        .map(String::from)
        .unwrap_or_else(|_| raw.to_string())
}

fn poem_card(ds: &Dataset, poem: &Poem) -> impl IntoView + use<> {
    let names: Vec<String> = ds.locations_of_poem(poem).iter().map(|l| l.name.clone()).collect();
    let more = names.len().saturating_sub(CARD_LOCATIONS);
    let title = poem.title.clone();
    let form = poem.form.clone();
    let first_line = poem.first_line().to_string();

    view! {
        <A href=format!("/poems/{}", poem.id)>
            <div class="stat-card">
                <div class="poem-title">"《" {title} "》"</div>
                <div class="poem-author">{form}</div>
                <div class="poem-content">{first_line} "..."</div>
                <div>
                    {names
                        .into_iter()
                        .take(CARD_LOCATIONS)
                        .map(|n| view! { <span class="count-badge">{n}</span> })
                        .collect_view()}
                    {(more > 0).then(|| view! { <span class="poem-author">"+" {more}</span> })}
                </div>
            </div>
        </A>
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  /poems: every poem, grouped by author
// ═══════════════════════════════════════════════════════════════════════

#[component]
pub fn PoemsPage() -> impl IntoView {
    let data = use_dataset();

    view! {
        <div>
            <h2>"诗词列表"</h2>
            {with_dataset(data, |ds| {
                let authors = ds.authors_by_poem_count();
                let with_locations = ds.poems_with_locations().count();
                view! {
                    <div class="stats-grid">
                        <div class="stat-card">
                            <div class="num">{ds.poems().len()}</div>
                            <div class="label">"诗词总数"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{with_locations}</div>
                            <div class="label">"含地名诗词"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{authors.len()}</div>
                            <div class="label">"诗人"</div>
                        </div>
                    </div>
                    {authors
                        .into_iter()
                        .map(|(author, poems)| {
                            let name = author.to_string();
                            view! {
                                <section>
                                    <h3>
                                        <A href=author_href(author)>{name}</A>
                                        " " <span class="poem-author">"(" {poems.len()} "首)"</span>
                                    </h3>
                                    <div class="card-grid">
                                        {poems.into_iter().map(|p| poem_card(ds, p)).collect_view()}
                                    </div>
                                </section>
                            }
                        })
                        .collect_view()}
                }
            })}
        </div>
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  /poems/:id
// ═══════════════════════════════════════════════════════════════════════

#[component]
pub fn PoemPage() -> impl IntoView {
    let data = use_dataset();
    let params = use_params_map();

    view! {
        <div>
            {with_dataset(data, move |ds| {
                let raw = params.with(|p| p.get("id")).unwrap_or_default();
                match raw.parse::<u32>().ok().and_then(|id| ds.poem_by_id(id)) {
                    None => view! { <p class="error">"诗词未找到：" {raw}</p> }.into_any(),
                    Some(poem) => poem_detail(ds, poem).into_any(),
                }
            })}
        </div>
    }
}

fn poem_detail(ds: &Dataset, poem: &Poem) -> impl IntoView + use<> {
    let (prev, next) = ds.poem_neighbors(poem.id);
    let author = poem.author.clone();
    let author_link = author_href(&author);
    let places: Vec<_> = ds
        .locations_of_poem(poem)
        .into_iter()
        .map(|l| (l.id.clone(), l.name.clone(), l.modern_name.clone(), l.description.clone(), l.kind))
        .collect();

    view! {
        <nav class="poem-author">
            <A href="/">"首页"</A> " / " <A href="/poems">"诗词"</A> " / " {poem.title.clone()}
        </nav>
        <article class="poem-card">
            <h2 class="poem-title">"《" {poem.title.clone()} "》"</h2>
            <div class="poem-author">
                <A href=author_link>{author}</A> " · " {poem.form.clone()}
            </div>
            <div class="poem-content">
                {poem.contents.split('\n').map(|l| view! { <div>{l.to_string()}</div> }).collect_view()}
            </div>
        </article>

        {(!places.is_empty()).then(|| view! {
            <section>
                <h3>"诗中地名"</h3>
                <div class="card-grid">
                    {places
                        .into_iter()
                        .map(|(id, name, modern_name, description, kind)| view! {
                            <A href=format!("/locations/{id}")>
                                <div class="stat-card">
                                    <div>{type_dot(kind)} <strong>{name}</strong></div>
                                    <div class="poem-author">{modern_name}</div>
                                    <div class="poem-author">{description}</div>
                                </div>
                            </A>
                        })
                        .collect_view()}
                </div>
            </section>
        })}

        <div class="pager">
            {prev.map(|id| view! { <A href=format!("/poems/{id}")>"← 上一首"</A> })}
            <span></span>
            {next.map(|id| view! { <A href=format!("/poems/{id}")>"下一首 →"</A> })}
        </div>
        <p><A href="/poems">"返回诗词列表"</A></p>
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  /poems/author/:author
// ═══════════════════════════════════════════════════════════════════════

#[component]
pub fn AuthorPage() -> impl IntoView {
    let data = use_dataset();
    let params = use_params_map();

    view! {
        <div>
            {with_dataset(data, move |ds| {
                let author = decode_param(&params.with(|p| p.get("author")).unwrap_or_default());
                let Some(profile) = ds.author_profile(&author) else {
                    return view! { <p class="error">"诗人未找到：" {author.clone()}</p> }.into_any();
                };
                let places: Vec<String> = profile.location_names.iter().take(10).map(|n| n.to_string()).collect();
                view! {
                    <nav class="poem-author">
                        <A href="/">"首页"</A> " / " <A href="/poems">"诗词"</A> " / " {author.clone()}
                    </nav>
                    <h2>{author.clone()}</h2>
                    <div class="stats-grid">
                        <div class="stat-card">
                            <div class="num">{profile.poems.len()}</div>
                            <div class="label">"收录诗词"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{profile.poems_with_locations}</div>
                            <div class="label">"含地名诗词"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{profile.location_names.len()}</div>
                            <div class="label">"涉及地点"</div>
                        </div>
                    </div>
                    {(!places.is_empty()).then(|| view! {
                        <p>"诗中地点：" {places.join("、")}</p>
                    })}
                    <div class="card-grid">
                        {profile.poems.iter().map(|p| poem_card(ds, p)).collect_view()}
                    </div>
                }
                .into_any()
            })}
        </div>
    }
}
