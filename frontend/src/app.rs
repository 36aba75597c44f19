use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::{
    components::{A, Route, Router, Routes},
    path,
};

use crate::pages::{
    about::AboutPage,
    locations::{LocationPage, LocationTypePage, LocationsPage},
    map::MapPage,
    poems::{AuthorPage, PoemPage, PoemsPage},
};
use crate::types::{DatasetSignal, fetch_dataset};

#[component]
pub fn App() -> impl IntoView {
    // Fetched once, shared by every page.
    let data: DatasetSignal = RwSignal::new(None);
    spawn_local(async move {
        let loaded = fetch_dataset().await.map(Arc::new);
        if let Err(e) = &loaded {
            leptos::logging::warn!("dataset unavailable: {e}");
        }
        data.set(Some(loaded));
    });
    provide_context(data);

    view! {
        <Router>
            <div id="app">
                <header>
                    <h1><A href="/">"唐诗三百首 · 地名地图"</A></h1>
                    <nav>
                        <A href="/">"地图"</A>
                        <A href="/locations">"地点"</A>
                        <A href="/poems">"诗词"</A>
                        <A href="/about">"关于"</A>
                    </nav>
                </header>
                <main>
                    <Routes fallback=|| {
                        view! { <p class="error">"页面未找到"</p> }
                    }>
                        <Route path=path!("/") view=MapPage/>
                        <Route path=path!("/about") view=AboutPage/>
                        <Route path=path!("/locations") view=LocationsPage/>
                        <Route path=path!("/locations/type/:kind") view=LocationTypePage/>
                        <Route path=path!("/locations/:id") view=LocationPage/>
                        <Route path=path!("/poems") view=PoemsPage/>
                        <Route path=path!("/poems/author/:author") view=AuthorPage/>
                        <Route path=path!("/poems/:id") view=PoemPage/>
                    </Routes>
                </main>
                <footer>
                    <p>"唐诗三百首地名地图 · 诗词数据来自 chinese-poetry"</p>
                </footer>
            </div>
        </Router>
    }
}
