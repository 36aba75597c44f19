use leptos::prelude::*;
use leptos_router::components::A;

use crate::types::{LocationType, type_dot, use_dataset, with_dataset};

/// Locations whose alias lists are shown as examples of name matching.
const ALIAS_EXAMPLES: [&str; 4] = ["changan", "taishan", "dongting", "xiongnu"];

#[component]
pub fn AboutPage() -> impl IntoView {
    let data = use_dataset();

    view! {
        <div>
            <h2>"关于本项目"</h2>
            <p>
                "本站整理《唐诗三百首》中出现的地名，将城市、山川、河流、湖泊、名胜与唐代疆域以外的地区标注在地图上，"
                "并列出每个地点相关的诗句。"
            </p>

            <h3>"数据统计"</h3>
            {with_dataset(data, |ds| {
                let stats = ds.stats();
                view! {
                    <div class="stats-grid">
                        <div class="stat-card">
                            <div class="num">{ds.poems().len()}</div>
                            <div class="label">"诗词总数"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{stats.total_locations}</div>
                            <div class="label">"地点总数"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{ds.poems_with_locations().count()}</div>
                            <div class="label">"含地名诗词"</div>
                        </div>
                        <div class="stat-card">
                            <div class="num">{LocationType::ALL.len()}</div>
                            <div class="label">"地点类型"</div>
                        </div>
                    </div>

                    <h3>"别名识别"</h3>
                    <ul>
                        {ALIAS_EXAMPLES
                            .into_iter()
                            .filter_map(|id| ds.location_by_id(id))
                            .filter(|l| !l.aliases.is_empty())
                            .map(|l| view! { <li><strong>{l.name.clone()}</strong> "：" {l.aliases.join("、")}</li> })
                            .collect_view()}
                    </ul>
                }
            })}

            <h3>"地名类型"</h3>
            <ul>
                {LocationType::ALL
                    .into_iter()
                    .map(|kind| view! {
                        <li>
                            {type_dot(kind)}
                            <A href=format!("/locations/type/{kind}")>{kind.label_zh()}</A>
                            "：" {kind.description_zh()}
                        </li>
                    })
                    .collect_view()}
            </ul>

            <h3>"致谢"</h3>
            <p>"诗词数据来源：chinese-poetry；地图服务：CARTO，OpenStreetMap。"</p>
        </div>
    }
}
