use std::fmt::Write;

use serde::Serialize;

use crate::{Location, PoemRef};

/// Poems listed in a marker popup before the "more" hint replaces the rest.
pub const POPUP_POEM_LIMIT: usize = 3;
/// Lines quoted per poem in a popup.
pub const EXCERPT_LINES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoemExcerpt {
    pub poem_id: u32,
    pub title: String,
    pub author: String,
    pub lines: Vec<String>,
    /// True when `lines` come from the pre-extracted relevant lines.
    pub highlighted: bool,
}

impl PoemExcerpt {
    pub fn from_ref(poem: &PoemRef) -> Self {
        let (lines, highlighted) = if poem.relevant_lines.is_empty() {
            let lines = poem
                .content
                .lines()
                .take(EXCERPT_LINES)
                .map(str::to_string)
                .collect();
            (lines, false)
        } else {
            (poem.relevant_lines.iter().take(EXCERPT_LINES).cloned().collect(), true)
        };
        Self {
            poem_id: poem.poem_id,
            title: poem.title.clone(),
            author: poem.author.clone(),
            lines,
            highlighted,
        }
    }
}

/// Info window payload of one map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupContent {
    pub name: String,
    /// `name（modern_name）`, or just `name` when the modern name is unknown.
    pub heading: String,
    pub modern_name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub poem_count: usize,
    pub excerpts: Vec<PoemExcerpt>,
    /// More poems exist than `excerpts` shows.
    pub truncated: bool,
}

impl PopupContent {
    pub fn for_location(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            heading: location.display_name(),
            modern_name: location.modern_name.clone(),
            description: location.description.clone(),
            aliases: location.aliases.clone(),
            poem_count: location.poems.len(),
            excerpts: location
                .poems
                .iter()
                .take(POPUP_POEM_LIMIT)
                .map(PoemExcerpt::from_ref)
                .collect(),
            truncated: location.poems.len() > POPUP_POEM_LIMIT,
        }
    }

    /// Markup handed to the map widget. All dataset text is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::from(r#"<div class="poem-popup">"#);
        let _ = write!(
            html,
            "<h3>{}</h3><p class=\"popup-description\">{}",
            escape_markup(&self.heading),
            escape_markup(&self.description)
        );
        if !self.aliases.is_empty() {
            let aliases: Vec<String> = self.aliases.iter().map(|a| escape_markup(a)).collect();
            let _ = write!(html, "<br>别称：{}", aliases.join("、"));
        }
        let _ = write!(
            html,
            "</p><div class=\"popup-count\">共有 <strong>{}</strong> 首诗提及此地</div>",
            self.poem_count
        );

        for ex in &self.excerpts {
            let lines: Vec<String> = ex
                .lines
                .iter()
                .map(|l| {
                    if ex.highlighted {
                        format!("<span class=\"highlighted-line\">{}</span>", escape_markup(l))
                    } else {
                        escape_markup(l)
                    }
                })
                .collect();
            let _ = write!(
                html,
                "<div class=\"poem-card\"><div class=\"poem-title\">《{}》</div>\
                 <div class=\"poem-author\">{}</div><div class=\"poem-content\">{}</div></div>",
                escape_markup(&ex.title),
                escape_markup(&ex.author),
                lines.join("<br>")
            );
        }

        if self.truncated {
            html.push_str(r#"<div class="popup-more">点击右侧查看更多...</div>"#);
        }
        html.push_str("</div>");
        html
    }
}

/// Split a poem into lines, flagging those that contain a relevant line or
/// are contained in one.
pub fn highlight_lines<'a>(content: &'a str, relevant: &[String]) -> Vec<(&'a str, bool)> {
    content
        .lines()
        .map(|line| {
            let hit = !line.is_empty()
                && relevant
                    .iter()
                    .any(|r| !r.is_empty() && (line.contains(r.as_str()) || r.contains(line)));
            (line, hit)
        })
        .collect()
}

/// Entity-escape text for HTML or XML markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tests::{loc, poem_ref};
    use crate::LocationType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_excerpt_prefers_relevant_lines() {
        let mut p = poem_ref(1, "王维");
        p.relevant_lines = vec!["渭城朝雨浥轻尘".into(), "客舍青青柳色新".into(), "西出阳关无故人".into()];
        let ex = PoemExcerpt::from_ref(&p);
        assert!(ex.highlighted);
        assert_eq!(ex.lines, vec!["渭城朝雨浥轻尘", "客舍青青柳色新"]);
    }

    #[test]
    fn test_excerpt_falls_back_to_first_two_content_lines() {
        let ex = PoemExcerpt::from_ref(&poem_ref(1, "王维"));
        assert!(!ex.highlighted);
        assert_eq!(ex.lines, vec!["第一句", "第二句"]);
    }

    #[test]
    fn test_popup_lists_at_most_three_poems() {
        let popup = PopupContent::for_location(&loc("changan", "长安", LocationType::City, &[1, 2, 3, 4]));
        assert_eq!(popup.poem_count, 4);
        assert_eq!(popup.excerpts.len(), POPUP_POEM_LIMIT);
        assert!(popup.truncated);
        assert!(popup.to_html().contains("点击右侧查看更多"));

        let popup = PopupContent::for_location(&loc("changan", "长安", LocationType::City, &[1, 2, 3]));
        assert!(!popup.truncated);
        assert!(!popup.to_html().contains("点击右侧查看更多"));
    }

    #[test]
    fn test_popup_html_escapes_dataset_text() {
        let mut l = loc("x", "<b>城</b>", LocationType::City, &[1]);
        l.aliases = vec!["甲&乙".into()];
        let html = PopupContent::for_location(&l).to_html();
        assert!(html.contains("&lt;b&gt;城&lt;/b&gt;"));
        assert!(html.contains("别称：甲&amp;乙"));
        assert!(!html.contains("<b>城"));
    }

    #[test]
    fn test_popup_html_omits_alias_line_when_none() {
        let html = PopupContent::for_location(&loc("x", "城", LocationType::City, &[1])).to_html();
        assert!(!html.contains("别称"));
        assert!(html.contains("共有 <strong>1</strong> 首诗提及此地"));
    }

    #[test]
    fn test_popup_heading_without_modern_name() {
        let mut l = loc("x", "阳关", LocationType::Landmark, &[1]);
        l.modern_name = String::new();
        let html = PopupContent::for_location(&l).to_html();
        assert!(html.contains("<h3>阳关</h3>"));
        assert!(!html.contains("（）"));

        l.modern_name = "敦煌".into();
        assert!(PopupContent::for_location(&l).to_html().contains("<h3>阳关（敦煌）</h3>"));
    }

    #[test]
    fn test_highlight_lines() {
        let content = "故人西辞黄鹤楼\n烟花三月下扬州\n孤帆远影碧空尽";
        let marked = highlight_lines(content, &["故人西辞黄鹤楼".to_string(), "三月".to_string()]);
        assert_eq!(
            marked,
            vec![("故人西辞黄鹤楼", true), ("烟花三月下扬州", true), ("孤帆远影碧空尽", false)]
        );
        assert!(highlight_lines(content, &[]).iter().all(|(_, hit)| !hit));
    }
}
