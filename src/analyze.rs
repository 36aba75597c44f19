//! Offline place-name analysis: link raw poems to a base gazetteer.
//!
//! Every location contributes its name and aliases as keywords. A poem
//! mentions a location when one of its keywords occurs in the title or the
//! text; the lines containing the keyword become the reference's
//! `relevant_lines`.

use std::collections::HashMap;

use poem_atlas::{Dataset, Location, Poem, PoemRef};
use regex::RegexSet;

/// Single characters such as 燕 or 岱 are too ambiguous to match on their own.
const MIN_KEYWORD_CHARS: usize = 2;

// ── Keyword table ────────────────────────────────────────────────────

pub struct Gazetteer {
    /// One escaped pattern per entry of `keywords`, same order.
    set: RegexSet,
    /// `(keyword, index into the location list)`. First owner wins.
    keywords: Vec<(String, usize)>,
}

impl Gazetteer {
    pub fn new(locations: &[Location]) -> Result<Self, regex::Error> {
        let mut owners: HashMap<&str, usize> = HashMap::new();
        let mut keywords: Vec<(String, usize)> = Vec::new();
        for (idx, loc) in locations.iter().enumerate() {
            for keyword in std::iter::once(&loc.name).chain(&loc.aliases) {
                if keyword.chars().count() < MIN_KEYWORD_CHARS {
                    continue;
                }
                if let Some(&first) = owners.get(keyword.as_str()) {
                    if first != idx {
                        tracing::debug!(%keyword, kept = %locations[first].id, dropped = %loc.id, "shared keyword");
                    }
                    continue;
                }
                owners.insert(keyword.as_str(), idx);
                keywords.push((keyword.clone(), idx));
            }
        }

        let set = RegexSet::new(keywords.iter().map(|(k, _)| regex::escape(k)))?;
        Ok(Self { set, keywords })
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// `(keyword, location index)` for every keyword occurring in `text`,
    /// overlapping ones included. Ordered by first occurrence; at the same
    /// position the longer keyword comes first (洞庭湖 before 洞庭).
    fn find(&self, text: &str) -> Vec<(&str, usize)> {
        let mut found: Vec<(usize, &str, usize)> = self
            .set
            .matches(text)
            .into_iter()
            .filter_map(|i| {
                let (keyword, idx) = &self.keywords[i];
                text.find(keyword.as_str()).map(|pos| (pos, keyword.as_str(), *idx))
            })
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())));
        found.into_iter().map(|(_, keyword, idx)| (keyword, idx)).collect()
    }
}

// ── Analysis ─────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub poems: usize,
    pub poems_with_locations: usize,
    pub locations_mentioned: usize,
}

/// Rebuild both sides of the poem/location links from scratch.
///
/// Existing `poems` on the base locations and `locations` on the poems are
/// discarded.
pub fn analyze(
    mut locations: Vec<Location>,
    mut poems: Vec<Poem>,
) -> Result<(Dataset, AnalysisSummary), regex::Error> {
    let gazetteer = Gazetteer::new(&locations)?;
    tracing::info!(
        locations = locations.len(),
        keywords = gazetteer.keyword_count(),
        "gazetteer built"
    );
    for loc in &mut locations {
        loc.poems.clear();
    }

    for poem in &mut poems {
        poem.locations.clear();
        let mut hits = gazetteer.find(&poem.title);
        for hit in gazetteer.find(&poem.contents) {
            if !hits.iter().any(|(k, _)| *k == hit.0) {
                hits.push(hit);
            }
        }

        for (keyword, idx) in hits {
            let lines: Vec<String> = poem
                .contents
                .split('\n')
                .filter(|line| line.contains(keyword))
                .map(str::to_string)
                .collect();
            let loc = &mut locations[idx];

            match loc.poems.iter().position(|r| r.poem_id == poem.id) {
                Some(i) => {
                    let existing = &mut loc.poems[i];
                    for line in lines {
                        if !existing.relevant_lines.contains(&line) {
                            existing.relevant_lines.push(line);
                        }
                    }
                }
                None => loc.poems.push(PoemRef {
                    poem_id: poem.id,
                    title: poem.title.clone(),
                    author: poem.author.clone(),
                    content: poem.contents.clone(),
                    relevant_lines: lines,
                    keyword: keyword.to_string(),
                }),
            }
            if !poem.locations.contains(&loc.id) {
                poem.locations.push(loc.id.clone());
            }
        }
    }

    let summary = AnalysisSummary {
        poems: poems.len(),
        poems_with_locations: poems.iter().filter(|p| p.has_locations()).count(),
        locations_mentioned: locations.iter().filter(|l| l.has_poems()).count(),
    };
    tracing::info!(?summary, "analysis finished");
    Ok((Dataset::new(locations, poems), summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use poem_atlas::LocationType;

    fn base(id: &str, name: &str, kind: LocationType, aliases: &[&str]) -> Location {
        Location {
            id: id.into(),
            name: name.into(),
            kind,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            modern_name: String::new(),
            coordinates: vec![],
            description: String::new(),
            poems: vec![],
        }
    }

    fn raw(id: u32, title: &str, author: &str, contents: &str) -> Poem {
        Poem {
            id,
            title: title.into(),
            author: author.into(),
            contents: contents.into(),
            form: String::new(),
            locations: vec![],
        }
    }

    fn gazetteer() -> Vec<Location> {
        vec![
            base("changan", "长安", LocationType::City, &["京华", "咸阳"]),
            base("taishan", "泰山", LocationType::Mountain, &["岱宗", "岱"]),
            base("dongting", "洞庭湖", LocationType::Lake, &["洞庭"]),
            base("huanghelou", "黄鹤楼", LocationType::Landmark, &[]),
        ]
    }

    // ── keyword matching ──

    #[test]
    fn test_single_char_aliases_are_skipped() {
        let g = Gazetteer::new(&gazetteer()).unwrap();
        assert_eq!(g.keyword_count(), 8);
        assert_eq!(g.find("岱色苍苍"), vec![]);
    }

    #[test]
    fn test_longer_keyword_first_at_same_position() {
        let g = Gazetteer::new(&gazetteer()).unwrap();
        assert_eq!(g.find("洞庭湖上月"), vec![("洞庭湖", 2), ("洞庭", 2)]);
        assert_eq!(g.find("遥望洞庭山水翠"), vec![("洞庭", 2)]);
    }

    #[test]
    fn test_overlapping_keywords_of_different_locations() {
        let locations = vec![
            base("yangtze", "长江", LocationType::River, &[]),
            base("jiangnan", "江南", LocationType::Region, &[]),
        ];
        let g = Gazetteer::new(&locations).unwrap();
        assert_eq!(g.find("长江南去水悠悠"), vec![("长江", 0), ("江南", 1)]);

        let (dataset, _) = analyze(locations, vec![raw(7, "送别", "佚名", "长江南去水悠悠")]).unwrap();
        assert_eq!(dataset.poem_by_id(7).unwrap().locations, vec!["yangtze", "jiangnan"]);
        assert_eq!(dataset.location_by_id("jiangnan").unwrap().poems[0].relevant_lines, vec!["长江南去水悠悠"]);
    }

    #[test]
    fn test_empty_gazetteer_matches_nothing() {
        let g = Gazetteer::new(&[]).unwrap();
        assert_eq!(g.find("长安"), vec![]);
    }

    // ── analysis ──

    #[test]
    fn test_links_both_sides() {
        let poems = vec![
            raw(1, "望岳", "杜甫", "岱宗夫如何\n齐鲁青未了"),
            raw(2, "长安道", "储光羲", "鸣鞭过酒肆\n京华游侠窟\n长安大道连狭斜"),
            raw(3, "登高", "杜甫", "风急天高猿啸哀"),
        ];
        let (dataset, summary) = analyze(gazetteer(), poems).unwrap();

        assert_eq!(
            summary,
            AnalysisSummary {
                poems: 3,
                poems_with_locations: 2,
                locations_mentioned: 2,
            }
        );
        let taishan = dataset.location_by_id("taishan").unwrap();
        assert_eq!(taishan.poems[0].keyword, "岱宗");
        assert_eq!(taishan.poems[0].relevant_lines, vec!["岱宗夫如何"]);

        // title match first, then every line of every matched alias
        let changan = dataset.location_by_id("changan").unwrap();
        assert_eq!(changan.poems.len(), 1);
        assert_eq!(changan.poems[0].keyword, "长安");
        assert_eq!(changan.poems[0].relevant_lines, vec!["长安大道连狭斜", "京华游侠窟"]);

        assert_eq!(dataset.poem_by_id(2).unwrap().locations, vec!["changan"]);
        assert!(dataset.poem_by_id(3).unwrap().locations.is_empty());
    }

    #[test]
    fn test_title_only_mention_has_no_relevant_lines() {
        let (dataset, summary) = analyze(gazetteer(), vec![raw(4, "黄鹤楼送别", "李白", "故人西辞去\n烟花三月天")]).unwrap();
        assert_eq!(summary.poems_with_locations, 1);

        let tower = dataset.location_by_id("huanghelou").unwrap();
        assert_eq!(tower.poems[0].keyword, "黄鹤楼");
        assert!(tower.poems[0].relevant_lines.is_empty());
        assert_eq!(dataset.poem_by_id(4).unwrap().locations, vec!["huanghelou"]);
    }

    #[test]
    fn test_existing_links_are_replaced() {
        let mut locations = gazetteer();
        locations[3].poems.push(PoemRef {
            poem_id: 99,
            title: "旧".into(),
            author: "佚名".into(),
            content: String::new(),
            relevant_lines: vec![],
            keyword: String::new(),
        });
        let mut poem = raw(5, "黄鹤楼", "崔颢", "昔人已乘黄鹤去\n此地空余黄鹤楼");
        poem.locations = vec!["changan".into()];

        let (dataset, _) = analyze(locations, vec![poem]).unwrap();
        let tower = dataset.location_by_id("huanghelou").unwrap();
        assert_eq!(tower.poems.len(), 1);
        assert_eq!(tower.poems[0].poem_id, 5);
        assert_eq!(tower.poems[0].relevant_lines, vec!["此地空余黄鹤楼"]);
        assert_eq!(dataset.poem_by_id(5).unwrap().locations, vec!["huanghelou"]);
    }
}
