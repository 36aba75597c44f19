//! Read-only views over a [`Dataset`]: lookups, joins, groupings and rankings.
//!
//! Nothing here fails. A missing id, author or type is an empty result, and a
//! poem pointing at a location that is absent (or has no poems) simply loses
//! that reference.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::{Dataset, Location, LocationType, Poem};

/// How many locations the ranking in [`Stats`] keeps.
pub const TOP_LOCATIONS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Stats<'a> {
    pub total_locations: usize,
    pub total_poems: usize,
    pub by_type: BTreeMap<LocationType, usize>,
    pub top_locations: Vec<&'a Location>,
}

/// Everything the author page shows about one poet.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorProfile<'a> {
    pub author: &'a str,
    pub poems: Vec<&'a Poem>,
    pub poems_with_locations: usize,
    /// Names of the places the author mentions, first mention first.
    pub location_names: Vec<&'a str>,
}

impl Dataset {
    pub fn locations_with_poems(&self) -> impl Iterator<Item = &Location> + '_ {
        self.locations().iter().filter(|l| l.has_poems())
    }

    pub fn location_by_id(&self, id: &str) -> Option<&Location> {
        self.locations().iter().find(|l| l.id == id)
    }

    /// First location whose name or one of whose aliases equals `name`.
    pub fn location_by_name(&self, name: &str) -> Option<&Location> {
        self.locations().iter().find(|l| l.is_named(name))
    }

    pub fn poem_by_id(&self, id: u32) -> Option<&Poem> {
        self.poems().iter().find(|p| p.id == id)
    }

    pub fn poems_by_author<'a>(&'a self, author: &'a str) -> impl Iterator<Item = &'a Poem> + 'a {
        self.poems().iter().filter(move |p| p.author == author)
    }

    pub fn poems_with_locations(&self) -> impl Iterator<Item = &Poem> + '_ {
        self.poems().iter().filter(|p| p.has_locations())
    }

    /// Distinct authors in the order they first appear.
    pub fn authors(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.poems()
            .iter()
            .map(|p| p.author.as_str())
            .filter(|a| seen.insert(*a))
            .collect()
    }

    pub fn stats(&self) -> Stats<'_> {
        let locations: Vec<&Location> = self.locations_with_poems().collect();

        let mut by_type = BTreeMap::new();
        for loc in &locations {
            *by_type.entry(loc.kind).or_insert(0) += 1;
        }

        let total_locations = locations.len();
        let mut top_locations = rank_by_poem_count(locations);
        top_locations.truncate(TOP_LOCATIONS);

        Stats {
            total_locations,
            total_poems: self.poems_with_locations().count(),
            by_type,
            top_locations,
        }
    }

    pub fn group_by_type(&self) -> Vec<(LocationType, Vec<&Location>)> {
        group_by(self.locations_with_poems(), |l| l.kind)
    }

    pub fn group_by_author(&self) -> Vec<(&str, Vec<&Poem>)> {
        group_by(self.poems().iter(), |p| p.author.as_str())
    }

    /// Author groups, largest first; equal sizes keep first-seen order.
    pub fn authors_by_poem_count(&self) -> Vec<(&str, Vec<&Poem>)> {
        let mut groups = self.group_by_author();
        groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        groups
    }

    pub fn locations_of_type(&self, kind: LocationType) -> Vec<&Location> {
        rank_by_poem_count(self.locations_with_poems().filter(|l| l.kind == kind))
    }

    /// The displayable locations a poem mentions, in the poem's order.
    pub fn locations_of_poem(&self, poem: &Poem) -> Vec<&Location> {
        poem.locations
            .iter()
            .filter_map(|id| self.location_by_id(id))
            .filter(|l| l.has_poems())
            .collect()
    }

    pub fn author_profile<'a>(&'a self, author: &'a str) -> Option<AuthorProfile<'a>> {
        let poems: Vec<&Poem> = self.poems_by_author(author).collect();
        if poems.is_empty() {
            return None;
        }

        let mut location_names = Vec::new();
        for poem in &poems {
            for loc in self.locations_of_poem(poem) {
                if !location_names.contains(&loc.name.as_str()) {
                    location_names.push(loc.name.as_str());
                }
            }
        }

        Some(AuthorProfile {
            author,
            poems_with_locations: poems.iter().filter(|p| p.has_locations()).count(),
            poems,
            location_names,
        })
    }

    /// Ids of the poems before and after `id` in dataset order.
    pub fn poem_neighbors(&self, id: u32) -> (Option<u32>, Option<u32>) {
        let poems = self.poems();
        let Some(pos) = poems.iter().position(|p| p.id == id) else {
            return (None, None);
        };
        let prev = pos.checked_sub(1).map(|i| poems[i].id);
        let next = poems.get(pos + 1).map(|p| p.id);
        (prev, next)
    }
}

/// Stable sort by descending poem count.
pub fn rank_by_poem_count<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Vec<&'a Location> {
    let mut ranked: Vec<&Location> = locations.into_iter().collect();
    ranked.sort_by(|a, b| b.poems.len().cmp(&a.poems.len()));
    ranked
}

/// Number of distinct poems referenced by a set of locations.
pub fn distinct_poem_count<'a>(locations: impl IntoIterator<Item = &'a Location>) -> usize {
    locations
        .into_iter()
        .flat_map(|l| l.poems.iter().map(|p| p.poem_id))
        .collect::<HashSet<_>>()
        .len()
}

/// Partition preserving first-seen order of keys and of members.
fn group_by<'a, T, K, F>(items: impl Iterator<Item = &'a T>, key: F) -> Vec<(K, Vec<&'a T>)>
where
    T: 'a,
    K: PartialEq,
    F: Fn(&'a T) -> K,
{
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match groups.iter_mut().find(|(g, _)| *g == k) {
            Some((_, members)) => members.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::PoemRef;
    use pretty_assertions::assert_eq;

    pub(crate) fn poem_ref(poem_id: u32, author: &str) -> PoemRef {
        PoemRef {
            poem_id,
            title: format!("诗{poem_id}"),
            author: author.into(),
            content: "第一句\n第二句\n第三句".into(),
            relevant_lines: Vec::new(),
            keyword: String::new(),
        }
    }

    pub(crate) fn loc(id: &str, name: &str, kind: LocationType, poem_ids: &[u32]) -> Location {
        Location {
            id: id.into(),
            name: name.into(),
            kind,
            aliases: Vec::new(),
            modern_name: String::new(),
            coordinates: vec![110.0, 34.0],
            description: String::new(),
            poems: poem_ids.iter().map(|&i| poem_ref(i, "李白")).collect(),
        }
    }

    pub(crate) fn poem(id: u32, author: &str, locations: &[&str]) -> Poem {
        Poem {
            id,
            title: format!("诗{id}"),
            author: author.into(),
            contents: "第一句\n第二句".into(),
            form: "五言绝句".into(),
            locations: locations.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Small dataset shared by the query, filter and marker tests.
    pub(crate) fn sample() -> Dataset {
        let mut changan = loc("changan", "长安", LocationType::City, &[1, 2, 3]);
        changan.aliases = vec!["京华".into(), "咸阳".into()];
        changan.modern_name = "西安".into();
        changan.coordinates = vec![108.9402, 34.3416];

        let mut luoyang = loc("luoyang", "洛阳", LocationType::City, &[2, 4]);
        luoyang.aliases = vec!["东都".into()];
        luoyang.modern_name = "洛阳".into();

        let taishan = loc("taishan", "泰山", LocationType::Mountain, &[]);
        let huashan = loc("huashan", "华山", LocationType::Mountain, &[4, 5]);
        let mut yangtze = loc("yangtze", "长江", LocationType::River, &[5]);
        yangtze.coordinates = Vec::new();

        Dataset::new(
            vec![changan, luoyang, taishan, huashan, yangtze],
            vec![
                poem(1, "杜甫", &["changan"]),
                poem(2, "李白", &["changan", "luoyang"]),
                poem(3, "杜甫", &["changan", "nowhere"]),
                poem(4, "王维", &["luoyang", "huashan", "taishan"]),
                poem(5, "李白", &["huashan", "yangtze"]),
                poem(6, "孟浩然", &[]),
            ],
        )
    }

    fn ids<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Vec<&'a str> {
        locations.into_iter().map(|l| l.id.as_str()).collect()
    }

    // ── lookups ──────────────────────────────────────────────────────

    #[test]
    fn test_locations_with_poems_drops_empty_and_keeps_order() {
        let ds = sample();
        let with_poems: Vec<&Location> = ds.locations_with_poems().collect();
        assert!(with_poems.iter().all(|l| !l.poems.is_empty()));
        assert_eq!(ids(with_poems), vec!["changan", "luoyang", "huashan", "yangtze"]);
    }

    #[test]
    fn test_location_by_id_and_name() {
        let ds = sample();
        assert_eq!(ds.location_by_id("luoyang").map(|l| l.name.as_str()), Some("洛阳"));
        assert!(ds.location_by_id("nowhere").is_none());
        assert_eq!(ds.location_by_name("京华").map(|l| l.id.as_str()), Some("changan"));
        assert_eq!(ds.location_by_name("长安").map(|l| l.id.as_str()), Some("changan"));
        assert!(ds.location_by_name("京").is_none());
    }

    #[test]
    fn test_location_by_name_first_match_wins() {
        let mut a = loc("a", "甲", LocationType::City, &[1]);
        a.aliases = vec!["同名".into()];
        let b = loc("b", "同名", LocationType::City, &[1]);
        let ds = Dataset::new(vec![a, b], Vec::new());
        assert_eq!(ds.location_by_name("同名").map(|l| l.id.as_str()), Some("a"));
    }

    #[test]
    fn test_poems_by_author_is_exact() {
        let ds = sample();
        let du_fu: Vec<u32> = ds.poems_by_author("杜甫").map(|p| p.id).collect();
        assert_eq!(du_fu, vec![1, 3]);
        assert!(ds.poems_by_author("杜").next().is_none());
        assert!(ds.poems_by_author("杜甫").all(|p| p.author == "杜甫"));
    }

    #[test]
    fn test_poem_by_id() {
        let ds = sample();
        assert_eq!(ds.poem_by_id(4).map(|p| p.author.as_str()), Some("王维"));
        assert!(ds.poem_by_id(319).is_none());
    }

    // ── stats ────────────────────────────────────────────────────────

    #[test]
    fn test_stats_counts() {
        let ds = sample();
        let stats = ds.stats();
        assert_eq!(stats.total_locations, ds.locations_with_poems().count());
        assert_eq!(stats.total_poems, 5);
        assert_eq!(
            stats.by_type,
            BTreeMap::from([
                (LocationType::City, 2),
                (LocationType::Mountain, 1),
                (LocationType::River, 1),
            ])
        );
    }

    #[test]
    fn test_stats_top_locations_stable_on_ties() {
        let ds = sample();
        // luoyang and huashan both have two poems; source order decides.
        assert_eq!(ids(ds.stats().top_locations), vec!["changan", "luoyang", "huashan", "yangtze"]);
    }

    #[test]
    fn test_stats_top_locations_capped_at_ten() {
        let locations: Vec<Location> = (0..15)
            .map(|i| loc(&format!("l{i}"), "地", LocationType::Region, &[1; 3][..(i % 3) + 1]))
            .collect();
        let ds = Dataset::new(locations, Vec::new());
        let top = ds.stats().top_locations;
        assert_eq!(top.len(), TOP_LOCATIONS);
        assert!(top.windows(2).all(|w| w[0].poems.len() >= w[1].poems.len()));
        assert_eq!(ids(top.iter().copied().take(5)), vec!["l2", "l5", "l8", "l11", "l14"]);
    }

    #[test]
    fn test_stats_scenario_excludes_location_without_poems() {
        let ds = Dataset::new(
            vec![
                loc("changan", "长安", LocationType::City, &[1, 2, 3]),
                loc("taishan", "泰山", LocationType::Mountain, &[]),
            ],
            Vec::new(),
        );
        assert_eq!(ids(ds.locations_with_poems()), vec!["changan"]);
        assert_eq!(ds.stats().by_type, BTreeMap::from([(LocationType::City, 1)]));
    }

    #[test]
    fn test_stats_on_empty_dataset() {
        let ds = Dataset::default();
        let stats = ds.stats();
        assert_eq!(stats.total_locations, 0);
        assert_eq!(stats.total_poems, 0);
        assert!(stats.by_type.is_empty());
        assert!(stats.top_locations.is_empty());
    }

    // ── grouping and ranking ─────────────────────────────────────────

    #[test]
    fn test_group_by_type_first_seen_order() {
        let ds = sample();
        let groups: Vec<(LocationType, Vec<&str>)> =
            ds.group_by_type().into_iter().map(|(t, ls)| (t, ids(ls))).collect();
        assert_eq!(
            groups,
            vec![
                (LocationType::City, vec!["changan", "luoyang"]),
                (LocationType::Mountain, vec!["huashan"]),
                (LocationType::River, vec!["yangtze"]),
            ]
        );
    }

    #[test]
    fn test_group_by_author_first_seen_order() {
        let ds = sample();
        let groups: Vec<(&str, Vec<u32>)> = ds
            .group_by_author()
            .into_iter()
            .map(|(a, ps)| (a, ps.iter().map(|p| p.id).collect()))
            .collect();
        assert_eq!(
            groups,
            vec![("杜甫", vec![1, 3]), ("李白", vec![2, 5]), ("王维", vec![4]), ("孟浩然", vec![6])]
        );
    }

    #[test]
    fn test_authors_by_poem_count_is_stable() {
        let ds = sample();
        let order: Vec<&str> = ds.authors_by_poem_count().into_iter().map(|(a, _)| a).collect();
        assert_eq!(order, vec!["杜甫", "李白", "王维", "孟浩然"]);
        assert_eq!(ds.authors(), vec!["杜甫", "李白", "王维", "孟浩然"]);
    }

    #[test]
    fn test_locations_of_type_ranked() {
        let ds = sample();
        assert_eq!(ids(ds.locations_of_type(LocationType::City)), vec!["changan", "luoyang"]);
        assert!(ds.locations_of_type(LocationType::Lake).is_empty());
    }

    #[test]
    fn test_distinct_poem_count() {
        let ds = sample();
        assert_eq!(distinct_poem_count(ds.locations_with_poems()), 5);
        assert_eq!(distinct_poem_count(ds.locations_of_type(LocationType::City)), 4);
        assert_eq!(distinct_poem_count(Vec::<&Location>::new()), 0);
    }

    // ── joins ────────────────────────────────────────────────────────

    #[test]
    fn test_locations_of_poem_drops_dangling_and_empty() {
        let ds = sample();
        let p3 = ds.poem_by_id(3).unwrap();
        assert_eq!(ids(ds.locations_of_poem(p3)), vec!["changan"]);
        let p4 = ds.poem_by_id(4).unwrap();
        assert_eq!(ids(ds.locations_of_poem(p4)), vec!["luoyang", "huashan"]);
    }

    #[test]
    fn test_author_profile() {
        let ds = sample();
        let profile = ds.author_profile("李白").unwrap();
        assert_eq!(profile.poems.len(), 2);
        assert_eq!(profile.poems_with_locations, 2);
        assert_eq!(profile.location_names, vec!["长安", "洛阳", "华山", "长江"]);

        let profile = ds.author_profile("孟浩然").unwrap();
        assert_eq!(profile.poems_with_locations, 0);
        assert!(profile.location_names.is_empty());

        assert!(ds.author_profile("佚名").is_none());
    }

    #[test]
    fn test_poem_neighbors() {
        let ds = sample();
        assert_eq!(ds.poem_neighbors(1), (None, Some(2)));
        assert_eq!(ds.poem_neighbors(4), (Some(3), Some(5)));
        assert_eq!(ds.poem_neighbors(6), (Some(5), None));
        assert_eq!(ds.poem_neighbors(99), (None, None));
    }
}
