use anekdex::config::IndexSettings;
use anekdex::models::{document, SearchParams};
use anekdex::SearchIndex;

fn index_fixture() -> SearchIndex {
    let mut index = SearchIndex::new(IndexSettings::default());
    let jokes = [
        "Иваныч приходит в бар",
        "Бармен говорит Иванычу: тебе как обычно?",
        "Штирлиц шёл по лесу и увидел бар",
        "Колобок повесился",
    ];
    for joke in jokes {
        index.insert(document("joke", joke)).unwrap();
    }
    index
}

fn ids(index: &SearchIndex, params: &SearchParams) -> Vec<String> {
    let results = index.search(params).unwrap();
    let mut ids: Vec<String> = results.ids().into_iter().map(str::to_string).collect();
    ids.sort_unstable();
    ids
}

#[test]
fn golden_single_record_single_hit() {
    let mut index = SearchIndex::new(IndexSettings::default());
    index.insert(document("joke", "Иваныч приходит в бар")).unwrap();

    let results = index
        .search(&SearchParams::new("Иваныч").with_properties(["joke"]))
        .unwrap();

    assert_eq!(results.count, 1);
    assert_eq!(results.hits.len(), 1);
    assert_eq!(results.hits[0].id, "1");
    assert_eq!(results.hits[0].document["joke"], "Иваныч приходит в бар");
}

#[test]
fn golden_prefix_matches_longer_words() {
    let index = index_fixture();

    // "бар" is a prefix of "бармен"
    let prefix = ids(&index, &SearchParams::new("бар").with_properties(["joke"]));
    assert_eq!(prefix, vec!["1", "2", "3"]);

    let exact = ids(&index, &SearchParams::new("бар").with_properties(["joke"]).exact(true));
    assert_eq!(exact, vec!["1", "3"]);
}

#[test]
fn golden_results_are_ranked_and_paged() {
    let index = index_fixture();
    let params = SearchParams::new("бар").with_properties(["joke"]);

    let all = index.search(&params).unwrap();
    assert_eq!(all.count, 3);
    for pair in all.hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let page = index.search(&params.clone().with_offset(1).with_limit(1)).unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.hits.len(), 1);
    assert_eq!(page.hits[0].id, all.hits[1].id);
}

#[test]
fn golden_no_match_and_stopword_only_queries() {
    let index = index_fixture();

    let none = index.search(&SearchParams::new("Чапаев")).unwrap();
    assert_eq!(none.count, 0);
    assert!(none.hits.is_empty());

    // "и" is a Russian stop word and produces no query tokens
    let stop = index.search(&SearchParams::new("и")).unwrap();
    assert_eq!(stop.count, 0);
}

#[test]
fn golden_unknown_property_is_rejected() {
    let index = index_fixture();
    assert!(index
        .search(&SearchParams::new("бар").with_properties(["title"]))
        .is_err());
}
