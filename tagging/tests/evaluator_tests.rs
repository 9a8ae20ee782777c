use tagging::evaluator::{evaluate_global, evaluate_local, ItemTags};
use tagging::filter::{Filter, GroupFilter};
use tagging::tagset::TagSet;
use tagging::vocabulary::{TagEntry, Vocabulary};

fn trains() -> Vocabulary {
    Vocabulary::from_entries([
        TagEntry::new("metro"),
        TagEntry::new("class 555").implying(["metro"]),
        TagEntry::new("555012").implying(["class 555"]),
        TagEntry::new("class 599").implying(["metro"]),
        TagEntry::new("4040").implying(["class 599"]),
        TagEntry::new("stopped"),
        TagEntry::new("terminated").implying(["stopped"]),
    ])
}

fn context() -> Vocabulary {
    Vocabulary::from_entries([
        TagEntry::new("metro station"),
        TagEntry::new("MMT").implying(["metro station"]),
        TagEntry::new("daytime"),
    ])
}

fn group(or: bool, local: bool, filters: Vec<Filter>) -> Filter {
    Filter::Group(GroupFilter {
        or,
        invert: false,
        local,
        filters,
    })
}

#[test]
fn empty_and_group_is_true_and_empty_or_group_is_false() {
    let v = Vocabulary::default();
    let global = TagSet::new(&v);
    let locals: Vec<TagSet> = vec![];
    assert!(evaluate_global(&group(false, false, vec![]), &global, &locals));
    assert!(!evaluate_global(&group(true, false, vec![]), &global, &locals));
    assert!(evaluate_global(&group(false, true, vec![]), &global, &locals));
    assert!(!evaluate_global(&group(true, true, vec![]), &global, &locals));
}

#[test]
fn blank_tag_is_a_wildcard_in_global_scope() {
    let v = Vocabulary::default();
    let global = TagSet::new(&v);
    assert!(evaluate_global(&Filter::tag(""), &global, &[]));
    assert!(evaluate_global(&Filter::tag("   "), &global, &[]));
    assert!(evaluate_global(&Filter::default(), &global, &[]));
}

#[test]
fn local_group_children_are_satisfied_independently() {
    let v = Vocabulary::default();
    let global = TagSet::new(&v);
    let locals = vec![TagSet::from_stored(&v, ["a"]), TagSet::from_stored(&v, ["b"])];

    let split = group(false, true, vec![Filter::tag("a"), Filter::tag("b")]);
    assert!(evaluate_global(&split, &global, &locals));

    // forcing both onto the same train needs a nested AND group
    let same_train = group(
        false,
        true,
        vec![group(false, false, vec![Filter::tag("a"), Filter::tag("b")])],
    );
    assert!(!evaluate_global(&same_train, &global, &locals));
}

#[test]
fn local_group_needs_at_least_one_train() {
    let v = trains();
    let global = TagSet::new(&v);
    let filter = Filter::tag("metro").local();
    assert!(!evaluate_global(&filter, &global, &[]));
}

#[test]
fn global_leaves_do_not_see_train_tags() {
    let cv = context();
    let tv = trains();
    let item = ItemTags::from_stored(&cv, &tv, ["MMT"], vec![vec!["555012"]]);
    assert!(item.matches(&Filter::tag("metro station")));
    assert!(!item.matches(&Filter::tag("class 555")));
    assert!(item.matches(&Filter::tag("class 555").local()));
}

#[test]
fn nested_local_flag_is_ignored_inside_local_scope() {
    let v = trains();
    let set = TagSet::from_stored(&v, ["4040", "terminated"]);
    let inner = group(false, true, vec![Filter::tag("class 599"), Filter::tag("stopped")]);
    assert!(evaluate_local(&inner, &set));
    assert!(evaluate_local(&group(false, true, vec![]), &set));
    assert!(!evaluate_local(&group(true, true, vec![]), &set));
}

#[test]
fn or_and_and_groups_combine_children() {
    let cv = context();
    let tv = trains();
    let item = ItemTags::from_stored(
        &cv,
        &tv,
        ["MMT", "daytime"],
        vec![vec!["555012", "terminated"], vec!["4040"]],
    );

    // daytime AND (some train is a 599) AND (some train stopped)
    let filter = Filter::all([
        Filter::tag("daytime"),
        Filter::any([Filter::tag("class 599"), Filter::tag("national rail")]).local(),
        Filter::tag("stopped").local(),
    ]);
    assert!(item.matches(&filter));

    let nighttime = Filter::all([Filter::tag("nighttime"), Filter::tag("metro").local()]);
    assert!(!item.matches(&nighttime));

    let either = Filter::any([Filter::tag("nighttime"), Filter::tag("metro").local()]);
    assert!(item.matches(&either));
}

#[test]
fn unknown_filter_tags_fall_back_to_plain_equality() {
    let cv = context();
    let tv = trains();
    let item = ItemTags::from_stored(&cv, &tv, ["my own tag"], Vec::<Vec<String>>::new());
    assert!(item.matches(&Filter::tag("my own tag")));
    assert!(!item.matches(&Filter::tag("metro station")));
}

// Known gap: `invert` is carried on every node but evaluation does not
// apply it yet. This pins the current behaviour until negation semantics
// are settled.
#[test]
fn invert_flag_is_not_applied_yet() {
    let cv = context();
    let tv = trains();
    let item = ItemTags::from_stored(&cv, &tv, ["daytime"], Vec::<Vec<String>>::new());
    assert!(item.matches(&Filter::tag("daytime").inverted()));
    assert!(!item.matches(&Filter::tag("nighttime").inverted()));
    assert!(item.matches(&Filter::all([Filter::tag("daytime")]).inverted()));
}

#[test]
fn evaluates_filters_received_as_json() {
    let cv = context();
    let tv = trains();
    let item = ItemTags::from_stored(&cv, &tv, ["MMT"], vec![vec!["555012"]]);
    let json = r#"{
        "group": true, "invert": false, "local": false, "or": false,
        "filters": [
            {"group": false, "invert": false, "tag": "metro station"},
            {"group": true, "invert": false, "local": true, "or": true,
             "filters": [{"group": false, "invert": false, "tag": "class 555"}]}
        ]
    }"#;
    assert!(tagging::evaluate_filter_json(json, &item).unwrap());
}

struct Photo {
    context: Vec<String>,
    trains: Vec<Vec<String>>,
}

impl tagging::Tagged for Photo {
    fn context_tags(&self) -> &[String] {
        &self.context
    }

    fn train_tags(&self) -> &[Vec<String>] {
        &self.trains
    }
}

#[test]
fn tagged_items_use_the_vocabulary_of_each_scope() {
    let cv = context();
    let tv = trains();
    let photo = Photo {
        context: vec!["MMT".into()],
        trains: vec![vec!["4040".into()], vec!["terminated".into()]],
    };

    assert!(tagging::evaluate_item(&Filter::tag("metro station"), &photo, &cv, &tv));
    assert!(tagging::evaluate_item(
        &Filter::all([Filter::tag("class 599"), Filter::tag("stopped")]).local(),
        &photo,
        &cv,
        &tv
    ));
    // train tags are not visible in global scope
    assert!(!tagging::evaluate_item(&Filter::tag("metro"), &photo, &cv, &tv));
    // context tags are not resolved through the train vocabulary
    assert!(!tagging::evaluate_item(&Filter::tag("metro station").local(), &photo, &cv, &tv));
}
