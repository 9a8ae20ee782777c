use tagging::assets::{
    context_vocabulary, train_vocabulary, write_default_vocabularies, CONTEXT_VOCABULARY_NAME,
    TRAIN_VOCABULARY_NAME,
};
use tagging::tagset::TagSet;
use tagging::vocabulary::Vocabulary;

#[test]
fn unit_numbers_roll_up_to_their_class() {
    let v = train_vocabulary();
    assert!(v.implies("555001", "metro"));
    assert!(v.implies("555046", "class 555"));
    assert!(!v.contains("555047"));
    assert!(v.implies("4073", "female announcements 599"));
    assert!(v.implies("4081", "class 599"));
    assert_eq!(v.display_name("4020"), "jubilee 4020");
    assert!(v.implies("BL2", "battery loco"));
    assert!(v.implies("northern rail", "national rail"));
}

#[test]
fn service_codes_and_positions() {
    let v = train_vocabulary();
    assert!(v.implies("T101", "green line service"));
    assert!(v.implies("T135", "yellow line service"));
    assert!(v.implies("T198", "passenger service"));
    assert!(v.implies("cab", "foreground"));
    assert!(v.implies("door tests", "not in service"));
    assert_eq!(v.display_name("dest:SSS"), "destination South Shields");
}

#[test]
fn low_high_tone_supersedes_both_tones() {
    let v = train_vocabulary();
    let mut set = TagSet::from_stored(&v, ["low tone", "high tone"]);
    set.add("low-high tone");
    assert_eq!(set.to_stored(), vec!["low-high tone"]);
    assert!(set.has("tone"));
}

#[test]
fn station_codes_are_metro_stations() {
    let v = context_vocabulary();
    assert!(v.implies("MMT", "metro station"));
    assert_eq!(v.display_name("HAY"), "Haymarket metro station");
    assert!(v.implies("pop app screenshot", "screenshot"));
}

#[test]
fn seeding_is_idempotent_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let created = write_default_vocabularies(dir.path()).unwrap();
    assert_eq!(created, vec![CONTEXT_VOCABULARY_NAME, TRAIN_VOCABULARY_NAME]);
    assert!(write_default_vocabularies(dir.path()).unwrap().is_empty());

    let loaded = Vocabulary::load(&dir.path().join(TRAIN_VOCABULARY_NAME)).unwrap();
    let builtin = train_vocabulary();
    assert_eq!(loaded.len(), builtin.len());
    assert_eq!(loaded.get("4020"), builtin.get("4020"));
    assert!(loaded.implies("555012", "metro"));
}

#[test]
fn json_vocabularies_accept_camel_case_display_names() {
    let v = Vocabulary::from_json_str(
        r#"[{"name": "metro"}, {"name": "4001", "displayName": "first", "implies": ["metro"]}]"#,
    )
    .unwrap();
    assert_eq!(v.display_name("4001"), "first");
    assert!(v.implies("4001", "metro"));
}
