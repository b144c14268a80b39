use chs_schema::{
    DocumentType, FieldDefinition, FieldPath, FieldVisibility, SiblingContext, ValueType,
    Visibility, is_field_visible, is_truthy, is_visible, validate, visibility_map,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn ctx(value: &Value) -> SiblingContext<'_> {
    SiblingContext::from_value(Some(value))
}

fn path(s: &str) -> FieldPath {
    s.parse().unwrap()
}

fn make_session_type() -> DocumentType {
    DocumentType::new("session", "Session")
        .field(FieldDefinition::boolean("remote"))
        .field(FieldDefinition::text("room").required().hidden_when("remote"))
        .field(FieldDefinition::object(
            "recording",
            vec![
                FieldDefinition::boolean("enabled"),
                FieldDefinition::text("url").required().hidden_unless("enabled"),
            ],
        )
        .hidden_when("remote"))
        .field(FieldDefinition::sequence(
            "speakers",
            ValueType::object(vec![
                FieldDefinition::boolean("guest"),
                FieldDefinition::text("affiliation").hidden_unless("guest"),
            ]),
        ))
}

// ── Truthiness ───────────────────────────────────────────────────

#[test]
fn truthiness_follows_json_host_rules() {
    for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
        assert!(!is_truthy(&falsy), "{falsy} should be falsy");
    }
    for truthy in [json!(true), json!(1), json!(-5), json!("x"), json!([]), json!({})] {
        assert!(is_truthy(&truthy), "{truthy} should be truthy");
    }
}

#[test]
fn context_treats_null_as_absent() {
    let v = json!({"a": null, "b": true});
    let c = ctx(&v);
    assert!(c.get("a").is_none());
    assert_eq!(c.get_bool("b"), Some(true));
    assert!(SiblingContext::empty().get("b").is_none());
}

// ── Predicates ───────────────────────────────────────────────────

#[test]
fn no_predicate_means_visible() {
    let f = FieldDefinition::text("plain");
    assert!(is_visible(&f, &SiblingContext::empty()));
}

#[test]
fn hidden_when_true_requires_strict_true() {
    let f = FieldDefinition::text("room").hidden_when("remote");
    assert!(!is_visible(&f, &ctx(&json!({"remote": true}))));
    assert!(is_visible(&f, &ctx(&json!({"remote": false}))));
    assert!(is_visible(&f, &ctx(&json!({"remote": 1}))));
    assert!(is_visible(&f, &ctx(&json!({}))));
}

#[test]
fn hidden_unless_hides_on_falsy_or_absent() {
    let f = FieldDefinition::text("url").hidden_unless("enabled");
    assert!(!is_visible(&f, &ctx(&json!({}))));
    assert!(!is_visible(&f, &ctx(&json!({"enabled": false}))));
    assert!(!is_visible(&f, &ctx(&json!({"enabled": 0}))));
    assert!(is_visible(&f, &ctx(&json!({"enabled": true}))));
}

#[test]
fn custom_predicate() {
    let f = FieldDefinition::text("late_fee").visibility(Visibility::custom(
        "after-deadline",
        |siblings| siblings.get_number("day").is_none_or(|d| d <= 15.0),
    ));
    assert!(is_visible(&f, &ctx(&json!({"day": 20}))));
    assert!(!is_visible(&f, &ctx(&json!({"day": 3}))));
}

#[test]
fn predicates_are_idempotent() {
    let f = FieldDefinition::text("room").hidden_when("remote");
    let v = json!({"remote": true});
    let first = is_visible(&f, &ctx(&v));
    let second = is_visible(&f, &ctx(&v));
    assert_eq!(first, second);
}

// ── Path resolution ──────────────────────────────────────────────

#[test]
fn path_visibility_checks_every_ancestor() {
    let t = make_session_type();
    let doc = json!({"remote": true, "recording": {"enabled": true}});
    assert!(!is_field_visible(&t, &doc, &path("recording")).unwrap());
    assert!(!is_field_visible(&t, &doc, &path("recording.url")).unwrap());
    assert!(!is_field_visible(&t, &doc, &path("recording.enabled")).unwrap());

    let local = json!({"remote": false, "recording": {"enabled": true}});
    assert!(is_field_visible(&t, &local, &path("recording.url")).unwrap());
}

#[test]
fn path_visibility_inside_sequence_elements() {
    let t = make_session_type();
    let doc = json!({"speakers": [{"guest": true}, {"guest": false}]});
    assert!(is_field_visible(&t, &doc, &path("speakers[0].affiliation")).unwrap());
    assert!(!is_field_visible(&t, &doc, &path("speakers[1].affiliation")).unwrap());
    assert!(!is_field_visible(&t, &doc, &path("speakers[7].affiliation")).unwrap());
    assert!(is_field_visible(&t, &doc, &path("speakers")).unwrap());
}

#[test]
fn path_errors() {
    let t = make_session_type();
    let doc = json!({});
    assert!(is_field_visible(&t, &doc, &path("nope")).is_err());
    assert!(is_field_visible(&t, &doc, &path("room.inner")).is_err());
    assert!(is_field_visible(&t, &doc, &path("speakers.guest")).is_err());
    assert!(is_field_visible(&t, &doc, &path("room[0]")).is_err());
}

// ── Visibility map ───────────────────────────────────────────────

#[test]
fn map_lists_fields_in_declaration_order() {
    let t = make_session_type();
    let doc = json!({
        "remote": false,
        "recording": {"enabled": false},
        "speakers": [{"guest": true}]
    });
    let entries: Vec<(String, bool)> = visibility_map(&t, &doc)
        .into_iter()
        .map(|FieldVisibility { path, visible }| (path.to_string(), visible))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("remote".to_string(), true),
            ("room".to_string(), true),
            ("recording".to_string(), true),
            ("recording.enabled".to_string(), true),
            ("recording.url".to_string(), false),
            ("speakers".to_string(), true),
            ("speakers[0].guest".to_string(), true),
            ("speakers[0].affiliation".to_string(), true),
        ]
    );
}

#[test]
fn hidden_parent_hides_children_in_map() {
    let t = make_session_type();
    let doc = json!({"remote": true, "recording": {"enabled": true}});
    let map = visibility_map(&t, &doc);
    let url = map
        .iter()
        .find(|e| e.path.to_string() == "recording.url")
        .unwrap();
    assert!(!url.visible);
}

// ── Hidden fields and validation ─────────────────────────────────

#[test]
fn hidden_required_field_is_not_validated() {
    let t = make_session_type();
    assert!(validate(&t, &json!({"remote": true})).is_empty());

    let errors = validate(&t, &json!({"remote": false}));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.to_string(), "room");
}

#[test]
fn hidden_object_skips_its_subtree() {
    let t = make_session_type();
    let doc = json!({"remote": true, "recording": {"enabled": true, "url": 42}});
    assert!(validate(&t, &doc).is_empty());
}
