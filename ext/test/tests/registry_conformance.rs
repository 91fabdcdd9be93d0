//! Registry-based conformance tests
//!
//! Proves that the config-driven path (Path B: `Registry::load_pattern()`)
//! produces identical results to the hand-built path (Path A: constructor
//! functions), for match results, emitted captures and traces alike.
//!
//! Run with: cargo test -p pmatch-test --test registry_conformance --features pmatch-test/registry

#![cfg(feature = "registry")]

use pmatch::{matches_with_trace, PatternConfig, Registry, RegistryBuilder};
use pmatch_test::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn registry() -> Registry {
    pmatch_test::register(RegistryBuilder::new()).build()
}

fn load(config: serde_json::Value) -> Pattern {
    let config: PatternConfig = serde_json::from_value(config).expect("valid pattern config");
    registry().load_pattern(config).expect("pattern loads")
}

fn emitted(pattern: &Pattern, value: &Value) -> (bool, Vec<(String, Value)>) {
    let mut out = Vec::new();
    let matched = pattern.matches(value, &mut |n: &str, v: &Value| {
        out.push((n.to_string(), v.clone()));
    });
    (matched, out)
}

/// Both paths agree on every value.
fn assert_same(hand_built: &Pattern, loaded: &Pattern, values: &[Value]) {
    for value in values {
        assert_eq!(
            emitted(hand_built, value),
            emitted(loaded, value),
            "paths disagree on {value:?}"
        );
        let a = matches_with_trace(hand_built, value);
        let b = matches_with_trace(loaded, value);
        assert_eq!(a.matched(), b.matched());
        assert_eq!(a.captures(), b.captures());
        assert_eq!(a.reason(), b.reason());
    }
}

fn lit(n: i32) -> serde_json::Value {
    json!({ "type": "literal", "value": { "type": "number", "value": n } })
}

fn matchable(type_name: &str, config: serde_json::Value) -> serde_json::Value {
    json!({ "type": "matchable", "type_name": type_name, "config": config })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn sequence_with_select() {
    let hand_built = Pattern::sequence([Pattern::from(1), select("rest")]);
    let loaded = load(json!({
        "type": "sequence",
        "items": [lit(1), matchable("pmatch.test.v1.Select", json!({ "name": "rest" }))]
    }));

    assert_same(
        &hand_built,
        &loaded,
        &[
            Value::sequence([1, 2]),
            Value::sequence([2, 2]),
            Value::sequence([1, 2, 3]),
            Value::from(1),
        ],
    );
}

#[test]
fn record_with_optional_and_regex() {
    let hand_built = Pattern::record([
        ("path", select_with("path", regex("^/api/").unwrap())),
        ("method", optional(union(["GET", "HEAD"]))),
    ]);
    let loaded = load(json!({
        "type": "record",
        "fields": [
            { "name": "path", "pattern": matchable("pmatch.test.v1.Select", json!({
                "name": "path",
                "pattern": matchable("pmatch.test.v1.Regex", json!({ "pattern": "^/api/" }))
            })) },
            { "name": "method", "pattern": matchable("pmatch.test.v1.Optional", json!({
                "pattern": matchable("pmatch.test.v1.Union", json!({ "patterns": [
                    { "type": "literal", "value": { "type": "string", "value": "GET" } },
                    { "type": "literal", "value": { "type": "string", "value": "HEAD" } }
                ] }))
            })) }
        ]
    }));

    assert_same(
        &hand_built,
        &loaded,
        &[
            Value::record([("path", "/api/users")]),
            Value::record([("path", "/api/users"), ("method", "GET")]),
            Value::record([("path", "/api/users"), ("method", "POST")]),
            Value::record([("path", "/web"), ("method", "GET")]),
            Value::record([("method", "GET")]),
            Value::map([("path", "/api/users")]),
        ],
    );
}

#[test]
fn sets_and_maps() {
    let hand_built = Pattern::map([
        (Value::from("roles"), Pattern::set(["admin", "ops"])),
        (Value::from("owner"), Pattern::set([select("owner")])),
    ]);
    let loaded = load(json!({
        "type": "map",
        "entries": [
            { "key": { "type": "string", "value": "roles" }, "pattern": { "type": "set", "items": [
                { "type": "literal", "value": { "type": "string", "value": "admin" } },
                { "type": "literal", "value": { "type": "string", "value": "ops" } }
            ] } },
            { "key": { "type": "string", "value": "owner" }, "pattern": { "type": "set", "items": [
                matchable("pmatch.test.v1.Select", json!({ "name": "owner" }))
            ] } }
        ]
    }));

    assert_same(
        &hand_built,
        &loaded,
        &[
            Value::map([
                ("roles", Value::set(["admin", "ops", "dev"])),
                ("owner", Value::set(["alice"])),
            ]),
            Value::map([
                ("roles", Value::set(["admin"])),
                ("owner", Value::set(["alice"])),
            ]),
            Value::map([
                ("roles", Value::set(["admin", "ops"])),
                ("owner", Value::set(["alice", "bob"])),
            ]),
        ],
    );
}

#[test]
fn negation_and_type_checks() {
    let hand_built = Pattern::sequence([not(type_of("string")), type_of("record")]);
    let loaded = load(json!({
        "type": "sequence",
        "items": [
            matchable("pmatch.test.v1.Not", json!({
                "pattern": matchable("pmatch.test.v1.TypeOf", json!({ "kind": "string" }))
            })),
            matchable("pmatch.test.v1.TypeOf", json!({ "kind": "record" }))
        ]
    }));

    assert_same(
        &hand_built,
        &loaded,
        &[
            Value::sequence([Value::from(1), Value::record([("a", 1)])]),
            Value::sequence([Value::from("1"), Value::record([("a", 1)])]),
            Value::sequence([Value::from(1), Value::map([("a", 1)])]),
        ],
    );
}

#[test]
fn literal_containers_compare_deeply() {
    let hand_built = Pattern::literal(Value::record([("a", 1)]));
    let loaded = load(json!({
        "type": "literal",
        "value": { "type": "record", "fields": [
            { "name": "a", "value": { "type": "number", "value": 1 } }
        ] }
    }));
    assert_same(
        &hand_built,
        &loaded,
        &[
            Value::record([("a", 1)]),
            Value::record([("a", 1), ("b", 2)]),
            Value::map([("a", 1)]),
        ],
    );
    assert!(!loaded.test(&Value::record([("a", 1), ("b", 2)])));

    let hand_built = Pattern::literal(Value::set([1]));
    let loaded = load(json!({
        "type": "literal",
        "value": { "type": "set", "items": [{ "type": "number", "value": 1 }] }
    }));
    assert_same(
        &hand_built,
        &loaded,
        &[Value::set([1]), Value::set([1, 2]), Value::sequence([1])],
    );
    assert!(!loaded.test(&Value::set([1, 2])));
}

#[test]
fn capture_leak_is_identical() {
    let hand_built = Pattern::record([("a", select("x")), ("b", Pattern::from(5))]);
    let loaded = load(json!({
        "type": "record",
        "fields": [
            { "name": "a", "pattern": matchable("pmatch.test.v1.Select", json!({ "name": "x" })) },
            { "name": "b", "pattern": lit(5) }
        ]
    }));

    let value = Value::record([("a", 1), ("b", 6)]);
    assert_same(&hand_built, &loaded, std::slice::from_ref(&value));
    assert_eq!(
        emitted(&loaded, &value),
        (false, vec![("x".to_string(), Value::from(1))])
    );
}
