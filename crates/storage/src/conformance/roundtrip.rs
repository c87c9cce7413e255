use super::{expect_value, Check};
use crate::KeyValueStore;

pub(super) fn run_roundtrip_tests<S, F>(factory: &F) -> Vec<Check>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    vec![
        Check::new(
            "roundtrip",
            "get_on_empty_store_is_none",
            get_on_empty_store_is_none(factory),
        ),
        Check::new(
            "roundtrip",
            "get_returns_what_set_stored",
            get_returns_what_set_stored(factory),
        ),
        Check::new(
            "roundtrip",
            "set_overwrites_previous_value",
            set_overwrites_previous_value(factory),
        ),
        Check::new(
            "roundtrip",
            "values_are_opaque",
            values_are_opaque(factory),
        ),
        Check::new(
            "roundtrip",
            "empty_value_is_distinct_from_missing",
            empty_value_is_distinct_from_missing(factory),
        ),
    ]
}

fn get_on_empty_store_is_none<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    expect_value(&s, "draft", None)
}

fn get_returns_what_set_stored<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    s.set("draft", "{\"data\":{}}").map_err(|e| e.to_string())?;
    expect_value(&s, "draft", Some("{\"data\":{}}"))
}

fn set_overwrites_previous_value<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    s.set("draft", "one").map_err(|e| e.to_string())?;
    s.set("draft", "two").map_err(|e| e.to_string())?;
    expect_value(&s, "draft", Some("two"))
}

/// Values containing newlines, quotes and non-ASCII text come back byte for byte.
fn values_are_opaque<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    let value = "line one\nline \"two\"\tégalité ✓";
    s.set("draft", value).map_err(|e| e.to_string())?;
    expect_value(&s, "draft", Some(value))
}

fn empty_value_is_distinct_from_missing<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    s.set("draft", "").map_err(|e| e.to_string())?;
    expect_value(&s, "draft", Some(""))
}
