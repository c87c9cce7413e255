use super::{expect_value, Check};
use crate::KeyValueStore;

pub(super) fn run_remove_tests<S, F>(factory: &F) -> Vec<Check>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    vec![
        Check::new(
            "remove",
            "remove_deletes_value",
            remove_deletes_value(factory),
        ),
        Check::new(
            "remove",
            "remove_missing_key_is_ok",
            remove_missing_key_is_ok(factory),
        ),
        Check::new(
            "remove",
            "set_after_remove_is_visible",
            set_after_remove_is_visible(factory),
        ),
    ]
}

fn remove_deletes_value<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    s.set("draft", "value").map_err(|e| e.to_string())?;
    s.remove("draft").map_err(|e| e.to_string())?;
    expect_value(&s, "draft", None)
}

fn remove_missing_key_is_ok<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    s.remove("never_written")
        .map_err(|e| format!("removing a missing key should succeed, got: {}", e))
}

fn set_after_remove_is_visible<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    s.set("draft", "old").map_err(|e| e.to_string())?;
    s.remove("draft").map_err(|e| e.to_string())?;
    s.set("draft", "new").map_err(|e| e.to_string())?;
    expect_value(&s, "draft", Some("new"))
}
