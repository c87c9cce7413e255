use super::{expect_value, Check};
use crate::{KeyValueStore, StorageError};

pub(super) fn run_key_tests<S, F>(factory: &F) -> Vec<Check>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    vec![
        Check::new(
            "keys",
            "different_keys_are_independent",
            different_keys_are_independent(factory),
        ),
        Check::new(
            "keys",
            "remove_leaves_other_keys",
            remove_leaves_other_keys(factory),
        ),
        Check::new(
            "keys",
            "path_traversal_key_is_rejected",
            path_traversal_key_is_rejected(factory),
        ),
        Check::new(
            "keys",
            "empty_key_is_rejected",
            empty_key_is_rejected(factory),
        ),
    ]
}

fn different_keys_are_independent<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    s.set("a", "1").map_err(|e| e.to_string())?;
    s.set("b", "2").map_err(|e| e.to_string())?;
    expect_value(&s, "a", Some("1"))?;
    expect_value(&s, "b", Some("2"))
}

fn remove_leaves_other_keys<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    s.set("a", "1").map_err(|e| e.to_string())?;
    s.set("b", "2").map_err(|e| e.to_string())?;
    s.remove("a").map_err(|e| e.to_string())?;
    expect_value(&s, "a", None)?;
    expect_value(&s, "b", Some("2"))
}

fn path_traversal_key_is_rejected<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    match s.set("../outside", "x") {
        Err(StorageError::InvalidKey { key }) if key == "../outside" => Ok(()),
        Err(other) => Err(format!("expected InvalidKey, got {}", other)),
        Ok(()) => Err("expected InvalidKey, set succeeded".to_string()),
    }
}

fn empty_key_is_rejected<S, F>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let s = factory();
    match s.get("") {
        Err(StorageError::InvalidKey { .. }) => Ok(()),
        Err(other) => Err(format!("expected InvalidKey, got {}", other)),
        Ok(_) => Err("expected InvalidKey, get succeeded".to_string()),
    }
}
