// hasher.rs — SHA-256 hashing and the JSON canonicalizer.
//
// Every hash the kernel computes — ledger entries, plan bodies, intent
// artifacts, attestation bundles — goes through hash_bytes/hash_str. JSON
// values additionally go through canonical_json first: the kernel has two
// canonicalizers (this JSON one and the plan-side string one), and every
// JSON call site must share this single implementation or hashes drift.

use serde_json::Value;
use sha2::{Digest, Sha256};

pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn hash_str(s: &str) -> String {
    hash_bytes(s.as_bytes())
}

/// Recursively sort object keys and serialize without whitespace. Arrays
/// keep their order — canonicalization never reorders meaningful sequence
/// data, only the unordered key space of objects.
pub fn canonical_json(value: &Value) -> String {
    let sorted = sort_keys(value);
    serde_json::to_string(&sorted).expect("canonicalized value is always serializable")
}

pub fn hash_json(value: &Value) -> String {
    hash_str(&canonical_json(value))
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

// A tiny hex encoder kept local so kaiza-audit doesn't need to pull in the
// `hex` crate for eight lines of code.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        use std::fmt::Write;
        let mut out = String::with_capacity(bytes.as_ref().len() * 2);
        for byte in bytes.as_ref() {
            write!(out, "{byte:02x}").expect("writing to a String never fails");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_bytes_is_deterministic() {
        assert_eq!(hash_bytes(b"hello"), hash_bytes(b"hello"));
    }

    #[test]
    fn hash_bytes_differs_on_different_input() {
        assert_ne!(hash_bytes(b"hello"), hash_bytes(b"world"));
    }

    #[test]
    fn known_sha256_of_empty_string() {
        assert_eq!(
            hash_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hash_str_matches_hash_bytes() {
        assert_eq!(hash_str("hello"), hash_bytes(b"hello"));
    }

    #[test]
    fn canonical_json_sorts_keys_recursively() {
        let a = json!({"b": 1, "a": {"d": 2, "c": 3}});
        let b = json!({"a": {"c": 3, "d": 2}, "b": 1});
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn canonical_json_is_whitespace_free() {
        let value = json!({"a": 1});
        assert!(!canonical_json(&value).contains(' '));
    }

    #[test]
    fn canonical_json_is_idempotent() {
        let value = json!({"z": [3, 1, 2], "a": {"y": 1, "x": 2}});
        let once = canonical_json(&value);
        let parsed: Value = serde_json::from_str(&once).unwrap();
        let twice = canonical_json(&parsed);
        assert_eq!(once, twice);
    }

    #[test]
    fn canonical_json_preserves_array_order() {
        let value = json!({"a": [3, 1, 2]});
        assert!(canonical_json(&value).contains("[3,1,2]"));
    }
}
