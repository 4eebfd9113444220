//! Parsers for the JSON data files.
//!
//! - catalog: a JSON array of movie objects
//! - statistics: `{ "<context key>": { "<title>": {"reward": n, "count": n} } }`
//!
//! Statistics maps are read in document order rather than through a
//! `HashMap`, so bucket iteration (and exploit tie-breaking) is reproducible.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::Path;
use tracing::warn;

/// Key/value pairs of a JSON object, in the order they appear
struct OrderedEntries<K, V>(Vec<(K, V)>);

impl<'de, K, V> Deserialize<'de> for OrderedEntries<K, V>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for EntriesVisitor<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = OrderedEntries<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl<'de> Deserialize<'de> for StatBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let OrderedEntries(entries) = OrderedEntries::<String, Value>::deserialize(deserializer)?;
        Ok(bucket_from_entries(entries))
    }
}

/// Build a bucket, skipping entries that do not describe a usable `StatEntry`
fn bucket_from_entries(entries: Vec<(String, Value)>) -> StatBucket {
    let mut bucket = StatBucket::new();
    for (title, value) in entries {
        match stat_entry_from_value(&value) {
            Ok(entry) => bucket.insert(title, entry),
            Err(reason) => warn!("Skipping statistics for '{}': {}", title, reason),
        }
    }
    bucket
}

/// Convert `{"reward": n, "count": n}`.
///
/// Missing fields count as zero. Counts written as integral floats (`2.0`)
/// are accepted; negative, fractional or non-numeric counts are not, and
/// neither are non-finite rewards.
fn stat_entry_from_value(value: &Value) -> std::result::Result<StatEntry, String> {
    let object = value
        .as_object()
        .ok_or_else(|| format!("expected an object, found {}", value))?;

    let reward = match object.get("reward") {
        None | Some(Value::Null) => 0.0,
        Some(reward) => reward
            .as_f64()
            .filter(|r| r.is_finite())
            .ok_or_else(|| format!("invalid reward {}", reward))?,
    };

    let count = match object.get("count") {
        None | Some(Value::Null) => 0,
        Some(count) => count
            .as_u64()
            .or_else(|| {
                count
                    .as_f64()
                    .filter(|c| *c >= 0.0 && c.fract() == 0.0 && *c <= u64::MAX as f64)
                    .map(|c| c as u64)
            })
            .ok_or_else(|| format!("invalid count {}", count))?,
    };

    Ok(StatEntry::new(reward, count))
}

/// A context's value in the statistics file: normally an object of
/// per-title entries, but anything else is tolerated and skipped
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawBucket {
    Entries(OrderedEntries<String, Value>),
    Other(Value),
}

impl Serialize for StatBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (title, entry) in self.iter() {
            map.serialize_entry(title, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatisticsStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let OrderedEntries(entries) = OrderedEntries::<String, RawBucket>::deserialize(deserializer)?;
        let mut store = StatisticsStore::new();
        for (key, raw) in entries {
            match raw {
                RawBucket::Entries(OrderedEntries(entries)) => {
                    store.insert(key, bucket_from_entries(entries));
                }
                RawBucket::Other(value) => {
                    warn!("Skipping statistics for context '{}': expected an object, found {}", key, value);
                }
            }
        }
        Ok(store)
    }
}

impl Serialize for StatisticsStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, bucket) in self.iter() {
            map.serialize_entry(key.as_str(), bucket)?;
        }
        map.end()
    }
}

/// Read a whole file, mapping "not found" to `FileNotFound`
fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Parse catalog JSON.
///
/// Entries that are not objects, lack a non-empty string `title`, or have
/// badly typed fields are skipped with a warning. A top-level value that
/// is not an array is an error.
pub fn parse_catalog(json: &str) -> Result<Vec<Movie>> {
    let records: Vec<Value> = serde_json::from_str(json)?;
    let mut movies = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        match movie_from_record(index, record) {
            Ok(movie) => movies.push(movie),
            Err(e) => warn!("Skipping catalog record: {}", e),
        }
    }
    Ok(movies)
}

fn movie_from_record(index: usize, record: Value) -> Result<Movie> {
    let title = record
        .as_object()
        .ok_or_else(|| DataLoadError::InvalidRecord {
            index,
            reason: "not an object".to_string(),
        })?
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| DataLoadError::InvalidRecord {
            index,
            reason: "missing string title".to_string(),
        })?;

    if title.trim().is_empty() {
        return Err(DataLoadError::InvalidRecord {
            index,
            reason: "empty title".to_string(),
        });
    }

    serde_json::from_value(record).map_err(|e| DataLoadError::InvalidRecord {
        index,
        reason: e.to_string(),
    })
}

/// Parse a catalog file (see [`parse_catalog`])
pub fn parse_catalog_file(path: &Path) -> Result<Vec<Movie>> {
    parse_catalog(&read_to_string(path)?)
}

/// Parse statistics JSON into a store.
///
/// Only a document that is not a JSON object is an error. Malformed
/// contexts and entries are skipped with a warning so one bad record does
/// not discard the rest of the snapshot.
pub fn parse_statistics(json: &str) -> Result<StatisticsStore> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a statistics file.
///
/// A missing file is reported as `MissingStatisticsSource` so callers can
/// route to the fallback path instead of failing.
pub fn parse_statistics_file(path: &Path) -> Result<StatisticsStore> {
    match read_to_string(path) {
        Ok(json) => parse_statistics(&json),
        Err(DataLoadError::FileNotFound { path }) => Err(DataLoadError::MissingStatisticsSource { path }),
        Err(e) => Err(e),
    }
}
