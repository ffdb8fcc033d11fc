use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Store;

/// A stored JSON document together with its optimistic-concurrency version.
/// Versions start at 1 and increment on every overwrite.
#[derive(Debug, Clone)]
pub struct Document<T> {
    pub key: String,
    pub value: T,
    pub version: i64,
}

impl Store {
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Document<T>>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT value, version FROM documents WHERE key = ?1",
                    [key],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;

            match row {
                Some((raw, version)) => {
                    let value = serde_json::from_str(&raw)
                        .with_context(|| format!("corrupt document at key '{}'", key))?;
                    Ok(Some(Document {
                        key: key.to_string(),
                        value,
                        version,
                    }))
                }
                None => Ok(None),
            }
        })
    }

    /// Insert or unconditionally overwrite. Returns the resulting version.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<i64> {
        let raw = serde_json::to_string(value)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, version = version + 1",
                params![key, raw],
            )?;
            let version = conn.query_row(
                "SELECT version FROM documents WHERE key = ?1",
                [key],
                |row| row.get(0),
            )?;
            Ok(version)
        })
    }

    /// Insert only if the key is absent. Returns false when it already exists.
    pub fn insert_new<T: Serialize>(&self, key: &str, value: &T) -> Result<bool> {
        let raw = serde_json::to_string(value)?;
        self.with_conn(|conn| {
            let n = conn.execute(
                "INSERT OR IGNORE INTO documents (key, value) VALUES (?1, ?2)",
                params![key, raw],
            )?;
            Ok(n == 1)
        })
    }

    /// Compare-and-swap: overwrite only if the stored version still matches
    /// `expected`. Returns the new version, or None when another writer got
    /// there first (or the key is gone) — the caller re-reads and retries.
    pub fn put_if_version<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expected: i64,
    ) -> Result<Option<i64>> {
        let raw = serde_json::to_string(value)?;
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE documents SET value = ?1, version = version + 1
                 WHERE key = ?2 AND version = ?3",
                params![raw, key, expected],
            )?;
            Ok(if n == 1 { Some(expected + 1) } else { None })
        })
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM documents WHERE key = ?1", [key])?;
            Ok(n == 1)
        })
    }

    /// All documents whose key starts with `prefix`, in insertion order.
    /// Prefixes are fixed namespace strings ("user/", "complaint/"), never
    /// user input, so a plain LIKE is safe here.
    pub fn list_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<Document<T>>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key, value, version FROM documents WHERE key LIKE ?1 ORDER BY seq",
            )?;

            let rows = stmt
                .query_map([format!("{}%", prefix)], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(key, raw, version)| {
                    let value = serde_json::from_str(&raw)
                        .with_context(|| format!("corrupt document at key '{}'", key))?;
                    Ok(Document {
                        key,
                        value,
                        version,
                    })
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    fn note(text: &str) -> Note {
        Note { text: text.into() }
    }

    #[test]
    fn put_get_roundtrip() {
        let store = Store::open_in_memory().unwrap();

        let v1 = store.put("note/a", &note("hello")).unwrap();
        assert_eq!(v1, 1);

        let doc = store.get::<Note>("note/a").unwrap().unwrap();
        assert_eq!(doc.value, note("hello"));
        assert_eq!(doc.version, 1);

        assert!(store.get::<Note>("note/missing").unwrap().is_none());
    }

    #[test]
    fn overwrite_bumps_version() {
        let store = Store::open_in_memory().unwrap();

        store.put("note/a", &note("v1")).unwrap();
        let v2 = store.put("note/a", &note("v2")).unwrap();
        assert_eq!(v2, 2);

        let doc = store.get::<Note>("note/a").unwrap().unwrap();
        assert_eq!(doc.value, note("v2"));
        assert_eq!(doc.version, 2);
    }

    #[test]
    fn insert_new_refuses_existing_key() {
        let store = Store::open_in_memory().unwrap();

        assert!(store.insert_new("note/a", &note("first")).unwrap());
        assert!(!store.insert_new("note/a", &note("second")).unwrap());

        let doc = store.get::<Note>("note/a").unwrap().unwrap();
        assert_eq!(doc.value, note("first"));
    }

    #[test]
    fn cas_rejects_stale_version() {
        let store = Store::open_in_memory().unwrap();
        store.put("note/a", &note("base")).unwrap();

        // Writer B sneaks in after A read version 1
        store.put("note/a", &note("from B")).unwrap();

        let stale = store.put_if_version("note/a", &note("from A"), 1).unwrap();
        assert_eq!(stale, None);

        // The losing write left the document untouched
        let doc = store.get::<Note>("note/a").unwrap().unwrap();
        assert_eq!(doc.value, note("from B"));
        assert_eq!(doc.version, 2);

        let fresh = store.put_if_version("note/a", &note("from A"), 2).unwrap();
        assert_eq!(fresh, Some(3));
    }

    #[test]
    fn cas_on_missing_key_is_conflict() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(
            store.put_if_version("note/gone", &note("x"), 1).unwrap(),
            None
        );
    }

    #[test]
    fn remove_reports_presence() {
        let store = Store::open_in_memory().unwrap();
        store.put("note/a", &note("x")).unwrap();

        assert!(store.remove("note/a").unwrap());
        assert!(!store.remove("note/a").unwrap());
        assert!(store.get::<Note>("note/a").unwrap().is_none());
    }

    #[test]
    fn list_prefix_keeps_insertion_order() {
        let store = Store::open_in_memory().unwrap();

        store.put("note/c", &note("1")).unwrap();
        store.put("note/a", &note("2")).unwrap();
        store.put("note/b", &note("3")).unwrap();
        store.put("other/x", &note("4")).unwrap();

        // Overwriting must not move a document to the back
        store.put("note/c", &note("1 again")).unwrap();

        let docs = store.list_prefix::<Note>("note/").unwrap();
        let keys: Vec<&str> = docs.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, ["note/c", "note/a", "note/b"]);
        assert_eq!(docs[0].value, note("1 again"));
    }
}
