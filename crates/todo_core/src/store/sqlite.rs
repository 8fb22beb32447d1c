//! SQLite-backed entity store over the `entities` / `entity_indexes` tables.

use super::{Bucket, EntityStore, IndexTerm, StoreResult, StoredRecord};
use rusqlite::{params, Connection, OptionalExtension};

/// Entity store borrowing a migrated connection.
pub struct SqliteEntityStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityStore<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntityStore for SqliteEntityStore<'_> {
    fn get(&self, bucket: Bucket, key: &str) -> StoreResult<Option<StoredRecord>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM entities WHERE bucket = ?1 AND key = ?2;",
                params![bucket.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => Ok(Some(StoredRecord {
                bucket,
                key: key.to_string(),
                body,
                indexes: load_index_terms(self.conn, bucket, key)?,
            })),
            None => Ok(None),
        }
    }

    fn put(&self, record: &StoredRecord) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        write_record(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    fn replace(&self, record: &StoredRecord) -> StoreResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE entities
             SET body = ?3,
                 stored_at = (strftime('%s', 'now') * 1000)
             WHERE bucket = ?1 AND key = ?2;",
            params![record.bucket.as_str(), record.key, record.body],
        )?;
        if changed == 0 {
            return Ok(false);
        }

        write_index_terms(&tx, record)?;
        tx.commit()?;
        Ok(true)
    }

    fn delete(&self, bucket: Bucket, key: &str) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM entities WHERE bucket = ?1 AND key = ?2;",
            params![bucket.as_str(), key],
        )?;
        Ok(changed > 0)
    }

    fn scan(&self, bucket: Bucket, term: &IndexTerm) -> StoreResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.key, e.body
             FROM entities e
             WHERE e.bucket = ?1
               AND EXISTS (
                    SELECT 1
                    FROM entity_indexes i
                    WHERE i.bucket = e.bucket
                      AND i.key = e.key
                      AND i.field = ?2
                      AND i.value = ?3
               )
             ORDER BY e.key ASC;",
        )?;
        let mut rows = stmt.query(params![bucket.as_str(), term.field, term.value])?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let indexes = load_index_terms(self.conn, bucket, &key)?;
            records.push(StoredRecord {
                bucket,
                key,
                body: row.get(1)?,
                indexes,
            });
        }
        Ok(records)
    }

    fn relocate(&self, key: &str, from: Bucket, record: &StoredRecord) -> StoreResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM entities WHERE bucket = ?1 AND key = ?2;",
            params![from.as_str(), key],
        )?;
        if removed == 0 {
            // Dropping the transaction rolls it back; nothing was written.
            return Ok(false);
        }

        write_record(&tx, record)?;
        tx.commit()?;
        Ok(true)
    }
}

fn write_record(conn: &Connection, record: &StoredRecord) -> StoreResult<()> {
    let bucket = record.bucket.as_str();
    conn.execute(
        "INSERT INTO entities (bucket, key, body)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (bucket, key) DO UPDATE SET
            body = excluded.body,
            stored_at = (strftime('%s', 'now') * 1000);",
        params![bucket, record.key, record.body],
    )?;
    write_index_terms(conn, record)
}

fn write_index_terms(conn: &Connection, record: &StoredRecord) -> StoreResult<()> {
    let bucket = record.bucket.as_str();
    conn.execute(
        "DELETE FROM entity_indexes WHERE bucket = ?1 AND key = ?2;",
        params![bucket, record.key],
    )?;
    for term in &record.indexes {
        conn.execute(
            "INSERT OR IGNORE INTO entity_indexes (bucket, key, field, value)
             VALUES (?1, ?2, ?3, ?4);",
            params![bucket, record.key, term.field, term.value],
        )?;
    }
    Ok(())
}

fn load_index_terms(conn: &Connection, bucket: Bucket, key: &str) -> StoreResult<Vec<IndexTerm>> {
    let mut stmt = conn.prepare(
        "SELECT field, value
         FROM entity_indexes
         WHERE bucket = ?1 AND key = ?2
         ORDER BY field ASC, value ASC;",
    )?;
    let mut rows = stmt.query(params![bucket.as_str(), key])?;
    let mut terms = Vec::new();
    while let Some(row) = rows.next()? {
        let field: String = row.get(0)?;
        let Some(field) = known_index_field(&field) else {
            continue;
        };
        terms.push(IndexTerm::new(field, row.get::<_, String>(1)?));
    }
    Ok(terms)
}

/// Maps a stored index field name back onto the static names this build writes.
fn known_index_field(field: &str) -> Option<&'static str> {
    super::INDEX_FIELDS
        .iter()
        .copied()
        .find(|known| *known == field)
}
