use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Sqlite, SqliteConnection};
use types::Identifier;

use crate::DatabaseError;

pub(crate) enum FieldValue<'a> {
    Text(&'a str),
    Flag(bool),
}

/// One collection: a table of `(id, document)` rows where `document` is the
/// entity as JSON, inside the schema of an attached database.
pub(crate) struct DocumentCollection<'a> {
    database: &'a str,
    name: &'a str,
    indexed_field: &'static str,
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

impl<'a> DocumentCollection<'a> {
    pub(crate) fn new(database: &'a str, name: &'a str, indexed_field: &'static str) -> Self {
        Self {
            database,
            name,
            indexed_field,
        }
    }

    fn table(&self) -> String {
        format!("{}.{}", quote(self.database), quote(self.name))
    }

    /// Creates the table and its filter index on first use. Fails when the
    /// database is not attached to the connection.
    pub(crate) async fn ensure(&self, conn: &mut SqliteConnection) -> Result<(), DatabaseError> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY NOT NULL, document TEXT NOT NULL)",
            self.table()
        ))
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {}.{} ON {} (json_extract(document, '$.{}'))",
            quote(self.database),
            quote(&format!("{}_{}_idx", self.name, self.indexed_field)),
            quote(self.name),
            self.indexed_field
        ))
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(())
    }

    pub(crate) async fn insert<T: Serialize>(
        &self,
        conn: &mut SqliteConnection,
        id: Identifier,
        document: &T,
    ) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(document)?;
        sqlx::query(&format!(
            "INSERT INTO {} (id, document) VALUES (?, ?)",
            self.table()
        ))
        .bind(id.to_string())
        .bind(json)
        .execute(conn)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    /// Replaces the whole document, inserting it when the id is absent.
    pub(crate) async fn upsert<T: Serialize>(
        &self,
        conn: &mut SqliteConnection,
        id: Identifier,
        document: &T,
    ) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(document)?;
        sqlx::query(&format!(
            "INSERT INTO {} (id, document) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET document = excluded.document",
            self.table()
        ))
        .bind(id.to_string())
        .bind(json)
        .execute(conn)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    /// Returns the number of removed documents (zero or one).
    pub(crate) async fn delete(
        &self,
        conn: &mut SqliteConnection,
        id: Identifier,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", self.table()))
            .bind(id.to_string())
            .execute(conn)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }

    pub(crate) async fn find_one<T: DeserializeOwned>(
        &self,
        conn: &mut SqliteConnection,
        id: Identifier,
    ) -> Result<Option<T>, DatabaseError> {
        let document: Option<String> = sqlx::query_scalar(&format!(
            "SELECT document FROM {} WHERE id = ?",
            self.table()
        ))
        .bind(id.to_string())
        .fetch_optional(conn)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(document
            .map(|json| serde_json::from_str(&json))
            .transpose()?)
    }

    /// Every document, ordered by id.
    pub(crate) async fn find_all<T: DeserializeOwned>(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<T>, DatabaseError> {
        let documents: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT document FROM {} ORDER BY id",
            self.table()
        ))
        .fetch_all(conn)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        decode_all(documents)
    }

    /// Documents whose `field` equals `value` exactly, ordered by id.
    pub(crate) async fn find_by<T: DeserializeOwned>(
        &self,
        conn: &mut SqliteConnection,
        field: &str,
        value: FieldValue<'_>,
    ) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT document FROM {} WHERE json_extract(document, '$.{field}') = ? ORDER BY id",
            self.table()
        );
        let query = sqlx::query_scalar::<Sqlite, String>(&sql);
        let query = match value {
            FieldValue::Text(text) => query.bind(text),
            FieldValue::Flag(flag) => query.bind(flag),
        };

        let documents: Vec<String> = query
            .fetch_all(conn)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        decode_all(documents)
    }

    /// Distinct non-null values of `field`, sorted.
    pub(crate) async fn distinct(
        &self,
        conn: &mut SqliteConnection,
        field: &str,
    ) -> Result<Vec<String>, DatabaseError> {
        sqlx::query_scalar(&format!(
            "SELECT DISTINCT json_extract(document, '$.{field}') FROM {}
             WHERE json_extract(document, '$.{field}') IS NOT NULL
             ORDER BY 1",
            self.table()
        ))
        .fetch_all(conn)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))
    }
}

fn decode_all<T: DeserializeOwned>(documents: Vec<String>) -> Result<Vec<T>, DatabaseError> {
    documents
        .iter()
        .map(|json| serde_json::from_str(json).map_err(DatabaseError::Serialization))
        .collect()
}
