//! `SQLite` implementation of [`DocumentStore`].
//!
//! All collections share one `documents` table. Bodies are stored as JSON
//! text and filters are evaluated with the `JSON1` functions, so lookups
//! by nested field never leave the database.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use metacat_app::ports::{Collection, DocumentStore, FieldPath, Filter, RawDocument, StoreError};
use serde_json::Value;

use crate::error::StorageError;

/// Wrapper for decoding a stored body without leaking row types upward.
struct Body(Value);

impl<'r> FromRow<'r, SqliteRow> for Body {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let body: String = row.try_get("body")?;
        let value = serde_json::from_str(&body).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        Ok(Self(value))
    }
}

const SELECT_BY_ID: &str = "SELECT body FROM documents WHERE collection = ? AND id = ?";
const SELECT_BY_NAME: &str = "SELECT body FROM documents WHERE collection = ? AND name = ?";
const SELECT_ALL: &str =
    "SELECT body FROM documents WHERE collection = ? ORDER BY name LIMIT ?";

const INSERT: &str = "INSERT INTO documents (collection, id, name, body) VALUES (?, ?, ?, ?)";
const UPDATE: &str = "UPDATE documents SET name = ?, body = ? WHERE collection = ? AND id = ?";
const DELETE_BY_ID: &str = "DELETE FROM documents WHERE collection = ? AND id = ?";

/// Render a field path as a `JSON1` path expression: `$."a"."b"`.
fn json_path(path: &FieldPath) -> String {
    path.segments()
        .iter()
        .fold(String::from("$"), |mut out, segment| {
            out.push_str(".\"");
            out.push_str(&segment.replace('"', "\\\""));
            out.push('"');
            out
        })
}

/// SQL predicate for `filter` plus its positional arguments, in order.
fn predicate(filter: &Filter) -> (&'static str, Vec<String>) {
    match filter {
        Filter::Eq { path, value } => (
            "json_extract(documents.body, ?) = json_extract(?, '$')",
            vec![json_path(path), value.to_string()],
        ),
        Filter::Contains {
            array,
            field: None,
            value,
        } => (
            "EXISTS (SELECT 1 FROM json_each(documents.body, ?) e \
             WHERE e.value = json_extract(?, '$'))",
            vec![json_path(array), value.to_string()],
        ),
        Filter::Contains {
            array,
            field: Some(field),
            value,
        } => (
            "EXISTS (SELECT 1 FROM json_each(documents.body, ?) e \
             WHERE json_extract(e.value, ?) = json_extract(?, '$'))",
            vec![json_path(array), json_path(field), value.to_string()],
        ),
    }
}

/// Whether `err` is the `(collection, name)` unique index firing.
fn is_name_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.message().contains("documents.name")
        }
        _ => false,
    }
}

fn write_error(err: sqlx::Error, collection: Collection, name: &str) -> StoreError {
    if is_name_collision(&err) {
        StoreError::DuplicateName {
            collection,
            name: name.to_owned(),
        }
    } else {
        StorageError::from(err).into()
    }
}

fn limit_arg(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// `SQLite`-backed document store.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn query_filtered(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let (clause, args) = predicate(filter);
        let sql = format!(
            "SELECT body FROM documents WHERE collection = ? AND {clause} ORDER BY name LIMIT ?"
        );
        let mut query = sqlx::query_as::<_, Body>(&sql).bind(collection.as_str());
        for arg in args {
            query = query.bind(arg);
        }
        let rows = query
            .bind(limit_arg(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|b| b.0).collect())
    }
}

impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<Body> = sqlx::query_as(SELECT_BY_ID)
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|b| b.0))
    }

    async fn get_by_name(
        &self,
        collection: Collection,
        name: &str,
    ) -> Result<Option<Value>, StoreError> {
        let row: Option<Body> = sqlx::query_as(SELECT_BY_NAME)
            .bind(collection.as_str())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|b| b.0))
    }

    async fn list(&self, collection: Collection, limit: usize) -> Result<Vec<Value>, StoreError> {
        let rows: Vec<Body> = sqlx::query_as(SELECT_ALL)
            .bind(collection.as_str())
            .bind(limit_arg(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|b| b.0).collect())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        self.query_filtered(collection, filter, limit).await
    }

    async fn exists(&self, collection: Collection, filter: &Filter) -> Result<bool, StoreError> {
        Ok(!self.query_filtered(collection, filter, 1).await?.is_empty())
    }

    async fn insert(&self, collection: Collection, document: RawDocument) -> Result<(), StoreError> {
        let body = serde_json::to_string(&document.body).map_err(StorageError::from)?;
        sqlx::query(INSERT)
            .bind(collection.as_str())
            .bind(&document.id)
            .bind(&document.name)
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(|err| write_error(err, collection, &document.name))?;
        Ok(())
    }

    async fn replace(
        &self,
        collection: Collection,
        document: RawDocument,
    ) -> Result<bool, StoreError> {
        let body = serde_json::to_string(&document.body).map_err(StorageError::from)?;
        let result = sqlx::query(UPDATE)
            .bind(&document.name)
            .bind(body)
            .bind(collection.as_str())
            .bind(&document.id)
            .execute(&self.pool)
            .await
            .map_err(|err| write_error(err, collection, &document.name))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(DELETE_BY_ID)
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use metacat_app::store::{Limits, Store};
    use metacat_domain::addressable::Addressable;
    use metacat_domain::error::{MetacatError, ValidationError};
    use serde_json::json;

    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteDocumentStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
        .build()
        .await
        .unwrap();
        SqliteDocumentStore::new(db.pool().clone())
    }

    fn doc(id: &str, name: &str, body: Value) -> RawDocument {
        RawDocument {
            id: id.to_string(),
            name: name.to_string(),
            body,
        }
    }

    #[test]
    fn should_quote_every_path_segment() {
        let path = FieldPath::from("identifiers").child("mac.address");
        assert_eq!(json_path(&path), "$.\"identifiers\".\"mac.address\"");
    }

    #[tokio::test]
    async fn should_get_document_by_id_and_name() {
        let store = setup().await;
        let body = json!({"id": "a1", "name": "A1", "port": 48080});
        store
            .insert(Collection::Addressable, doc("a1", "A1", body.clone()))
            .await
            .unwrap();

        assert_eq!(store.get(Collection::Addressable, "a1").await.unwrap(), Some(body.clone()));
        assert_eq!(
            store.get_by_name(Collection::Addressable, "A1").await.unwrap(),
            Some(body)
        );
        assert_eq!(store.get(Collection::Device, "a1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_report_duplicate_name_within_collection_only() {
        let store = setup().await;
        store
            .insert(Collection::Addressable, doc("a1", "X", json!({})))
            .await
            .unwrap();
        store
            .insert(Collection::Device, doc("d1", "X", json!({})))
            .await
            .unwrap();

        let err = store
            .insert(Collection::Addressable, doc("a2", "X", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateName { collection: Collection::Addressable, name } if name == "X"
        ));
    }

    #[tokio::test]
    async fn should_report_rename_onto_taken_name() {
        let store = setup().await;
        store
            .insert(Collection::Schedule, doc("s1", "S1", json!({})))
            .await
            .unwrap();
        store
            .insert(Collection::Schedule, doc("s2", "S2", json!({})))
            .await
            .unwrap();

        let err = store
            .replace(Collection::Schedule, doc("s2", "S1", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName { .. }));
        assert!(
            !store
                .replace(Collection::Schedule, doc("s9", "S9", json!({})))
                .await
                .unwrap()
        );
        assert!(
            store
                .replace(Collection::Schedule, doc("s2", "S3", json!({"name": "S3"})))
                .await
                .unwrap()
        );
        assert!(store.get_by_name(Collection::Schedule, "S3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn should_list_by_name_up_to_limit() {
        let store = setup().await;
        for (id, name) in [("3", "C"), ("1", "A"), ("2", "B")] {
            store
                .insert(Collection::Addressable, doc(id, name, json!({"name": name})))
                .await
                .unwrap();
        }
        let listed = store.list(Collection::Addressable, 2).await.unwrap();
        assert_eq!(listed, vec![json!({"name": "A"}), json!({"name": "B"})]);
    }

    #[tokio::test]
    async fn should_filter_on_nested_fields_and_arrays() {
        let store = setup().await;
        store
            .insert(
                Collection::Device,
                doc(
                    "d1",
                    "D1",
                    json!({
                        "addressable": {"id": "a1"},
                        "labels": ["indoor", "hvac"],
                        "port": 48080,
                    }),
                ),
            )
            .await
            .unwrap();
        store
            .insert(
                Collection::Device,
                doc("d2", "D2", json!({"addressable": {"id": "a2"}, "labels": []})),
            )
            .await
            .unwrap();

        let found = store
            .find(Collection::Device, &Filter::equals("addressable.id", "a1"), 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["addressable"]["id"], "a1");

        assert!(
            store
                .exists(Collection::Device, &Filter::contains("labels", "hvac"))
                .await
                .unwrap()
        );
        assert!(
            !store
                .exists(Collection::Device, &Filter::contains("labels", "outdoor"))
                .await
                .unwrap()
        );
        assert!(
            store
                .exists(Collection::Device, &Filter::equals("port", 48080))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn should_match_array_elements_by_field() {
        let store = setup().await;
        store
            .insert(
                Collection::DeviceProfile,
                doc(
                    "p1",
                    "P1",
                    json!({"commands": [{"id": "c1", "name": "C1"}, {"id": "c2", "name": "C2"}]}),
                ),
            )
            .await
            .unwrap();

        let hit = Filter::contains_where("commands", "name", "C2");
        let miss = Filter::contains_where("commands", "id", "c9");
        assert!(store.exists(Collection::DeviceProfile, &hit).await.unwrap());
        assert!(!store.exists(Collection::DeviceProfile, &miss).await.unwrap());
    }

    #[tokio::test]
    async fn should_match_keys_containing_dots() {
        let store = setup().await;
        store
            .insert(
                Collection::ProvisionWatcher,
                doc("w1", "W1", json!({"identifiers": {"mac.address": "00:11"}})),
            )
            .await
            .unwrap();
        let filter = Filter::equals(FieldPath::from("identifiers").child("mac.address"), "00:11");
        assert_eq!(
            store
                .find(Collection::ProvisionWatcher, &filter, 10)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn should_delete_once() {
        let store = setup().await;
        store
            .insert(Collection::Schedule, doc("s1", "S1", json!({})))
            .await
            .unwrap();
        assert!(store.delete(Collection::Schedule, "s1").await.unwrap());
        assert!(!store.delete(Collection::Schedule, "s1").await.unwrap());
    }

    #[tokio::test]
    async fn should_surface_duplicate_name_as_validation_through_typed_store() {
        let store = Store::new(Arc::new(setup().await), Limits::default());
        let a1 = Addressable::builder().name("A1").build().unwrap();
        store.insert(&a1).await.unwrap();

        let again = Addressable::builder().name("A1").build().unwrap();
        let err = store.insert(&again).await.unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::NameNotUnique(name)) if name == "A1"
        ));
        let stored: Addressable = store.get_by_name("A1").await.unwrap().unwrap();
        assert_eq!(stored, a1);
    }
}
