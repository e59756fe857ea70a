/// In-memory collection backend
///
/// Insertion-ordered storage behind `tokio::sync::RwLock`, giving exactly
/// the consistency envelope the service assumes of its store: each insert,
/// replace, or delete is atomic for one document, and nothing spans
/// documents. Filters and sorts evaluate against each document's JSON
/// serialization, so the backend needs no knowledge of the schema beyond
/// the `Document` impl.
///
/// Declared-unique fields are enforced on insert and replace; a collision
/// surfaces as [`StoreError::UniqueViolation`], the in-process analogue of
/// a database unique-index error.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::query::{Filter, ListQuery};
use super::{Collection, Document, StoreError};

/// Insertion-ordered in-memory collection
pub struct MemoryCollection<T: Document> {
    docs: RwLock<Vec<T>>,
}

impl<T: Document> MemoryCollection<T> {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }

    /// Rejects `candidate` when a unique field collides with another
    /// document. `skip_id` exempts the document being replaced.
    fn check_unique(
        existing: &[T],
        candidate: &Value,
        skip_id: Option<Uuid>,
    ) -> Result<(), StoreError> {
        if T::UNIQUE.is_empty() {
            return Ok(());
        }
        for doc in existing {
            if skip_id == Some(doc.id()) {
                continue;
            }
            let other = serde_json::to_value(doc)?;
            for field in T::UNIQUE {
                if candidate.get(*field).is_some()
                    && candidate.get(*field) == other.get(*field)
                {
                    return Err(StoreError::UniqueViolation(*field));
                }
            }
        }
        Ok(())
    }
}

impl<T: Document> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> Collection<T> for MemoryCollection<T> {
    async fn insert(&self, doc: &T) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let candidate = serde_json::to_value(doc)?;
        Self::check_unique(&docs, &candidate, None)?;
        docs.push(doc.clone());
        tracing::debug!(collection = T::COLLECTION, id = %doc.id(), "document inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|doc| doc.id() == id).cloned())
    }

    async fn find(&self, query: &ListQuery) -> Result<Vec<T>, StoreError> {
        let docs = self.docs.read().await;

        let mut rows: Vec<(usize, Value)> = Vec::with_capacity(docs.len());
        for (index, doc) in docs.iter().enumerate() {
            let value = serde_json::to_value(doc)?;
            if query.filter.matches(&value) {
                rows.push((index, value));
            }
        }

        if !query.sort.is_empty() {
            // sort_by is stable, ties keep insertion order
            rows.sort_by(|a, b| query.sort.compare(&a.1, &b.1));
        }

        let selected = rows.into_iter().skip(query.skip as usize);
        let matched: Vec<T> = match query.limit {
            Some(limit) => selected
                .take(limit as usize)
                .map(|(index, _)| docs[index].clone())
                .collect(),
            None => selected.map(|(index, _)| docs[index].clone()).collect(),
        };
        Ok(matched)
    }

    async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        let docs = self.docs.read().await;
        let mut total = 0;
        for doc in docs.iter() {
            if filter.matches(&serde_json::to_value(doc)?) {
                total += 1;
            }
        }
        Ok(total)
    }

    async fn replace(&self, id: Uuid, doc: &T) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(position) = docs.iter().position(|existing| existing.id() == id) else {
            return Ok(false);
        };
        let candidate = serde_json::to_value(doc)?;
        Self::check_unique(&docs, &candidate, Some(id))?;
        docs[position] = doc.clone();
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(position) = docs.iter().position(|existing| existing.id() == id) else {
            return Ok(false);
        };
        docs.remove(position);
        tracing::debug!(collection = T::COLLECTION, id = %id, "document deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::parse_deadline;
    use crate::models::{Task, User};
    use crate::store::query::{Projection, Sort};
    use serde_json::json;

    fn user(name: &str, email: &str) -> User {
        User::new(name.to_string(), email.to_string(), vec![])
    }

    fn task(name: &str, deadline: &str, completed: bool) -> Task {
        Task::new(
            name.to_string(),
            String::new(),
            parse_deadline(deadline).unwrap(),
            completed,
        )
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let collection = MemoryCollection::<User>::new();
        let ada = user("Ada", "ada@example.com");

        collection.insert(&ada).await.unwrap();

        let found = collection.find_by_id(ada.id).await.unwrap().unwrap();
        assert_eq!(found.email, "ada@example.com");

        let missing = collection.find_by_id(Uuid::new_v4()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let collection = MemoryCollection::<User>::new();
        collection.insert(&user("Ada", "ada@example.com")).await.unwrap();

        let err = collection
            .insert(&user("Imposter", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation("email")));
    }

    #[tokio::test]
    async fn test_replace_enforces_unique_but_allows_self() {
        let collection = MemoryCollection::<User>::new();
        let mut ada = user("Ada", "ada@example.com");
        let grace = user("Grace", "grace@example.com");
        collection.insert(&ada).await.unwrap();
        collection.insert(&grace).await.unwrap();

        // keeping your own email is not a collision
        ada.name = "Ada L.".to_string();
        assert!(collection.replace(ada.id, &ada).await.unwrap());

        // taking someone else's is
        ada.email = "grace@example.com".to_string();
        let err = collection.replace(ada.id, &ada).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation("email")));
    }

    #[tokio::test]
    async fn test_replace_missing_returns_false() {
        let collection = MemoryCollection::<User>::new();
        let ghost = user("Ghost", "ghost@example.com");
        assert!(!collection.replace(ghost.id, &ghost).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let collection = MemoryCollection::<User>::new();
        let ada = user("Ada", "ada@example.com");
        collection.insert(&ada).await.unwrap();

        assert!(collection.delete(ada.id).await.unwrap());
        assert!(!collection.delete(ada.id).await.unwrap());
        assert!(collection.find_by_id(ada.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_filter_sort_skip_limit() {
        let collection = MemoryCollection::<Task>::new();
        collection.insert(&task("c", "2025-03-01", false)).await.unwrap();
        collection.insert(&task("a", "2025-01-01", false)).await.unwrap();
        collection.insert(&task("done", "2025-02-01", true)).await.unwrap();
        collection.insert(&task("b", "2025-02-01", false)).await.unwrap();

        let query = ListQuery {
            filter: Filter::parse(&json!({"completed": false}), Task::FIELDS).unwrap(),
            sort: Sort::parse(&json!({"deadline": 1}), Task::FIELDS).unwrap(),
            skip: 1,
            limit: Some(1),
        };
        let found = collection.find(&query).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "b");
    }

    #[tokio::test]
    async fn test_find_unbounded_preserves_insertion_order() {
        let collection = MemoryCollection::<Task>::new();
        collection.insert(&task("first", "2025-03-01", false)).await.unwrap();
        collection.insert(&task("second", "2025-01-01", false)).await.unwrap();

        let found = collection.find(&ListQuery::default()).await.unwrap();
        let names: Vec<_> = found.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[tokio::test]
    async fn test_count_with_filter() {
        let collection = MemoryCollection::<Task>::new();
        collection.insert(&task("a", "2025-01-01", false)).await.unwrap();
        collection.insert(&task("b", "2025-01-01", true)).await.unwrap();

        let filter = Filter::parse(&json!({"completed": true}), Task::FIELDS).unwrap();
        assert_eq!(collection.count(&filter).await.unwrap(), 1);
        assert_eq!(collection.count(&Filter::default()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_projection_applies_to_serialized_docs() {
        // projection itself lives in the query layer; this pins the shape
        // handlers rely on when stripping fields from find() output
        let collection = MemoryCollection::<User>::new();
        let ada = user("Ada", "ada@example.com");
        collection.insert(&ada).await.unwrap();

        let found = collection.find(&ListQuery::default()).await.unwrap();
        let mut value = serde_json::to_value(&found[0]).unwrap();
        let projection = Projection::parse(&json!({"email": 1}), User::FIELDS).unwrap();
        projection.apply(&mut value);

        assert_eq!(value, json!({"id": ada.id, "email": "ada@example.com"}));
    }
}
