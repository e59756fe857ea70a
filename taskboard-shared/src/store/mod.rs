/// Document-store abstraction
///
/// The service treats its backing store as an external collaborator reached
/// through the [`Collection`] trait: typed CRUD over one collection of
/// documents, with filter/sort/skip/limit queries expressed by the types in
/// [`query`]. The only consistency primitive a backend must provide is
/// single-document atomicity; nothing here assumes cross-document
/// transactions.
///
/// [`memory`] provides the in-process implementation used by the server and
/// the test suites.
///
/// # Example
///
/// ```
/// use taskboard_shared::store::Store;
///
/// # async fn example() -> Result<(), taskboard_shared::store::StoreError> {
/// let store = Store::in_memory();
/// let users = store.users.find(&Default::default()).await?;
/// assert!(users.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod query;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::integrity::ReferenceIntegrity;
use crate::models::{Task, User};
use query::{Filter, ListQuery};

pub use memory::MemoryCollection;

/// A document type storable in a collection.
///
/// `FIELDS` lists the wire-format field names; caller-supplied filters,
/// sorts, and projections are validated against it before reaching the
/// store. `UNIQUE` names the fields the store must keep unique across the
/// collection.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used in logs
    const COLLECTION: &'static str;

    /// Wire-format field names of this document type
    const FIELDS: &'static [&'static str];

    /// Wire-format fields with a uniqueness constraint
    const UNIQUE: &'static [&'static str] = &[];

    /// The document's unique id
    fn id(&self) -> Uuid;
}

/// Store errors surfaced by a collection backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A declared-unique field already holds this value in another document
    #[error("duplicate value for unique field `{0}`")]
    UniqueViolation(&'static str),

    /// Document could not be encoded for storage or query evaluation
    #[error("document encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// CRUD interface over one collection of documents.
///
/// Every operation is atomic with respect to a single document; concurrent
/// writers to the same document are last-write-wins.
#[async_trait]
pub trait Collection<T: Document>: Send + Sync {
    /// Persists a new document.
    ///
    /// Fails with [`StoreError::UniqueViolation`] when a unique field
    /// collides with an existing document.
    async fn insert(&self, doc: &T) -> Result<(), StoreError>;

    /// Looks a document up by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    /// Returns the documents matching `query`, filtered, sorted, and
    /// paginated in that order.
    async fn find(&self, query: &ListQuery) -> Result<Vec<T>, StoreError>;

    /// Counts the documents matching `filter`.
    async fn count(&self, filter: &Filter) -> Result<u64, StoreError>;

    /// Replaces the document with the given id wholesale.
    ///
    /// Returns false when no such document exists.
    async fn replace(&self, id: Uuid, doc: &T) -> Result<bool, StoreError>;

    /// Deletes the document with the given id.
    ///
    /// Returns false when no such document exists.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Shared handle to a collection backend
pub type CollectionHandle<T> = Arc<dyn Collection<T>>;

/// The two typed collection handles the service operates on.
///
/// Built once at startup and injected into handlers; there is no hidden
/// module-level store state.
#[derive(Clone)]
pub struct Store {
    /// User collection
    pub users: CollectionHandle<User>,

    /// Task collection
    pub tasks: CollectionHandle<Task>,
}

impl Store {
    /// Creates a store backed by empty in-memory collections
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryCollection::<User>::new()),
            tasks: Arc::new(MemoryCollection::<Task>::new()),
        }
    }

    /// Returns the reference-integrity manager over this store's collections
    pub fn integrity(&self) -> ReferenceIntegrity {
        ReferenceIntegrity::new(self.users.clone(), self.tasks.clone())
    }
}
