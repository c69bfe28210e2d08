use crate::model::{
    Book, BookDraft, DeleteBookError, ExistsBookError, FindBookError, ListBooksError, Page,
    PageRequest, SaveBookError,
};
use async_trait::async_trait;

/// The data-access surface the service needs, and nothing more.
#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    async fn find_all(&self, page: &PageRequest) -> Result<Page<Book>, ListBooksError>;

    async fn find_by_id(&self, id: i64) -> Result<Book, FindBookError>;

    /// Upserts keyed by `draft.id`; a draft without an id is inserted and
    /// given a store-assigned identity. Returns the persisted record.
    async fn save(&self, draft: &BookDraft) -> Result<Book, SaveBookError>;

    async fn exists_by_id(&self, id: i64) -> Result<bool, ExistsBookError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), DeleteBookError>;
}
