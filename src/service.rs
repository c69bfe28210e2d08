use crate::model::{
    Book, BookDraft, CreateBookError, DeleteBookError, FindBookError, ListBooksError, Page,
    PageRequest, UpdateBookError,
};
use crate::store::BookRepository;

/// Orchestrates the five book operations over a repository. The only logic of
/// its own is the existence guard before update and delete, and discarding
/// caller-supplied ids on create.
#[derive(Debug)]
pub struct BookService<R> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    #[must_use]
    pub const fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn get_all_books(&self, page: &PageRequest) -> Result<Page<Book>, ListBooksError> {
        self.repo.find_all(page).await
    }

    pub async fn get_book_by_id(&self, id: i64) -> Result<Book, FindBookError> {
        self.repo.find_by_id(id).await
    }

    /// Persists a new book; any id on the draft is discarded and the store
    /// assigns one.
    pub async fn create_book(&self, draft: &BookDraft) -> Result<Book, CreateBookError> {
        let draft = BookDraft::new(
            draft.title().to_owned(),
            draft.genre().to_owned(),
            draft.author_id(),
        );
        self.repo
            .save(&draft)
            .await
            .map_err(|err| CreateBookError(err.0))
    }

    /// Full replace keyed by `id`: the stored record ends up matching the
    /// draft exactly, except its id, which is always `id`.
    ///
    /// The existence check and the save are separate statements, so a
    /// concurrent delete of the same id can slip between them.
    pub async fn update_book(&self, id: i64, draft: &BookDraft) -> Result<Book, UpdateBookError> {
        let exists = self
            .repo
            .exists_by_id(id)
            .await
            .map_err(|err| UpdateBookError::Other(err.0))?;
        if !exists {
            return Err(UpdateBookError::NotFound { id });
        }

        let draft = BookDraft::new(
            draft.title().to_owned(),
            draft.genre().to_owned(),
            draft.author_id(),
        )
        .with_id(id);
        self.repo
            .save(&draft)
            .await
            .map_err(|err| UpdateBookError::Other(err.0))
    }

    pub async fn delete_book(&self, id: i64) -> Result<(), DeleteBookError> {
        let exists = self
            .repo
            .exists_by_id(id)
            .await
            .map_err(|err| DeleteBookError::Other(err.0))?;
        if !exists {
            return Err(DeleteBookError::NotFound { id });
        }

        self.repo.delete_by_id(id).await
    }
}
