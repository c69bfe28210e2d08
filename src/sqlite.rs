use crate::model::{
    Author, Book, BookDraft, DeleteBookError, ExistsBookError, FindBookError, ListBooksError, Page,
    PageRequest, SaveBookError,
};
use crate::store::BookRepository;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!();

const BOOK_SELECT: &str = "SELECT book.id, book.title, book.genre, book.author_id, \
     author.name AS author_name \
     FROM book LEFT JOIN author ON author.id = book.author_id";

pub async fn establish_pool(path: &str) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(path)
        .with_context(|| format!("Invalid database path {path}"))?
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);
    let pool = SqlitePool::connect_with(opts)
        .await
        .with_context(|| format!("Failed to open database at {path}"))?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct Sqlite {
    pool: SqlitePool,
}

impl Sqlite {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let title = row.try_get("title")?;
        let genre = row.try_get("genre")?;
        let author_id: Option<i64> = row.try_get("author_id")?;

        let author = match author_id {
            Some(author_id) => Some(Author::new(author_id, row.try_get("author_name")?)),
            None => None,
        };
        Ok(Self::new(id, title, genre, author))
    }
}

#[async_trait]
impl BookRepository for Sqlite {
    async fn find_all(&self, page: &PageRequest) -> Result<Page<Book>, ListBooksError> {
        // Sort column and direction come from closed enums, never from raw input.
        let query = format!(
            "{BOOK_SELECT} ORDER BY book.{} {} LIMIT ? OFFSET ?",
            page.sort().field().column(),
            page.sort().direction().keyword(),
        );
        let books: Vec<Book> = sqlx::query_as(&query)
            .bind(i64::from(page.size()))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to retrieve books");
                ListBooksError(err)
            })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to count books");
                ListBooksError(err)
            })?;

        Ok(Page::new(
            books,
            total.unsigned_abs(),
            page.page(),
            page.size(),
        ))
    }

    async fn find_by_id(&self, id: i64) -> Result<Book, FindBookError> {
        let query = format!("{BOOK_SELECT} WHERE book.id = ?");
        let book = sqlx::query_as(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if matches!(err, sqlx::Error::RowNotFound) {
                    FindBookError::NotFound { id }
                } else {
                    let err =
                        anyhow!(err).context(format!(r#"Failed to retrieve book with id "{id}""#));
                    FindBookError::Other(err)
                }
            })?;

        Ok(book)
    }

    async fn save(&self, draft: &BookDraft) -> Result<Book, SaveBookError> {
        // A NULL id lets the integer primary key assign one; a present id
        // either replaces that row or inserts it anew.
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO book (id, title, genre, author_id) VALUES (?, ?, ?, ?) \
             ON CONFLICT (id) DO UPDATE \
             SET title = excluded.title, genre = excluded.genre, author_id = excluded.author_id \
             RETURNING id",
        )
        .bind(draft.id())
        .bind(draft.title())
        .bind(draft.genre())
        .bind(draft.author_id())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            let err = anyhow!(err).context(format!(
                r#"Failed to save book with title "{}""#,
                draft.title()
            ));
            SaveBookError(err)
        })?;

        // Re-read so the response carries the joined author.
        self.find_by_id(id).await.map_err(|err| match err {
            FindBookError::NotFound { id } => {
                SaveBookError(anyhow!(r#"Book with id "{id}" vanished after save"#))
            }
            FindBookError::Other(err) => SaveBookError(err),
        })
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ExistsBookError> {
        let exists = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM book WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err)
                    .context(format!(r#"Failed to check existence of book with id "{id}""#));
                ExistsBookError(err)
            })?;

        Ok(exists)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DeleteBookError> {
        sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context(format!(r#"Failed to delete book with id "{id}""#));
                DeleteBookError::Other(err)
            })?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // Every pooled connection to `sqlite::memory:` would get its own empty
    // database, so tests pin the pool to a single connection.
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    pool
}
