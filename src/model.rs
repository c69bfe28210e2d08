use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    id: i64,
    name: String,
}

impl Author {
    #[must_use]
    pub const fn new(id: i64, name: String) -> Self {
        Self { id, name }
    }

    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A persisted book record, with its author resolved (if it has one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: i64,
    title: String,
    genre: String,
    author: Option<Author>,
}

impl Book {
    #[must_use]
    pub const fn new(id: i64, title: String, genre: String, author: Option<Author>) -> Self {
        Self {
            id,
            title,
            genre,
            author,
        }
    }

    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn genre(&self) -> &str {
        &self.genre
    }

    #[must_use]
    pub const fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }
}

/// Book fields as supplied by a caller, before the store has assigned (or
/// confirmed) an identity. `id: None` means the store picks one on save.
#[derive(Debug, Clone)]
pub struct BookDraft {
    id: Option<i64>,
    title: String,
    genre: String,
    author_id: Option<i64>,
}

impl BookDraft {
    #[must_use]
    pub const fn new(title: String, genre: String, author_id: Option<i64>) -> Self {
        Self {
            id: None,
            title,
            genre,
            author_id,
        }
    }

    #[must_use]
    pub const fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn genre(&self) -> &str {
        &self.genre
    }

    #[must_use]
    pub const fn author_id(&self) -> Option<i64> {
        self.author_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Genre,
}

impl SortField {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Genre => "genre",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    field: SortField,
    direction: SortDirection,
}

impl Sort {
    #[must_use]
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parses `field` or `field,direction` (e.g. `title,desc`). Only book
    /// properties are sortable; anything else is rejected.
    pub fn parse(raw: &str) -> Result<Self, SortParseError> {
        let (field, direction) = match raw.split_once(',') {
            Some((field, direction)) => (field.trim(), direction.trim()),
            None => (raw.trim(), "asc"),
        };

        let field = match field {
            "id" => SortField::Id,
            "title" => SortField::Title,
            "genre" => SortField::Genre,
            _ => return Err(SortParseError(raw.into())),
        };
        let direction = if direction.eq_ignore_ascii_case("asc") {
            SortDirection::Ascending
        } else if direction.eq_ignore_ascii_case("desc") {
            SortDirection::Descending
        } else {
            return Err(SortParseError(raw.into()));
        };

        Ok(Self { field, direction })
    }

    #[must_use]
    pub const fn field(&self) -> SortField {
        self.field
    }

    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::new(SortField::Id, SortDirection::Ascending)
    }
}

#[derive(Error, Debug)]
#[error("\"{0}\" is not a valid sort expression")]
pub struct SortParseError(String);

/// Which slice of the book list to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u32, size: u32, sort: Sort) -> Self {
        Self {
            page,
            size: size.max(1),
            sort,
        }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub const fn sort(&self) -> Sort {
        self.sort
    }

    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.page as i64 * self.size as i64
    }
}

/// One slice of a result set plus the total count it was cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    page: u32,
    size: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, page: u32, size: u32) -> Self {
        Self {
            items,
            total,
            page,
            size,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub const fn total_elements(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            self.total.div_ceil(u64::from(self.size))
        }
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub const fn first(&self) -> bool {
        self.page == 0
    }

    #[must_use]
    pub fn last(&self) -> bool {
        u64::from(self.page) + 1 >= self.total_pages()
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ListBooksError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
pub enum FindBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct SaveBookError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ExistsBookError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
#[error(transparent)]
pub struct CreateBookError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
pub enum UpdateBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
pub enum DeleteBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}
