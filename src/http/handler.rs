use crate::http::AppState;
use crate::model::{
    Author, Book, BookDraft, CreateBookError, DeleteBookError, FindBookError, ListBooksError,
    Page, PageRequest, Sort, SortParseError, UpdateBookError,
};
use crate::store::BookRepository;
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub const fn new(status: StatusCode, data: T) -> Self {
        Self(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    UnprocessableEntity(String),
    InternalServerError(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    status_code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = ApiErrorBody {
            status_code: status.as_u16(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

fn internal_error(cause: &anyhow::Error) -> ApiError {
    tracing::error!("{cause:#}");
    ApiError::InternalServerError("Internal server error".to_string())
}

impl From<ListBooksError> for ApiError {
    fn from(err: ListBooksError) -> Self {
        internal_error(&err.0)
    }
}

impl From<FindBookError> for ApiError {
    fn from(err: FindBookError) -> Self {
        match err {
            FindBookError::NotFound { .. } => Self::NotFound(err.to_string()),
            FindBookError::Other(cause) => internal_error(&cause),
        }
    }
}

impl From<CreateBookError> for ApiError {
    fn from(err: CreateBookError) -> Self {
        internal_error(&err.0)
    }
}

impl From<UpdateBookError> for ApiError {
    fn from(err: UpdateBookError) -> Self {
        match err {
            UpdateBookError::NotFound { .. } => Self::NotFound(err.to_string()),
            UpdateBookError::Other(cause) => internal_error(&cause),
        }
    }
}

impl From<DeleteBookError> for ApiError {
    fn from(err: DeleteBookError) -> Self {
        match err {
            DeleteBookError::NotFound { .. } => Self::NotFound(err.to_string()),
            DeleteBookError::Other(cause) => internal_error(&cause),
        }
    }
}

impl From<SortParseError> for ApiError {
    fn from(err: SortParseError) -> Self {
        Self::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    page: Option<u32>,
    size: Option<u32>,
    sort: Option<String>,
}

impl TryFrom<ListBooksQuery> for PageRequest {
    type Error = SortParseError;

    fn try_from(query: ListBooksQuery) -> Result<Self, Self::Error> {
        let sort = match query.sort {
            Some(raw) => Sort::parse(&raw)?,
            None => Sort::default(),
        };
        Ok(Self::new(
            query.page.unwrap_or(0),
            query.size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort,
        ))
    }
}

/// Incoming book body. A nested `author` object only contributes its id; an
/// `id` at the top level is ignored on create and overridden on update.
#[derive(Debug, Deserialize)]
pub struct BookHttpRequest {
    #[serde(default)]
    #[allow(dead_code)]
    id: Option<i64>,
    title: String,
    genre: String,
    #[serde(default)]
    author: Option<AuthorRefHttpRequest>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorRefHttpRequest {
    id: i64,
}

impl From<BookHttpRequest> for BookDraft {
    fn from(body: BookHttpRequest) -> Self {
        Self::new(body.title, body.genre, body.author.map(|author| author.id))
    }
}

#[derive(Debug, Serialize)]
pub struct BookHttpResponse {
    id: i64,
    title: String,
    genre: String,
    author: Option<AuthorHttpResponse>,
}

#[derive(Debug, Serialize)]
pub struct AuthorHttpResponse {
    id: i64,
    name: String,
}

impl From<Author> for AuthorHttpResponse {
    fn from(author: Author) -> Self {
        Self {
            id: author.id(),
            name: author.name().to_owned(),
        }
    }
}

impl From<Book> for BookHttpResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id(),
            title: book.title().to_owned(),
            genre: book.genre().to_owned(),
            author: book.author().cloned().map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHttpResponse<T> {
    content: Vec<T>,
    total_elements: u64,
    total_pages: u64,
    size: u32,
    number: u32,
    number_of_elements: usize,
    first: bool,
    last: bool,
}

impl From<Page<Book>> for PageHttpResponse<BookHttpResponse> {
    fn from(page: Page<Book>) -> Self {
        let total_elements = page.total_elements();
        let total_pages = page.total_pages();
        let size = page.size();
        let number = page.number();
        let first = page.first();
        let last = page.last();
        let content: Vec<BookHttpResponse> =
            page.into_items().into_iter().map(Into::into).collect();
        Self {
            number_of_elements: content.len(),
            content,
            total_elements,
            total_pages,
            size,
            number,
            first,
            last,
        }
    }
}

pub async fn get_all_books<R: BookRepository>(
    State(state): State<AppState<R>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<ApiSuccess<PageHttpResponse<BookHttpResponse>>, ApiError> {
    let page_request = query.try_into()?;
    state
        .service
        .get_all_books(&page_request)
        .await
        .map_err(ApiError::from)
        .map(|page| ApiSuccess::new(StatusCode::OK, page.into()))
}

pub async fn get_book_by_id<R: BookRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    state
        .service
        .get_book_by_id(id)
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::OK, book.into()))
}

pub async fn create_book<R: BookRepository>(
    State(state): State<AppState<R>>,
    Json(body): Json<BookHttpRequest>,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    let draft = body.into();
    state
        .service
        .create_book(&draft)
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::CREATED, book.into()))
}

pub async fn update_book<R: BookRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
    Json(body): Json<BookHttpRequest>,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    let draft = body.into();
    state
        .service
        .update_book(id, &draft)
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::OK, book.into()))
}

pub async fn delete_book<R: BookRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
