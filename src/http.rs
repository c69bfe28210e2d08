pub mod handler;

use crate::service::BookService;
use crate::store::BookRepository;
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Debug)]
pub struct AppState<R: BookRepository> {
    pub service: Arc<BookService<R>>,
}

impl<R: BookRepository> AppState<R> {
    pub fn new(service: BookService<R>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<R: BookRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
}

impl HttpServerConfig {
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<R: BookRepository>(
        state: AppState<R>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        let router = Router::new()
            .nest("/api", api_routes())
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!("listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router)
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

fn api_routes<R: BookRepository>() -> Router<AppState<R>> {
    Router::new()
        .route(
            "/books",
            get(handler::get_all_books).post(handler::create_book),
        )
        .route(
            "/books/{id}",
            get(handler::get_book_by_id)
                .put(handler::update_book)
                .delete(handler::delete_book),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::{Sqlite, memory_pool};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    async fn test_app() -> (Router, SqlitePool) {
        let pool = memory_pool().await;
        let state = AppState::new(BookService::new(Sqlite::new(pool.clone())));
        let router = Router::new().nest("/api", api_routes()).with_state(state);
        (router, pool)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn post_creates_a_book_with_a_generated_id() {
        let (app, _pool) = test_app().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/books",
                json!({"title": "Test Book", "genre": "Fiction"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        assert_eq!(body["id"], json!(1));
        assert_eq!(body["title"], json!("Test Book"));
        assert_eq!(body["genre"], json!("Fiction"));
        assert_eq!(body["author"], Value::Null);
    }

    #[tokio::test]
    async fn post_ignores_a_client_supplied_id() {
        let (app, _pool) = test_app().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/books",
                json!({"id": 999, "title": "Test Book", "genre": "Fiction"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        assert_eq!(body["id"], json!(1));
    }

    #[tokio::test]
    async fn post_nests_the_referenced_author() {
        let (app, pool) = test_app().await;
        let author_id: i64 = sqlx::query_scalar("INSERT INTO author (name) VALUES (?) RETURNING id")
            .bind("Frank Herbert")
            .fetch_one(&pool)
            .await
            .unwrap();

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/books",
                json!({"title": "Dune", "genre": "Science Fiction", "author": {"id": author_id}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        assert_eq!(body["author"]["id"], json!(author_id));
        assert_eq!(body["author"]["name"], json!("Frank Herbert"));
    }

    #[tokio::test]
    async fn get_by_id_round_trips_a_created_book() {
        let (app, _pool) = test_app().await;

        let created = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/books",
                json!({"title": "Test Book", "genre": "Fiction"}),
            ))
            .await
            .unwrap();
        let created = response_json(created).await;

        let response = app
            .oneshot(empty_request("GET", "/api/books/1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await, created);
    }

    #[tokio::test]
    async fn get_by_id_returns_404_when_absent() {
        let (app, _pool) = test_app().await;

        let response = app
            .oneshot(empty_request("GET", "/api/books/999"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response_json(response).await;
        assert_eq!(body["statusCode"], json!(404));
    }

    #[tokio::test]
    async fn put_replaces_the_whole_record() {
        let (app, _pool) = test_app().await;
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/books",
                json!({"title": "Old Title", "genre": "Old Genre"}),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/books/1",
                json!({"id": 42, "title": "New Title", "genre": "New Genre"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(
            body,
            json!({"id": 1, "title": "New Title", "genre": "New Genre", "author": null})
        );
    }

    #[tokio::test]
    async fn put_returns_404_when_absent() {
        let (app, _pool) = test_app().await;

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/books/1",
                json!({"title": "New Title", "genre": "New Genre"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_get_returns_404() {
        let (app, _pool) = test_app().await;
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/books",
                json!({"title": "Test Book", "genre": "Fiction"}),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/api/books/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(empty_request("GET", "/api/books/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_returns_404_when_absent() {
        let (app, _pool) = test_app().await;

        let response = app
            .oneshot(empty_request("DELETE", "/api/books/1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_pages_with_spring_style_metadata() {
        let (app, _pool) = test_app().await;
        for title in ["Carrie", "Animal Farm", "Beloved"] {
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/api/books",
                    json!({"title": title, "genre": "Fiction"}),
                ))
                .await
                .unwrap();
        }

        let response = app
            .oneshot(empty_request(
                "GET",
                "/api/books?page=0&size=2&sort=title,desc",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["totalElements"], json!(3));
        assert_eq!(body["totalPages"], json!(2));
        assert_eq!(body["number"], json!(0));
        assert_eq!(body["size"], json!(2));
        assert_eq!(body["numberOfElements"], json!(2));
        assert_eq!(body["first"], json!(true));
        assert_eq!(body["last"], json!(false));
        assert_eq!(body["content"][0]["title"], json!("Carrie"));
        assert_eq!(body["content"][1]["title"], json!("Beloved"));
    }

    #[tokio::test]
    async fn list_defaults_to_page_0_size_10_sorted_by_id() {
        let (app, _pool) = test_app().await;
        for title in ["B", "A"] {
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/api/books",
                    json!({"title": title, "genre": "Fiction"}),
                ))
                .await
                .unwrap();
        }

        let response = app.oneshot(empty_request("GET", "/api/books")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["size"], json!(10));
        assert_eq!(body["content"][0]["id"], json!(1));
        assert_eq!(body["content"][0]["title"], json!("B"));
    }

    #[tokio::test]
    async fn list_rejects_an_unknown_sort_property() {
        let (app, _pool) = test_app().await;

        let response = app
            .oneshot(empty_request("GET", "/api/books?sort=isbn"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
