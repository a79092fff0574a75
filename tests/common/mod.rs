#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use bookshelf::app::{build_router, AppState};
use bookshelf::db::author_repository::{AuthorRepository, MongoAuthorRepository};
use bookshelf::db::book_repository::{BookRepository, MongoBookRepository};
use bookshelf::db::models::{Author, Book, BookFields};
use bookshelf::rendering::templates::Templates;
use bookshelf::utils::date::parse_date;

/// Holds the running MongoDB container and provides the Axum router for integration tests.
///
/// The container is kept alive for as long as this struct lives. When dropped,
/// it is stopped and cleaned up automatically.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub router: Router,
    pub books: Arc<dyn BookRepository>,
    pub authors: Arc<dyn AuthorRepository>,
}

impl TestEnv {
    /// Spin up MongoDB and build an Axum router wired to real repositories.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let mongo_db = mongo_client.database("bookshelf_test");

        let books: Arc<dyn BookRepository> = Arc::new(MongoBookRepository::new(&mongo_db));
        let authors: Arc<dyn AuthorRepository> = Arc::new(MongoAuthorRepository::new(&mongo_db));

        let app_state = AppState {
            book_repo: books.clone(),
            author_repo: authors.clone(),
            templates: Arc::new(Templates::new().expect("Failed to compile templates")),
        };
        let router = build_router(app_state, "public");

        Self {
            _mongo: mongo_container,
            router,
            books,
            authors,
        }
    }

    /// Build a `TestServer` that leaves redirects and error statuses to the test.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }

    /// Helper: insert an author directly through the repository.
    pub async fn create_author(&self, name: &str) -> ObjectId {
        self.authors
            .insert(Author {
                id: None,
                name: name.to_string(),
            })
            .await
            .expect("Failed to insert author")
    }

    /// Helper: insert a book directly through the repository.
    pub async fn create_book(&self, title: &str, author: ObjectId, published: &str) -> ObjectId {
        let book = Book::new(
            BookFields {
                title: title.to_string(),
                author,
                publish_date: parse_date(published).expect("valid test date"),
                page_count: 100,
                description: None,
            },
            Utc::now(),
        );
        self.books.insert(book).await.expect("Failed to insert book")
    }
}

/// The `Location` header of a redirect response.
pub fn location(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get("location")
        .expect("response should redirect")
        .to_str()
        .unwrap()
        .to_string()
}

/// The id at the end of a `/books/{id}` or `/authors/{id}` location.
pub fn id_from_location(location: &str) -> ObjectId {
    let hex = location.rsplit('/').next().unwrap();
    ObjectId::parse_str(hex).expect("location should end with an object id")
}
