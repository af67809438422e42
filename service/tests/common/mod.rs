#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{self, Request};
use http_body_util::BodyExt;
use mock_server::Db;
use serde_json::Value;
use treat_core::{HttpMethod, HttpRequest, HttpResponse, NotionClient, SchemaVersion};
use treat_sync::{Transport, TransportError, TreatStore, UreqTransport};

/// Counts the requests that reach Notion, split by what they do.
#[derive(Default)]
pub struct Counting {
    inner: UreqTransport,
    pub queries: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
}

impl Counting {
    pub fn total(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
            + self.creates.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
    }
}

impl Transport for Counting {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let counter = match request.method {
            HttpMethod::Patch => &self.updates,
            HttpMethod::Post if request.url.ends_with("/query") => &self.queries,
            HttpMethod::Post => &self.creates,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(request)
    }
}

/// Serve `db` on a random port from its own thread; returns the base URL.
pub fn start_mock(db: Db) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_db(listener, db).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

pub struct Harness {
    pub db: Db,
    pub transport: Arc<Counting>,
    pub store: Arc<TreatStore>,
}

pub fn harness() -> Harness {
    harness_for(mock_server::DATABASE_ID)
}

pub fn harness_for(database_id: &str) -> Harness {
    let db = mock_server::new_db();
    let base_url = start_mock(db.clone());
    let transport = Arc::new(Counting::default());
    let store = Arc::new(TreatStore::new(
        NotionClient::new(&base_url, "secret_test"),
        transport.clone(),
        database_id,
        SchemaVersion::Select,
    ));
    Harness { db, transport, store }
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

pub fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}
