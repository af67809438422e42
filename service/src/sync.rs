//! Upsert and export pipelines over the treat database.
//!
//! Both run on the blocking pool: every remote call is a synchronous
//! round-trip. Upserts are not transactional; a failure stops the batch and
//! leaves earlier records written. Two concurrent upserts of a new name can
//! both miss the lookup and create duplicates.

use serde::Serialize;
use tracing::{debug, info};
use treat_core::client::MAX_PAGE_SIZE;
use treat_core::{extract_record, format_properties, QueryDatabase, TreatRecord};

use crate::store::{StoreError, TreatStore};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub created: usize,
    pub updated: usize,
}

/// Create or update each record, in order, keyed by its name.
pub fn upsert_treats(
    store: &TreatStore,
    items: &[TreatRecord],
) -> Result<UpsertSummary, StoreError> {
    let mut summary = UpsertSummary::default();
    for item in items {
        let properties = format_properties(item, store.schema());
        match store.find_by_name(&item.name)? {
            Some(page) => {
                store.update(&page.id, properties)?;
                debug!(name = %item.name, page_id = %page.id, "updated treat");
                summary.updated += 1;
            }
            None => {
                let page = store.create(properties)?;
                debug!(name = %item.name, page_id = %page.id, "created treat");
                summary.created += 1;
            }
        }
    }
    info!(
        created = summary.created,
        updated = summary.updated,
        total = items.len(),
        "upsert finished"
    );
    Ok(summary)
}

/// Every record in the database, in the order Notion returns them.
pub fn export_treats(store: &TreatStore) -> Result<Vec<TreatRecord>, StoreError> {
    let mut records = Vec::new();
    let mut cursor = None;
    let mut fetches = 0usize;
    loop {
        let query = QueryDatabase {
            filter: None,
            start_cursor: cursor.take(),
            page_size: Some(MAX_PAGE_SIZE),
        };
        let batch = store.query(&query)?;
        fetches += 1;
        records.extend(batch.results.iter().map(|page| extract_record(&page.properties)));

        match (batch.has_more, batch.next_cursor) {
            (true, Some(next)) => cursor = Some(next),
            (true, None) => {
                debug!("has_more without next_cursor, stopping");
                break;
            }
            (false, _) => break,
        }
    }
    info!(records = records.len(), fetches, "export finished");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Transport, TransportError};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use treat_core::{HttpMethod, HttpRequest, HttpResponse, NotionClient, SchemaVersion};

    /// Replays canned responses and keeps every request it was given.
    #[derive(Default)]
    struct Scripted {
        responses: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn reply(&self, status: u16, body: Value) {
            self.responses.lock().unwrap().push_back(HttpResponse {
                status,
                body: body.to_string(),
            });
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request"))
        }
    }

    fn store(transport: Arc<Scripted>) -> TreatStore {
        TreatStore::new(
            NotionClient::new("http://notion.test", "secret"),
            transport,
            "db-1",
            SchemaVersion::Select,
        )
    }

    fn body(request: &HttpRequest) -> Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    fn page(id: &str, name: &str) -> Value {
        json!({"id": id, "properties": {
            "Treat Name": {"type": "title", "title": [{"plain_text": name}]}
        }})
    }

    fn named(name: &str) -> TreatRecord {
        TreatRecord {
            name: name.to_string(),
            ..TreatRecord::default()
        }
    }

    #[test]
    fn unknown_name_is_created() {
        let transport = Arc::new(Scripted::default());
        transport.reply(200, json!({"results": [], "has_more": false, "next_cursor": null}));
        transport.reply(200, page("new-1", "Broa"));

        let summary = upsert_treats(&store(transport.clone()), &[named("Broa")]).unwrap();
        assert_eq!(summary, UpsertSummary { created: 1, updated: 0 });

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            body(&requests[0])["filter"],
            json!({"property": "Treat Name", "title": {"equals": "Broa"}})
        );
        assert_eq!(requests[1].method, HttpMethod::Post);
        assert_eq!(requests[1].url, "http://notion.test/v1/pages");
        assert_eq!(body(&requests[1])["parent"], json!({"database_id": "db-1"}));
    }

    #[test]
    fn known_name_updates_matched_page() {
        let transport = Arc::new(Scripted::default());
        transport.reply(200, json!({"results": [page("page-7", "Broa")], "has_more": false}));
        transport.reply(200, page("page-7", "Broa"));

        let summary = upsert_treats(&store(transport.clone()), &[named("Broa")]).unwrap();
        assert_eq!(summary, UpsertSummary { created: 0, updated: 1 });

        let requests = transport.requests();
        assert_eq!(requests[1].method, HttpMethod::Patch);
        assert_eq!(requests[1].url, "http://notion.test/v1/pages/page-7");
    }

    #[test]
    fn failure_stops_the_batch() {
        let transport = Arc::new(Scripted::default());
        transport.reply(200, json!({"results": [], "has_more": false}));
        transport.reply(200, page("new-1", "Broa"));
        transport.reply(200, json!({"results": [], "has_more": false}));
        transport.reply(
            400,
            json!({"object": "error", "status": 400, "code": "validation_error", "message": "bad"}),
        );

        let items = [named("Broa"), named("Bolo"), named("Queijada")];
        let err = upsert_treats(&store(transport.clone()), &items).unwrap_err();
        assert!(matches!(err, StoreError::Api(treat_core::ApiError::HttpError { status: 400, .. })));
        assert_eq!(transport.requests().len(), 4);
    }

    #[test]
    fn export_follows_cursor() {
        let transport = Arc::new(Scripted::default());
        transport.reply(
            200,
            json!({"results": [page("a", "One"), page("b", "Two")], "has_more": true, "next_cursor": "c"}),
        );
        transport.reply(200, json!({"results": [page("c", "Three")], "has_more": false, "next_cursor": null}));

        let records = export_treats(&store(transport.clone())).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["One", "Two", "Three"]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(body(&requests[0]), json!({"page_size": 100}));
        assert_eq!(body(&requests[1]), json!({"page_size": 100, "start_cursor": "c"}));
    }

    #[test]
    fn export_stops_when_cursor_is_missing() {
        let transport = Arc::new(Scripted::default());
        transport.reply(200, json!({"results": [page("a", "One")], "has_more": true, "next_cursor": null}));

        let records = export_treats(&store(transport.clone())).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(transport.requests().len(), 1);
    }
}
