//! HTTP surface: `POST /update-treat` and `GET /read-treats`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use treat_core::{check_selects, SchemaVersion, TreatRecord};

use crate::error::AppError;
use crate::store::TreatStore;
use crate::sync::{export_treats, upsert_treats};

pub const NO_PAYLOAD: &str = "No JSON payload received";
pub const NOT_A_LIST: &str = "'treat_items' must be a list";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TreatStore>,
}

/// The service router, with every route bound to `store`.
pub fn app(store: Arc<TreatStore>) -> Router {
    Router::new()
        .route("/update-treat", post(update_treat))
        .route("/read-treats", get(read_treats))
        .with_state(AppState { store })
}

/// Body of a successful `POST /update-treat`.
#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub status: &'static str,
    pub created: usize,
    pub updated: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub treat_items: Vec<TreatRecord>,
}

async fn update_treat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UpsertResponse>, AppError> {
    let items = parse_upsert_payload(&body, state.store.schema())?;
    let total = items.len();
    let store = state.store.clone();
    let summary = tokio::task::spawn_blocking(move || upsert_treats(&store, &items)).await??;
    Ok(Json(UpsertResponse {
        status: "success",
        created: summary.created,
        updated: summary.updated,
        total,
    }))
}

async fn read_treats(State(state): State<AppState>) -> Result<Json<ExportResponse>, AppError> {
    let store = state.store.clone();
    let treat_items = tokio::task::spawn_blocking(move || export_treats(&store)).await??;
    Ok(Json(ExportResponse { treat_items }))
}

/// Validate the upsert body. A missing `treat_items` key is an empty batch.
/// Items are checked against `schema` so nothing Notion would refuse is sent.
pub fn parse_upsert_payload(
    body: &[u8],
    schema: SchemaVersion,
) -> Result<Vec<TreatRecord>, AppError> {
    let bad_request = |message: &str| AppError::BadRequest(message.to_string());

    let payload: Value = serde_json::from_slice(body).map_err(|_| bad_request(NO_PAYLOAD))?;
    if is_falsy(&payload) {
        return Err(bad_request(NO_PAYLOAD));
    }
    let Some(object) = payload.as_object() else {
        return Err(bad_request("JSON payload must be an object"));
    };
    let items = match object.get("treat_items") {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(bad_request(NOT_A_LIST)),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(AppError::BadRequest(format!(
                    "treat_items[{index}] must be an object"
                )));
            }
            let record: TreatRecord = serde_json::from_value(item.clone())
                .map_err(|e| AppError::BadRequest(format!("treat_items[{index}]: {e}")))?;
            check_selects(&record, schema)
                .map_err(|e| AppError::BadRequest(format!("treat_items[{index}]: {e}")))?;
            Ok(record)
        })
        .collect()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(body: &str) -> String {
        match parse_upsert_payload(body.as_bytes(), SchemaVersion::Select) {
            Err(AppError::BadRequest(message)) => message,
            other => panic!("expected a bad request, got {other:?}"),
        }
    }

    #[test]
    fn empty_or_invalid_body_has_no_payload() {
        assert_eq!(rejection(""), NO_PAYLOAD);
        assert_eq!(rejection("not json"), NO_PAYLOAD);
        assert_eq!(rejection("null"), NO_PAYLOAD);
        assert_eq!(rejection("{}"), NO_PAYLOAD);
    }

    #[test]
    fn treat_items_must_be_a_list() {
        assert_eq!(rejection(r#"{"treat_items": {"Treat Name": "Broa"}}"#), NOT_A_LIST);
        assert_eq!(rejection(r#"{"treat_items": null}"#), NOT_A_LIST);
    }

    #[test]
    fn items_must_be_objects() {
        assert_eq!(
            rejection(r#"{"treat_items": [{"Treat Name": "Broa"}, "Bolo"]}"#),
            "treat_items[1] must be an object"
        );
    }

    #[test]
    fn commas_in_select_fields_are_rejected_for_select_schema() {
        let body = r#"{"treat_items": [{"Treat Name": "Broa"}, {"Treat Name": "Bolo", "Region": "Minho, Douro"}]}"#;
        assert_eq!(
            rejection(body),
            "treat_items[1]: 'Region' cannot contain a comma when stored as a select: \"Minho, Douro\""
        );
        let items = parse_upsert_payload(body.as_bytes(), SchemaVersion::Text).unwrap();
        assert_eq!(items[1].region, "Minho, Douro");
    }

    #[test]
    fn missing_treat_items_is_an_empty_batch() {
        let items = parse_upsert_payload(br#"{"other": 1}"#, SchemaVersion::Select).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn items_are_parsed_in_order() {
        let items = parse_upsert_payload(
            br#"{"treat_items": [{"Treat Name": "Broa", "Tried": "yes"}, {"Treat Name": "Bolo"}]}"#,
            SchemaVersion::Select,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Broa");
        assert!(items[0].tried);
        assert_eq!(items[1].name, "Bolo");
    }
}
