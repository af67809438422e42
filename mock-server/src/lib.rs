//! In-memory stand-in for the slice of the Notion API the treat service uses.
//!
//! Pages are kept per database in insertion order, which is also the order
//! queries return them in. Cursors are the id of the first page of the next
//! batch, as in Notion.

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Database every fresh `app()` starts with.
pub const DATABASE_ID: &str = "2a5bed35c6cb80a9937bf8abcde98bd1";

pub const MAX_PAGE_SIZE: usize = 100;
const MAX_TEXT_CHARS: usize = 2000;
const STORAGE_TYPES: [&str; 6] = ["title", "rich_text", "url", "number", "checkbox", "select"];

#[derive(Clone, Debug)]
pub struct StoredPage {
    pub id: String,
    pub database_id: String,
    /// Properties in Notion's write shape, e.g. `{"select": {"name": "x"}}`.
    pub properties: Map<String, Value>,
}

impl StoredPage {
    /// Concatenated text of a title or rich text property.
    pub fn text(&self, property: &str) -> String {
        self.properties
            .get(property)
            .and_then(|value| value.get("title").or_else(|| value.get("rich_text")))
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.pointer("/text/content").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn render(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), render_property(name, value)))
            .collect();
        json!({
            "object": "page",
            "id": self.id,
            "parent": {"type": "database_id", "database_id": self.database_id},
            "archived": false,
            "properties": properties,
        })
    }
}

#[derive(Debug, Default)]
pub struct MockNotion {
    databases: HashSet<String>,
    pages: Vec<StoredPage>,
}

impl MockNotion {
    pub fn add_database(&mut self, database_id: &str) {
        self.databases.insert(database_id.to_string());
    }

    /// Insert a page directly, bypassing validation. Returns its id.
    pub fn insert_page(&mut self, database_id: &str, properties: Map<String, Value>) -> String {
        let id = Uuid::new_v4().to_string();
        self.pages.push(StoredPage {
            id: id.clone(),
            database_id: database_id.to_string(),
            properties,
        });
        id
    }

    pub fn pages(&self, database_id: &str) -> Vec<&StoredPage> {
        self.pages
            .iter()
            .filter(|page| page.database_id == database_id)
            .collect()
    }

    pub fn page(&self, id: &str) -> Option<&StoredPage> {
        self.pages.iter().find(|page| page.id == id)
    }
}

pub type Db = Arc<RwLock<MockNotion>>;

/// A fresh store holding only `DATABASE_ID`.
pub fn new_db() -> Db {
    let mut notion = MockNotion::default();
    notion.add_database(DATABASE_ID);
    Arc::new(RwLock::new(notion))
}

pub fn app() -> Router {
    app_with_db(new_db())
}

pub fn app_with_db(db: Db) -> Router {
    Router::new()
        .route("/v1/databases/{id}/query", post(query_database))
        .route("/v1/pages", post(create_page))
        .route("/v1/pages/{id}", patch(update_page))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_db(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

fn notion_error(status: StatusCode, code: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "object": "error",
            "status": status.as_u16(),
            "code": code,
            "message": message,
        })),
    )
}

fn authorize(headers: &HeaderMap) -> ApiResult<()> {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or("");
    if token.trim().is_empty() {
        return Err(notion_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "API token is invalid.",
        ));
    }
    if !headers.contains_key("notion-version") {
        return Err(notion_error(
            StatusCode::BAD_REQUEST,
            "missing_version",
            "Notion-Version header failed validation.",
        ));
    }
    Ok(())
}

fn validation_error(message: &str) -> (StatusCode, Json<Value>) {
    notion_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

fn validate_properties(properties: &Map<String, Value>) -> ApiResult<()> {
    for (name, value) in properties {
        let Some(object) = value.as_object() else {
            return Err(validation_error(&format!("{name} should be an object.")));
        };
        let Some(kind) = STORAGE_TYPES.into_iter().find(|key| object.contains_key(*key)) else {
            return Err(validation_error(&format!("{name} has an unsupported type.")));
        };
        let body = &object[kind];
        match kind {
            "select" if !body.is_null() => {
                let named = body.get("name").and_then(Value::as_str).unwrap_or("");
                if named.is_empty() {
                    return Err(validation_error(&format!("{name}.select.name should be populated.")));
                }
                if named.contains(',') {
                    return Err(validation_error(&format!(
                        "Select option names cannot contain commas: {name}."
                    )));
                }
            }
            "url" if body.as_str() == Some("") => {
                return Err(validation_error(&format!("{name}.url should be a valid URL or null.")));
            }
            "title" | "rich_text" => {
                let too_long = body
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter_map(|part| part.pointer("/text/content").and_then(Value::as_str))
                    .any(|content| content.chars().count() > MAX_TEXT_CHARS);
                if too_long {
                    return Err(validation_error(&format!(
                        "{name}.text.content.length should be ≤ `{MAX_TEXT_CHARS}`."
                    )));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn render_property(name: &str, value: &Value) -> Value {
    let Some(kind) = STORAGE_TYPES
        .into_iter()
        .find(|key| value.get(*key).is_some())
    else {
        return value.clone();
    };
    let body = match (kind, &value[kind]) {
        ("title" | "rich_text", Value::Array(parts)) => Value::Array(
            parts
                .iter()
                .map(|part| {
                    let content = part.pointer("/text/content").cloned().unwrap_or(json!(""));
                    json!({
                        "type": "text",
                        "text": {"content": content, "link": null},
                        "plain_text": content,
                        "href": null,
                    })
                })
                .collect(),
        ),
        ("select", Value::Object(option)) => {
            let mut option = option.clone();
            option.entry("color").or_insert(json!("default"));
            Value::Object(option)
        }
        (_, body) => body.clone(),
    };
    let mut rendered = Map::new();
    rendered.insert("id".to_string(), json!(name));
    rendered.insert("type".to_string(), json!(kind));
    rendered.insert(kind.to_string(), body);
    Value::Object(rendered)
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub filter: Option<QueryFilter>,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct QueryFilter {
    pub property: String,
    pub title: Option<TextCondition>,
}

#[derive(Debug, Deserialize)]
pub struct TextCondition {
    pub equals: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub parent: ParentBody,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ParentBody {
    pub database_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

async fn query_database(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(database_id): Path<String>,
    Json(query): Json<QueryBody>,
) -> ApiResult<Json<Value>> {
    authorize(&headers)?;
    let notion = db.read().await;
    if !notion.databases.contains(&database_id) {
        return Err(notion_error(
            StatusCode::NOT_FOUND,
            "object_not_found",
            &format!("Could not find database with ID: {database_id}."),
        ));
    }

    let page_size = query.page_size.unwrap_or(MAX_PAGE_SIZE);
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(validation_error("body.page_size should be ≤ `100`."));
    }

    let title_match = match &query.filter {
        Some(QueryFilter { property, title: Some(condition) }) => {
            Some((property.as_str(), condition.equals.as_str()))
        }
        Some(_) => return Err(validation_error("body.filter is not supported.")),
        None => None,
    };

    let matching: Vec<&StoredPage> = notion
        .pages(&database_id)
        .into_iter()
        .filter(|page| match title_match {
            Some((property, equals)) => page.text(property) == equals,
            None => true,
        })
        .collect();

    let start = match &query.start_cursor {
        Some(cursor) => matching
            .iter()
            .position(|page| &page.id == cursor)
            .ok_or_else(|| validation_error("body.start_cursor should be a valid cursor."))?,
        None => 0,
    };
    let end = (start + page_size).min(matching.len());
    let has_more = end < matching.len();

    let results: Vec<Value> = matching[start..end].iter().map(|page| page.render()).collect();
    let next_cursor = has_more.then(|| matching[end].id.clone());

    Ok(Json(json!({
        "object": "list",
        "results": results,
        "has_more": has_more,
        "next_cursor": next_cursor,
    })))
}

async fn create_page(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateBody>,
) -> ApiResult<Json<Value>> {
    authorize(&headers)?;
    validate_properties(&input.properties)?;
    let mut notion = db.write().await;
    if !notion.databases.contains(&input.parent.database_id) {
        return Err(notion_error(
            StatusCode::NOT_FOUND,
            "object_not_found",
            &format!("Could not find database with ID: {}.", input.parent.database_id),
        ));
    }
    let id = notion.insert_page(&input.parent.database_id, input.properties);
    let page = notion.page(&id).map(StoredPage::render).unwrap_or_default();
    Ok(Json(page))
}

async fn update_page(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateBody>,
) -> ApiResult<Json<Value>> {
    authorize(&headers)?;
    validate_properties(&input.properties)?;
    let mut notion = db.write().await;
    let page = notion
        .pages
        .iter_mut()
        .find(|page| page.id == id)
        .ok_or_else(|| {
            notion_error(
                StatusCode::NOT_FOUND,
                "object_not_found",
                &format!("Could not find page with ID: {id}."),
            )
        })?;
    page.properties.extend(input.properties);
    Ok(Json(page.render()))
}
