//! The configured treat database: a Notion client, a transport, and the one
//! database id every call targets.

use std::sync::Arc;

use treat_core::{
    ApiError, CreatePage, Filter, NotionClient, Page, Parent, Properties, QueryDatabase,
    QueryResponse, SchemaVersion, TreatField, UpdatePage,
};

use crate::config::Config;
use crate::transport::{Transport, TransportError, UreqTransport};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Shared handle to the treat database, built once at startup.
pub struct TreatStore {
    client: NotionClient,
    transport: Arc<dyn Transport>,
    database_id: String,
    schema: SchemaVersion,
}

impl TreatStore {
    /// Wire a client and a transport to `database_id`. Records are written in
    /// the `schema` layout.
    pub fn new(
        client: NotionClient,
        transport: Arc<dyn Transport>,
        database_id: &str,
        schema: SchemaVersion,
    ) -> Self {
        Self {
            client,
            transport,
            database_id: database_id.to_string(),
            schema,
        }
    }

    /// Store talking to the real Notion API over ureq.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            NotionClient::new(&config.api_url, &config.notion_token),
            Arc::new(UreqTransport::new(config.timeout)),
            &config.database_id,
            config.schema,
        )
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// First page whose title equals `name` exactly, if any.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Page>, StoreError> {
        let query = QueryDatabase {
            filter: Some(Filter::title_equals(TreatField::Name.property_name(), name)),
            start_cursor: None,
            page_size: Some(1),
        };
        Ok(self.query(&query)?.results.into_iter().next())
    }

    /// One page of results from the configured database.
    pub fn query(&self, query: &QueryDatabase) -> Result<QueryResponse, StoreError> {
        let request = self.client.build_query_database(&self.database_id, query)?;
        let response = self.transport.execute(request)?;
        Ok(self.client.parse_query_database(response)?)
    }

    /// New page in the configured database.
    pub fn create(&self, properties: Properties) -> Result<Page, StoreError> {
        let input = CreatePage {
            parent: Parent {
                database_id: self.database_id.clone(),
            },
            properties,
        };
        let request = self.client.build_create_page(&input)?;
        let response = self.transport.execute(request)?;
        Ok(self.client.parse_create_page(response)?)
    }

    /// Overwrite the given properties of an existing page.
    pub fn update(&self, page_id: &str, properties: Properties) -> Result<Page, StoreError> {
        let request = self
            .client
            .build_update_page(page_id, &UpdatePage { properties })?;
        let response = self.transport.execute(request)?;
        Ok(self.client.parse_update_page(response)?)
    }
}
