//! Sending validated drafts to the catalog service
//!
//! [`CatalogService`] is the seam between the dialog and the network.
//! [`HttpCatalogService`] talks to the REST API; tests substitute in-memory
//! services. [`reconcile`] turns a saved entity into a collection update.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::collection::{CollectionSetter, CollectionUpdate};
use crate::config::Config;
use crate::dialog::{Completion, EntityDialog, SubmitStep};
use crate::error::SubmissionError;
use crate::models::{Entity, EntityFields};
use crate::schema::{FieldErrors, SchemaMode, ValidatedDraft};

/// Catalog REST API paths
pub struct CatalogApi;

impl CatalogApi {
    pub const ENTITIES_ENDPOINT: &'static str = "/api/entities";
    pub const UPDATE_ENDPOINT: &'static str = "/api/entities/update";
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Persist a new item and return it with its assigned identifier
    async fn create(&self, fields: &EntityFields) -> Result<Entity, SubmissionError>;

    /// Overwrite an existing item; last writer wins
    async fn update(&self, entity: &Entity) -> Result<Entity, SubmissionError>;

    /// Load the whole catalog
    async fn list(&self) -> Result<Vec<Entity>, SubmissionError>;
}

/// Send a draft to whichever endpoint its mode calls for
pub async fn send<S>(service: &S, draft: &ValidatedDraft) -> Result<Entity, SubmissionError>
where
    S: CatalogService + ?Sized,
{
    match draft {
        ValidatedDraft::Create(fields) => service.create(fields).await,
        ValidatedDraft::Update(entity) => service.update(entity).await,
    }
}

/// Collection update for a saved entity: creates go last, updates replace
/// the element with the same identifier and keep the order
pub fn reconcile(mode: SchemaMode, saved: Entity) -> CollectionUpdate {
    match mode {
        SchemaMode::Create => CollectionUpdate::apply(move |mut items| {
            items.push(saved);
            items
        }),
        SchemaMode::Update => CollectionUpdate::apply(move |items| {
            items
                .into_iter()
                .map(|item| if item.id == saved.id { saved.clone() } else { item })
                .collect()
        }),
    }
}

/// Outcome of a headless submit
#[derive(Debug)]
pub enum SubmitOutcome {
    Saved(Entity),
    Invalid(FieldErrors),
    Failed(SubmissionError),
    /// Dialog was not in a state that accepts submit
    Ignored,
}

/// Validate, send and reconcile in one step.
///
/// Used where nothing else runs while the request is in flight, such as the
/// CLI commands. The TUI drives [`EntityDialog::submit`] and
/// [`EntityDialog::finish`] separately so the event loop keeps running.
pub async fn submit<S, C>(dialog: &mut EntityDialog, service: &S, collection: &mut C) -> SubmitOutcome
where
    S: CatalogService + ?Sized,
    C: CollectionSetter + ?Sized,
{
    let pending = match dialog.submit() {
        SubmitStep::Pending(pending) => pending,
        SubmitStep::Invalid(errors) => return SubmitOutcome::Invalid(errors),
        SubmitStep::Ignored => return SubmitOutcome::Ignored,
    };

    let result = send(service, &pending.draft).await;
    match dialog.finish(pending.handle, result, collection) {
        Completion::Applied(entity) => SubmitOutcome::Saved(entity),
        Completion::Failed(err) => SubmitOutcome::Failed(err),
        Completion::Superseded => SubmitOutcome::Ignored,
    }
}

/// REST client for the catalog service
#[derive(Debug, Clone)]
pub struct HttpCatalogService {
    client: Client,
    base_url: Url,
}

impl HttpCatalogService {
    /// `base_url` may carry a path prefix, e.g. `https://host/catalog`
    pub fn new(client: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    /// Build a client from configuration
    pub fn from_config(config: &Config) -> Result<Self, SubmissionError> {
        let mut builder = Client::builder().user_agent(&config.http.user_agent);
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?, config.api.base_url.clone()))
    }

    /// Resolve an API path below the base URL, keeping its prefix
    fn endpoint(&self, path: &str) -> Result<Url, SubmissionError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, SubmissionError>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let response = self.client.post(url.clone()).json(body).send().await?;
        read_json(url, response).await
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn create(&self, fields: &EntityFields) -> Result<Entity, SubmissionError> {
        let entity: Entity = self.post(CatalogApi::ENTITIES_ENDPOINT, fields).await?;
        info!("Created item {} ({})", entity.id, entity.fields.name);
        Ok(entity)
    }

    async fn update(&self, entity: &Entity) -> Result<Entity, SubmissionError> {
        let saved: Entity = self.post(CatalogApi::UPDATE_ENDPOINT, entity).await?;
        info!("Updated item {} ({})", saved.id, saved.fields.name);
        Ok(saved)
    }

    async fn list(&self) -> Result<Vec<Entity>, SubmissionError> {
        let url = self.endpoint(CatalogApi::ENTITIES_ENDPOINT)?;
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let items: Vec<Entity> = read_json(url, response).await?;
        info!("Loaded {} items", items.len());
        Ok(items)
    }
}

/// Check the status and decode the body, keeping the raw text for errors
async fn read_json<T: DeserializeOwned>(url: Url, response: Response) -> Result<T, SubmissionError> {
    let status = response.status();
    let response_text = response.text().await?;

    if !status.is_success() {
        return Err(SubmissionError::Api {
            status_code: status.as_u16(),
            message: response_text,
        });
    }

    serde_json::from_str(&response_text).map_err(|source| SubmissionError::MalformedResponse {
        endpoint: url.to_string(),
        source,
    })
}
