use crate::config::SurrealConfig;
use crate::error::{PolymathError, Result};
use crate::storage::traits::{Collection, NewRecord, Store};
use crate::types::{ContentType, Embedding, Expert, ExpertiseRef, FieldOfExpertise, GeneratedContent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::sql::Thing;
use surrealdb::Surreal;

// Row shapes as they come back from the store. Record ids arrive as
// `Thing` and are rendered to `table:key` strings on the way out.

#[derive(Debug, Deserialize)]
struct IdRow {
    id: Thing,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct FieldRow {
    id: Thing,
    name: String,
    #[serde(default)]
    subfields: Vec<String>,
}

impl From<FieldRow> for FieldOfExpertise {
    fn from(row: FieldRow) -> Self {
        Self {
            id: Some(row.id.to_string()),
            name: row.name,
            subfields: row.subfields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExpertRow {
    id: Thing,
    name: String,
    expertise: ExpertiseRef,
    #[serde(default)]
    also_interested_in: Vec<ExpertiseRef>,
}

impl From<ExpertRow> for Expert {
    fn from(row: ExpertRow) -> Self {
        Self {
            id: Some(row.id.to_string()),
            name: row.name,
            expertise: row.expertise,
            also_interested_in: row.also_interested_in,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentRow {
    id: Thing,
    #[serde(rename = "type")]
    content_type: ContentType,
    title_or_topic: String,
    content: String,
    primary_field_name: String,
    primary_expert_name: String,
    #[serde(default)]
    secondary_field_name: Option<String>,
    #[serde(default)]
    secondary_expert_name: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    vector_embedding: Option<Embedding>,
}

impl From<ContentRow> for GeneratedContent {
    fn from(row: ContentRow) -> Self {
        Self {
            id: Some(row.id.to_string()),
            content_type: row.content_type,
            title_or_topic: row.title_or_topic,
            content: row.content,
            primary_field_name: row.primary_field_name,
            primary_expert_name: row.primary_expert_name,
            secondary_field_name: row.secondary_field_name,
            secondary_expert_name: row.secondary_expert_name,
            created_at: row.created_at,
            vector_embedding: row.vector_embedding,
        }
    }
}

fn query_err(context: &str, e: surrealdb::Error) -> PolymathError {
    PolymathError::Query(format!("{}: {}", context, e))
}

/// Parse a `generated_content:...` id string.
fn content_id(id: &str) -> Result<Thing> {
    let thing = id
        .parse::<Thing>()
        .map_err(|_| PolymathError::Validation(format!("Invalid record id: {}", id)))?;
    if thing.tb != Collection::GeneratedContent.table() {
        return Err(PolymathError::Validation(format!(
            "{} is not a {} record",
            id,
            Collection::GeneratedContent
        )));
    }
    Ok(thing)
}

/// SurrealDB-backed [`Store`].
///
/// Holds one authenticated session scoped to a namespace and database.
/// Dropping the store releases the session; [`SurrealStore::close`] does the
/// same and logs it.
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Any>,
    target: String,
}

impl SurrealStore {
    /// Connect, sign in as root and select namespace and database.
    pub async fn connect(config: &SurrealConfig) -> Result<Self> {
        let url = config.endpoint.url();
        log::info!("Connecting to SurrealDB at {}...", url);

        let db = any::connect(url.as_str())
            .await
            .map_err(|e| PolymathError::Connection(format!("connect to {} failed: {}", url, e)))?;

        db.signin(Root {
            username: &config.credentials.username,
            password: &config.credentials.password,
        })
        .await
        .map_err(|e| PolymathError::Connection(format!("sign-in failed: {}", e)))?;

        db.use_ns(&config.scope.namespace)
            .use_db(&config.scope.database)
            .await
            .map_err(|e| {
                PolymathError::Connection(format!(
                    "selecting {}/{} failed: {}",
                    config.scope.namespace, config.scope.database, e
                ))
            })?;

        log::info!(
            "Connected to SurrealDB (ns: {}, db: {})",
            config.scope.namespace,
            config.scope.database
        );
        Ok(Self { db, target: url })
    }

    /// Wrap an already-connected client.
    pub fn from_client(db: Surreal<Any>, target: impl Into<String>) -> Self {
        Self {
            db,
            target: target.into(),
        }
    }

    /// Fresh in-memory database, for tests and local experiments.
    #[cfg(any(test, feature = "mem"))]
    pub async fn in_memory(namespace: &str, database: &str) -> Result<Self> {
        let db = any::connect("mem://")
            .await
            .map_err(|e| PolymathError::Connection(format!("in-memory engine: {}", e)))?;
        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| PolymathError::Connection(format!("selecting {}/{} failed: {}", namespace, database, e)))?;
        Ok(Self::from_client(db, "mem://"))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Release the session.
    pub fn close(self) {
        log::info!("SurrealDB connection to {} closed.", self.target);
    }

    async fn insert<D>(&self, collection: Collection, data: D) -> Result<String>
    where
        D: Serialize + Send + 'static,
    {
        let created: Option<IdRow> = self
            .db
            .create(collection.table())
            .content(data)
            .await
            .map_err(|e| PolymathError::Write(format!("insert into {} failed: {}", collection, e)))?;

        created
            .map(|row| row.id.to_string())
            .ok_or_else(|| PolymathError::Write(format!("insert into {} returned no record", collection)))
    }
}

#[async_trait]
impl Store for SurrealStore {
    async fn try_list_fields(&self) -> Result<Vec<FieldOfExpertise>> {
        let rows: Vec<FieldRow> = self
            .db
            .select(Collection::FieldOfExpertise.table())
            .await
            .map_err(|e| query_err("listing fields of expertise", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn try_list_experts_by_field(&self, field_name: &str) -> Result<Vec<Expert>> {
        let mut response = self
            .db
            .query("SELECT * FROM expert WHERE expertise.field_name = $field_name")
            .bind(("field_name", field_name.to_string()))
            .await
            .map_err(|e| query_err("listing experts", e))?;
        let rows: Vec<ExpertRow> = response
            .take(0)
            .map_err(|e| query_err("listing experts", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_field(&self, name: &str) -> Result<Option<FieldOfExpertise>> {
        let mut response = self
            .db
            .query("SELECT * FROM field_of_expertise WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await
            .map_err(|e| query_err("finding field", e))?;
        let rows: Vec<FieldRow> = response.take(0).map_err(|e| query_err("finding field", e))?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn find_expert(&self, name: &str) -> Result<Option<Expert>> {
        let mut response = self
            .db
            .query("SELECT * FROM expert WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await
            .map_err(|e| query_err("finding expert", e))?;
        let rows: Vec<ExpertRow> = response.take(0).map_err(|e| query_err("finding expert", e))?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn get_generated_content(&self, id: &str) -> Result<Option<GeneratedContent>> {
        let thing = content_id(id)?;
        let mut response = self
            .db
            .query("SELECT * FROM $id")
            .bind(("id", thing))
            .await
            .map_err(|e| query_err("reading content", e))?;
        let rows: Vec<ContentRow> = response.take(0).map_err(|e| query_err("reading content", e))?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn list_generated_content(&self, limit: usize) -> Result<Vec<GeneratedContent>> {
        let sql = format!(
            "SELECT * FROM generated_content ORDER BY created_at DESC LIMIT {}",
            limit
        );
        let mut response = self
            .db
            .query(sql)
            .await
            .map_err(|e| query_err("listing content", e))?;
        let rows: Vec<ContentRow> = response.take(0).map_err(|e| query_err("listing content", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        let mut response = self
            .db
            .query("SELECT count() AS total FROM type::table($table) GROUP ALL")
            .bind(("table", collection.table()))
            .await
            .map_err(|e| query_err("counting records", e))?;
        let rows: Vec<CountRow> = response.take(0).map_err(|e| query_err("counting records", e))?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn create_record(&self, record: NewRecord) -> Result<String> {
        let collection = record.collection();
        let id = match record.without_identity() {
            NewRecord::Field(field) => self.insert(collection, field).await?,
            NewRecord::Expert(expert) => self.insert(collection, expert).await?,
            NewRecord::Content(content) => self.insert(collection, content).await?,
        };
        log::debug!("Created {}", id);
        Ok(id)
    }

    async fn clear_collection(&self, collection: Collection) -> Result<()> {
        self.db
            .query("DELETE type::table($table)")
            .bind(("table", collection.table()))
            .await
            .and_then(|response| response.check())
            .map_err(|e| PolymathError::Write(format!("clearing {} failed: {}", collection, e)))?;
        log::debug!("Cleared {}", collection);
        Ok(())
    }

    async fn update_content_embedding(&self, id: &str, embedding: &Embedding) -> Result<()> {
        let thing = content_id(id)?;
        let mut response = self
            .db
            .query("UPDATE $id SET vector_embedding = $embedding RETURN id")
            .bind(("id", thing))
            .bind(("embedding", embedding.clone()))
            .await
            .map_err(|e| PolymathError::Write(format!("updating embedding of {} failed: {}", id, e)))?;
        let rows: Vec<IdRow> = response
            .take(0)
            .map_err(|e| PolymathError::Write(format!("updating embedding of {} failed: {}", id, e)))?;
        if rows.is_empty() {
            return Err(PolymathError::Write(format!("No content record {}", id)));
        }
        Ok(())
    }
}
