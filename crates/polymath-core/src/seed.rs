use crate::error::{PolymathError, Result};
use crate::storage::{Collection, NewRecord, Store};
use crate::types::{Expert, FieldOfExpertise};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_FIELDS_PATH: &str = "data/fields_of_expertise.json";
pub const DEFAULT_EXPERTS_PATH: &str = "data/experts.json";

/// Parsed contents of the two seed files.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub fields: Vec<FieldOfExpertise>,
    pub experts: Vec<Expert>,
}

impl SeedData {
    /// Read and parse both files. Either one missing or malformed fails the load.
    pub async fn load(fields_path: &Path, experts_path: &Path) -> Result<Self> {
        let fields = read_array(fields_path).await?;
        let experts = read_array(experts_path).await?;
        Ok(Self { fields, experts })
    }

    /// Names of experts whose primary field has no matching field record.
    pub fn dangling_experts(&self) -> Vec<&str> {
        self.experts
            .iter()
            .filter(|e| !self.fields.iter().any(|f| f.name == e.expertise.field_name))
            .map(|e| e.name.as_str())
            .collect()
    }
}

async fn read_array<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        PolymathError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let items: Vec<T> = serde_json::from_str(&raw)?;
    log::info!("Read {} records from {}", items.len(), path.display());
    Ok(items)
}

/// A record that could not be inserted.
#[derive(Debug, Clone, Serialize)]
pub struct SeedFailure {
    pub collection: String,
    pub name: String,
    pub reason: String,
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub fields_read: usize,
    pub experts_read: usize,
    pub fields_inserted: usize,
    pub experts_inserted: usize,
    pub failures: Vec<SeedFailure>,
}

impl SeedReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replace the field and expert collections with `data`.
///
/// Both collections are cleared first, then every field and every expert is
/// inserted one at a time. A failed insert is logged and recorded in the
/// report; the remaining records are still attempted.
pub async fn seed(store: &dyn Store, data: &SeedData) -> Result<SeedReport> {
    let mut report = SeedReport {
        fields_read: data.fields.len(),
        experts_read: data.experts.len(),
        ..Default::default()
    };

    log::info!("Clearing existing data...");
    store.clear_collection(Collection::FieldOfExpertise).await?;
    store.clear_collection(Collection::Expert).await?;

    log::info!("Seeding fields of expertise...");
    for field in &data.fields {
        if insert(store, NewRecord::Field(field.clone()), &mut report).await {
            report.fields_inserted += 1;
        }
    }

    log::info!("Seeding experts...");
    for expert in &data.experts {
        if insert(store, NewRecord::Expert(expert.clone()), &mut report).await {
            report.experts_inserted += 1;
        }
    }

    log::info!(
        "Seeding complete: {}/{} fields, {}/{} experts, {} failures",
        report.fields_inserted,
        report.fields_read,
        report.experts_inserted,
        report.experts_read,
        report.failures.len()
    );
    Ok(report)
}

/// Load the files at the given paths and seed them.
pub async fn seed_from_files(
    store: &dyn Store,
    fields_path: impl Into<PathBuf>,
    experts_path: impl Into<PathBuf>,
) -> Result<SeedReport> {
    let data = SeedData::load(&fields_path.into(), &experts_path.into()).await?;
    seed(store, &data).await
}

async fn insert(store: &dyn Store, record: NewRecord, report: &mut SeedReport) -> bool {
    let collection = record.collection();
    let name = record.label().to_string();
    match store.create_record(record).await {
        Ok(id) => {
            log::debug!("Seeded {} as {}", name, id);
            true
        }
        Err(e) => {
            log::error!("Error seeding {} record {}: {}", collection, name, e);
            report.failures.push(SeedFailure {
                collection: collection.to_string(),
                name,
                reason: e.to_string(),
            });
            false
        }
    }
}
