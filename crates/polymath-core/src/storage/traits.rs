use crate::error::Result;
use crate::types::{Embedding, Expert, FieldOfExpertise, GeneratedContent};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// The three persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    FieldOfExpertise,
    Expert,
    GeneratedContent,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::FieldOfExpertise,
        Collection::Expert,
        Collection::GeneratedContent,
    ];

    /// Table name in the store.
    pub fn table(&self) -> &'static str {
        match self {
            Collection::FieldOfExpertise => "field_of_expertise",
            Collection::Expert => "expert",
            Collection::GeneratedContent => "generated_content",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for Collection {
    type Err = crate::error::PolymathError;

    fn from_str(s: &str) -> Result<Self> {
        Collection::ALL
            .into_iter()
            .find(|c| c.table() == s)
            .ok_or_else(|| {
                crate::error::PolymathError::Validation(format!("Unknown collection: {}", s))
            })
    }
}

/// A record on its way into the store.
///
/// The collection is implied by the variant. Any identity the caller set is
/// discarded on insert.
#[derive(Debug, Clone)]
pub enum NewRecord {
    Field(FieldOfExpertise),
    Expert(Expert),
    Content(GeneratedContent),
}

impl NewRecord {
    pub fn collection(&self) -> Collection {
        match self {
            NewRecord::Field(_) => Collection::FieldOfExpertise,
            NewRecord::Expert(_) => Collection::Expert,
            NewRecord::Content(_) => Collection::GeneratedContent,
        }
    }

    /// Human-readable label for logs and reports.
    pub fn label(&self) -> &str {
        match self {
            NewRecord::Field(f) => &f.name,
            NewRecord::Expert(e) => &e.name,
            NewRecord::Content(c) => &c.title_or_topic,
        }
    }

    /// Drop any client-supplied identity.
    pub fn without_identity(self) -> Self {
        match self {
            NewRecord::Field(mut f) => {
                f.id = None;
                NewRecord::Field(f)
            }
            NewRecord::Expert(mut e) => {
                e.id = None;
                NewRecord::Expert(e)
            }
            NewRecord::Content(mut c) => {
                c.id = None;
                NewRecord::Content(c)
            }
        }
    }
}

/// Document store for fields, experts and generated content.
///
/// The `try_*` methods report query failures. `list_fields_of_expertise` and
/// `list_experts_by_field` are the degrading forms: a failed query is logged
/// and comes back as an empty list.
#[async_trait]
pub trait Store: Send + Sync {
    // === Reads ===

    async fn try_list_fields(&self) -> Result<Vec<FieldOfExpertise>>;

    /// Experts whose primary expertise is in `field_name`.
    async fn try_list_experts_by_field(&self, field_name: &str) -> Result<Vec<Expert>>;

    async fn list_fields_of_expertise(&self) -> Vec<FieldOfExpertise> {
        match self.try_list_fields().await {
            Ok(fields) => fields,
            Err(e) => {
                log::error!("Error listing fields of expertise: {}", e);
                Vec::new()
            }
        }
    }

    async fn list_experts_by_field(&self, field_name: &str) -> Vec<Expert> {
        match self.try_list_experts_by_field(field_name).await {
            Ok(experts) => experts,
            Err(e) => {
                log::error!("Error listing experts for field {}: {}", field_name, e);
                Vec::new()
            }
        }
    }

    async fn find_field(&self, name: &str) -> Result<Option<FieldOfExpertise>>;

    async fn find_expert(&self, name: &str) -> Result<Option<Expert>>;

    async fn get_generated_content(&self, id: &str) -> Result<Option<GeneratedContent>>;

    /// Most recent first.
    async fn list_generated_content(&self, limit: usize) -> Result<Vec<GeneratedContent>>;

    async fn count(&self, collection: Collection) -> Result<u64>;

    // === Writes ===

    /// Insert one record and return its store-assigned id.
    async fn create_record(&self, record: NewRecord) -> Result<String>;

    /// Delete every record in the collection. Clearing an empty collection is fine.
    async fn clear_collection(&self, collection: Collection) -> Result<()>;

    /// Check the Essay/Debate invariant, then insert.
    async fn save_generated_content(&self, content: &GeneratedContent) -> Result<String> {
        content.validate()?;
        self.create_record(NewRecord::Content(content.clone())).await
    }

    async fn update_content_embedding(&self, id: &str, embedding: &Embedding) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolymathError;
    use crate::types::ExpertiseRef;

    /// A store whose every query fails.
    struct UnreachableStore;

    fn down<T>() -> Result<T> {
        Err(PolymathError::Query("connection reset".into()))
    }

    #[async_trait]
    impl Store for UnreachableStore {
        async fn try_list_fields(&self) -> Result<Vec<FieldOfExpertise>> {
            down()
        }
        async fn try_list_experts_by_field(&self, _field_name: &str) -> Result<Vec<Expert>> {
            down()
        }
        async fn find_field(&self, _name: &str) -> Result<Option<FieldOfExpertise>> {
            down()
        }
        async fn find_expert(&self, _name: &str) -> Result<Option<Expert>> {
            down()
        }
        async fn get_generated_content(&self, _id: &str) -> Result<Option<GeneratedContent>> {
            down()
        }
        async fn list_generated_content(&self, _limit: usize) -> Result<Vec<GeneratedContent>> {
            down()
        }
        async fn count(&self, _collection: Collection) -> Result<u64> {
            down()
        }
        async fn create_record(&self, _record: NewRecord) -> Result<String> {
            down()
        }
        async fn clear_collection(&self, _collection: Collection) -> Result<()> {
            down()
        }
        async fn update_content_embedding(&self, _id: &str, _embedding: &Embedding) -> Result<()> {
            down()
        }
    }

    #[tokio::test]
    async fn test_list_wrappers_degrade_to_empty() {
        let _ = env_logger::builder().is_test(true).try_init();
        let store = UnreachableStore;

        assert!(matches!(store.try_list_fields().await, Err(PolymathError::Query(_))));
        assert!(store.list_fields_of_expertise().await.is_empty());

        assert!(matches!(
            store.try_list_experts_by_field("psychology").await,
            Err(PolymathError::Query(_))
        ));
        assert!(store.list_experts_by_field("psychology").await.is_empty());
    }

    #[tokio::test]
    async fn test_save_validates_before_insert() {
        let store = UnreachableStore;
        let field = FieldOfExpertise::new("psychology", vec![]);
        let expert = Expert::new("Carl Jung", ExpertiseRef::new("psychology", "Psychoanalysis"));
        let mut essay = GeneratedContent::essay("Archetypes", "text", &field, &expert);
        essay.secondary_expert_name = Some("Simone de Beauvoir".into());

        let err = store.save_generated_content(&essay).await.unwrap_err();
        assert!(matches!(err, PolymathError::Validation(_)));
    }

    #[test]
    fn test_collection_tables() {
        assert_eq!(Collection::FieldOfExpertise.table(), "field_of_expertise");
        assert_eq!(Collection::Expert.to_string(), "expert");
        assert_eq!(
            "generated_content".parse::<Collection>().unwrap(),
            Collection::GeneratedContent
        );
        assert!("experts".parse::<Collection>().is_err());
    }

    #[test]
    fn test_without_identity() {
        let mut expert = Expert::new("Carl Jung", ExpertiseRef::new("psychology", "Psychoanalysis"));
        expert.id = Some("expert:jung".to_string());
        let record = NewRecord::Expert(expert).without_identity();

        assert_eq!(record.collection(), Collection::Expert);
        assert_eq!(record.label(), "Carl Jung");
        match record {
            NewRecord::Expert(e) => assert!(e.id.is_none()),
            other => panic!("unexpected record {other:?}"),
        }
    }
}
