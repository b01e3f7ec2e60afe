//! Storage abstraction for template records

use async_trait::async_trait;

use crate::entities::{CreatedTemplate, Template, TemplateInput, TemplateSummary, UpdatedTemplate};
use crate::error::Result;

pub mod file_storage;

pub use file_storage::FileStorage;

/// Persistence operations the HTTP layer relies on.
///
/// Every method taking `raw_id` accepts untrusted input and must resolve it to
/// a record inside the store before touching anything.
#[async_trait]
pub trait TemplateStorage: Send + Sync + 'static {
    /// Summaries of every readable record, most recently updated first
    async fn list_templates(&self) -> Result<Vec<TemplateSummary>>;

    /// Full record by id
    async fn get_template(&self, raw_id: &str) -> Result<Template>;

    /// Allocate a new record with a collision-free id
    async fn create_template(&self, input: TemplateInput) -> Result<CreatedTemplate>;

    /// Merge the supplied fields into an existing record
    async fn update_template(&self, raw_id: &str, input: TemplateInput) -> Result<UpdatedTemplate>;

    /// Remove a record
    async fn delete_template(&self, raw_id: &str) -> Result<()>;
}
