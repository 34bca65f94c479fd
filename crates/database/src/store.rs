use crate::DbError;
use analytics::AssetAnalysis;
use async_trait::async_trait;
use uuid::Uuid;

/// Anything that can archive a finished analysis for a user.
///
/// Implemented by `DbRepository`; tests substitute in-memory stores.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save_analysis(&self, user_id: &str, analysis: &AssetAnalysis) -> Result<Uuid, DbError>;
}
