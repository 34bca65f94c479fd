use analytics::AssetAnalysis;
use database::AnalysisStore;
use uuid::Uuid;

/// Saves an analysis without letting a storage failure reach the caller.
///
/// Errors are logged and reported as `None`; the analysis itself is unaffected.
pub async fn save_best_effort(
    store: &dyn AnalysisStore,
    user_id: &str,
    analysis: &AssetAnalysis,
) -> Option<Uuid> {
    match store.save_analysis(user_id, analysis).await {
        Ok(id) => {
            tracing::info!(%id, symbol = %analysis.asset.symbol, "Analysis saved.");
            Some(id)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                symbol = %analysis.asset.symbol,
                "Failed to save analysis; continuing without persistence."
            );
            None
        }
    }
}
