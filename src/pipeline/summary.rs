use tracing::{error, info};

use crate::app::ports::{CompletionPort, CompletionRequest, ModelProfile};
use crate::domain::ParsedDataset;
use crate::pipeline::normalize::dataset_to_csv;
use crate::prompts::{summary_request, SUMMARY_SYSTEM};

/// Asks the model for a client email draft built from `dataset`.
///
/// Never fails: an empty dataset or any error yields an empty string, which
/// the review page shows as an empty draft.
pub async fn compose_email_summary(model: &dyn CompletionPort, profile: &ModelProfile, dataset: &ParsedDataset) -> String {
    if dataset.is_empty() {
        return String::new();
    }
    let csv = match dataset_to_csv(dataset) {
        Ok(csv) => csv,
        Err(e) => {
            error!("Could not render rows for the summary: {}", e);
            return String::new();
        }
    };

    let request = CompletionRequest {
        profile: profile.clone(),
        system: SUMMARY_SYSTEM.to_string(),
        user: summary_request(&csv),
    };
    match model.complete(&request).await {
        Ok(text) => {
            info!("Generated email summary ({} chars)", text.len());
            text.trim().to_string()
        }
        Err(e) => {
            error!("Error generating email summary: {}", e);
            String::new()
        }
    }
}
