use crate::submission::SubmissionError;
use super::WizardStep;

// ============================================================================
// Wizard Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step '{step}' is incomplete: {source}")]
    Incomplete {
        step: WizardStep,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Preview can only be left forward by submitting")]
    SubmitRequired,

    #[error("Submit is only available from the preview step (currently at '{0}')")]
    NotAtPreview(WizardStep),

    #[error("Wizard has already been submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
