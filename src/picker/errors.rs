// ============================================================================
// Picker Errors
// ============================================================================
//
// Fetch failures are not errors here: they are reported to the user through
// the notifier and come back as FetchOutcome::Failed.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PickerError {
    #[error("Picker is closed")]
    Closed,

    #[error("Page {page} is out of range (1..={last})")]
    PageOutOfRange { page: u32, last: u32 },
}
