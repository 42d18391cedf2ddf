use std::collections::HashSet;

use crate::api::ApiError;
use crate::context::AdminContext;
use crate::models::Page;
use crate::notify::Notice;

// ============================================================================
// Picker Dialog - paginated, searchable selection of one reference entity
// ============================================================================
//
// Lifecycle: open -> (load | submit_search | go_to_page)* -> pick | close.
// All state is reset on close.
//
// Fetching is split into begin_fetch/complete_fetch so a UI event loop can
// run the request elsewhere and post the result back. Every begin_fetch
// bumps the request generation; a result whose ticket is not the newest, or
// that arrives after close, is dropped. load() does both halves inline.
//
// ============================================================================

mod errors;
mod source;

pub use errors::PickerError;
pub use source::{CategorySource, ColorSource, PickerSource, SizeSource};

pub type ColorPicker = Picker<ColorSource>;
pub type SizePicker = Picker<SizeSource>;
pub type CategoryPicker = Picker<CategorySource>;

/// Identifies one issued request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    page: u32,
    search: Option<String>,
}

impl FetchTicket {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows replaced with the fetched page
    Applied,
    /// Backend or network failure; the user was notified and the list is empty
    Failed,
    /// Superseded by a newer request or by closing the dialog; ignored
    Stale,
}

pub struct Picker<S: PickerSource> {
    source: S,
    page_size: u32,
    open: bool,
    excluded: HashSet<S::Id>,
    search_input: String,
    search: Option<String>,
    page: u32,
    total_pages: u32,
    rows: Vec<S::Item>,
    generation: u64,
    in_flight: Option<u64>,
}

impl<S: PickerSource + Default> Picker<S> {
    pub fn new(page_size: u32) -> Self {
        Self::with_source(S::default(), page_size)
    }
}

impl<S: PickerSource> Picker<S> {
    pub fn with_source(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            open: false,
            excluded: HashSet::new(),
            search_input: String::new(),
            search: None,
            page: 1,
            total_pages: 0,
            rows: Vec::new(),
            generation: 0,
            in_flight: None,
        }
    }

    // ------------------------------------------------------------------
    // View state
    // ------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn rows(&self) -> &[S::Item] {
        &self.rows
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Excluded rows are shown disabled and cannot be picked
    pub fn is_excluded(&self, item: &S::Item) -> bool {
        self.excluded.contains(self.source.id_of(item))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub fn open(&mut self, excluded: impl IntoIterator<Item = S::Id>) {
        self.reset();
        self.open = true;
        self.excluded = excluded.into_iter().collect();
        tracing::debug!(entity = self.source.entity(), excluded = self.excluded.len(), "Picker opened");
    }

    /// Open and fetch the first page
    pub async fn open_and_load(
        &mut self,
        ctx: &AdminContext,
        excluded: impl IntoIterator<Item = S::Id>,
    ) -> Result<FetchOutcome, PickerError> {
        self.open(excluded);
        self.load(ctx).await
    }

    /// Close and reset; any request still in flight becomes stale
    pub fn close(&mut self) {
        self.reset();
        tracing::debug!(entity = self.source.entity(), "Picker closed");
    }

    fn reset(&mut self) {
        self.open = false;
        self.excluded.clear();
        self.search_input.clear();
        self.search = None;
        self.page = 1;
        self.total_pages = 0;
        self.rows.clear();
        self.in_flight = None;
        // Never reset the generation: tickets from before the reset must stay stale
        self.generation += 1;
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    pub fn begin_fetch(&mut self) -> Result<FetchTicket, PickerError> {
        if !self.open {
            return Err(PickerError::Closed);
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        Ok(FetchTicket {
            generation: self.generation,
            page: self.page,
            search: self.search.clone(),
        })
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page<S::Item>, ApiError>,
        ctx: &AdminContext,
    ) -> FetchOutcome {
        let entity = self.source.entity();

        if !self.open || self.in_flight != Some(ticket.generation) {
            tracing::debug!(
                entity = entity,
                page = ticket.page,
                generation = ticket.generation,
                "Ignoring stale picker response"
            );
            ctx.metrics.record_stale_response(entity);
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                tracing::debug!(
                    entity = entity,
                    page = ticket.page,
                    rows = page.items.len(),
                    total_pages = page.total_pages,
                    "Picker page loaded"
                );
                ctx.metrics.record_picker_fetch(entity, true);
                self.rows = page.items;
                self.total_pages = page.total_pages;
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(entity = entity, page = ticket.page, error = %e, "Picker fetch failed");
                ctx.metrics.record_picker_fetch(entity, false);
                ctx.notifier.notify(Notice::error(e.to_string()));
                self.rows.clear();
                self.total_pages = 0;
                FetchOutcome::Failed
            }
        }
    }

    /// Fetch the current page with the committed search term
    pub async fn load(&mut self, ctx: &AdminContext) -> Result<FetchOutcome, PickerError> {
        let ticket = self.begin_fetch()?;
        let result = self
            .source
            .fetch(ctx.api.as_ref(), ticket.page, self.page_size, ticket.search())
            .await;
        Ok(self.complete_fetch(ticket, result, ctx))
    }

    /// Record typing. Does not fetch.
    pub fn set_search_input(&mut self, text: impl Into<String>) {
        self.search_input = text.into();
    }

    /// Commit the typed term (Enter), go back to page 1 and fetch
    pub async fn submit_search(&mut self, ctx: &AdminContext) -> Result<FetchOutcome, PickerError> {
        if !self.open {
            return Err(PickerError::Closed);
        }
        let term = self.search_input.trim();
        self.search = if self.source.searchable() && !term.is_empty() {
            Some(term.to_string())
        } else {
            None
        };
        self.page = 1;
        self.load(ctx).await
    }

    pub async fn go_to_page(&mut self, ctx: &AdminContext, page: u32) -> Result<FetchOutcome, PickerError> {
        if !self.open {
            return Err(PickerError::Closed);
        }
        let last = self.total_pages.max(1);
        if page == 0 || page > last {
            return Err(PickerError::PageOutOfRange { page, last });
        }
        self.page = page;
        self.load(ctx).await
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Pick the row at `row`. Returns the entity and closes the dialog, or
    /// `None` (dialog stays open) when the row is missing or excluded.
    pub fn pick(&mut self, row: usize) -> Option<S::Item> {
        if !self.open {
            return None;
        }
        let item = self.rows.get(row)?;
        if self.is_excluded(item) {
            tracing::debug!(entity = self.source.entity(), row = row, "Ignoring pick of excluded row");
            return None;
        }
        let item = item.clone();
        self.close();
        Some(item)
    }

    pub fn pick_id(&mut self, id: &S::Id) -> Option<S::Item> {
        let row = self.rows.iter().position(|item| self.source.id_of(item) == id)?;
        self.pick(row)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
