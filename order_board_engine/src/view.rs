//! View projection
//!
//! [`project`] derives what the dashboard shows from the reconciled orders and the local view state. It is a pure
//! function of its inputs:
//! 1. Orders in the [`HiddenStack`] are dropped.
//! 2. If a search term is set, only orders whose ticket number or item names contain it (case-insensitively) remain.
//! 3. The remaining orders are split into pages of `page_size`. There is always at least one page, and the requested
//!    page is clamped into range.
use crate::{fade::FadeTracker, hidden::HiddenStack, order_objects::OrderRecord};

pub const DEFAULT_PAGE_SIZE: usize = 6;
pub const DEFAULT_LONG_WAIT_THRESHOLD: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionSettings {
    pub page_size: usize,
    pub long_wait_threshold: i64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self { page_size: DEFAULT_PAGE_SIZE, long_wait_threshold: DEFAULT_LONG_WAIT_THRESHOLD }
    }
}

/// Transient, dashboard-local view state
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    search: String,
    page: usize,
}

impl ViewState {
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Sets the search term and returns to the first page
    pub fn set_search<S: Into<String>>(&mut self, term: S) {
        self.search = term.into();
        self.page = 0;
    }

    /// The trimmed, lower-cased search term, or `None` if no filter applies
    pub fn needle(&self) -> Option<String> {
        let term = self.search.trim();
        (!term.is_empty()).then(|| term.to_lowercase())
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrderCard<'a> {
    pub record: &'a OrderRecord,
    pub long_wait: bool,
    pub fading: bool,
}

#[derive(Debug, Clone)]
pub struct Projection<'a> {
    pub cards: Vec<OrderCard<'a>>,
    pub current_page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub hidden_count: usize,
}

pub fn total_pages(filtered_count: usize, page_size: usize) -> usize {
    filtered_count.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.min(total_pages.saturating_sub(1))
}

/// The orders that survive the hidden-set and search filters, in board order
pub fn filtered<'a>(orders: &'a [OrderRecord], hidden: &HiddenStack, view: &ViewState) -> Vec<&'a OrderRecord> {
    let needle = view.needle();
    orders
        .iter()
        .filter(|o| !hidden.contains(&o.id))
        .filter(|o| needle.as_deref().map_or(true, |n| o.matches_search(n)))
        .collect()
}

pub fn project<'a>(
    orders: &'a [OrderRecord],
    hidden: &HiddenStack,
    fades: &FadeTracker,
    view: &ViewState,
    settings: &ProjectionSettings,
) -> Projection<'a> {
    let page_size = settings.page_size.max(1);
    let filtered = filtered(orders, hidden, view);
    let total_pages = total_pages(filtered.len(), page_size);
    let current_page = clamp_page(view.page(), total_pages);
    let cards = filtered
        .iter()
        .skip(current_page * page_size)
        .take(page_size)
        .map(|&record| OrderCard {
            record,
            long_wait: record.is_long_wait(settings.long_wait_threshold),
            fading: fades.is_fading(&record.id),
        })
        .collect();
    Projection { cards, current_page, total_pages, filtered_count: filtered.len(), hidden_count: hidden.len() }
}
