//! View-state derivation: categorize, select tab, filter, sort, paginate.
//!
//! Everything here is a pure function of `(publications, ViewParameters)`.
//! Source records are borrowed, never modified. [`PublicationView`] caches
//! the per-record tags and the top-cited selection so that repeated
//! parameter changes only redo the filter/sort/page steps.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::category::{CategoryFilter, CategorySet, categorize};
use crate::model::PublicationRecord;

/// Records per page
pub const PAGE_SIZE: usize = 10;

/// Size of the "top cited" subview
pub const TOP_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Top,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most cited first
    #[default]
    Citations,
    /// Newest first
    Year,
    /// A to Z
    Title,
}

/// User-adjustable view parameters.
///
/// Changing the tab, the search query or the category filter resets the
/// page to 1. Changing the sort key keeps the page since the match count
/// is unchanged. Callers must still run [`ViewParameters::clamp_page`]
/// after the publication set itself changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewParameters {
    tab: Tab,
    search_query: String,
    sort_key: SortKey,
    category: CategoryFilter,
    page: usize,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            search_query: String::new(),
            sort_key: SortKey::default(),
            category: CategoryFilter::default(),
            page: 1,
        }
    }
}

impl ViewParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.page = 1;
        }
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if self.search_query != query {
            self.search_query = query;
            self.page = 1;
        }
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        if self.category != category {
            self.category = category;
            self.page = 1;
        }
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    /// Select a page (1-based; 0 is treated as 1). Not checked against the page count.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Pull `page` back into `1..=page_count`. Returns true if it moved.
    pub fn clamp_page(&mut self, page_count: usize) -> bool {
        let clamped = self.page.min(page_count).max(1);
        let moved = clamped != self.page;
        self.page = clamped;
        moved
    }
}

/// A borrowed record together with its derived tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorizedRecord<'a> {
    pub record: &'a PublicationRecord,
    pub categories: CategorySet,
    /// Position in the original collection
    pub index: usize,
}

/// One derived page of publications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct View<'a> {
    pub visible: Vec<CategorizedRecord<'a>>,
    pub page_count: usize,
    pub total_matched: usize,
}

/// Tagged publications plus the cached top-cited selection.
pub struct PublicationView<'a> {
    records: Vec<CategorizedRecord<'a>>,
    /// Indices into `records`, most cited first
    top: Vec<usize>,
}

impl<'a> PublicationView<'a> {
    pub fn new(publications: &'a [PublicationRecord]) -> Self {
        let records: Vec<CategorizedRecord<'a>> = publications
            .iter()
            .enumerate()
            .map(|(index, record)| CategorizedRecord {
                record,
                categories: categorize(record.title.as_deref()),
                index,
            })
            .collect();

        // sort_by is stable: equal citation counts keep source order
        let mut top: Vec<usize> = (0..records.len()).collect();
        top.sort_by(|&a, &b| records[b].record.citations.cmp(&records[a].record.citations));
        top.truncate(TOP_COUNT);

        Self { records, top }
    }

    /// Up to [`TOP_COUNT`] records by citations, descending
    pub fn top(&self) -> impl Iterator<Item = &CategorizedRecord<'a>> {
        self.top.iter().map(|&i| &self.records[i])
    }

    /// Tab scope → category filter → search filter → sort. No pagination.
    pub fn filtered_sorted(&self, params: &ViewParameters) -> Vec<&CategorizedRecord<'a>> {
        let scope: Box<dyn Iterator<Item = &CategorizedRecord<'a>> + '_> = match params.tab {
            Tab::Top => Box::new(self.top()),
            Tab::All => Box::new(self.records.iter()),
        };

        let query = params.search_query.to_lowercase();
        let mut out: Vec<&CategorizedRecord<'a>> = scope
            .filter(|r| params.category.matches(&r.categories))
            .filter(|r| query.is_empty() || matches_query(r.record, &query))
            .collect();

        match params.sort_key {
            SortKey::Citations => out.sort_by(|a, b| b.record.citations.cmp(&a.record.citations)),
            SortKey::Year => out.sort_by(|a, b| b.record.year.cmp(&a.record.year)),
            SortKey::Title => out.sort_by_cached_key(|r| TitleKey::new(r.record.title_or_empty())),
        }
        out
    }

    /// Full pipeline including the page slice for `params.page()`.
    ///
    /// An out-of-range page yields an empty `visible` list; clamping is the
    /// caller's job.
    pub fn derive(&self, params: &ViewParameters) -> View<'a> {
        let matched = self.filtered_sorted(params);
        let total_matched = matched.len();
        let visible = page_slice(&matched, params.page)
            .iter()
            .map(|r| (*r).clone())
            .collect();
        View {
            visible,
            page_count: page_count(total_matched),
            total_matched,
        }
    }
}

/// One-shot derivation without keeping the tag cache around.
pub fn derive_view<'a>(publications: &'a [PublicationRecord], params: &ViewParameters) -> View<'a> {
    PublicationView::new(publications).derive(params)
}

/// `ceil(len / PAGE_SIZE)`
pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// `items[(page-1)*PAGE_SIZE .. page*PAGE_SIZE]`, truncated to the slice bounds
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    if start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// `query` must already be lowercase.
fn matches_query(record: &PublicationRecord, query: &str) -> bool {
    [&record.title, &record.authors, &record.venue]
        .into_iter()
        .any(|field| {
            field
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(query))
        })
}

/// Collation key for title ordering.
///
/// Letters compare first with case and diacritics folded away, then by
/// accents (unaccented first), then by case (lowercase first).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct TitleKey {
    base: String,
    accented: Vec<bool>,
    upper: Vec<bool>,
}

impl TitleKey {
    fn new(title: &str) -> Self {
        let mut key = Self {
            base: String::with_capacity(title.len()),
            accented: Vec::with_capacity(title.len()),
            upper: Vec::with_capacity(title.len()),
        };
        for c in title.nfd() {
            if is_combining_mark(c) {
                if let Some(last) = key.accented.last_mut() {
                    *last = true;
                }
                continue;
            }
            let upper = c.is_uppercase();
            for lower in c.to_lowercase() {
                key.base.push(lower);
                key.accented.push(false);
                key.upper.push(upper);
            }
        }
        key
    }
}
