//! `scholarview show` - load the profile and print one page of publications

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, CellAlignment};
use tokio_util::sync::CancellationToken;

use scholarview_client::{AcquisitionController, Transport};
use scholarview_core::{
    AcquisitionResult, AuthorStats, CacheBanner, CategoryFilter, CategoryTag, ProgressContext,
    PublicationView, SortKey, Tab, View, ViewParameters, citation_search_url, fmt_num,
};

use super::{interrupted, styled_table, with_progress};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Which list to show
    #[arg(long, value_enum, default_value_t = TabArg::Top)]
    pub tab: TabArg,

    /// Case-insensitive match on title, authors and venue
    #[arg(short, long)]
    pub search: Option<String>,

    /// Ordering of the full list
    #[arg(long, value_enum, default_value_t = SortArg::Citations)]
    pub sort: SortArg,

    /// Restrict to one research area
    #[arg(short = 'C', long, value_enum, default_value_t = CategoryArg::All)]
    pub category: CategoryArg,

    /// 1-based page of the full list
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Print abstracts and citation links below the table
    #[arg(long)]
    pub abstracts: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TabArg {
    Top,
    All,
}

impl From<TabArg> for Tab {
    fn from(arg: TabArg) -> Self {
        match arg {
            TabArg::Top => Self::Top,
            TabArg::All => Self::All,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortArg {
    Citations,
    Year,
    Title,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Citations => Self::Citations,
            SortArg::Year => Self::Year,
            SortArg::Title => Self::Title,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CategoryArg {
    All,
    Epilepsy,
    Neuroimaging,
    Neuromodulation,
    Psychiatry,
    Methods,
    Clinical,
}

impl From<CategoryArg> for CategoryFilter {
    fn from(arg: CategoryArg) -> Self {
        let tag = match arg {
            CategoryArg::All => return Self::All,
            CategoryArg::Epilepsy => CategoryTag::Epilepsy,
            CategoryArg::Neuroimaging => CategoryTag::Neuroimaging,
            CategoryArg::Neuromodulation => CategoryTag::Neuromodulation,
            CategoryArg::Psychiatry => CategoryTag::Psychiatry,
            CategoryArg::Methods => CategoryTag::Methods,
            CategoryArg::Clinical => CategoryTag::Clinical,
        };
        Self::Only(tag)
    }
}

impl ShowArgs {
    /// Apply the arguments in interaction order; the page comes last so the
    /// resets triggered by the other setters do not discard it.
    pub fn to_params(&self) -> ViewParameters {
        let mut params = ViewParameters::new();
        params.set_tab(self.tab.into());
        if let Some(query) = &self.search {
            params.set_search_query(query.as_str());
        }
        params.set_category(self.category.into());
        params.set_sort_key(self.sort.into());
        params.set_page(self.page);
        params
    }
}

pub async fn run<T: Transport>(
    args: ShowArgs,
    ctl: &AcquisitionController<T>,
    progress: &ProgressContext,
    cancel: &CancellationToken,
) -> Result<()> {
    let result = interrupted(with_progress(ctl, progress, ctl.run(cancel)).await)?;

    let mut params = args.to_params();
    let publications = PublicationView::new(&result.publications);
    let mut view = publications.derive(&params);
    let requested = params.page();
    if params.clamp_page(view.page_count) {
        log::warn!(
            "Page {requested} out of range, showing page {} of {}",
            params.page(),
            view.page_count.max(1)
        );
        view = publications.derive(&params);
    }

    print_profile(&result.author);
    println!("{}", CacheBanner::of(&result));
    print_publications(&view, &params);
    if args.abstracts {
        print_details(&view);
    }
    log::debug!(
        "Rendered {} of {} publications",
        view.visible.len(),
        result.publications.len()
    );
    Ok(())
}

pub fn print_profile(author: &AuthorStats) {
    let mut table = styled_table(&["Author", "Citations", "h-index", "i10-index"]);
    table.add_row(vec![
        Cell::new(&author.name),
        Cell::new(fmt_num(author.citations)).set_alignment(CellAlignment::Right),
        Cell::new(author.h_index).set_alignment(CellAlignment::Right),
        Cell::new(author.i10_index).set_alignment(CellAlignment::Right),
    ]);
    println!("{table}");
}

fn print_publications(view: &View<'_>, params: &ViewParameters) {
    if view.visible.is_empty() {
        println!("No publications match the current filters.");
        return;
    }

    let mut table = styled_table(&["#", "Title", "Areas", "Venue", "Year", "Cited by"]);
    for (i, entry) in view.visible.iter().enumerate() {
        let record = entry.record;
        let rank = match params.tab() {
            Tab::Top => i + 1,
            Tab::All => (params.page() - 1) * scholarview_core::PAGE_SIZE + i + 1,
        };
        let areas = entry
            .categories
            .iter()
            .map(|tag| tag.label())
            .collect::<Vec<_>>()
            .join(", ");
        let year = if record.year == 0 {
            "-".to_string()
        } else {
            record.year.to_string()
        };
        table.add_row(vec![
            Cell::new(rank).set_alignment(CellAlignment::Right),
            Cell::new(record.title_or_empty()),
            Cell::new(areas),
            Cell::new(record.venue.as_deref().unwrap_or("-")),
            Cell::new(year).set_alignment(CellAlignment::Right),
            Cell::new(fmt_num(record.citations)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");

    if params.tab() == Tab::All {
        println!(
            "Page {} of {} ({} matching)",
            params.page(),
            view.page_count.max(1),
            view.total_matched
        );
    }
}

fn print_details(view: &View<'_>) {
    for entry in &view.visible {
        let record = entry.record;
        println!();
        println!("{}", record.title_or_empty());
        if let Some(authors) = &record.authors {
            println!("  {authors}");
        }
        if let Some(text) = record.abstract_text.as_deref().filter(|t| !t.is_empty()) {
            println!("  {text}");
        }
        if let Some(url) = &record.url {
            println!("  {url}");
        }
        println!("  Cited by: {}", citation_search_url(record.title_or_empty()));
    }
}

/// Summary line used after a refresh.
pub fn summary(result: &AcquisitionResult) -> String {
    format!(
        "{}: {} publications, {} citations. {}",
        result.author.name,
        fmt_num(result.publications.len() as u64),
        fmt_num(result.author.citations),
        CacheBanner::of(result)
    )
}
