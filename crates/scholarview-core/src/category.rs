//! Heuristic topic tags derived from publication titles

use std::collections::BTreeSet;

/// Topic tag inferred from a title. Not authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryTag {
    Epilepsy,
    Neuroimaging,
    Neuromodulation,
    Psychiatry,
    Methods,
    Clinical,
}

/// Ordered set of tags for one record
pub type CategorySet = BTreeSet<CategoryTag>;

impl CategoryTag {
    pub const ALL: [CategoryTag; 6] = [
        Self::Epilepsy,
        Self::Neuroimaging,
        Self::Neuromodulation,
        Self::Psychiatry,
        Self::Methods,
        Self::Clinical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Epilepsy => "epilepsy",
            Self::Neuroimaging => "neuroimaging",
            Self::Neuromodulation => "neuromodulation",
            Self::Psychiatry => "psychiatry",
            Self::Methods => "methods",
            Self::Clinical => "clinical",
        }
    }

    /// Human-readable label for chips/tables
    pub fn label(self) -> &'static str {
        match self {
            Self::Epilepsy => "Epilepsy",
            Self::Neuroimaging => "Neuroimaging",
            Self::Neuromodulation => "Neuromodulation",
            Self::Psychiatry => "Psychiatry",
            Self::Methods => "Methods & Algorithms",
            Self::Clinical => "Clinical Studies",
        }
    }

    /// Lowercase substrings that trigger this tag
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Epilepsy => &["epilep"],
            Self::Neuroimaging => &["meg", "eeg"],
            Self::Neuromodulation => &["closed-loop", "stimulation"],
            Self::Psychiatry => &["ptsd", "psychiatric", "depression"],
            Self::Methods => &["algorithm", "detection", "classification"],
            Self::Clinical => &["clinical", "patient"],
        }
    }
}

impl std::fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Tags for a title by case-insensitive substring match. `None` yields no tags.
pub fn categorize(title: Option<&str>) -> CategorySet {
    let Some(title) = title else {
        return CategorySet::new();
    };
    let lower = title.to_lowercase();
    CategoryTag::ALL
        .into_iter()
        .filter(|tag| tag.keywords().iter().any(|kw| lower.contains(kw)))
        .collect()
}

/// Category selector: a single tag or no filtering at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CategoryTag),
}

impl CategoryFilter {
    pub fn matches(self, tags: &CategorySet) -> bool {
        match self {
            Self::All => true,
            Self::Only(tag) => tags.contains(&tag),
        }
    }
}
