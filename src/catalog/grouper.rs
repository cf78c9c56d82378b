//! Category grouping and per-group window state.
//!
//! The grouper exclusively owns the mapping from group name to window state.
//! All mutation happens on the interaction thread; the windowed loader only
//! reads and extends windows through this API. Switching the active category
//! discards all window state and rebuilds from scratch.

use std::collections::HashMap;
use tracing::debug;

use super::category_names::CategoryNameMap;
use super::classifier::Classifier;
use crate::config::CatalogConfig;
use crate::models::{Category, ContentGroup, ContentRecord, DEFAULT_GROUP_LABEL};

#[derive(Debug, Clone)]
pub struct GrouperSettings {
    pub initial_load: usize,
    pub load_more_count: usize,
    pub movies_per_page: usize,
    pub movies_eager_pages: usize,
}

impl Default for GrouperSettings {
    fn default() -> Self {
        Self {
            initial_load: 30,
            load_more_count: 10,
            movies_per_page: 300,
            movies_eager_pages: 2,
        }
    }
}

impl From<&CatalogConfig> for GrouperSettings {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            initial_load: config.initial_load,
            load_more_count: config.load_more_count,
            movies_per_page: config.movies_per_page,
            movies_eager_pages: config.movies_eager_pages,
        }
    }
}

pub struct CategoryGrouper {
    classifier: Classifier,
    category_names: CategoryNameMap,
    settings: GrouperSettings,
    records: Vec<ContentRecord>,
    /// Active-category filter result, in original dataset order.
    filtered: Vec<ContentRecord>,
    active_category: Category,
    /// Group name -> materialized window (always a prefix of the full
    /// matching set in filtered order).
    windows: HashMap<String, Vec<ContentRecord>>,
    /// Movies pagination: number of pages materialized so far.
    loaded_pages: usize,
}

impl CategoryGrouper {
    pub fn new(
        classifier: Classifier,
        category_names: CategoryNameMap,
        settings: GrouperSettings,
    ) -> Self {
        Self {
            classifier,
            category_names,
            settings,
            records: Vec::new(),
            filtered: Vec::new(),
            active_category: Category::Live,
            windows: HashMap::new(),
            loaded_pages: 0,
        }
    }

    /// Replace the full dataset. Clears every window and re-applies the
    /// active category filter.
    pub fn set_records(&mut self, records: Vec<ContentRecord>) {
        self.records = records;
        let category = self.active_category;
        self.select_category(category);
    }

    pub fn active_category(&self) -> Category {
        self.active_category
    }

    /// Switch the active category. All per-group windows are discarded, so
    /// A -> B -> A rebuilds identically to a fresh A selection.
    pub fn select_category(&mut self, category: Category) {
        self.active_category = category;
        self.windows.clear();
        self.loaded_pages = 0;
        self.filtered = self
            .records
            .iter()
            .filter(|r| self.classifier.matches(r, category))
            .cloned()
            .collect();
        debug!(
            "Category {:?} selected: {} matching records",
            category,
            self.filtered.len()
        );

        if category == Category::Movies {
            self.loaded_pages = self.settings.movies_eager_pages.min(self.page_count());
        }
    }

    /// Build the ordered group set for the active category, seeding windows
    /// for groups seen for the first time.
    pub fn groups(&mut self) -> Vec<ContentGroup> {
        if self.filtered.is_empty() {
            return Vec::new();
        }

        if self.active_category == Category::Movies {
            return self.page_groups();
        }

        let mut names = Vec::new();
        for record in &self.filtered {
            let name = self.group_key(record);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        // Final order is always lexical by display name
        names.sort_by_key(|n| n.to_lowercase());

        let initial_load = self.settings.initial_load;
        let mut groups = Vec::with_capacity(names.len());
        for (group_index, name) in names.into_iter().enumerate() {
            let (total_count, seed) = {
                let matching = self.full_matches(&name);
                let seed: Vec<ContentRecord> = matching
                    .iter()
                    .take(initial_load)
                    .map(|r| (*r).clone())
                    .collect();
                (matching.len(), seed)
            };

            let window = self.windows.entry(name.clone()).or_insert(seed).clone();

            groups.push(ContentGroup {
                name,
                window,
                total_count,
                group_index,
            });
        }

        groups
    }

    /// Grow one group's window by `load_more_count` items, returning the
    /// appended records. A group at `has_more == false` is left unchanged.
    pub fn grow_window(&mut self, group_name: &str) -> Vec<ContentRecord> {
        let matching: Vec<ContentRecord> = if self.active_category == Category::Movies {
            match self.page_index_for(group_name) {
                Some(page) => self.page_slice(page).to_vec(),
                None => return Vec::new(),
            }
        } else {
            self.full_matches(group_name).into_iter().cloned().collect()
        };

        let window = self.windows.entry(group_name.to_string()).or_default();
        let current = window.len();
        if current >= matching.len() {
            return Vec::new();
        }

        let next: Vec<ContentRecord> = matching
            .iter()
            .skip(current)
            .take(self.settings.load_more_count)
            .cloned()
            .collect();
        window.extend(next.iter().cloned());
        debug!(
            "Group '{}' window grew by {} to {}",
            group_name,
            next.len(),
            window.len()
        );
        next
    }

    /// Total number of movie pages for the current filter result.
    pub fn page_count(&self) -> usize {
        self.filtered.len().div_ceil(self.settings.movies_per_page)
    }

    pub fn loaded_pages(&self) -> usize {
        self.loaded_pages
    }

    pub fn has_more_pages(&self) -> bool {
        self.active_category == Category::Movies && self.loaded_pages < self.page_count()
    }

    /// Materialize the next movies page. Returns false when every page is
    /// already loaded.
    pub fn load_next_page(&mut self) -> bool {
        if !self.has_more_pages() {
            return false;
        }
        self.loaded_pages += 1;
        debug!(
            "Materialized movies page {}/{}",
            self.loaded_pages,
            self.page_count()
        );
        true
    }

    fn page_groups(&mut self) -> Vec<ContentGroup> {
        let initial_load = self.settings.initial_load;
        let mut groups = Vec::with_capacity(self.loaded_pages);

        for page in 0..self.loaded_pages {
            let name = self.category_names.name_for_page(page);
            let (total_count, seed) = {
                let slice = self.page_slice(page);
                let seed: Vec<ContentRecord> =
                    slice.iter().take(initial_load).cloned().collect();
                (slice.len(), seed)
            };

            let window = self.windows.entry(name.clone()).or_insert(seed).clone();

            groups.push(ContentGroup {
                name,
                window,
                total_count,
                group_index: page,
            });
        }

        groups
    }

    fn page_slice(&self, page: usize) -> &[ContentRecord] {
        let per_page = self.settings.movies_per_page;
        let start = page * per_page;
        let end = (start + per_page).min(self.filtered.len());
        if start >= end {
            &[]
        } else {
            &self.filtered[start..end]
        }
    }

    fn page_index_for(&self, group_name: &str) -> Option<usize> {
        (0..self.page_count()).find(|&page| self.category_names.name_for_page(page) == group_name)
    }

    /// Grouping key: genre for series content, raw source label otherwise.
    fn group_key(&self, record: &ContentRecord) -> String {
        if self.active_category == Category::Series {
            self.classifier.genre(record).to_string()
        } else if record.group_label.is_empty() {
            DEFAULT_GROUP_LABEL.to_string()
        } else {
            record.group_label.clone()
        }
    }

    /// Full matching set for a group, computed by re-filtering each time.
    /// O(n) per group is accepted for simplicity on bounded datasets.
    fn full_matches(&self, group_name: &str) -> Vec<&ContentRecord> {
        self.filtered
            .iter()
            .filter(|r| self.group_key(r) == group_name)
            .collect()
    }
}
