//! Scroll/hover/intersection-driven window growth.
//!
//! The loader reads and extends group windows only through the grouper's
//! API. One in-flight-load guard covers the whole grouper: a trigger that
//! fires while any load is running is dropped, not queued.

use std::collections::HashMap;
use tracing::debug;

use super::grouper::CategoryGrouper;
use crate::config::CatalogConfig;
use crate::models::ContentRecord;

#[derive(Debug, Clone)]
pub struct LoaderSettings {
    /// Fraction of scrollable width that triggers a load when crossed.
    pub scroll_threshold: f64,
    /// Hovering within this many pages of the last loaded one prefetches.
    pub preload_threshold: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            scroll_threshold: 0.8,
            preload_threshold: 2,
        }
    }
}

impl From<&CatalogConfig> for LoaderSettings {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            scroll_threshold: config.scroll_threshold,
            preload_threshold: config.preload_threshold,
        }
    }
}

/// Scroll geometry of one horizontally-scrolling group container, as
/// reported by the rendering collaborator.
#[derive(Debug, Clone, Copy)]
pub struct ScrollMetrics {
    pub offset: f64,
    pub viewport_width: f64,
    pub content_width: f64,
}

pub struct WindowedLoader {
    settings: LoaderSettings,
    /// Single-flight guard shared by every group.
    loading: bool,
    /// Per-group scroll offsets, snapshotted so the view can be restored
    /// after a window grows and re-renders.
    scroll_positions: HashMap<String, f64>,
}

impl WindowedLoader {
    pub fn new(settings: LoaderSettings) -> Self {
        Self {
            settings,
            loading: false,
            scroll_positions: HashMap::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Take the guard for a load that spans frames. Returns false when a
    /// load is already in flight, in which case the trigger is dropped.
    pub fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish_load(&mut self) {
        self.loading = false;
    }

    /// Grow one group's window. No-op when the group has nothing more to
    /// give or a load is already in flight.
    pub fn load_more(
        &mut self,
        grouper: &mut CategoryGrouper,
        group_name: &str,
    ) -> Vec<ContentRecord> {
        if !self.begin_load() {
            debug!("Load for '{}' dropped: another load in flight", group_name);
            return Vec::new();
        }

        let appended = grouper.grow_window(group_name);
        self.finish_load();
        appended
    }

    /// Scroll trigger: snapshot the offset, then load when the position
    /// crosses the threshold fraction of the scrollable width.
    pub fn on_scroll(
        &mut self,
        grouper: &mut CategoryGrouper,
        group_name: &str,
        metrics: ScrollMetrics,
    ) -> Vec<ContentRecord> {
        self.scroll_positions
            .insert(group_name.to_string(), metrics.offset);

        if self.loading {
            return Vec::new();
        }

        let crossed = metrics.offset + metrics.viewport_width
            >= metrics.content_width * self.settings.scroll_threshold;
        if !crossed {
            return Vec::new();
        }

        self.load_more(grouper, group_name)
    }

    /// Movies pagination: a sentinel near the tail of rendered pages became
    /// visible. Materializes the next page.
    pub fn on_page_sentinel(&mut self, grouper: &mut CategoryGrouper) -> bool {
        if !self.begin_load() {
            return false;
        }
        let loaded = grouper.load_next_page();
        self.finish_load();
        loaded
    }

    /// Movies pagination: hover-based prefetch. Loads the next page when
    /// the hovered page index comes within the preload threshold of the
    /// last loaded page.
    pub fn on_page_hover(&mut self, grouper: &mut CategoryGrouper, page_index: usize) -> bool {
        let loaded_pages = grouper.loaded_pages();
        if loaded_pages == 0 || page_index + self.settings.preload_threshold < loaded_pages {
            return false;
        }
        self.on_page_sentinel(grouper)
    }

    /// Offset to restore for a group after its window grew and re-rendered.
    pub fn scroll_offset(&self, group_name: &str) -> Option<f64> {
        self.scroll_positions.get(group_name).copied()
    }

    /// Category switches invalidate every container, so stored offsets go
    /// with them.
    pub fn reset(&mut self) {
        self.scroll_positions.clear();
        self.loading = false;
    }
}

impl Default for WindowedLoader {
    fn default() -> Self {
        Self::new(LoaderSettings::default())
    }
}
