use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::BarColors;
use crate::config::DashboardConfig;
use crate::data::aggregate::{compute_kpis, sales_by_hour, sales_by_product_line, Kpis, RatingPolicy};
use crate::data::cache::LoadCache;
use crate::data::filter::{filtered_indices, Dimension, FilterSelection};
use crate::data::model::SalesTable;
use crate::data::schema::LoadParams;

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Everything the main area shows, derived from the table and the selection.
/// Rebuilt from scratch after every interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    /// Indices of transactions passing the filters, in source order.
    pub indices: Vec<usize>,
    pub kpis: Kpis,
    pub by_product_line: Vec<(String, f64)>,
    pub by_hour: Vec<(u8, f64)>,
}

impl DashboardView {
    pub fn compute(table: &SalesTable, selection: &FilterSelection, policy: &RatingPolicy) -> Self {
        let indices = filtered_indices(table, selection);
        DashboardView {
            kpis: compute_kpis(table, &indices, policy),
            by_product_line: sales_by_product_line(table, &indices),
            by_hour: sales_by_hour(table, &indices),
            indices,
        }
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// One user action.  Each is applied on its own and followed by exactly one
/// recomputation of the [`DashboardView`].
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Flip one value of a sidebar multi-select.
    Toggle(Dimension, String),
    SelectAll(Dimension),
    SelectNone(Dimension),
    /// Switch to another source file.
    OpenSource(PathBuf),
    /// Re-check the current source; reloads only if the file changed.
    Reload,
    /// Drop the cached table and read the current source again.
    ForceReload,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub source: PathBuf,
    params: LoadParams,
    cache: LoadCache,

    /// Loaded table, shared read-only.
    pub table: Arc<SalesTable>,

    /// Current sidebar selections.
    pub selection: FilterSelection,

    /// Filtered rows and aggregates for the current selection.
    pub view: DashboardView,

    pub rating_policy: RatingPolicy,
    pub colors: BarColors,
    pub preview_rows: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load the configured source.  A failure here is fatal for the app.
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let params = config.load_params()?;
        let mut cache = LoadCache::new();
        let table = cache
            .get_or_load(&config.source, &params)
            .with_context(|| format!("loading {}", config.source.display()))?;

        let mut state = AppState {
            source: config.source.clone(),
            params,
            cache,
            selection: FilterSelection::all(&table),
            table,
            view: DashboardView::default(),
            rating_policy: config.rating_policy(),
            colors: config.bar_colors()?,
            preview_rows: config.preview_rows,
            status_message: None,
        };
        state.recompute();
        Ok(state)
    }

    /// Apply a single interaction, then recompute the view.
    pub fn apply(&mut self, interaction: Interaction) {
        log::debug!("Applying {interaction:?}");
        match interaction {
            Interaction::Toggle(dim, value) => self.selection.toggle(dim, &value),
            Interaction::SelectAll(dim) => self.selection.select_all(&self.table, dim),
            Interaction::SelectNone(dim) => self.selection.select_none(dim),
            Interaction::OpenSource(path) => self.switch_source(path),
            Interaction::Reload => self.switch_source(self.source.clone()),
            Interaction::ForceReload => {
                self.cache.invalidate();
                self.switch_source(self.source.clone());
            }
        }
        self.recompute();
    }

    /// Rebuild the derived view from the table and the selection.
    pub fn recompute(&mut self) {
        self.view = DashboardView::compute(&self.table, &self.selection, &self.rating_policy);
    }

    /// Load `path` through the cache.  A new table resets the selection to
    /// "everything"; on failure the current table stays and the error is
    /// reported in the status bar.
    fn switch_source(&mut self, path: PathBuf) {
        match self.cache.get_or_load(&path, &self.params) {
            Ok(table) => {
                if !Arc::ptr_eq(&table, &self.table) {
                    log::info!("Now showing {} (file read #{})", path.display(), self.cache.loads());
                    self.selection = FilterSelection::all(&table);
                    self.table = table;
                }
                self.source = path;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
