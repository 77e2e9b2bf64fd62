//! Client configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::calendar::{CalendarGrid, DateArithmetic, WeekNumbering, DEFAULT_GRID_WEEKS};
use crate::error::{Result, SearchError};

fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_search_path() -> String {
    "/search".to_string()
}

fn default_weeks_per_grid() -> usize {
    DEFAULT_GRID_WEEKS
}

/// Where the back-end lives and how the date picker renders.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_search_path")]
    pub search_path: String,
    /// Sent as `items-per-page` when set; the back-end picks otherwise.
    #[serde(default)]
    pub items_per_page: Option<u32>,
    #[serde(default = "default_weeks_per_grid")]
    pub weeks_per_grid: usize,
    #[serde(default)]
    pub week_numbering: WeekNumbering,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            backend_url: default_backend_url(),
            search_path: default_search_path(),
            items_per_page: None,
            weeks_per_grid: default_weeks_per_grid(),
            week_numbering: WeekNumbering::default(),
        }
    }
}

impl SearchConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: SearchConfig =
            serde_json::from_str(json).map_err(|e| SearchError::Config(e.to_string()))?;
        config.sanitize();
        config.search_endpoint()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Config(format!("{}: {e}", path.display())))?;
        let config = SearchConfig::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            backend_url = %config.backend_url,
            week_numbering = ?config.week_numbering,
            "loaded search config"
        );
        Ok(config)
    }

    fn sanitize(&mut self) {
        if self.weeks_per_grid == 0 {
            warn!("weeks_per_grid is 0; using {DEFAULT_GRID_WEEKS}");
            self.weeks_per_grid = DEFAULT_GRID_WEEKS;
        }
        if self.items_per_page == Some(0) {
            warn!("items_per_page is 0; leaving it to the back-end");
            self.items_per_page = None;
        }
    }

    /// Absolute URL of the search endpoint.
    pub fn search_endpoint(&self) -> Result<Url> {
        endpoint(&self.backend_url, &self.search_path)
    }

    /// Absolute URL of an arbitrary back-end path.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        endpoint(&self.backend_url, path)
    }

    /// A calendar grid using the configured week numbering.
    pub fn grid<A: DateArithmetic>(&self, calendar: A) -> CalendarGrid<A> {
        CalendarGrid::new(calendar).with_numbering(self.week_numbering)
    }
}

fn endpoint(base: &str, path: &str) -> Result<Url> {
    let base = Url::parse(base).map_err(|e| SearchError::Config(format!("'{base}': {e}")))?;
    base.join(path)
        .map_err(|e| SearchError::Config(format!("'{path}': {e}")))
}
