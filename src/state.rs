use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use crate::color::SeriesColors;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::filter::{region_series, search_regions, state_series};
use crate::data::metrics::RegionSummary;
use crate::data::model::{
    ObservationRecord, PreparedDataset, StateAverageRecord, DEFAULT_STATE,
};
use crate::data::prepare::DatasetPreparer;
use crate::geo::{Coordinates, GeocodeWorker, Geocoder, NominatimBackend, RateLimitedGeocoder};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    preparer: DatasetPreparer,
    cache: DatasetCache,

    /// File the current dataset was read from (or was attempted).
    pub data_path: PathBuf,

    /// Prepared dataset (None until a load succeeds).
    pub dataset: Option<Arc<PreparedDataset>>,

    /// Region chosen in the selector.
    pub selected_region: Option<String>,

    /// Text typed into the region search box.
    pub region_query: String,

    pub show_state_average: bool,
    pub show_growth: bool,
    pub show_map: bool,

    /// `None` when geocoding is switched off.
    geocoder: Option<GeocodeWorker>,

    /// Region whose lookup is in flight.
    locating: Option<String>,

    /// Position of the selected region, once looked up.
    pub location: Option<Coordinates>,

    pub colors: SeriesColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let geocoder = if config.options.include_geocoding {
            build_geocoder(&config)
        } else {
            None
        };
        Self::with_geocoder(config, geocoder)
    }

    /// Build state around an explicit geocoder (or none). The geocoder is
    /// moved onto a background thread.
    pub fn with_geocoder(
        config: DashboardConfig,
        geocoder: Option<Box<dyn Geocoder + Send>>,
    ) -> Self {
        let geocoder = geocoder.and_then(|g| match GeocodeWorker::spawn(g) {
            Ok(worker) => Some(worker),
            Err(e) => {
                log::error!("Geocoding disabled, could not start its thread: {e}");
                None
            }
        });
        let show_growth = config.options.include_growth_rate;
        let show_map = geocoder.is_some();
        Self {
            preparer: DatasetPreparer::new(config.options),
            cache: DatasetCache::new(),
            data_path: config.data_path.clone(),
            config,
            dataset: None,
            selected_region: None,
            region_query: String::new(),
            show_state_average: true,
            show_growth,
            show_map,
            geocoder,
            locating: None,
            location: None,
            colors: SeriesColors::default(),
            status_message: None,
        }
    }

    /// Whether the map view can be shown at all.
    pub fn geocoding_available(&self) -> bool {
        self.geocoder.is_some()
    }

    /// Load (or fetch from cache) the dataset at `path`. Failures end up
    /// in `status_message`; a missing file clears the dataset.
    pub fn load(&mut self, path: &Path) {
        self.data_path = path.to_path_buf();
        let today = Utc::now().date_naive();

        match self.cache.get_or_prepare(&self.preparer, path, today) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} observations across {} regions from {}",
                    dataset.len(),
                    dataset.regions.len(),
                    path.display()
                );
                let (hits, misses) = self.cache.stats();
                log::debug!("Dataset cache: {hits} hits, {misses} misses");
                self.set_dataset(dataset);
            }
            Err(e) => {
                if e.is_unavailable() {
                    log::warn!("{e}");
                    self.dataset = None;
                    self.selected_region = None;
                    self.locating = None;
                    self.location = None;
                } else {
                    log::error!("Failed to load file: {e}");
                }
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Re-read the current file, bypassing the cache.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        let path = self.data_path.clone();
        self.load(&path);
    }

    /// Install a freshly prepared dataset, keeping the selection when the
    /// region still exists.
    pub fn set_dataset(&mut self, dataset: Arc<PreparedDataset>) {
        let keep = self
            .selected_region
            .as_ref()
            .filter(|r| dataset.regions.contains(r))
            .cloned();
        let default = dataset
            .regions
            .iter()
            .find(|r| r.as_str() == DEFAULT_STATE)
            .or_else(|| dataset.regions.first())
            .cloned();

        self.dataset = Some(dataset);
        self.status_message = None;
        match keep.or(default) {
            Some(region) => self.select_region(&region),
            None => self.selected_region = None,
        }
    }

    /// Change the selected region and refresh its location.
    pub fn select_region(&mut self, region: &str) {
        if self.selected_region.as_deref() == Some(region) {
            return;
        }
        self.selected_region = Some(region.to_string());
        self.location = None;
        self.locating = None;
        if self.show_map {
            self.locate_selected();
        }
    }

    /// Queue a lookup of the selected region's coordinates. The answer
    /// arrives through [`AppState::poll_location`].
    pub fn locate_selected(&mut self) {
        let (Some(geocoder), Some(region)) = (&self.geocoder, self.selected_region.as_deref())
        else {
            return;
        };
        if self.location.is_some() || self.locating.as_deref() == Some(region) {
            return;
        }
        if geocoder.request(region) {
            self.locating = Some(region.to_string());
        }
    }

    /// Drain finished lookups; answers for regions no longer selected are
    /// dropped. Returns `true` while a lookup is still outstanding.
    pub fn poll_location(&mut self) -> bool {
        let Some(geocoder) = &self.geocoder else {
            return false;
        };
        while let Some((place, found)) = geocoder.try_reply() {
            if self.locating.as_deref() == Some(place.as_str()) {
                self.location = found;
                self.locating = None;
            }
        }
        self.locating.is_some()
    }

    /// Whether the selected region's lookup has not come back yet.
    pub fn is_locating(&self) -> bool {
        self.locating.is_some()
    }

    /// Regions matching the search box.
    pub fn visible_regions(&self) -> Vec<&str> {
        match &self.dataset {
            Some(ds) => search_regions(ds, &self.region_query),
            None => Vec::new(),
        }
    }

    /// Selected region's observations, oldest first.
    pub fn selected_series(&self) -> Vec<&ObservationRecord> {
        match (&self.dataset, &self.selected_region) {
            (Some(ds), Some(region)) => region_series(ds, region),
            _ => Vec::new(),
        }
    }

    /// State the selected region belongs to.
    pub fn selected_state(&self) -> Option<&str> {
        let ds = self.dataset.as_ref()?;
        ds.state_of(self.selected_region.as_deref()?)
    }

    /// State averages for the selected region's state, oldest first.
    pub fn selected_state_series(&self) -> Vec<&StateAverageRecord> {
        match (&self.dataset, self.selected_state()) {
            (Some(ds), Some(state)) => state_series(ds, state),
            _ => Vec::new(),
        }
    }

    pub fn summary(&self) -> RegionSummary {
        RegionSummary::from_series(&self.selected_series())
    }
}

fn build_geocoder(config: &DashboardConfig) -> Option<Box<dyn Geocoder + Send>> {
    match NominatimBackend::new(&config.geocoder_url, &config.geocoder_user_agent) {
        Ok(backend) => Some(Box::new(RateLimitedGeocoder::new(
            backend,
            config.geocoder_interval,
        ))),
        Err(e) => {
            log::error!("Geocoding disabled: {e}");
            None
        }
    }
}
