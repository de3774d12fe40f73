//! Optional geocoding of region names for the map view.
//!
//! Lookups go through [`RateLimitedGeocoder`], which memoizes every answer
//! (including failures) per query string and spaces backend calls at least
//! `min_interval` apart. A failed lookup yields `None`, meaning
//! "coordinates unknown"; it never reaches the caller as an error.
//!
//! The UI never calls a geocoder directly: [`GeocodeWorker`] owns it on a
//! background thread and answers over a channel.

use std::collections::HashMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::GeocodeError;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves a place name to coordinates.
pub trait Geocoder {
    /// `None` means the coordinates are unknown.
    fn locate(&mut self, place: &str) -> Option<Coordinates>;
}

/// One raw lookup against a geocoding service.
pub trait GeocodeBackend {
    fn lookup(&mut self, place: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

// ---------------------------------------------------------------------------
// Rate limiting + memoization
// ---------------------------------------------------------------------------

pub struct RateLimitedGeocoder<B> {
    backend: B,
    min_interval: Duration,
    last_call: Option<Instant>,
    memo: HashMap<String, Option<Coordinates>>,
}

impl<B: GeocodeBackend> RateLimitedGeocoder<B> {
    pub fn new(backend: B, min_interval: Duration) -> Self {
        Self {
            backend,
            min_interval,
            last_call: None,
            memo: HashMap::new(),
        }
    }

    /// Number of distinct queries answered so far.
    pub fn cached(&self) -> usize {
        self.memo.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn throttle(&self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
    }
}

impl<B: GeocodeBackend> Geocoder for RateLimitedGeocoder<B> {
    fn locate(&mut self, place: &str) -> Option<Coordinates> {
        let key = place.trim();
        if key.is_empty() {
            return None;
        }
        if let Some(hit) = self.memo.get(key) {
            return *hit;
        }

        self.throttle();
        let result = match self.backend.lookup(key) {
            Ok(found) => {
                if found.is_none() {
                    log::info!("No coordinates found for {key:?}");
                }
                found
            }
            Err(e) => {
                log::warn!("Geocoding {key:?} failed: {e}");
                None
            }
        };
        self.last_call = Some(Instant::now());
        self.memo.insert(key.to_string(), result);
        result
    }
}

// ---------------------------------------------------------------------------
// Background worker
// ---------------------------------------------------------------------------

/// A finished lookup: the query and what it resolved to.
pub type GeocodeReply = (String, Option<Coordinates>);

/// Runs a [`Geocoder`] on its own thread so throttling and network
/// latency never block a frame. The thread exits once the worker is dropped.
pub struct GeocodeWorker {
    requests: Sender<String>,
    replies: Receiver<GeocodeReply>,
}

impl GeocodeWorker {
    pub fn spawn(mut geocoder: Box<dyn Geocoder + Send>) -> io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<String>();
        let (reply_tx, reply_rx) = mpsc::channel::<GeocodeReply>();

        thread::Builder::new()
            .name("geocoder".into())
            .spawn(move || {
                for place in request_rx {
                    let found = geocoder.locate(&place);
                    if reply_tx.send((place, found)).is_err() {
                        break;
                    }
                }
                log::debug!("Geocoder thread stopped");
            })?;

        Ok(Self {
            requests: request_tx,
            replies: reply_rx,
        })
    }

    /// Queue a lookup. Returns `false` when the worker thread is gone.
    pub fn request(&self, place: &str) -> bool {
        match self.requests.send(place.to_string()) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("Geocoder thread is not running; {place:?} stays unknown");
                false
            }
        }
    }

    /// Next finished lookup, if any. Never blocks.
    pub fn try_reply(&self) -> Option<GeocodeReply> {
        match self.replies.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Geocoder thread exited");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Nominatim backend
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Nominatim-compatible `/search?format=json` client.
pub struct NominatimBackend {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl NominatimBackend {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

impl GeocodeBackend for NominatimBackend {
    fn lookup(&mut self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .header("Accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let places: Vec<NominatimPlace> = response.json()?;
        places.first().map(parse_place).transpose()
    }
}

fn parse_place(place: &NominatimPlace) -> Result<Coordinates, GeocodeError> {
    let latitude = place
        .lat
        .parse()
        .map_err(|_| GeocodeError::InvalidCoordinate(place.lat.clone()))?;
    let longitude = place
        .lon
        .parse()
        .map_err(|_| GeocodeError::InvalidCoordinate(place.lon.clone()))?;
    Ok(Coordinates {
        latitude,
        longitude,
    })
}
