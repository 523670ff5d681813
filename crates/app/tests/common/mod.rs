#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tripmate_app::backend::TripBackend;
use tripmate_app::banner::Banners;
use tripmate_app::TripDetail;
use tripmate_client::ApiError;
use tripmate_core::destination::{CreateDestination, Destination, OptimizeRouteResponse};
use tripmate_core::media::{MediaItem, MediaType, MediaUpload};
use tripmate_core::place::PlaceCandidate;
use tripmate_core::trip::{Trip, TripPrivacy, TripStatus};
use tripmate_core::types::DbId;
use tripmate_maps::loader::DEFAULT_LOAD_TIMEOUT;
use tripmate_maps::provider::{
    DirectionsResult, DirectionsService, DirectionsStatus, RoutePath, RouteRequest,
};
use tripmate_maps::scene::{LoadBehavior, MemoryScriptHost, ScriptedDirections};
use tripmate_maps::{MapError, ScriptLoader};

pub const TRIP_ID: DbId = 7;

/// Which backend call to fail, and with what status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    GetTrip,
    ListDestinations,
    ListMedia,
    AddDestination,
    DeleteDestination,
    OptimizeRoute,
    UploadMedia,
    SearchPlaces,
}

#[derive(Default)]
struct State {
    destinations: Vec<Destination>,
    media: Vec<MediaItem>,
    places: Vec<PlaceCandidate>,
    optimize: OptimizeRouteResponse,
    failures: HashMap<Call, u16>,
    calls: Vec<Call>,
    next_id: DbId,
}

/// An in-memory backend for one trip.
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new(destinations: Vec<Destination>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                destinations,
                optimize: OptimizeRouteResponse {
                    success: true,
                    ..Default::default()
                },
                next_id: 100,
                ..Default::default()
            }),
        })
    }

    /// Make `call` fail with `status` until cleared.
    pub fn fail(&self, call: Call, status: u16) {
        self.state.lock().unwrap().failures.insert(call, status);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub fn set_optimize(&self, response: OptimizeRouteResponse) {
        self.state.lock().unwrap().optimize = response;
    }

    pub fn set_places(&self, places: Vec<PlaceCandidate>) {
        self.state.lock().unwrap().places = places;
    }

    /// How many times `call` was made.
    pub fn count(&self, call: Call) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == call)
            .count()
    }

    pub fn destinations(&self) -> Vec<Destination> {
        self.state.lock().unwrap().destinations.clone()
    }

    fn enter(&self, call: Call) -> Result<std::sync::MutexGuard<'_, State>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let failure = state.failures.get(&call).copied();
        match failure {
            Some(status) => Err(ApiError::Status {
                status,
                body: r#"{"error": "backend says no"}"#.into(),
            }),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl TripBackend for FakeBackend {
    async fn get_trip(&self, trip_id: DbId) -> Result<Trip, ApiError> {
        self.enter(Call::GetTrip)?;
        Ok(trip(trip_id))
    }

    async fn list_destinations(&self, _trip_id: DbId) -> Result<Vec<Destination>, ApiError> {
        Ok(self.enter(Call::ListDestinations)?.destinations.clone())
    }

    async fn list_media(&self, _trip_id: DbId) -> Result<Vec<MediaItem>, ApiError> {
        Ok(self.enter(Call::ListMedia)?.media.clone())
    }

    async fn add_destination(
        &self,
        _trip_id: DbId,
        form: &CreateDestination,
    ) -> Result<Destination, ApiError> {
        let mut state = self.enter(Call::AddDestination)?;
        state.next_id += 1;
        let order_index = state.destinations.len() as i32;
        let mut added = destination(state.next_id, &form.name, order_index, form.latitude, form.longitude);
        added.address = form.address.clone();
        added.duration_minutes = form.duration_minutes;
        state.destinations.push(added.clone());
        Ok(added)
    }

    async fn delete_destination(
        &self,
        _trip_id: DbId,
        destination_id: DbId,
    ) -> Result<(), ApiError> {
        let mut state = self.enter(Call::DeleteDestination)?;
        let before = state.destinations.len();
        state.destinations.retain(|d| d.id != destination_id);
        if state.destinations.len() == before {
            return Err(ApiError::Status {
                status: 404,
                body: String::new(),
            });
        }
        Ok(())
    }

    async fn optimize_route(&self, _trip_id: DbId) -> Result<OptimizeRouteResponse, ApiError> {
        let mut state = self.enter(Call::OptimizeRoute)?;
        if state.optimize.success {
            // Reverse the visiting order.
            let n = state.destinations.len() as i32;
            for d in state.destinations.iter_mut() {
                d.order_index = n - 1 - d.order_index;
            }
        }
        Ok(OptimizeRouteResponse {
            success: state.optimize.success,
            message: state.optimize.message.clone(),
            error: state.optimize.error.clone(),
            total_distance: state.optimize.total_distance,
            total_duration: state.optimize.total_duration,
        })
    }

    async fn upload_media(&self, _trip_id: DbId, upload: MediaUpload) -> Result<MediaItem, ApiError> {
        let mut state = self.enter(Call::UploadMedia)?;
        state.next_id += 1;
        let item = MediaItem {
            id: state.next_id,
            media_type: MediaType::from_file_name(&upload.file_name),
            file_url: Some(format!("/media/{}", upload.file_name)),
            title: upload.title.unwrap_or_default(),
            description: upload.description.unwrap_or_default(),
            file_size: Some(upload.bytes.len() as i64),
            latitude: None,
            longitude: None,
            captured_at: None,
            destination: upload.destination,
            is_flagged: false,
        };
        state.media.push(item.clone());
        Ok(item)
    }

    async fn search_places(&self, _query: &str) -> Result<Vec<PlaceCandidate>, ApiError> {
        Ok(self.enter(Call::SearchPlaces)?.places.clone())
    }
}

pub fn trip(id: DbId) -> Trip {
    Trip {
        id,
        title: "Italy by car".into(),
        description: String::new(),
        start_date: None,
        end_date: None,
        status: TripStatus::Planning,
        privacy: TripPrivacy::Private,
        share_token: None,
        total_distance: None,
        total_duration: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn destination(id: DbId, name: &str, order_index: i32, lat: f64, lng: f64) -> Destination {
    Destination {
        id,
        name: name.into(),
        address: format!("{name}, Italy"),
        latitude: lat,
        longitude: lng,
        place_id: String::new(),
        notes: String::new(),
        visit_date: None,
        visit_time: None,
        duration_minutes: None,
        order_index,
        media_count: None,
        created_at: None,
    }
}

/// Paris, Milan, and Rome, listed out of visiting order.
pub fn paris_milan_rome() -> Vec<Destination> {
    vec![
        destination(3, "Milan", 2, 45.4642, 9.19),
        destination(1, "Paris", 0, 48.8566, 2.3522),
        destination(2, "Rome", 1, 41.9028, 12.4964),
    ]
}

/// A mounted-ready view over `backend` with an in-memory map.
pub struct Harness {
    pub detail: TripDetail,
    pub host: Arc<MemoryScriptHost>,
    pub directions: Arc<ScriptedDirections>,
}

pub fn harness(backend: Arc<FakeBackend>, api_key: Option<&str>) -> Harness {
    let directions = Arc::new(ScriptedDirections::default());
    let (detail, host) = detail_with(backend, api_key, directions.clone());
    Harness {
        detail,
        host,
        directions,
    }
}

/// A view over `backend` whose map routes through `directions`.
pub fn detail_with(
    backend: Arc<FakeBackend>,
    api_key: Option<&str>,
    directions: Arc<dyn DirectionsService>,
) -> (TripDetail, Arc<MemoryScriptHost>) {
    let host = Arc::new(MemoryScriptHost::new(LoadBehavior::Load, directions));
    let loader = ScriptLoader::new(host.clone(), api_key.map(String::from), DEFAULT_LOAD_TIMEOUT);
    let banners = Banners::new(Duration::from_secs(3), Duration::from_secs(5));
    (TripDetail::new(TRIP_ID, backend, loader, banners), host)
}

/// Answers every route request with a route whose summary is the call
/// number. Call `held` waits for [`GatedDirections::release`] after
/// signalling `entered`.
pub struct GatedDirections {
    held: usize,
    calls: AtomicUsize,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedDirections {
    pub fn holding(call: usize) -> Arc<Self> {
        Arc::new(Self {
            held: call,
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl DirectionsService for GatedDirections {
    async fn route(&self, _request: &RouteRequest) -> Result<DirectionsResult, MapError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.held {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(DirectionsResult {
            status: DirectionsStatus::Ok,
            route: Some(RoutePath {
                summary: format!("call {call}"),
                legs: Vec::new(),
                polyline: String::new(),
            }),
        })
    }
}
