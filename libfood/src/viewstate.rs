//! Moving the map to the location the user picked.
//!
//! When a location is selected (from the list, by clicking its marker, or in
//! code) the camera flies to it, and once the camera arrives the popup for
//! that location is opened. The [MapViewController] only sequences these
//! effects; the map widget itself is reached through the [CameraMover] and
//! [PopupOpener] traits.
use crate::{
    location::{Coordinates, Location},
    timer::Timer,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::{debug, trace};

/// Zoom level of the map before anything is selected
pub const RESTING_ZOOM: f64 = 16.0;

/// Zoom level used when flying to a selected location
pub const TARGET_ZOOM: f64 = 18.0;

/// How long the camera takes to fly to a selected location
pub const FLY_DURATION: Duration = Duration::from_millis(1500);

/// The camera of the map widget
pub trait CameraMover: Send + Sync {
    /// Stop the camera animation that is in progress, if any
    fn cancel_animation(&self);

    /// Start animating the camera towards `target`
    fn fly_to(&self, target: Coordinates, zoom: f64, duration: Duration);
}

/// The info popups attached to the map markers
pub trait PopupOpener: Send + Sync {
    fn open_popup(&self, id: i64);
}

/// Where the controller is in the select → fly → open popup sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Nothing is selected
    #[default]
    Idle,
    /// The camera is on its way to the selected location
    Transitioning { id: i64 },
    /// The camera has arrived and the popup for the location is open
    Settled { id: i64 },
}

impl ViewState {
    /// The currently selected location, if any
    pub fn selected(&self) -> Option<i64> {
        match *self {
            Self::Idle => None,
            Self::Transitioning { id } | Self::Settled { id } => Some(id),
        }
    }
}

/// Camera parameters used by [MapViewController]. The map's initial view
/// uses [RESTING_ZOOM] and is not managed by the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    pub target_zoom: f64,
    pub fly_duration: Duration,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            target_zoom: TARGET_ZOOM,
            fly_duration: FLY_DURATION,
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: ViewState,
    // bumped on every selection change so that a timer that outlived its
    // selection can recognize that it is stale
    generation: u64,
}

/// Turns selection changes into camera moves and popups for one map session
pub struct MapViewController<C, P> {
    camera: Arc<C>,
    popups: Arc<P>,
    config: CameraConfig,
    shared: Arc<Mutex<Shared>>,
    popup_timer: Timer,
    visible: HashMap<i64, Coordinates>,
}

impl<C, P> MapViewController<C, P>
where
    C: CameraMover + 'static,
    P: PopupOpener + 'static,
{
    pub fn new(camera: Arc<C>, popups: Arc<P>) -> Self {
        Self::with_config(camera, popups, CameraConfig::default())
    }

    pub fn with_config(camera: Arc<C>, popups: Arc<P>, config: CameraConfig) -> Self {
        Self {
            camera,
            popups,
            config,
            shared: Arc::new(Mutex::new(Shared::default())),
            popup_timer: Timer::new(),
            visible: HashMap::new(),
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn state(&self) -> ViewState {
        lock(&self.shared).state
    }

    /// Whether a popup is waiting for the camera to arrive
    pub fn popup_pending(&self) -> bool {
        self.popup_timer.is_pending()
    }

    /// Replace the set of locations that can be selected, normally the result
    /// of [crate::search::filter()]. If the selected location is no longer
    /// visible the selection is cleared, so its popup is never opened.
    pub fn set_visible<'a, I>(&mut self, locations: I)
    where
        I: IntoIterator<Item = &'a Location>,
    {
        self.visible = locations
            .into_iter()
            .map(|loc| (loc.id, loc.coordinates()))
            .collect();
        let selected = self.state().selected();
        if let Some(id) = selected.filter(|id| !self.visible.contains_key(id)) {
            debug!(id, "selected location was filtered out");
            self.clear();
        }
    }

    /// Select the location with the given id, or clear the selection with
    /// `None`. Selecting an id that is not in the visible set does nothing.
    pub fn select(&mut self, id: Option<i64>) {
        match id {
            None => self.clear(),
            Some(id) => match self.visible.get(&id).copied() {
                Some(target) => self.fly_to(id, target),
                None => debug!(id, "selected location is not visible, ignoring"),
            },
        }
    }

    fn clear(&mut self) {
        self.popup_timer.cancel();
        let mut shared = lock(&self.shared);
        shared.generation += 1;
        shared.state = ViewState::Idle;
        trace!("selection cleared");
    }

    fn fly_to(&mut self, id: i64, target: Coordinates) {
        self.popup_timer.cancel();
        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.state = ViewState::Transitioning { id };
            shared.generation
        };
        debug!(id, ?target, "flying to selected location");
        self.camera.cancel_animation();
        self.camera
            .fly_to(target, self.config.target_zoom, self.config.fly_duration);

        let shared = self.shared.clone();
        let popups = self.popups.clone();
        self.popup_timer.schedule(self.config.fly_duration, move || {
            // open_popup runs under the lock so it is ordered with fly_to and clear
            let mut shared = lock(&shared);
            if shared.generation != generation {
                trace!(id, "selection changed before the camera arrived");
                return;
            }
            shared.state = ViewState::Settled { id };
            popups.open_popup(id);
        });
    }
}

impl<C, P> std::fmt::Debug for MapViewController<C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapViewController")
            .field("config", &self.config)
            .field("shared", &self.shared)
            .field("popup_timer", &self.popup_timer)
            .field("visible", &self.visible.len())
            .finish_non_exhaustive()
    }
}

// A panic while holding the lock can't leave `Shared` half-updated, so a
// poisoned lock is still usable.
fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}
