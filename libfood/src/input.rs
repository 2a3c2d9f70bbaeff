//! Debounced handling of the search box, including text entered through an
//! input method editor (IME).
//!
//! The text shown in the search box follows every keystroke, but the search
//! itself only runs once the user stops typing for a short while. While an
//! IME composition is in progress (e.g. when typing Chinese or Japanese) the
//! intermediate keystrokes are not real input, so nothing is propagated until
//! the composition ends.
use crate::timer::Timer;
use std::{sync::Arc, time::Duration};
use tracing::trace;

/// Quiet periods used by [SearchInput]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Delay after the last regular keystroke
    pub typing: Duration,
    /// Delay after an IME composition ends
    pub composition: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            typing: Duration::from_millis(150),
            composition: Duration::from_millis(50),
        }
    }
}

type SearchFn = dyn Fn(String) + Send + Sync;

/// The state of a search box. `on_search` is called with the value that
/// should be searched for once the input has settled.
pub struct SearchInput {
    value: String,
    composing: bool,
    config: DebounceConfig,
    timer: Timer,
    on_search: Arc<SearchFn>,
}

impl std::fmt::Debug for SearchInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchInput")
            .field("value", &self.value)
            .field("composing", &self.composing)
            .field("config", &self.config)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl SearchInput {
    pub fn new<F>(on_search: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self::with_config(DebounceConfig::default(), on_search)
    }

    pub fn with_config<F>(config: DebounceConfig, on_search: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            value: String::new(),
            composing: false,
            config,
            timer: Timer::new(),
            on_search: Arc::new(on_search),
        }
    }

    /// The text currently displayed in the search box
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Whether a search is waiting for its quiet period to elapse
    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Handle a change of the search box contents
    pub fn input(&mut self, value: &str) {
        self.value = value.to_string();
        if self.composing {
            trace!(value, "composition in progress, not searching");
            return;
        }
        self.propagate(self.config.typing);
    }

    /// Handle the start of an IME composition. Any search that was waiting
    /// for the typing delay is dropped so that nothing runs until the
    /// composition ends.
    pub fn composition_start(&mut self) {
        self.composing = true;
        self.timer.cancel();
    }

    /// Handle the end of an IME composition with the final composed `value`
    pub fn composition_end(&mut self, value: &str) {
        self.composing = false;
        self.value = value.to_string();
        self.propagate(self.config.composition);
    }

    /// Drop any pending search without running it
    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    fn propagate(&mut self, delay: Duration) {
        let on_search = self.on_search.clone();
        let value = self.value.clone();
        self.timer.schedule(delay, move || on_search(value));
    }
}
