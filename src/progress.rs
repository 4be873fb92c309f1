//! Navigation progress indicator.
//!
//! One shared bar at the top of the viewport, shown while a live
//! navigation or form submission is in flight. The timing rules live in
//! [`ProgressState`], which is plain data so the flash-prevention and
//! idempotence properties are testable off the browser; the DOM shell
//! around it only shows and hides the element.

/// Minimum time the bar stays visible once shown, in milliseconds. A stop
/// arriving earlier defers the hide for the remainder so even instant
/// navigations produce a visible flash.
pub const MIN_VISIBLE_MS: f64 = 300.0;

/// Fixed bar color, matching the rest of the product chrome.
pub const BAR_COLOR: &str = "#29d";

/// Fixed bar shadow.
pub const BAR_SHADOW: &str = "rgba(0, 0, 0, .3)";

/// What the shell must do with the bar after a stop signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HideDecision {
    /// The bar is not visible; nothing to do.
    AlreadyHidden,
    /// The minimum visible window has elapsed; hide immediately.
    Now,
    /// Hide after `delay_ms`, unless a newer start supersedes `epoch`.
    After { delay_ms: f64, epoch: u64 },
}

/// Visibility state machine for the shared indicator.
///
/// Idempotent by construction: repeated starts keep the original show
/// time, and stops on a hidden bar are no-ops. The epoch counter ties a
/// deferred hide to the start generation it was issued for, so a start
/// arriving while a hide is pending cancels it.
#[derive(Debug)]
pub struct ProgressState {
    min_visible_ms: f64,
    shown_at: Option<f64>,
    epoch: u64,
}

impl ProgressState {
    pub fn new(min_visible_ms: f64) -> Self {
        Self {
            min_visible_ms,
            shown_at: None,
            epoch: 0,
        }
    }

    /// A navigation started. Returns whether the bar must be shown
    /// (`false` when it is already visible).
    pub fn on_start(&mut self, now_ms: f64) -> bool {
        self.epoch += 1;
        if self.shown_at.is_some() {
            return false;
        }
        self.shown_at = Some(now_ms);
        true
    }

    /// The pending navigation finished.
    pub fn on_stop(&mut self, now_ms: f64) -> HideDecision {
        let Some(shown_at) = self.shown_at else {
            return HideDecision::AlreadyHidden;
        };
        let elapsed = now_ms - shown_at;
        if elapsed >= self.min_visible_ms {
            self.shown_at = None;
            HideDecision::Now
        } else {
            HideDecision::After {
                delay_ms: self.min_visible_ms - elapsed,
                epoch: self.epoch,
            }
        }
    }

    /// A deferred hide fired. Returns whether the bar should actually hide
    /// (no start intervened since the hide was scheduled).
    pub fn confirm_hide(&mut self, epoch: u64) -> bool {
        if self.epoch == epoch && self.shown_at.is_some() {
            self.shown_at = None;
            true
        } else {
            false
        }
    }

    pub fn is_visible(&self) -> bool {
        self.shown_at.is_some()
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new(MIN_VISIBLE_MS)
    }
}

// =========================================
// Web (WASM) shell
// =========================================

#[cfg(target_arch = "wasm32")]
pub use shell::ProgressBar;

#[cfg(target_arch = "wasm32")]
mod shell {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gloo_timers::future::TimeoutFuture;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;

    use super::{HideDecision, ProgressState, BAR_COLOR, BAR_SHADOW};
    use crate::error::BridgeError;
    use crate::events;
    use crate::subscription::EventSubscription;

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    /// The shared indicator element, driven only by the page-loading
    /// events.
    pub struct ProgressBar {
        bar: web_sys::HtmlElement,
        _subs: Vec<EventSubscription>,
    }

    impl ProgressBar {
        /// Create the bar element and install the `page-loading-start` /
        /// `page-loading-stop` listeners.
        pub fn attach() -> Result<Self, BridgeError> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| BridgeError::Dom("no document".to_string()))?;
            let body = document
                .body()
                .ok_or_else(|| BridgeError::Dom("no body".to_string()))?;

            let bar = document
                .create_element("div")
                .map_err(|_| BridgeError::Dom("createElement(div)".to_string()))?
                .unchecked_into::<web_sys::HtmlElement>();
            bar.set_id("livebridge-progress");
            let style = bar.style();
            let shadow = format!("0 1px 3px {BAR_SHADOW}");
            for (prop, value) in [
                ("position", "fixed"),
                ("top", "0"),
                ("left", "0"),
                ("width", "100%"),
                ("height", "3px"),
                ("background", BAR_COLOR),
                ("box-shadow", shadow.as_str()),
                ("z-index", "9999"),
                ("display", "none"),
            ] {
                let _ = style.set_property(prop, value);
            }
            body.append_child(&bar)
                .map_err(|_| BridgeError::Dom("appendChild(progress)".to_string()))?;

            let state = Rc::new(RefCell::new(ProgressState::default()));

            let start_state = state.clone();
            let start_bar = bar.clone();
            let on_start = EventSubscription::window_listen(events::PAGE_LOADING_START, move |_| {
                if start_state.borrow_mut().on_start(now_ms()) {
                    set_visible(&start_bar, true);
                }
            })?;

            let stop_state = state.clone();
            let stop_bar = bar.clone();
            let on_stop = EventSubscription::window_listen(events::PAGE_LOADING_STOP, move |_| {
                let decision = stop_state.borrow_mut().on_stop(now_ms());
                match decision {
                    HideDecision::AlreadyHidden => {}
                    HideDecision::Now => set_visible(&stop_bar, false),
                    HideDecision::After { delay_ms, epoch } => {
                        let state = stop_state.clone();
                        let bar = stop_bar.clone();
                        spawn_local(async move {
                            TimeoutFuture::new(delay_ms.ceil() as u32).await;
                            if state.borrow_mut().confirm_hide(epoch) {
                                set_visible(&bar, false);
                            }
                        });
                    }
                }
            })?;

            Ok(Self {
                bar,
                _subs: vec![on_start, on_stop],
            })
        }

        pub fn is_visible(&self) -> bool {
            self.bar
                .style()
                .get_property_value("display")
                .map(|display| display != "none")
                .unwrap_or(false)
        }
    }

    impl Drop for ProgressBar {
        fn drop(&mut self) {
            self.bar.remove();
        }
    }

    fn set_visible(bar: &web_sys::HtmlElement, visible: bool) {
        let display = if visible { "block" } else { "none" };
        let _ = bar.style().set_property("display", display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_shows_once() {
        let mut state = ProgressState::default();
        assert!(state.on_start(0.0));
        assert!(!state.on_start(50.0));
        assert!(state.is_visible());
    }

    #[test]
    fn slow_navigation_hides_immediately() {
        let mut state = ProgressState::default();
        state.on_start(0.0);
        assert_eq!(state.on_stop(1000.0), HideDecision::Now);
        assert!(!state.is_visible());
    }

    #[test]
    fn fast_navigation_defers_the_hide() {
        let mut state = ProgressState::default();
        state.on_start(0.0);
        match state.on_stop(10.0) {
            HideDecision::After { delay_ms, epoch } => {
                assert_eq!(delay_ms, MIN_VISIBLE_MS - 10.0);
                assert!(state.is_visible());
                assert!(state.confirm_hide(epoch));
                assert!(!state.is_visible());
            }
            other => panic!("expected deferred hide, got {other:?}"),
        }
    }

    #[test]
    fn a_new_start_cancels_a_pending_hide() {
        let mut state = ProgressState::default();
        state.on_start(0.0);
        let HideDecision::After { epoch, .. } = state.on_stop(10.0) else {
            panic!("expected deferred hide");
        };
        state.on_start(20.0);
        assert!(!state.confirm_hide(epoch));
        assert!(state.is_visible());
    }

    #[test]
    fn stop_on_a_hidden_bar_is_a_noop_twice_over() {
        let mut state = ProgressState::default();
        assert_eq!(state.on_stop(0.0), HideDecision::AlreadyHidden);
        assert_eq!(state.on_stop(1.0), HideDecision::AlreadyHidden);

        state.on_start(10.0);
        assert_eq!(state.on_stop(1000.0), HideDecision::Now);
        assert_eq!(state.on_stop(1001.0), HideDecision::AlreadyHidden);
    }

    #[test]
    fn restart_keeps_the_original_show_time() {
        let mut state = ProgressState::default();
        state.on_start(0.0);
        let _ = state.on_stop(10.0);
        state.on_start(20.0);
        // Visible since t=0, so by t=310 the minimum window has passed.
        assert_eq!(state.on_stop(310.0), HideDecision::Now);
    }
}
