//! Explicit event-listener subscriptions.
//!
//! Every process-wide listener the bridge installs is owned by an
//! `EventSubscription`: the closure stays alive exactly as long as the
//! subscription value, and dropping it removes the listener again. Nothing
//! here calls `Closure::forget`, so teardown is a defined operation rather
//! than a leak.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::EventTarget;

use crate::error::BridgeError;

/// One `addEventListener` registration, removed on drop.
pub struct EventSubscription {
    target: EventTarget,
    event: String,
    capture: bool,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventSubscription {
    /// Listen on `target` in the bubbling phase.
    pub fn listen(
        target: &EventTarget,
        event: &str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, BridgeError> {
        Self::attach(target, event, false, handler)
    }

    /// Listen on the window in the bubbling phase.
    pub fn window_listen(
        event: &str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, BridgeError> {
        let window = web_sys::window().ok_or_else(|| BridgeError::Dom("no window".to_string()))?;
        Self::attach(window.as_ref(), event, false, handler)
    }

    /// Listen on the window in the capture phase, ahead of any page
    /// handlers.
    pub fn window_listen_capture(
        event: &str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, BridgeError> {
        let window = web_sys::window().ok_or_else(|| BridgeError::Dom("no window".to_string()))?;
        Self::attach(window.as_ref(), event, true, handler)
    }

    fn attach(
        target: &EventTarget,
        event: &str,
        capture: bool,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, BridgeError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        let registered = if capture {
            target.add_event_listener_with_callback_and_bool(
                event,
                callback.as_ref().unchecked_ref(),
                true,
            )
        } else {
            target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        };
        registered.map_err(|_| BridgeError::Dom(format!("addEventListener(\"{event}\")")))?;

        Ok(Self {
            target: target.clone(),
            event: event.to_string(),
            capture,
            callback,
        })
    }

    pub fn event(&self) -> &str {
        &self.event
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        let removed = if self.capture {
            self.target.remove_event_listener_with_callback_and_bool(
                &self.event,
                self.callback.as_ref().unchecked_ref(),
                true,
            )
        } else {
            self.target
                .remove_event_listener_with_callback(&self.event, self.callback.as_ref().unchecked_ref())
        };
        if removed.is_err() {
            crate::log_warn!("failed to remove `{}` listener", self.event);
        }
    }
}
