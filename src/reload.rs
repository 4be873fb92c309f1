//! Development log/edit bridge.
//!
//! Quality-of-life glue for development builds only:
//!
//!   1. streams server logs to the browser console
//!   2. maps modifier-clicks on rendered elements to "open my editor at
//!      this element's source" requests
//!
//! The live-reload companion announces itself with a `live_reload:attached`
//! custom event whose detail is the companion object itself. Click routing
//! is driven by the most recently pressed key: `c` opens the caller
//! location, `d` the definition, anything else leaves the click alone.

/// Key held to open the clicked element's caller location.
pub const CALLER_KEY: &str = "c";

/// Key held to open the clicked element's definition location.
pub const DEF_KEY: &str = "d";

/// What a click should do given the currently held key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickIntent {
    OpenAtCaller,
    OpenAtDef,
    PassThrough,
}

/// Most-recently-pressed-key state.
///
/// Written only by the key handlers (down sets, up clears), read only by
/// the click interceptor. Holding a key and clicking is the whole
/// protocol, so only one key is ever tracked.
#[derive(Debug, Default)]
pub struct KeyTracker {
    held: Option<String>,
}

impl KeyTracker {
    pub fn key_down(&mut self, key: &str) {
        self.held = Some(key.to_string());
    }

    pub fn key_up(&mut self) {
        self.held = None;
    }

    pub fn held(&self) -> Option<&str> {
        self.held.as_deref()
    }

    pub fn click_intent(&self) -> ClickIntent {
        match self.held.as_deref() {
            Some(CALLER_KEY) => ClickIntent::OpenAtCaller,
            Some(DEF_KEY) => ClickIntent::OpenAtDef,
            _ => ClickIntent::PassThrough,
        }
    }
}

// =========================================
// Web (WASM) shell
// =========================================

#[cfg(target_arch = "wasm32")]
pub use shell::{bridge_reloader, installed_reloader, DevBridge, Reloader};

#[cfg(target_arch = "wasm32")]
mod shell {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use super::{ClickIntent, KeyTracker};
    use crate::error::BridgeError;
    use crate::events;
    use crate::subscription::EventSubscription;

    #[wasm_bindgen]
    extern "C" {
        /// Live-reload companion injected by the development server.
        pub type Reloader;

        #[wasm_bindgen(method, js_name = enableServerLogs)]
        pub fn enable_server_logs(this: &Reloader);

        #[wasm_bindgen(method, js_name = disableServerLogs)]
        pub fn disable_server_logs(this: &Reloader);

        #[wasm_bindgen(method, js_name = openEditorAtCaller)]
        pub fn open_editor_at_caller(this: &Reloader, target: &web_sys::Element);

        #[wasm_bindgen(method, js_name = openEditorAtDef)]
        pub fn open_editor_at_def(this: &Reloader, target: &web_sys::Element);
    }

    thread_local! {
        // Console debug slot for the attached companion.
        static RELOADER: RefCell<Option<Rc<Reloader>>> = const { RefCell::new(None) };
    }

    /// The attached reload companion, for console inspection.
    pub fn installed_reloader() -> Option<Rc<Reloader>> {
        RELOADER.with_borrow(Clone::clone)
    }

    /// Console handle to the reload companion; `null` until it attaches.
    #[wasm_bindgen]
    pub fn bridge_reloader() -> JsValue {
        match installed_reloader() {
            Some(reloader) => (*reloader).clone().into(),
            None => JsValue::NULL,
        }
    }

    /// Waits for the reload companion and wires it up once it attaches.
    pub struct DevBridge {
        _attach: EventSubscription,
        active: Rc<RefCell<Option<ActiveDevBridge>>>,
    }

    impl DevBridge {
        pub fn attach() -> Result<Self, BridgeError> {
            let active: Rc<RefCell<Option<ActiveDevBridge>>> = Rc::new(RefCell::new(None));
            let slot = active.clone();
            let attach =
                EventSubscription::window_listen(events::LIVE_RELOAD_ATTACHED, move |event| {
                    let Some(custom) = event.dyn_ref::<web_sys::CustomEvent>() else {
                        return;
                    };
                    let detail = custom.detail();
                    if detail.is_null() || detail.is_undefined() {
                        crate::log_warn!("live reload attached without a companion handle");
                        return;
                    }
                    match ActiveDevBridge::start(detail.unchecked_into()) {
                        Ok(bridge) => *slot.borrow_mut() = Some(bridge),
                        Err(err) => crate::log_error!("dev bridge setup failed: {}", err),
                    }
                })?;

            Ok(Self {
                _attach: attach,
                active,
            })
        }

        pub fn is_active(&self) -> bool {
            self.active.borrow().is_some()
        }
    }

    struct ActiveDevBridge {
        _subs: Vec<EventSubscription>,
    }

    impl ActiveDevBridge {
        fn start(reloader: Reloader) -> Result<Self, BridgeError> {
            // Server log lines flow to this console from here on. Turn off
            // from the console via the reloader handle itself.
            reloader.enable_server_logs();
            crate::log_info!(
                "server logs streaming; {}+click opens the caller, {}+click the definition",
                super::CALLER_KEY,
                super::DEF_KEY
            );

            let reloader = Rc::new(reloader);
            let keys = Rc::new(RefCell::new(KeyTracker::default()));
            let mut subs = Vec::new();

            let down_keys = keys.clone();
            subs.push(EventSubscription::window_listen("keydown", move |event| {
                if let Some(key_event) = event.dyn_ref::<web_sys::KeyboardEvent>() {
                    down_keys.borrow_mut().key_down(&key_event.key());
                }
            })?);

            let up_keys = keys.clone();
            subs.push(EventSubscription::window_listen("keyup", move |_| {
                up_keys.borrow_mut().key_up();
            })?);

            // Capture phase so the page never sees a modifier click.
            let click_keys = keys.clone();
            let click_reloader = reloader.clone();
            subs.push(EventSubscription::window_listen_capture(
                "click",
                move |event| {
                    let intent = click_keys.borrow().click_intent();
                    if intent == ClickIntent::PassThrough {
                        return;
                    }
                    event.prevent_default();
                    event.stop_immediate_propagation();
                    let Some(target) = event
                        .target()
                        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                    else {
                        return;
                    };
                    match intent {
                        ClickIntent::OpenAtCaller => click_reloader.open_editor_at_caller(&target),
                        ClickIntent::OpenAtDef => click_reloader.open_editor_at_def(&target),
                        ClickIntent::PassThrough => {}
                    }
                },
            )?);

            RELOADER.with_borrow_mut(|slot| *slot = Some(reloader));

            Ok(Self { _subs: subs })
        }
    }
}
