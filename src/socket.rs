//! Connection manager.
//!
//! `ViewSocket` owns the single persistent connection between the page and
//! the view-state server. The wire protocol and DOM patching live behind
//! the [`Transport`] trait; the manager's job is wiring: resolve the
//! security token, build the handshake URL, hand the hook dispatcher to
//! the transport, and enforce that the page holds at most one live
//! connection. Reconnection and backoff belong to the transport, never to
//! the manager.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use url::Url;

use crate::config::{self, ConnectOptions, SecurityToken};
use crate::error::BridgeError;
use crate::hooks::HookDispatcher;

/// The external view-state transport.
///
/// Implementations own the socket, the wire protocol, DOM patching, and
/// all retry behavior. They drive the [`HookDispatcher`] as marked
/// elements enter, re-render, and leave the document.
pub trait Transport {
    /// Open the connection. `fallback_ms` is how long the primary channel
    /// may stall before the long-poll fallback takes over.
    fn open(
        &mut self,
        url: &Url,
        fallback_ms: u32,
        hooks: Rc<RefCell<HookDispatcher>>,
    ) -> Result<(), BridgeError>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Toggle verbose wire logging.
    fn set_verbose(&mut self, on: bool);

    /// Inject artificial latency into the wire, `None` to disable. Debug
    /// escape hatch only.
    fn set_latency_sim(&mut self, latency_ms: Option<u32>);
}

thread_local! {
    // One live connection per page.
    static CONNECTED: Cell<bool> = const { Cell::new(false) };
}

/// The single live connection, plus its debug controls.
pub struct ViewSocket {
    transport: Box<dyn Transport>,
    hooks: Rc<RefCell<HookDispatcher>>,
    url: Url,
    debug: bool,
}

impl std::fmt::Debug for ViewSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSocket")
            .field("url", &self.url)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl ViewSocket {
    /// Establish the page connection.
    ///
    /// Builds the handshake URL from `base` and the options, opens the
    /// transport wired to the hook dispatcher, and claims the
    /// one-connection-per-page slot. Fails with `AlreadyConnected` while
    /// another socket is live.
    pub fn connect(
        mut transport: Box<dyn Transport>,
        token: SecurityToken,
        base: &str,
        options: ConnectOptions,
    ) -> Result<Self, BridgeError> {
        if CONNECTED.get() {
            return Err(BridgeError::AlreadyConnected);
        }
        let url = config::handshake_url(base, &options.endpoint, &token, &options.params)?;
        let hooks = Rc::new(RefCell::new(HookDispatcher::new(options.hooks)));
        transport.open(&url, options.fallback_ms, hooks.clone())?;
        CONNECTED.set(true);
        crate::log_info!("connected to {}", url.path());

        Ok(Self {
            transport,
            hooks,
            url,
            debug: false,
        })
    }

    /// The dispatcher the transport drives. Shared so callers can inspect
    /// live hook instances.
    pub fn hooks(&self) -> Rc<RefCell<HookDispatcher>> {
        self.hooks.clone()
    }

    /// The handshake URL this socket connected with.
    pub fn handshake(&self) -> &Url {
        &self.url
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Turn on verbose wire logging for interactive debugging.
    pub fn enable_debug(&mut self) {
        self.debug = true;
        self.transport.set_verbose(true);
        crate::log_info!("debug logging enabled");
    }

    pub fn disable_debug(&mut self) {
        self.debug = false;
        self.transport.set_verbose(false);
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    /// Simulate `latency_ms` of added wire latency for the rest of the
    /// session, or until disabled.
    pub fn enable_latency_sim(&mut self, latency_ms: u32) {
        self.transport.set_latency_sim(Some(latency_ms));
        crate::log_info!("latency simulation enabled ({} ms)", latency_ms);
    }

    pub fn disable_latency_sim(&mut self) {
        self.transport.set_latency_sim(None);
        crate::log_info!("latency simulation disabled");
    }

    /// Close the connection and release the per-page slot.
    pub fn disconnect(&mut self) {
        if self.transport.is_open() {
            self.transport.close();
        }
        CONNECTED.set(false);
    }
}

impl Drop for ViewSocket {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// =========================================
// Process-wide debug handle (web console)
// =========================================
//
// The live socket is reachable from the browser console through the
// exported bridge_* functions:
//
//   >> bridge_enable_debug()
//   >> bridge_enable_latency_sim(1000)   // for the rest of the session
//   >> bridge_disable_latency_sim()

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

#[cfg(target_arch = "wasm32")]
thread_local! {
    static SOCKET: RefCell<Option<Rc<RefCell<ViewSocket>>>> = const { RefCell::new(None) };
}

/// Install the live socket into the console debug slot.
#[cfg(target_arch = "wasm32")]
pub fn install_debug_handle(socket: Rc<RefCell<ViewSocket>>) {
    SOCKET.with_borrow_mut(|slot| *slot = Some(socket));
}

#[cfg(target_arch = "wasm32")]
fn with_live_socket(f: impl FnOnce(&mut ViewSocket)) {
    SOCKET.with_borrow(|slot| match slot {
        Some(socket) => f(&mut socket.borrow_mut()),
        None => crate::log_warn!("no live connection"),
    });
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn bridge_enable_debug() {
    with_live_socket(|socket| socket.enable_debug());
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn bridge_disable_debug() {
    with_live_socket(|socket| socket.disable_debug());
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn bridge_enable_latency_sim(latency_ms: u32) {
    with_live_socket(|socket| socket.enable_latency_sim(latency_ms));
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn bridge_disable_latency_sim() {
    with_live_socket(|socket| socket.disable_latency_sim());
}
