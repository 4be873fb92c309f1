//! livebridge - browser-side event bridge for server-driven live views.
//!
//! The server owns rendering and pushes view-state over one persistent
//! connection; this crate is the glue on the browser side of that
//! connection:
//!
//! - [`socket::ViewSocket`] owns the connection lifecycle: security token,
//!   handshake parameters, the hook table, and the console debug handle.
//!   The wire protocol itself lives behind [`socket::Transport`].
//! - [`hooks`] hosts the per-element behavior modules bound via
//!   `data-hook` marker attributes.
//! - [`clipboard`], [`download`], and [`progress`] react to the server's
//!   custom events with one-shot browser side effects.
//! - [`reload`] is the development-only log streaming and click-to-editor
//!   bridge.
//!
//! The platform-independent core (registries, timing rules, payload
//! shapes) compiles on native targets so it runs under plain `cargo
//! test`; the DOM shells are `wasm32` only.

pub mod config;
pub mod element;
pub mod error;
pub mod events;
pub mod hooks;
pub mod logging;
pub mod progress;
pub mod reload;
pub mod socket;

#[cfg(target_arch = "wasm32")]
pub mod clipboard;
#[cfg(target_arch = "wasm32")]
pub mod download;
#[cfg(target_arch = "wasm32")]
pub mod subscription;

pub use config::{ConnectOptions, SecurityToken};
pub use element::BoundElement;
pub use error::BridgeError;
pub use hooks::{Hook, HookDispatcher, HookRegistry};
pub use socket::{Transport, ViewSocket};

#[cfg(target_arch = "wasm32")]
pub use wasm::Bridge;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::config::{self, ConnectOptions, SecurityToken};
    use crate::error::BridgeError;
    use crate::progress::ProgressBar;
    use crate::socket::{self, Transport, ViewSocket};
    use crate::subscription::EventSubscription;
    use crate::{clipboard, download};

    /// The fully assembled bridge. Owns every listener it installed;
    /// dropping it tears the page wiring down again.
    pub struct Bridge {
        socket: Rc<RefCell<ViewSocket>>,
        _progress: ProgressBar,
        _adapters: Vec<EventSubscription>,
        #[cfg(debug_assertions)]
        _dev: Option<crate::reload::DevBridge>,
    }

    impl Bridge {
        /// Boot the bridge for this page.
        ///
        /// Reads the security token from the rendered document (fatal if
        /// absent), opens the single connection through `transport`, and
        /// attaches the clipboard, download, and progress adapters. On
        /// development builds the live-reload bridge is attached as well.
        pub fn boot(
            transport: Box<dyn Transport>,
            options: ConnectOptions,
        ) -> Result<Self, BridgeError> {
            let token = SecurityToken::from_document()?;
            let origin = config::page_origin()?;
            let socket = Rc::new(RefCell::new(ViewSocket::connect(
                transport, token, &origin, options,
            )?));
            socket::install_debug_handle(socket.clone());

            let adapters = vec![clipboard::attach()?, download::attach()?];
            let progress = ProgressBar::attach()?;

            #[cfg(debug_assertions)]
            let dev = match crate::reload::DevBridge::attach() {
                Ok(bridge) => Some(bridge),
                Err(err) => {
                    crate::log_error!("live reload bridge unavailable: {}", err);
                    None
                }
            };

            Ok(Self {
                socket,
                _progress: progress,
                _adapters: adapters,
                #[cfg(debug_assertions)]
                _dev: dev,
            })
        }

        /// The live connection, shared with the console debug handle.
        pub fn socket(&self) -> Rc<RefCell<ViewSocket>> {
            self.socket.clone()
        }
    }
}
