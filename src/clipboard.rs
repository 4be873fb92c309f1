//! Clipboard copy adapter.
//!
//! Consumes `copy_to_clipboard` events pushed by the server (API keys and
//! the like). The async clipboard API is the primary path; when it is
//! missing or the write is denied, a legacy off-screen textarea plus
//! `execCommand("copy")` takes over. Neither path leaves anything behind
//! in the document, and neither surfaces an error to the user.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};

use crate::error::BridgeError;
use crate::events::{self, CopyToClipboard};
use crate::subscription::EventSubscription;

/// Install the process-wide `copy_to_clipboard` listener.
pub fn attach() -> Result<EventSubscription, BridgeError> {
    EventSubscription::window_listen(events::COPY_TO_CLIPBOARD, |event| {
        let Some(custom) = event.dyn_ref::<web_sys::CustomEvent>() else {
            return;
        };
        let Some(payload) =
            events::decode_detail::<CopyToClipboard>(events::COPY_TO_CLIPBOARD, custom.detail())
        else {
            return;
        };
        copy(payload.text);
    })
}

fn copy(text: String) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let clipboard = window.navigator().clipboard();
    if AsRef::<JsValue>::as_ref(&clipboard).is_undefined() {
        // Insecure context or very old browser: no async clipboard at all.
        fallback_copy(&text);
        return;
    }

    spawn_local(async move {
        match JsFuture::from(clipboard.write_text(&text)).await {
            Ok(_) => crate::log_info!("text copied to clipboard"),
            Err(err) => {
                crate::log_error!("failed to copy text: {:?}", err);
                fallback_copy(&text);
            }
        }
    });
}

/// Legacy copy path: off-screen textarea, select, `execCommand("copy")`,
/// remove. The textarea is removed on every branch past its insertion.
fn fallback_copy(text: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(body) = document.body() else {
        return;
    };
    let Ok(el) = document.create_element("textarea") else {
        return;
    };
    let textarea = el.unchecked_into::<web_sys::HtmlTextAreaElement>();

    textarea.set_value(text);
    let style = textarea.style();
    let _ = style.set_property("position", "fixed");
    let _ = style.set_property("left", "-9999px");

    if body.append_child(&textarea).is_err() {
        return;
    }
    textarea.select();
    let copied = document.exec_command("copy").unwrap_or(false);
    let _ = body.remove_child(&textarea);

    if copied {
        crate::log_info!("text copied to clipboard (fallback)");
    } else {
        crate::log_error!("clipboard fallback failed");
    }
}
