//! File download adapter.
//!
//! Consumes `download` events pushed by the server (backup codes,
//! exports). The content is wrapped in an in-memory `Blob`, a temporary
//! object URL is minted for it, and a hidden anchor with the requested
//! filename is clicked programmatically. The anchor and the object URL are
//! released unconditionally after triggering, success or not.

use wasm_bindgen::{JsCast, JsValue};

use crate::error::BridgeError;
use crate::events::{self, Download};
use crate::subscription::EventSubscription;

/// Install the process-wide `download` listener.
pub fn attach() -> Result<EventSubscription, BridgeError> {
    EventSubscription::window_listen(events::DOWNLOAD, |event| {
        let Some(custom) = event.dyn_ref::<web_sys::CustomEvent>() else {
            return;
        };
        let Some(payload) = events::decode_detail::<Download>(events::DOWNLOAD, custom.detail())
        else {
            return;
        };
        if let Err(err) = save_file(&payload) {
            crate::log_error!("download `{}` failed: {:?}", payload.filename, err);
        }
    })
}

fn save_file(payload: &Download) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(&payload.content));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(&payload.content_type);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor = document
        .create_element("a")?
        .unchecked_into::<web_sys::HtmlAnchorElement>();
    anchor.set_href(&url);
    anchor.set_download(&payload.filename);
    let _ = anchor.style().set_property("display", "none");

    let triggered = body.append_child(&anchor).map(|_| anchor.click());

    // Unconditional cleanup: the anchor and the URL never outlive the call.
    let _ = body.remove_child(&anchor);
    let _ = web_sys::Url::revoke_object_url(&url);

    triggered.map(|_| ())
}
