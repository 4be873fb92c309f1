//! Server-pushed custom events: wire names and payload shapes.
//!
//! The server dispatches these as named DOM custom events; the adapters in
//! this crate are their only consumers. Payloads come from a trusted
//! collaborator, so a malformed detail is logged and dropped rather than
//! allowed to break unrelated listeners in the same tick.

use serde::Deserialize;

/// Copy `text` to the platform clipboard.
pub const COPY_TO_CLIPBOARD: &str = "copy_to_clipboard";

/// Save `content` as a local file download.
pub const DOWNLOAD: &str = "download";

/// A live navigation or form submission started.
pub const PAGE_LOADING_START: &str = "page-loading-start";

/// The pending navigation or form submission finished.
pub const PAGE_LOADING_STOP: &str = "page-loading-stop";

/// The live-reload companion attached (development builds only). The
/// event detail is the reloader handle itself.
pub const LIVE_RELOAD_ATTACHED: &str = "live_reload:attached";

/// Detail payload of [`COPY_TO_CLIPBOARD`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CopyToClipboard {
    pub text: String,
}

/// Detail payload of [`DOWNLOAD`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Download {
    pub filename: String,
    pub content: String,
    pub content_type: String,
}

/// Decode a custom event detail, logging and discarding anything that does
/// not match the expected shape.
#[cfg(target_arch = "wasm32")]
pub fn decode_detail<T>(event_name: &str, detail: wasm_bindgen::JsValue) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    match serde_wasm_bindgen::from_value(detail) {
        Ok(payload) => Some(payload),
        Err(err) => {
            crate::log_debug!("ignoring malformed `{}` detail: {}", event_name, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_payload_decodes() {
        let payload: CopyToClipboard = serde_json::from_str(r#"{"text":"secret-key"}"#).unwrap();
        assert_eq!(payload.text, "secret-key");
    }

    #[test]
    fn download_payload_decodes() {
        let payload: Download = serde_json::from_str(
            r#"{"filename":"backup-codes.txt","content":"1111\n2222","content_type":"text/plain"}"#,
        )
        .unwrap();
        assert_eq!(payload.filename, "backup-codes.txt");
        assert_eq!(payload.content_type, "text/plain");
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(serde_json::from_str::<CopyToClipboard>(r#"{"test":"typo"}"#).is_err());
        assert!(serde_json::from_str::<Download>(r#"{"filename":"x"}"#).is_err());
    }
}
