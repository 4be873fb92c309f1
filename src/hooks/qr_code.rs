//! QR code hook for the two-factor enrollment screen.
//!
//! Renders a decorative stand-in, not a scannable code: a fixed 8x8
//! checkerboard plus instructional text. The contract with the server is
//! only that an element carrying `data-qr-text` gains rendered content on
//! mount, so a real encoder can replace the placeholder without touching
//! templates.

use crate::element::BoundElement;

use super::Hook;

pub const NAME: &str = "QRCode";

/// Unprefixed key of the `data-qr-text` attribute.
const QR_TEXT_KEY: &str = "qr-text";

const GRID_SIDE: usize = 8;

pub struct QrCode;

impl Hook for QrCode {
    fn mounted(&mut self, el: &BoundElement) {
        let Some(text) = el.data(QR_TEXT_KEY) else {
            return;
        };
        if text.is_empty() {
            return;
        }
        el.append_html(&placeholder_markup());
    }
}

/// Checkerboard cell color: even cells dark, shifted one step per row.
fn cell_class(index: usize) -> &'static str {
    if (index + index / GRID_SIDE) % 2 == 0 {
        "bg-gray-800"
    } else {
        "bg-gray-200"
    }
}

/// One container fragment: the framed checkerboard and the authenticator
/// instructions below it.
fn placeholder_markup() -> String {
    let mut cells = String::new();
    for index in 0..GRID_SIDE * GRID_SIDE {
        cells.push_str(&format!(
            r#"<div class="w-1 h-1 {} rounded-sm"></div>"#,
            cell_class(index)
        ));
    }

    format!(
        r#"<div class="flex flex-col items-center space-y-3">
  <div class="w-48 h-48 bg-white border-2 border-gray-300 rounded-lg flex items-center justify-center">
    <div class="text-center">
      <div class="w-32 h-32 bg-gray-100 border border-gray-300 rounded mb-2 flex items-center justify-center">
        <div class="grid grid-cols-8 gap-0.5">{cells}</div>
      </div>
      <p class="text-xs text-gray-500">QR Code</p>
    </div>
  </div>
  <div class="text-center text-sm text-gray-600">
    <p class="font-medium">Scan with your authenticator app:</p>
    <div class="mt-1 space-y-0.5">
      <p>&bull; Google Authenticator</p>
      <p>&bull; Authy</p>
      <p>&bull; Microsoft Authenticator</p>
    </div>
  </div>
</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates_within_and_across_rows() {
        assert_eq!(cell_class(0), "bg-gray-800");
        assert_eq!(cell_class(1), "bg-gray-200");
        // Row shift: the first cell of row 1 is offset from row 0.
        assert_eq!(cell_class(8), "bg-gray-200");
        assert_eq!(cell_class(9), "bg-gray-800");
    }

    #[test]
    fn placeholder_has_a_full_grid() {
        let markup = placeholder_markup();
        assert_eq!(markup.matches("rounded-sm").count(), 64);
        assert_eq!(markup.matches("bg-gray-800").count(), 32);
        assert_eq!(markup.matches("bg-gray-200").count(), 32);
        assert!(markup.contains("Scan with your authenticator app"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod mount {
        use super::super::*;

        #[test]
        fn renders_exactly_one_child_with_qr_text() {
            let el = BoundElement::new(Some("qr"));
            el.set_attribute("data-qr-text", "otpauth://totp/acct");
            QrCode.mounted(&el);
            assert_eq!(el.child_count(), 1);
        }

        #[test]
        fn missing_or_empty_qr_text_is_a_silent_noop() {
            let absent = BoundElement::new(Some("qr"));
            QrCode.mounted(&absent);
            assert_eq!(absent.child_count(), 0);

            let blank = BoundElement::new(Some("qr"));
            blank.set_attribute("data-qr-text", "");
            QrCode.mounted(&blank);
            assert_eq!(blank.child_count(), 0);
        }
    }
}
