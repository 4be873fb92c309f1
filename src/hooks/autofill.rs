//! Autofill fix for server-tracked form state.
//!
//! The server only learns about field values through input events, so
//! values a browser fills in on its own are invisible to it until the user
//! types. On mount this hook re-dispatches a bubbling `input` event on
//! every `<input>` inside the bound element to push autofilled values
//! through the normal tracking path.

use crate::element::BoundElement;

use super::Hook;

pub const NAME: &str = "AutofillFix";

pub struct AutofillFix;

impl Hook for AutofillFix {
    fn mounted(&mut self, el: &BoundElement) {
        let dispatched = el.redispatch_inputs();
        if dispatched > 0 {
            crate::log_debug!("re-dispatched input on {} autofilled field(s)", dispatched);
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn redispatches_once_per_input() {
        let el = BoundElement::new(Some("login-form"));
        el.set_input_count(2);
        AutofillFix.mounted(&el);
        assert_eq!(el.dispatched_inputs(), 2);
    }

    #[test]
    fn no_inputs_means_no_dispatches() {
        let el = BoundElement::new(Some("empty"));
        AutofillFix.mounted(&el);
        assert_eq!(el.dispatched_inputs(), 0);
    }
}
