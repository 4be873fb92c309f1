//! Bound-element handle for hooks.
//!
//! `BoundElement` is the surface a hook sees of the element it is bound
//! to. On the web target it wraps a live `web_sys::Element`; on native
//! targets it is an in-memory record with the same API, standing in for
//! the DOM the way the native storage backend stands in for
//! `localStorage`. Clones share the underlying element on both targets.

/// Marker attribute that opts an element into a hook. Its value is the
/// hook name looked up in the registry.
pub const HOOK_ATTR: &str = "data-hook";

// =========================================
// Web (WASM) implementation
// =========================================

#[cfg(target_arch = "wasm32")]
#[derive(Clone)]
pub struct BoundElement {
    el: web_sys::Element,
}

#[cfg(target_arch = "wasm32")]
impl BoundElement {
    pub fn from_element(el: web_sys::Element) -> Self {
        Self { el }
    }

    /// The wrapped DOM element.
    pub fn element(&self) -> &web_sys::Element {
        &self.el
    }

    /// The element id, if any. Hooked elements must carry one.
    pub fn id(&self) -> Option<String> {
        let id = self.el.id();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    /// The hook name from the marker attribute, if present.
    pub fn hook_name(&self) -> Option<String> {
        self.el.get_attribute(HOOK_ATTR)
    }

    /// Read a `data-*` attribute by its unprefixed key.
    pub fn data(&self, key: &str) -> Option<String> {
        self.el.get_attribute(&format!("data-{key}"))
    }

    /// Append a markup fragment as the element's content.
    pub fn append_html(&self, html: &str) {
        if self
            .el
            .insert_adjacent_html("beforeend", html)
            .is_err()
        {
            crate::log_error!("failed to append markup to #{}", self.el.id());
        }
    }

    /// Number of element children.
    pub fn child_count(&self) -> usize {
        self.el.child_element_count() as usize
    }

    /// Re-dispatch a bubbling `input` event on every `<input>` descendant.
    /// Returns how many were dispatched.
    pub fn redispatch_inputs(&self) -> usize {
        let Ok(inputs) = self.el.query_selector_all("input") else {
            return 0;
        };
        let mut dispatched = 0;
        for index in 0..inputs.length() {
            let Some(node) = inputs.item(index) else {
                continue;
            };
            let init = web_sys::EventInit::new();
            init.set_bubbles(true);
            if let Ok(event) = web_sys::Event::new_with_event_init_dict("input", &init) {
                let _ = node.dispatch_event(&event);
                dispatched += 1;
            }
        }
        dispatched
    }
}

// =========================================
// Native implementation (tests, non-browser hosts)
// =========================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Default)]
pub struct BoundElement {
    inner: std::rc::Rc<std::cell::RefCell<ElementRecord>>,
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
struct ElementRecord {
    id: Option<String>,
    attrs: std::collections::BTreeMap<String, String>,
    appended: Vec<String>,
    inputs: usize,
    dispatched_inputs: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl BoundElement {
    pub fn new(id: Option<&str>) -> Self {
        let el = Self::default();
        el.inner.borrow_mut().id = id.map(str::to_string);
        el
    }

    /// Set any attribute by its full name (e.g. `data-qr-text`).
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.inner
            .borrow_mut()
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    /// Declare how many `<input>` descendants the element has.
    pub fn set_input_count(&self, count: usize) {
        self.inner.borrow_mut().inputs = count;
    }

    pub fn id(&self) -> Option<String> {
        self.inner.borrow().id.clone()
    }

    pub fn hook_name(&self) -> Option<String> {
        self.inner.borrow().attrs.get(HOOK_ATTR).cloned()
    }

    pub fn data(&self, key: &str) -> Option<String> {
        self.inner.borrow().attrs.get(&format!("data-{key}")).cloned()
    }

    pub fn append_html(&self, html: &str) {
        self.inner.borrow_mut().appended.push(html.to_string());
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().appended.len()
    }

    pub fn redispatch_inputs(&self) -> usize {
        let mut record = self.inner.borrow_mut();
        record.dispatched_inputs += record.inputs;
        record.inputs
    }

    /// Markup fragments appended so far.
    pub fn appended(&self) -> Vec<String> {
        self.inner.borrow().appended.clone()
    }

    /// Total synthetic `input` events dispatched so far.
    pub fn dispatched_inputs(&self) -> usize {
        self.inner.borrow().dispatched_inputs
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn data_reads_prefixed_attributes() {
        let el = BoundElement::new(Some("qr"));
        el.set_attribute("data-qr-text", "otpauth://totp/x");
        assert_eq!(el.data("qr-text").as_deref(), Some("otpauth://totp/x"));
        assert_eq!(el.data("missing"), None);
    }

    #[test]
    fn clones_share_the_element() {
        let el = BoundElement::new(Some("a"));
        let alias = el.clone();
        alias.append_html("<div></div>");
        assert_eq!(el.child_count(), 1);
    }

    #[test]
    fn redispatch_counts_inputs() {
        let el = BoundElement::new(Some("form"));
        el.set_input_count(3);
        assert_eq!(el.redispatch_inputs(), 3);
        assert_eq!(el.dispatched_inputs(), 3);
    }
}
