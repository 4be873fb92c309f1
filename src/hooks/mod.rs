//! Per-element behavior hooks.
//!
//! An element opts into a hook by carrying `data-hook="Name"`; the
//! connection manager instantiates the named hook when the element enters
//! the live document and discards it when the element leaves. The registry
//! is a typed map from name to factory, validated at registration time:
//! duplicate names and lookups of unregistered names fail loudly instead
//! of silently never matching.

mod autofill;
mod qr_code;

pub use autofill::AutofillFix;
pub use qr_code::QrCode;

use std::collections::BTreeMap;

use crate::element::BoundElement;
use crate::error::BridgeError;

/// Lifecycle callbacks of a behavior module bound to one element.
///
/// `mounted` runs exactly once, when the bound element first attaches to
/// the live document. Side effects must stay scoped to that element.
pub trait Hook {
    fn mounted(&mut self, el: &BoundElement);

    /// The bound element was patched by a re-render.
    fn updated(&mut self, _el: &BoundElement) {}

    /// The bound element left the document.
    fn destroyed(&mut self, _el: &BoundElement) {}
}

type HookFactory = Box<dyn Fn() -> Box<dyn Hook>>;

/// Typed mapping from hook name to behavior factory.
#[derive(Default)]
pub struct HookRegistry {
    factories: BTreeMap<String, HookFactory>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed built-in hook set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .factories
            .insert(qr_code::NAME.to_string(), Box::new(|| Box::new(QrCode)));
        registry.factories.insert(
            autofill::NAME.to_string(),
            Box::new(|| Box::new(AutofillFix)),
        );
        registry
    }

    /// Register a hook under `name`. A duplicate name is an error, not a
    /// silent overwrite.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), BridgeError>
    where
        F: Fn() -> Box<dyn Hook> + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(BridgeError::DuplicateHook(name.to_string()));
        }
        self.factories.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered hook names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    fn instantiate(&self, name: &str) -> Option<Box<dyn Hook>> {
        self.factories.get(name).map(|factory| factory())
    }
}

struct ActiveHook {
    el: BoundElement,
    hook: Box<dyn Hook>,
}

/// Owns the live hook instances, keyed by element id.
///
/// Driven by the transport as marked elements enter, re-render, and leave
/// the document.
pub struct HookDispatcher {
    registry: HookRegistry,
    active: BTreeMap<String, ActiveHook>,
}

impl HookDispatcher {
    pub fn new(registry: HookRegistry) -> Self {
        Self {
            registry,
            active: BTreeMap::new(),
        }
    }

    /// An element entered the live document.
    ///
    /// Returns `Ok(true)` if a hook was mounted, `Ok(false)` if the
    /// element carries no marker attribute. Unknown hook names and marked
    /// elements without an id are errors.
    pub fn element_mounted(&mut self, el: BoundElement) -> Result<bool, BridgeError> {
        let Some(name) = el.hook_name() else {
            return Ok(false);
        };
        let id = el
            .id()
            .ok_or_else(|| BridgeError::MissingElementId(name.clone()))?;
        let mut hook = self
            .registry
            .instantiate(&name)
            .ok_or_else(|| BridgeError::UnknownHook(name.clone()))?;

        // A remount under a live id means the element re-entered the
        // document; the old instance is discarded first.
        if let Some(mut stale) = self.active.remove(&id) {
            crate::log_warn!("hook `{}` remounted on #{}", name, id);
            stale.hook.destroyed(&stale.el);
        }

        hook.mounted(&el);
        self.active.insert(id, ActiveHook { el, hook });
        Ok(true)
    }

    /// A tracked element was patched by a re-render.
    pub fn element_updated(&mut self, el: &BoundElement) {
        let Some(id) = el.id() else {
            return;
        };
        if let Some(active) = self.active.get_mut(&id) {
            active.hook.updated(&active.el);
        }
    }

    /// A tracked element left the document; its hook instance is dropped.
    pub fn element_removed(&mut self, el: &BoundElement) {
        let Some(id) = el.id() else {
            return;
        };
        if let Some(mut active) = self.active.remove(&id) {
            active.hook.destroyed(&active.el);
        }
    }

    /// Number of live hook instances.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::element::HOOK_ATTR;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counts {
        mounted: usize,
        updated: usize,
        destroyed: usize,
    }

    struct CountingHook(Rc<RefCell<Counts>>);

    impl Hook for CountingHook {
        fn mounted(&mut self, _el: &BoundElement) {
            self.0.borrow_mut().mounted += 1;
        }
        fn updated(&mut self, _el: &BoundElement) {
            self.0.borrow_mut().updated += 1;
        }
        fn destroyed(&mut self, _el: &BoundElement) {
            self.0.borrow_mut().destroyed += 1;
        }
    }

    fn counting_registry(counts: Rc<RefCell<Counts>>) -> HookRegistry {
        let mut registry = HookRegistry::new();
        registry
            .register("Counting", move || Box::new(CountingHook(counts.clone())))
            .unwrap();
        registry
    }

    fn marked(id: &str, hook: &str) -> BoundElement {
        let el = BoundElement::new(Some(id));
        el.set_attribute(HOOK_ATTR, hook);
        el
    }

    #[test]
    fn defaults_register_the_fixed_hook_set() {
        let registry = HookRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["AutofillFix", "QRCode"]);
    }

    #[test]
    fn duplicate_registration_fails_fast() {
        let mut registry = HookRegistry::with_defaults();
        let err = registry
            .register("QRCode", || Box::new(QrCode))
            .unwrap_err();
        assert_eq!(err, BridgeError::DuplicateHook("QRCode".to_string()));
    }

    #[test]
    fn unmarked_elements_are_ignored() {
        let mut dispatcher = HookDispatcher::new(HookRegistry::with_defaults());
        let mounted = dispatcher
            .element_mounted(BoundElement::new(Some("plain")))
            .unwrap();
        assert!(!mounted);
        assert_eq!(dispatcher.active_count(), 0);
    }

    #[test]
    fn unknown_hook_name_is_loud() {
        let mut dispatcher = HookDispatcher::new(HookRegistry::with_defaults());
        let err = dispatcher
            .element_mounted(marked("el-1", "QRCod"))
            .unwrap_err();
        assert_eq!(err, BridgeError::UnknownHook("QRCod".to_string()));
    }

    #[test]
    fn marked_element_without_id_is_rejected() {
        let mut dispatcher = HookDispatcher::new(HookRegistry::with_defaults());
        let el = BoundElement::new(None);
        el.set_attribute(HOOK_ATTR, "QRCode");
        let err = dispatcher.element_mounted(el).unwrap_err();
        assert_eq!(err, BridgeError::MissingElementId("QRCode".to_string()));
    }

    #[test]
    fn lifecycle_runs_mount_update_destroy() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut dispatcher = HookDispatcher::new(counting_registry(counts.clone()));
        let el = marked("el-1", "Counting");

        assert!(dispatcher.element_mounted(el.clone()).unwrap());
        dispatcher.element_updated(&el);
        dispatcher.element_updated(&el);
        dispatcher.element_removed(&el);

        let counts = counts.borrow();
        assert_eq!(counts.mounted, 1);
        assert_eq!(counts.updated, 2);
        assert_eq!(counts.destroyed, 1);
        drop(counts);
    }

    #[test]
    fn remount_discards_the_stale_instance() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut dispatcher = HookDispatcher::new(counting_registry(counts.clone()));

        dispatcher.element_mounted(marked("el-1", "Counting")).unwrap();
        dispatcher.element_mounted(marked("el-1", "Counting")).unwrap();

        assert_eq!(dispatcher.active_count(), 1);
        assert_eq!(counts.borrow().mounted, 2);
        assert_eq!(counts.borrow().destroyed, 1);
    }

    #[test]
    fn updates_for_untracked_elements_are_ignored() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut dispatcher = HookDispatcher::new(counting_registry(counts.clone()));
        dispatcher.element_updated(&marked("ghost", "Counting"));
        dispatcher.element_removed(&marked("ghost", "Counting"));
        assert_eq!(counts.borrow().mounted, 0);
    }
}
