//! Working list of payment methods and the single-default invariant.
//!
//! The registry holds a local copy of an externally owned list. Whenever
//! the non-empty list is rendered, exactly one record carries the default
//! flag. Incoming lists that violate this are repaired lazily at display
//! time without mutating the working copy; user actions reassert the
//! invariant by construction.

use crate::method::PaymentMethod;
use log::debug;

/// Notifications fired after a local mutation.
///
/// The external collaborator behind these is opaque: calls are
/// fire-and-forget, never awaited, and a failing collaborator cannot roll
/// back local state. All methods default to no-ops.
pub trait MethodEvents {
    /// A new record was added. Receives the record as stored.
    fn on_add(&mut self, _method: &PaymentMethod) {}

    /// An existing record was replaced. Receives the record as stored.
    fn on_edit(&mut self, _method: &PaymentMethod) {}

    /// The given record became the default through an explicit user
    /// action. Promotions that merely repair the invariant do not fire
    /// this.
    fn on_set_default(&mut self, _id: &str) {}

    /// The record with the given id was deleted.
    fn on_remove(&mut self, _id: &str) {}
}

/// Event sink used when no collaborator is wired up.
pub struct NullEvents;

impl MethodEvents for NullEvents {}

/// The payment method working list.
pub struct MethodRegistry {
    methods: Vec<PaymentMethod>,
    events: Box<dyn MethodEvents>,
}

impl MethodRegistry {
    /// Creates an empty registry with no collaborator.
    pub fn new() -> Self {
        Self::with_events(Box::new(NullEvents))
    }

    /// Creates an empty registry notifying the given sink.
    pub fn with_events(events: Box<dyn MethodEvents>) -> Self {
        MethodRegistry {
            methods: Vec::new(),
            events,
        }
    }

    /// Replaces the working list verbatim from the external list.
    ///
    /// No invariant repair happens here; a list with zero defaults is
    /// rendered as-if corrected by [`normalize_for_display`] without the
    /// caller's data ever being touched.
    ///
    /// [`normalize_for_display`]: MethodRegistry::normalize_for_display
    pub fn sync(&mut self, external: &[PaymentMethod]) {
        self.methods = external.to_vec();
    }

    /// The raw working list, possibly violating the default invariant.
    pub fn methods(&self) -> &[PaymentMethod] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Looks up a record by id.
    pub fn get(&self, id: &str) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| m.id == id)
    }

    /// Returns the render-ready list.
    ///
    /// An empty list stays empty. If no record is flagged default, the
    /// first record is forced default in the copy. This is the sole
    /// invariant-repair point and runs before every render.
    pub fn normalize_for_display(&self) -> Vec<PaymentMethod> {
        if self.methods.is_empty() {
            return Vec::new();
        }

        let mut list = self.methods.clone();
        if !list.iter().any(|m| m.is_default) {
            list[0].is_default = true;
        }
        list
    }

    /// Whether the multiple-methods affordances (set-as-default controls)
    /// are offered. Only when the normalized list has more than one entry.
    pub fn can_manage_multiple(&self) -> bool {
        self.methods.len() > 1
    }

    /// Makes the record with the given id the default.
    ///
    /// Every record's flag becomes `record.id == id`, so exactly one
    /// record ends up flagged by construction. The collaborator is
    /// notified after the local update; the notification is not awaited
    /// and never rolls the update back.
    pub fn set_default(&mut self, id: &str) {
        self.apply_default(id);
        debug!("set default method to {id}");
        self.events.on_set_default(id);
    }

    /// Deletes the record with the given id.
    ///
    /// If the removed record was the default and records remain, the
    /// first remaining record (by current order) is promoted; relative
    /// order is preserved. The collaborator is notified with the removed
    /// id, not with the newly promoted default. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) {
        let Some(index) = self.methods.iter().position(|m| m.id == id) else {
            return;
        };

        let removed = self.methods.remove(index);
        if removed.is_default {
            if let Some(first) = self.methods.first_mut() {
                first.is_default = true;
            }
        }

        debug!("removed method {}", removed.id);
        self.events.on_remove(&removed.id);
    }

    /// Inserts or replaces a record.
    ///
    /// When `is_edit` and a record with the same id exists it is replaced
    /// in place, order preserved; otherwise the record is appended. If the
    /// submitted record claims the default flag, or the resulting list has
    /// exactly one element, the invariant is reasserted immediately.
    /// Otherwise the list may transiently hold zero defaults until the
    /// next [`normalize_for_display`] pass, which is accepted.
    ///
    /// [`normalize_for_display`]: MethodRegistry::normalize_for_display
    pub fn upsert(&mut self, record: PaymentMethod, is_edit: bool) {
        let id = record.id.clone();
        let claims_default = record.is_default;

        let existing = self.methods.iter().position(|m| m.id == id);
        match existing {
            Some(index) if is_edit => self.methods[index] = record,
            _ => self.methods.push(record),
        }

        if claims_default || self.methods.len() == 1 {
            self.apply_default(&id);
        }
    }

    /// Fire-and-forget access for save notifications.
    pub fn events_mut(&mut self) -> &mut dyn MethodEvents {
        self.events.as_mut()
    }

    fn apply_default(&mut self, id: &str) {
        for method in &mut self.methods {
            method.is_default = method.id == id;
        }
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::MethodType;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn method(id: &str, is_default: bool) -> PaymentMethod {
        PaymentMethod {
            id: id.to_string(),
            kind: MethodType::CreditCard.blank_kind(),
            last4: "4242".to_string(),
            nickname: None,
            is_default,
        }
    }

    fn registry_with(methods: &[PaymentMethod]) -> MethodRegistry {
        let mut registry = MethodRegistry::new();
        registry.sync(methods);
        registry
    }

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl MethodEvents for Recorder {
        fn on_add(&mut self, method: &PaymentMethod) {
            self.0.borrow_mut().push(format!("add:{}", method.id));
        }
        fn on_edit(&mut self, method: &PaymentMethod) {
            self.0.borrow_mut().push(format!("edit:{}", method.id));
        }
        fn on_set_default(&mut self, id: &str) {
            self.0.borrow_mut().push(format!("set_default:{id}"));
        }
        fn on_remove(&mut self, id: &str) {
            self.0.borrow_mut().push(format!("remove:{id}"));
        }
    }

    fn recording_registry() -> (MethodRegistry, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let registry = MethodRegistry::with_events(Box::new(Recorder(log.clone())));
        (registry, log)
    }

    fn default_ids(list: &[PaymentMethod]) -> Vec<&str> {
        list.iter()
            .filter(|m| m.is_default)
            .map(|m| m.id.as_str())
            .collect()
    }

    #[test]
    fn test_normalize_empty_stays_empty() {
        let registry = MethodRegistry::new();
        assert!(registry.normalize_for_display().is_empty());
    }

    #[test]
    fn test_normalize_elects_first_when_none_flagged() {
        let registry = registry_with(&[method("a", false), method("b", false)]);

        let list = registry.normalize_for_display();
        assert_eq!(default_ids(&list), ["a"]);

        // The working copy itself is not repaired.
        assert!(registry.methods().iter().all(|m| !m.is_default));
    }

    #[test]
    fn test_normalize_leaves_flagged_list_alone() {
        let registry = registry_with(&[method("a", false), method("b", true)]);
        let list = registry.normalize_for_display();
        assert_eq!(default_ids(&list), ["b"]);
    }

    #[test]
    fn test_set_default_exclusivity() {
        let (mut registry, log) = recording_registry();
        registry.sync(&[method("a", true), method("b", false), method("c", false)]);

        registry.set_default("c");

        assert_eq!(default_ids(registry.methods()), ["c"]);
        assert_eq!(log.borrow().as_slice(), ["set_default:c"]);
    }

    #[test]
    fn test_remove_default_promotes_first_remaining() {
        let (mut registry, log) = recording_registry();
        registry.sync(&[method("a", true), method("b", false), method("c", false)]);

        registry.remove("a");

        let ids: Vec<_> = registry.methods().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        assert_eq!(default_ids(registry.methods()), ["b"]);

        // Notified with the removed id, not the promoted one.
        assert_eq!(log.borrow().as_slice(), ["remove:a"]);
    }

    #[test]
    fn test_remove_non_default_keeps_default() {
        let mut registry = registry_with(&[method("a", true), method("b", false), method("c", false)]);
        registry.remove("b");

        let ids: Vec<_> = registry.methods().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(default_ids(registry.methods()), ["a"]);
    }

    #[test]
    fn test_remove_last_record_yields_empty() {
        let mut registry = registry_with(&[method("a", true)]);
        registry.remove("a");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_unknown_id_is_ignored() {
        let (mut registry, log) = recording_registry();
        registry.sync(&[method("a", true)]);
        registry.remove("zzz");

        assert_eq!(registry.len(), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_upsert_first_record_becomes_default() {
        let mut registry = MethodRegistry::new();
        registry.upsert(method("a", false), false);
        assert_eq!(default_ids(registry.methods()), ["a"]);
    }

    #[test]
    fn test_upsert_append_without_default_claim() {
        let mut registry = registry_with(&[method("a", true)]);
        registry.upsert(method("b", false), false);

        assert_eq!(registry.len(), 2);
        assert_eq!(default_ids(registry.methods()), ["a"]);
    }

    #[test]
    fn test_upsert_default_claim_demotes_others() {
        let mut registry = registry_with(&[method("a", true), method("b", false)]);
        registry.upsert(method("c", true), false);
        assert_eq!(default_ids(registry.methods()), ["c"]);
    }

    #[test]
    fn test_upsert_edit_replaces_in_place() {
        let mut registry = registry_with(&[method("a", true), method("b", false)]);

        let mut replacement = method("a", true);
        replacement.last4 = "9999".to_string();
        registry.upsert(replacement, true);

        let ids: Vec<_> = registry.methods().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(registry.methods()[0].last4, "9999");
    }

    #[test]
    fn test_sync_replaces_verbatim() {
        let mut registry = registry_with(&[method("a", true)]);
        registry.sync(&[method("x", false), method("y", true)]);

        let ids: Vec<_> = registry.methods().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["x", "y"]);
    }

    #[test]
    fn test_can_manage_multiple() {
        let mut registry = MethodRegistry::new();
        assert!(!registry.can_manage_multiple());
        registry.sync(&[method("a", true)]);
        assert!(!registry.can_manage_multiple());
        registry.sync(&[method("a", true), method("b", false)]);
        assert!(registry.can_manage_multiple());
    }

    #[test]
    fn test_multiple_incoming_defaults_survive_normalize() {
        // Only the first flagged record is honored downstream; normalize
        // does not demote extras, it only repairs the zero-default case.
        let registry = registry_with(&[method("a", true), method("b", true)]);
        let list = registry.normalize_for_display();
        assert_eq!(default_ids(&list), ["a", "b"]);
    }
}
