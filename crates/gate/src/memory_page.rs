//! An in-memory host page.
//!
//! Holds a flat list of elements with text, form values, attributes, and
//! inline styles. Used by the terminal composer and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::host::{Element, ElementId, HostPage};

type ClickHook = Box<dyn Fn(ElementId) + Send + Sync>;

struct Node {
    element: Element,
    text: Option<String>,
    value: Option<String>,
    attributes: HashMap<String, String>,
    styles: HashMap<String, String>,
}

/// A host page backed by plain data.
#[derive(Default)]
pub struct InMemoryPage {
    nodes: Mutex<Vec<Node>>,
    next_id: AtomicU64,
    clicks: Mutex<Vec<ElementId>>,
    on_click: Mutex<Option<ClickHook>>,
}

impl InMemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return its handle. Ids are never reused.
    pub fn add_element(&self, test_id: Option<&str>) -> Element {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let element = Element::new(id, test_id);
        lock(&self.nodes).push(Node {
            element: element.clone(),
            text: None,
            value: None,
            attributes: HashMap::new(),
            styles: HashMap::new(),
        });
        element
    }

    /// Remove an element, as a re-rendering host would.
    pub fn remove_element(&self, id: ElementId) {
        lock(&self.nodes).retain(|n| n.element.id != id);
    }

    pub fn set_text(&self, id: ElementId, text: impl Into<String>) {
        self.with_node(id, |n| n.text = Some(text.into()));
    }

    pub fn set_value(&self, id: ElementId, value: impl Into<String>) {
        self.with_node(id, |n| n.value = Some(value.into()));
    }

    pub fn set_attribute(&self, id: ElementId, name: &str, value: &str) {
        self.with_node(id, |n| {
            n.attributes.insert(name.into(), value.into());
        });
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        lock(&self.nodes)
            .iter()
            .find(|n| n.element.id == id)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<String> {
        lock(&self.nodes)
            .iter()
            .find(|n| n.element.id == id)
            .and_then(|n| n.styles.get(property).cloned())
    }

    /// Every synthetic click dispatched so far, oldest first.
    pub fn clicks(&self) -> Vec<ElementId> {
        lock(&self.clicks).clone()
    }

    /// Run `hook` whenever a synthetic click is dispatched.
    pub fn on_click(&self, hook: impl Fn(ElementId) + Send + Sync + 'static) {
        *lock(&self.on_click) = Some(Box::new(hook));
    }

    fn with_node(&self, id: ElementId, f: impl FnOnce(&mut Node)) {
        if let Some(node) = lock(&self.nodes).iter_mut().find(|n| n.element.id == id) {
            f(node);
        }
    }
}

impl HostPage for InMemoryPage {
    fn query_test_ids(&self, matches: &dyn Fn(&str) -> bool) -> Vec<Element> {
        lock(&self.nodes)
            .iter()
            .filter(|n| n.element.test_id.as_deref().is_some_and(matches))
            .map(|n| n.element.clone())
            .collect()
    }

    fn text_content(&self, id: ElementId) -> Option<String> {
        lock(&self.nodes)
            .iter()
            .find(|n| n.element.id == id)
            .and_then(|n| n.text.clone())
    }

    fn form_value(&self, id: ElementId) -> Option<String> {
        lock(&self.nodes)
            .iter()
            .find(|n| n.element.id == id)
            .and_then(|n| n.value.clone())
    }

    fn dispatch_click(&self, id: ElementId) {
        lock(&self.clicks).push(id);
        if let Some(hook) = lock(&self.on_click).as_ref() {
            hook(id);
        }
    }

    fn remove_attribute(&self, id: ElementId, name: &str) {
        self.with_node(id, |n| {
            n.attributes.remove(name);
        });
    }

    fn set_style(&self, id: ElementId, property: &str, value: &str) {
        self.with_node(id, |n| {
            n.styles.insert(property.into(), value.into());
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
