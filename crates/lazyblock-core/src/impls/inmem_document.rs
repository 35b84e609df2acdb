//! InMemoryDocument - 開発用の Document
//!
//! テストと CLI で実際の DOM の代わりに使う。

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{Element, MarkerSelector, NodeId};
use crate::ports::Document;

#[derive(Debug, Default)]
pub struct InMemoryDocument {
    elements: Vec<Element>,
    classes: Mutex<HashMap<NodeId, Vec<String>>>,
}

impl InMemoryDocument {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            elements,
            classes: Mutex::new(HashMap::new()),
        }
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.lock().get(&node).cloned().unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.lock()
            .get(&node)
            .is_some_and(|classes| classes.iter().any(|c| c == class))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<NodeId, Vec<String>>> {
        self.classes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Document for InMemoryDocument {
    fn query(&self, selector: &MarkerSelector) -> Vec<Element> {
        self.elements
            .iter()
            .filter(|el| selector.matches(el))
            .cloned()
            .collect()
    }

    fn add_class(&self, node: NodeId, class: &str) {
        let mut classes = self.lock();
        let list = classes.entry(node).or_default();
        if !list.iter().any(|c| c == class) {
            list.push(class.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::MARKER_ATTRIBUTE;

    #[test]
    fn query_keeps_document_order() {
        let doc = InMemoryDocument::new(vec![
            Element::new(NodeId::new(3)).with_attribute(MARKER_ATTRIBUTE, "b"),
            Element::new(NodeId::new(1)).with_attribute(MARKER_ATTRIBUTE, "a"),
            Element::new(NodeId::new(2)).with_attribute(MARKER_ATTRIBUTE, "zzz"),
        ]);
        let sel = MarkerSelector::new(MARKER_ATTRIBUTE, vec!["a".into(), "b".into()]);

        let ids: Vec<_> = doc.query(&sel).iter().map(|el| el.id).collect();
        assert_eq!(ids, vec![NodeId::new(3), NodeId::new(1)]);
    }

    #[test]
    fn add_class_is_idempotent() {
        let doc = InMemoryDocument::default();
        let node = NodeId::new(1);
        doc.add_class(node, "loaded");
        doc.add_class(node, "loaded");
        assert_eq!(doc.classes(node), vec!["loaded".to_string()]);
        assert!(doc.has_class(node, "loaded"));
        assert!(!doc.has_class(NodeId::new(2), "loaded"));
    }
}
