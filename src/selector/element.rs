use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{ElementSelectorFlags, MatchingContext};
use selectors::{Element, OpaqueElement};

use super::css::{CssString, HtmlSelectors, PseudoClass, PseudoElement};
use crate::document::{Document, ElementData, NodeId, Shape};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// An element of a [`Document`] as seen by the selector matcher.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementRef<'a> {
    document: &'a Document,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    /// `None` unless `id` is an element.
    pub(crate) fn new(document: &'a Document, id: NodeId) -> Option<Self> {
        document
            .is_element(id)
            .then_some(Self { document, id })
    }

    fn at(&self, id: NodeId) -> Self {
        Self {
            document: self.document,
            id,
        }
    }

    fn data(&self) -> Option<&'a ElementData> {
        self.document.element(self.id)
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.data()?.attribute(name)
    }
}

impl<'a> Element for ElementRef<'a> {
    type Impl = HtmlSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.document.node(self.id))
    }

    fn parent_element(&self) -> Option<Self> {
        self.document.parent_element(self.id).map(|id| self.at(id))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.document
            .previous_element_sibling(self.id)
            .map(|id| self.at(id))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.document
            .next_element_sibling(self.id)
            .map(|id| self.at(id))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.document
            .element_children(self.id)
            .next()
            .map(|id| self.at(id))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        self.data().is_some_and(|element| element.name() == local_name)
    }

    fn has_namespace(&self, ns: &str) -> bool {
        ns.is_empty() || ns == HTML_NAMESPACE
    }

    fn is_same_type(&self, other: &Self) -> bool {
        match (self.data(), other.data()) {
            (Some(a), Some(b)) => a.name() == b.name(),
            _ => false,
        }
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssString>,
        local_name: &CssString,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        if let NamespaceConstraint::Specific(url) = ns {
            if !(url.as_str().is_empty() || url.as_str() == HTML_NAMESPACE) {
                return false;
            }
        }
        let Some(actual) = self.attribute(local_name.as_str()) else {
            return false;
        };
        match operation {
            AttrSelectorOperation::Exists => true,
            AttrSelectorOperation::WithValue {
                operator,
                case_sensitivity,
                value,
            } => operator.eval_str(actual, value.as_str(), *case_sensitivity),
        }
    }

    fn match_non_ts_pseudo_class(
        &self,
        pseudo: &PseudoClass,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match *pseudo {}
    }

    fn match_pseudo_element(
        &self,
        pseudo: &PseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match *pseudo {}
    }

    fn is_link(&self) -> bool {
        self.attribute("href").is_some()
            && self
                .data()
                .is_some_and(|element| matches!(element.name(), "a" | "area" | "link"))
    }

    fn is_html_slot_element(&self) -> bool {
        self.data().is_some_and(|element| element.name() == "slot")
    }

    fn assigned_slot(&self) -> Option<Self> {
        None
    }

    fn has_id(&self, id: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.attribute("id")
            .is_some_and(|actual| case_sensitivity.eq(actual.as_bytes(), id.as_str().as_bytes()))
    }

    fn has_class(&self, class: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.attribute("class").is_some_and(|classes| {
            classes
                .split_ascii_whitespace()
                .any(|name| case_sensitivity.eq(name.as_bytes(), class.as_str().as_bytes()))
        })
    }

    fn imported_part(&self, _name: &CssString) -> Option<CssString> {
        None
    }

    fn is_part(&self, _name: &CssString) -> bool {
        false
    }

    /// No element children and no non-empty text.
    fn is_empty(&self) -> bool {
        self.document.children(self.id).iter().all(|&child| {
            let node = self.document.node(child);
            !node.is_element() && node.as_text().map_or(true, str::is_empty)
        })
    }

    /// Only a parsed page has a root element; fragment nodes hang off the
    /// synthetic document node.
    fn is_root(&self) -> bool {
        self.document.shape() == Shape::Document
            && self.document.parent(self.id) == Some(self.document.root())
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn has_custom_state(&self, _name: &CssString) -> bool {
        false
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}
