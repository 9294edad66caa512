//! The selector dialect handed to the `selectors` crate.
//!
//! Structural pseudo-classes, `:not()`, `:is()` and `:where()` are built into
//! the crate. Everything that depends on user interaction or rendering
//! (`:hover`, `::before`, ...) has no meaning for a static edit and fails to
//! parse.

use std::fmt;

use cssparser::ToCss;
use selectors::parser::{SelectorImpl, SelectorParseErrorKind};

/// Owned string used for every identifier slot of [`HtmlSelectors`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct CssString(pub(crate) String);

impl CssString {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CssString {
    fn from(s: &str) -> Self {
        CssString(s.to_string())
    }
}

impl std::borrow::Borrow<str> for CssString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(&self.0)
    }
}

impl precomputed_hash::PrecomputedHash for CssString {
    fn precomputed_hash(&self) -> u32 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HtmlSelectors;

impl SelectorImpl for HtmlSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssString;
    type LocalName = CssString;
    type NamespacePrefix = CssString;
    type NamespaceUrl = CssString;
    type BorrowedLocalName = str;
    type BorrowedNamespaceUrl = str;

    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

/// No state-dependent pseudo-class is accepted, so this has no values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PseudoClass {}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = HtmlSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl ToCss for PseudoClass {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

/// Pseudo-elements are never edit targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PseudoElement {}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = HtmlSelectors;
}

impl ToCss for PseudoElement {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

pub(crate) struct SelectorParser;

impl<'i> selectors::parser::Parser<'i> for SelectorParser {
    type Impl = HtmlSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_is_and_where(&self) -> bool {
        true
    }
}
