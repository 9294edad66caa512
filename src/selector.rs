mod css;
mod element;

use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use cssparser::{BasicParseErrorKind, ParseError, ParseErrorKind, ParserInput, ToCss};
use selectors::matching::{
    matches_selector, MatchingContext, MatchingForInvalidation, MatchingMode, NeedsSelectorFlags,
    QuirksMode, SelectorCaches,
};
use selectors::parser::{ParseRelative, SelectorList, SelectorParseErrorKind};

use self::css::{HtmlSelectors, SelectorParser};
use self::element::ElementRef;
use crate::document::{Document, NodeId};
use crate::errors::SelectorError;

/// A compiled CSS selector list.
///
/// Parsing and matching are done by the `selectors` crate, so the grammar is
/// that of a browser minus the state and rendering pseudo-classes.
#[derive(Clone)]
pub struct Selector {
    source: String,
    list: SelectorList<HtmlSelectors>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut input = ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&SelectorParser, &mut parser, ParseRelative::No)
            .map_err(|error| selector_error(source, error))?;
        Ok(Self {
            source: source.to_string(),
            list,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the element `id` matches any selector in the list.
    pub fn matches(&self, document: &Document, id: NodeId) -> bool {
        let mut caches = SelectorCaches::default();
        let mut context = matching_context(&mut caches);
        self.matches_in(document, id, &mut context)
    }

    fn matches_in(
        &self,
        document: &Document,
        id: NodeId,
        context: &mut MatchingContext<'_, HtmlSelectors>,
    ) -> bool {
        let Some(element) = ElementRef::new(document, id) else {
            return false;
        };
        self.list
            .slice()
            .iter()
            .any(|selector| matches_selector(selector, 0, None, &element, context))
    }
}

fn matching_context(caches: &mut SelectorCaches) -> MatchingContext<'_, HtmlSelectors> {
    MatchingContext::new(
        MatchingMode::Normal,
        None,
        caches,
        QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    )
}

fn selector_error(source: &str, error: ParseError<'_, SelectorParseErrorKind<'_>>) -> SelectorError {
    let message = match &error.kind {
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected `{}`", token.to_css_string())
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "unexpected end of selector".to_string()
        }
        ParseErrorKind::Basic(other) => format!("{other:?}"),
        ParseErrorKind::Custom(SelectorParseErrorKind::EmptySelector) => {
            "expected a selector".to_string()
        }
        ParseErrorKind::Custom(SelectorParseErrorKind::DanglingCombinator) => {
            "combinator is missing its right-hand side".to_string()
        }
        ParseErrorKind::Custom(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)) => {
            format!("`{}` is not supported", &**name)
        }
        ParseErrorKind::Custom(other) => format!("{other:?}"),
    };
    SelectorError {
        selector: source.to_string(),
        position: error.location.column.saturating_sub(1) as usize,
        message,
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Selector {}

impl Debug for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Every element matching `selector`, in document order, evaluated against the
/// tree as it is right now.
pub fn resolve(document: &Document, selector: &Selector) -> Vec<NodeId> {
    let mut caches = SelectorCaches::default();
    let mut context = matching_context(&mut caches);
    let matched: Vec<NodeId> = document
        .elements()
        .filter(|&id| selector.matches_in(document, id, &mut context))
        .collect();
    log::trace!("`{selector}` matched {} element(s)", matched.len());
    matched
}
