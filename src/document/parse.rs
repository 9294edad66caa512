use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, parse_fragment, LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData as DomData, RcDom};

use super::{Attribute, Document, ElementData, NodeData, NodeId, Shape};
use crate::config::{ParseMode, ParseOptions};
use crate::errors::ParseError;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Tags whose presence marks the input as a whole page rather than a fragment.
const DOCUMENT_TAGS: [&str; 4] = ["!doctype", "html", "head", "body"];

impl Document {
    /// Parses `text` into an owned tree.
    ///
    /// The HTML parser recovers from nearly anything, so the only hard failures
    /// are empty input, input without a single tag, and (with `strict`) any
    /// error the parser reports while recovering.
    pub fn parse(text: &str, options: &ParseOptions) -> Result<Self, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        if !contains_markup(text) {
            return Err(ParseError::NoMarkup);
        }

        let shape = match options.parse_mode {
            ParseMode::Auto => detect_shape(text),
            ParseMode::Document => Shape::Document,
            ParseMode::Fragment => Shape::Fragment,
        };

        let dom = match shape {
            Shape::Document => parse_document(RcDom::default(), ParseOpts::default()).one(text),
            Shape::Fragment => parse_fragment(
                RcDom::default(),
                ParseOpts::default(),
                QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("body")),
                Vec::new(),
            )
            .one(text),
        };

        if !dom.errors.is_empty() {
            log::debug!("parser recovered from {} error(s)", dom.errors.len());
            if options.strict {
                return Err(ParseError::Malformed(
                    dom.errors.iter().map(|error| error.to_string()).collect(),
                ));
            }
        }

        let source = match shape {
            Shape::Document => dom.document.clone(),
            Shape::Fragment => fragment_root(&dom.document),
        };

        let mut document = Document::new(shape);
        let root = document.root();
        document.import_children(&source, root);
        log::trace!("parsed {shape:?} with {} nodes", document.nodes.len());
        Ok(document)
    }

    fn import_children(&mut self, source: &Handle, target: NodeId) {
        let mut pending = vec![(source.clone(), target)];
        while let Some((handle, parent)) = pending.pop() {
            for child in children_of(&handle) {
                if let Some(data) = convert(&child) {
                    let id = self.append(parent, data);
                    pending.push((child, id));
                }
            }
        }
    }
}

/// Fragment parsing hangs the parsed nodes under a synthetic `<html>` element.
fn fragment_root(document: &Handle) -> Handle {
    document
        .children
        .borrow()
        .iter()
        .find(|child| {
            matches!(&child.data, DomData::Element { name, .. } if &*name.local == "html")
        })
        .cloned()
        .unwrap_or_else(|| document.clone())
}

fn children_of(handle: &Handle) -> Vec<Handle> {
    if let DomData::Element {
        template_contents, ..
    } = &handle.data
    {
        if let Some(contents) = template_contents.borrow().as_ref() {
            return contents.children.borrow().clone();
        }
    }
    handle.children.borrow().clone()
}

fn convert(handle: &Handle) -> Option<NodeData> {
    match &handle.data {
        DomData::Doctype {
            name,
            public_id,
            system_id,
        } => Some(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }),
        DomData::Text { contents } => Some(NodeData::Text(contents.borrow().to_string())),
        DomData::Comment { contents } => Some(NodeData::Comment(contents.to_string())),
        DomData::Element { name, attrs, .. } => {
            let mut element = ElementData::new(name.local.to_string());
            for attribute in attrs.borrow().iter() {
                let Attribute { name, value } = convert_attribute(attribute);
                element.set_attribute(name, value);
            }
            Some(NodeData::Element(element))
        }
        DomData::Document | DomData::ProcessingInstruction { .. } => None,
    }
}

fn convert_attribute(attribute: &html5ever::Attribute) -> Attribute {
    let name = match &attribute.name.prefix {
        Some(prefix) => format!("{}:{}", prefix, attribute.name.local),
        None => attribute.name.local.to_string(),
    };
    Attribute {
        name,
        value: attribute.value.to_string(),
    }
}

fn contains_markup(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|pair| pair[0] == b'<' && (pair[1].is_ascii_alphabetic() || pair[1] == b'!'))
}

fn detect_shape(text: &str) -> Shape {
    let lower = text.to_ascii_lowercase();
    let is_document = DOCUMENT_TAGS.iter().any(|tag| opens_tag(&lower, tag));
    if is_document {
        Shape::Document
    } else {
        Shape::Fragment
    }
}

/// Whether `<tag` appears as a whole tag name, so `<head` does not match `<header>`.
fn opens_tag(lower: &str, tag: &str) -> bool {
    let needle = format!("<{tag}");
    lower.match_indices(&needle).any(|(start, _)| {
        lower[start + needle.len()..]
            .chars()
            .next()
            .map_or(true, |next| {
                next.is_ascii_whitespace() || next == '>' || next == '/'
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Document {
        Document::parse(text, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn fragment_keeps_only_parsed_nodes() {
        let document = parse(r#"<div id="t" class="a">Hi</div>"#);
        assert_eq!(document.shape(), Shape::Fragment);
        let top: Vec<_> = document.children(document.root()).to_vec();
        assert_eq!(top.len(), 1);
        let div = document.element(top[0]).unwrap();
        assert_eq!(div.name(), "div");
        assert_eq!(div.attribute("id"), Some("t"));
        assert_eq!(div.attribute("CLASS"), Some("a"));
        assert_eq!(document.text_content(top[0]), "Hi");
    }

    #[test]
    fn full_documents_are_detected() {
        let document = parse("<!DOCTYPE html><html><body><p>x</p></body></html>");
        assert_eq!(document.shape(), Shape::Document);
        let names: Vec<_> = document
            .elements()
            .map(|id| document.element(id).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["html", "head", "body", "p"]);
    }

    #[test]
    fn header_is_not_head() {
        assert_eq!(detect_shape("<header>top</header>"), Shape::Fragment);
        assert_eq!(detect_shape("<HEAD><title>t</title></HEAD>"), Shape::Document);
        assert_eq!(detect_shape("<body class=\"x\">"), Shape::Document);
    }

    #[test]
    fn forced_modes_override_detection() {
        let options = ParseOptions {
            parse_mode: ParseMode::Document,
            strict: false,
        };
        let document = Document::parse("<p>x</p>", &options).unwrap();
        assert_eq!(document.shape(), Shape::Document);
    }

    #[test]
    fn empty_and_plain_text_are_rejected() {
        let options = ParseOptions::default();
        assert_eq!(Document::parse("   \n", &options), Err(ParseError::Empty));
        assert_eq!(
            Document::parse("just some words", &options),
            Err(ParseError::NoMarkup)
        );
        assert_eq!(Document::parse("1 < 2", &options), Err(ParseError::NoMarkup));
    }

    #[test]
    fn strict_mode_rejects_recovered_errors() {
        let options = ParseOptions {
            parse_mode: ParseMode::Fragment,
            strict: true,
        };
        assert!(matches!(
            Document::parse("<div></span></div>", &options),
            Err(ParseError::Malformed(_))
        ));
        assert!(Document::parse("<div><span>ok</span></div>", &options).is_ok());
    }

    #[test]
    fn template_contents_become_children() {
        let document = parse("<template><b>bold</b></template>");
        let template = document.children(document.root())[0];
        let bold = document.children(template)[0];
        assert_eq!(document.element(bold).unwrap().name(), "b");
    }
}
