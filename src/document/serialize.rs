use super::{Document, NodeData, NodeId};

const VOID_ELEMENTS: [&str; 18] = [
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 8] = [
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "noscript",
];

enum Step {
    Open(NodeId),
    Close(NodeId),
}

impl Document {
    /// Serializes the tree back to HTML text.
    ///
    /// Attribute values are always double-quoted and entities are re-escaped
    /// minimally, so an untouched document approximates its source without
    /// necessarily matching it byte for byte.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<Step> = self
            .children(self.root())
            .iter()
            .rev()
            .map(|&id| Step::Open(id))
            .collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Open(id) => match self.node(id).data() {
                    NodeData::Element(element) => {
                        out.push('<');
                        out.push_str(element.name());
                        for attribute in element.attributes() {
                            out.push(' ');
                            out.push_str(&attribute.name);
                            out.push_str("=\"");
                            escape(&attribute.value, true, &mut out);
                            out.push('"');
                        }
                        out.push('>');

                        if VOID_ELEMENTS.contains(&element.name()) {
                            continue;
                        }
                        stack.push(Step::Close(id));
                        stack.extend(self.children(id).iter().rev().map(|&child| Step::Open(child)));
                    }
                    NodeData::Text(text) => {
                        let raw = self
                            .parent_element(id)
                            .and_then(|parent| self.element(parent))
                            .is_some_and(|parent| RAW_TEXT_ELEMENTS.contains(&parent.name()));
                        if raw {
                            out.push_str(text);
                        } else {
                            escape(text, false, &mut out);
                        }
                    }
                    NodeData::Comment(comment) => {
                        out.push_str("<!--");
                        out.push_str(comment);
                        out.push_str("-->");
                    }
                    NodeData::Doctype {
                        name,
                        public_id,
                        system_id,
                    } => {
                        out.push_str("<!DOCTYPE ");
                        out.push_str(name);
                        if !public_id.is_empty() {
                            out.push_str(&format!(" PUBLIC \"{public_id}\""));
                            if !system_id.is_empty() {
                                out.push_str(&format!(" \"{system_id}\""));
                            }
                        } else if !system_id.is_empty() {
                            out.push_str(&format!(" SYSTEM \"{system_id}\""));
                        }
                        out.push('>');
                    }
                    NodeData::Document => {}
                },
                Step::Close(id) => {
                    if let Some(element) = self.element(id) {
                        out.push_str("</");
                        out.push_str(element.name());
                        out.push('>');
                    }
                }
            }
        }

        out
    }
}

fn escape(text: &str, attribute_mode: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' if !attribute_mode => out.push_str("&lt;"),
            '>' if !attribute_mode => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
