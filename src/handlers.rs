mod class_list;
mod inline_style;

pub(crate) use class_list::ClassList;
pub(crate) use inline_style::InlineStyle;

use crate::document::{Document, ElementData, NodeId};
use crate::errors::HandlerError;
use crate::operation::{ClassAction, Operation, VisibilityAction};

/// A single write against the tree, computed before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    SetAttribute {
        element: NodeId,
        name: String,
        value: String,
    },
    RemoveAttribute {
        element: NodeId,
        name: &'static str,
    },
    SetText {
        node: NodeId,
        content: String,
    },
}

/// Applies `operation` to every node in `targets`.
///
/// All edits are planned first, so if any target fails nothing is written and
/// the tree is left exactly as it was.
pub(crate) fn apply(
    document: &mut Document,
    operation: &Operation,
    targets: &[NodeId],
) -> Result<(), HandlerError> {
    let mut edits = Vec::with_capacity(targets.len());
    for &target in targets {
        plan(document, operation, target, &mut edits)?;
    }

    log::trace!("{operation}: {} edit(s) on {} node(s)", edits.len(), targets.len());
    for edit in edits {
        write(document, edit);
    }
    Ok(())
}

fn plan(
    document: &Document,
    operation: &Operation,
    target: NodeId,
    edits: &mut Vec<Edit>,
) -> Result<(), HandlerError> {
    let Some(element) = document.element(target) else {
        return Ok(());
    };

    match operation {
        Operation::StyleChange {
            property, value, ..
        } => edits.push(restyle(target, element, |style| style.set(property, value))?),

        Operation::VisibilityToggle { action, .. } => {
            let edit = match action {
                VisibilityAction::Hide => {
                    restyle(target, element, |style| style.set("display", "none"))?
                }
                VisibilityAction::Show => restyle(target, element, |style| {
                    style.remove("display");
                })?,
            };
            edits.push(edit);
        }

        Operation::AttributeModify {
            attribute, value, ..
        } => edits.push(Edit::SetAttribute {
            element: target,
            name: attribute.to_ascii_lowercase(),
            value: value.clone(),
        }),

        Operation::ClassToggle {
            class_name, action, ..
        } => {
            let mut classes = ClassList::parse(element.attribute("class").unwrap_or_default());
            match action {
                ClassAction::Add => classes.add(class_name),
                ClassAction::Remove => classes.remove(class_name),
            }
            edits.push(if classes.is_empty() {
                Edit::RemoveAttribute {
                    element: target,
                    name: "class",
                }
            } else {
                Edit::SetAttribute {
                    element: target,
                    name: "class".into(),
                    value: classes.to_string(),
                }
            });
        }

        // A lone text child and a mix of text and elements both come down to
        // rewriting each direct text child; element children are untouched.
        Operation::TextReplace { new_text, .. } => {
            edits.extend(
                document
                    .children(target)
                    .iter()
                    .filter(|&&child| document.is_text(child))
                    .map(|&node| Edit::SetText {
                        node,
                        content: new_text.clone(),
                    }),
            );
        }
    }

    Ok(())
}

fn restyle(
    target: NodeId,
    element: &ElementData,
    change: impl FnOnce(&mut InlineStyle),
) -> Result<Edit, HandlerError> {
    let current = element.attribute("style").unwrap_or_default();
    let mut style = InlineStyle::parse(current, element.name())?;
    change(&mut style);

    Ok(if style.is_empty() {
        Edit::RemoveAttribute {
            element: target,
            name: "style",
        }
    } else {
        Edit::SetAttribute {
            element: target,
            name: "style".into(),
            value: style.to_string(),
        }
    })
}

fn write(document: &mut Document, edit: Edit) {
    match edit {
        Edit::SetAttribute {
            element,
            name,
            value,
        } => {
            if let Some(element) = document.element_mut(element) {
                element.set_attribute(name, value);
            }
        }
        Edit::RemoveAttribute { element, name } => {
            if let Some(element) = document.element_mut(element) {
                element.remove_attribute(name);
            }
        }
        Edit::SetText { node, content } => {
            document.set_text(node, &content);
        }
    }
}
