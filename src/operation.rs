use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use strum::{AsRefStr, Display as StrumDisplay, EnumString, VariantNames};

/// One structured edit to apply to every element a CSS selector matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[schemars(title = "operation")]
pub enum Operation {
    /// Set or overwrite one inline style property
    StyleChange {
        /// CSS selector for the target elements
        selector: String,
        /// Style property name, e.g. `color`
        property: String,
        /// New property value, e.g. `blue`
        value: String,
    },

    /// Replace the text directly inside the target elements, leaving child elements alone
    TextReplace {
        /// CSS selector for the target elements
        selector: String,
        /// Replacement text; may be empty
        #[serde(rename = "newText")]
        new_text: String,
    },

    /// Create or overwrite an attribute
    AttributeModify {
        /// CSS selector for the target elements
        selector: String,
        /// Attribute name, e.g. `href`
        attribute: String,
        /// New attribute value; may be empty
        value: String,
    },

    /// Add or remove one class name
    ClassToggle {
        /// CSS selector for the target elements
        selector: String,
        /// A single class name without whitespace
        #[serde(rename = "className")]
        class_name: String,
        action: ClassAction,
    },

    /// Hide an element with `display: none`, or show it by removing its `display` declaration
    VisibilityToggle {
        /// CSS selector for the target elements
        selector: String,
        action: VisibilityAction,
    },
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    StrumDisplay,
    EnumString,
    VariantNames,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    StyleChange,
    TextReplace,
    AttributeModify,
    ClassToggle,
    VisibilityToggle,
}

impl OperationKind {
    /// Wire names of every field this kind carries besides its tag.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::StyleChange => &["selector", "property", "value"],
            Self::TextReplace => &["selector", "newText"],
            Self::AttributeModify => &["selector", "attribute", "value"],
            Self::ClassToggle => &["selector", "className", "action"],
            Self::VisibilityToggle => &["selector", "action"],
        }
    }

    /// Allowed values of the `action` field, for kinds that have one.
    pub fn actions(self) -> Option<&'static [&'static str]> {
        match self {
            Self::ClassToggle => Some(ClassAction::VARIANTS),
            Self::VisibilityToggle => Some(VisibilityAction::VARIANTS),
            _ => None,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    StrumDisplay,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClassAction {
    Add,
    Remove,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    StrumDisplay,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VisibilityAction {
    Hide,
    Show,
}

impl Operation {
    pub fn style_change(
        selector: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::StyleChange {
            selector: selector.into(),
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn text_replace(selector: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self::TextReplace {
            selector: selector.into(),
            new_text: new_text.into(),
        }
    }

    pub fn attribute_modify(
        selector: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::AttributeModify {
            selector: selector.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn class_toggle(
        selector: impl Into<String>,
        class_name: impl Into<String>,
        action: ClassAction,
    ) -> Self {
        Self::ClassToggle {
            selector: selector.into(),
            class_name: class_name.into(),
            action,
        }
    }

    pub fn visibility_toggle(selector: impl Into<String>, action: VisibilityAction) -> Self {
        Self::VisibilityToggle {
            selector: selector.into(),
            action,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::StyleChange { .. } => OperationKind::StyleChange,
            Self::TextReplace { .. } => OperationKind::TextReplace,
            Self::AttributeModify { .. } => OperationKind::AttributeModify,
            Self::ClassToggle { .. } => OperationKind::ClassToggle,
            Self::VisibilityToggle { .. } => OperationKind::VisibilityToggle,
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            Self::StyleChange { selector, .. }
            | Self::TextReplace { selector, .. }
            | Self::AttributeModify { selector, .. }
            | Self::ClassToggle { selector, .. }
            | Self::VisibilityToggle { selector, .. } => selector,
        }
    }

    /// Field rules that hold regardless of how the operation was built.
    pub fn check(&self) -> Result<(), String> {
        if self.selector().trim().is_empty() {
            return Err("`selector` must not be empty".into());
        }

        match self {
            Self::StyleChange {
                property, value, ..
            } => {
                non_empty("property", property)?;
                non_empty("value", value)?;
                if property.contains([':', ';']) {
                    return Err("`property` must not contain `:` or `;`".into());
                }
            }
            Self::AttributeModify { attribute, .. } => {
                non_empty("attribute", attribute)?;
                if let Some(c) = attribute
                    .chars()
                    .find(|&c| c.is_whitespace() || "\"'>/=".contains(c))
                {
                    return Err(format!("`attribute` must not contain {c:?}"));
                }
            }
            Self::ClassToggle { class_name, .. } => {
                non_empty("className", class_name)?;
                if class_name.chars().any(char::is_whitespace) {
                    return Err("`className` must be a single class name without whitespace".into());
                }
            }
            Self::TextReplace { .. } | Self::VisibilityToggle { .. } => {}
        }

        Ok(())
    }
}

fn non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("`{field}` must not be empty"))
    } else {
        Ok(())
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind(), self.selector())
    }
}
