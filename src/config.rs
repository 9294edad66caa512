use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// How the input text is interpreted before patching.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
    ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParseMode {
    /// Full document when the text carries a doctype, `<html>`, `<head>` or `<body>`;
    /// body fragment otherwise
    #[default]
    Auto,
    /// Always parse as a full document (html/head/body are synthesised)
    Document,
    /// Always parse as the content of a `<body>` and serialize only that content
    Fragment,
}

/// Options that shape document loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::Args)]
#[serde(default)]
pub struct ParseOptions {
    /// How to interpret the input document
    #[arg(long, value_enum, env = "HTML_PATCH_PARSE_MODE", default_value_t = ParseMode::Auto)]
    pub parse_mode: ParseMode,

    /// Reject documents the HTML parser reports errors for, instead of recovering
    #[arg(long, env = "HTML_PATCH_STRICT")]
    pub strict: bool,
}

/// Configuration for a [`Patcher`](crate::Patcher).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::Args)]
#[serde(default)]
pub struct PatchOptions {
    #[command(flatten)]
    #[serde(flatten)]
    pub parse: ParseOptions,

    /// Reject batches longer than this many operations
    #[arg(long, env = "HTML_PATCH_MAX_OPERATIONS")]
    pub max_operations: Option<usize>,
}

impl PatchOptions {
    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse.parse_mode = parse_mode;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.parse.strict = strict;
        self
    }

    pub fn with_max_operations(mut self, max_operations: impl Into<Option<usize>>) -> Self {
        self.max_operations = max_operations.into();
        self
    }
}
