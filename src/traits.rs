use crate::operation::{ClassAction, Operation, VisibilityAction};
use crate::types::Example;
use schemars::{generate::SchemaSettings, JsonSchema, Schema};
use serde::Serialize;
use serde_json::Value;

pub trait WithExamples: Sized + Serialize {
    fn examples() -> Option<Vec<Example<Self>>> {
        None
    }
}

impl WithExamples for Operation {
    fn examples() -> Option<Vec<Example<Self>>> {
        Some(vec![
            Example {
                description: "Change the color of the page title",
                item: Operation::style_change("h1", "color", "#1e40af"),
            },
            Example {
                description: "Rewrite the label of a button, keeping any icon inside it",
                item: Operation::text_replace("#submit", "Send message"),
            },
            Example {
                description: "Point a link somewhere else",
                item: Operation::attribute_modify("nav a.docs", "href", "/docs/v2"),
            },
            Example {
                description: "Highlight every card",
                item: Operation::class_toggle(".card", "highlighted", ClassAction::Add),
            },
            Example {
                description: "Hide the cookie banner",
                item: Operation::visibility_toggle("#cookie-banner", VisibilityAction::Hide),
            },
        ])
    }
}

/// JSON Schema of `T` with its examples attached, in the shape planners are shown.
pub fn schema_with_examples<T>() -> Schema
where
    T: JsonSchema + WithExamples,
{
    let settings = SchemaSettings::draft2020_12().with(|s| {
        s.meta_schema = None;
        s.inline_subschemas = true;
    });

    let generator = settings.into_generator();
    let mut schema = generator.into_root_schema_for::<T>();
    schema.remove("$schema");

    if let Some(examples) = T::examples() {
        match serde_json::to_value(examples) {
            Ok(examples) => {
                schema.insert("examples".to_string(), examples);
            }
            Err(error) => log::error!("could not serialize schema examples: {error}"),
        }
    }

    schema
}

/// Schema for a single [`Operation`], for embedding in planner prompts.
pub fn operation_schema() -> Value {
    schema_with_examples::<Operation>().into()
}
