use std::fmt::{self, Display, Formatter};

/// The tokens of a `class` attribute, in order and without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ClassList(Vec<String>);

impl ClassList {
    pub(crate) fn parse(text: &str) -> Self {
        let mut list = Self::default();
        for token in text.split_ascii_whitespace() {
            list.add(token);
        }
        list
    }

    pub(crate) fn contains(&self, class_name: &str) -> bool {
        self.0.iter().any(|token| token == class_name)
    }

    /// Appends `class_name` unless it is already present.
    pub(crate) fn add(&mut self, class_name: &str) {
        if !self.contains(class_name) {
            self.0.push(class_name.to_string());
        }
    }

    pub(crate) fn remove(&mut self, class_name: &str) {
        self.0.retain(|token| token != class_name);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for ClassList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}
