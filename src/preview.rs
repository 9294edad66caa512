use diffy::{DiffOptions, PatchFormatter};

/// Line diff from `before` to `after` with file and hunk headers stripped.
///
/// Returns an empty string when nothing changed.
pub fn diff(before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let patch = DiffOptions::new().create_patch(before, after);
    let formatted = PatchFormatter::new()
        .missing_newline_message(false)
        .fmt_patch(&patch)
        .to_string();

    let mut preview = String::from("===DIFF===\n");
    for line in formatted.lines() {
        if line.starts_with("---") || line.starts_with("+++") || line.starts_with("@@") {
            continue;
        }
        preview.push_str(line);
        preview.push('\n');
    }

    if preview.ends_with('\n') {
        preview.pop();
    }
    preview
}
