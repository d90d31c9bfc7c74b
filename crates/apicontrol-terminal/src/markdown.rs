//! Minimal markdown rendering for AI insight text
//!
//! Only `**bold**` spans are interpreted; everything else is printed as-is,
//! one output line per input line.

use colored::*;

/// Render insight text for the terminal
///
/// Bold spans lose their asterisks and are emboldened when `colored` is set.
///
/// # Examples
/// ```
/// use apicontrol_terminal::markdown::render_insight_markdown;
///
/// let lines = render_insight_markdown("**Rating:** 8/10\nAll good", false);
/// assert_eq!(lines, vec!["Rating: 8/10".to_string(), "All good".to_string()]);
/// ```
pub fn render_insight_markdown(text: &str, colored: bool) -> Vec<String> {
    text.lines().map(|line| render_line(line, colored)).collect()
}

fn render_line(line: &str, colored: bool) -> String {
    let mut output = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(start) = rest.find("**") {
        let after_open = &rest[start + 2..];
        let Some(len) = after_open.find("**") else {
            break;
        };
        output.push_str(&rest[..start]);
        let inner = &after_open[..len];
        if colored {
            output.push_str(&inner.bold().to_string());
        } else {
            output.push_str(inner);
        }
        rest = &after_open[len + 2..];
    }

    output.push_str(rest);
    output
}
