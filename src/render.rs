//! Output surfaces.
//!
//! The core only talks to the `Renderer` trait. `Printer` is the bundled
//! implementation: an in-memory surface of tagged lines that is echoed to
//! the tracing log.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Something that can show lines of text tagged with a category.
///
/// Implementations must not block and must accept any UTF-8 text.
pub trait Renderer: Send + Sync {
    /// Append one line to the surface.
    fn render(&self, text: &str, category: &str);

    /// Remove every line rendered so far.
    fn clear_output(&self);

    /// Add `class` to the 1-based `position`-th line, if it exists.
    fn highlight(&self, _position: usize, _class: &str) {}
}

/// Printer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterSettings {
    /// Name of the output surface
    pub container: String,
    /// Class used when a line is rendered without a category
    pub class_name: String,
    /// Tag wrapped around each line
    pub tag_name: String,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            container: String::new(),
            class_name: String::new(),
            tag_name: "div".to_string(),
        }
    }
}

/// Partial printer settings; `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrinterOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
}

impl PrinterSettings {
    /// Merge `options` over these settings. Later values win.
    pub fn merge(&mut self, options: PrinterOptions) {
        if let Some(container) = options.container {
            self.container = container;
        }
        if let Some(class_name) = options.class_name {
            self.class_name = class_name;
        }
        if let Some(tag_name) = options.tag_name {
            self.tag_name = tag_name;
        }
    }
}

/// A line on a printer surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub tag: String,
    pub classes: Vec<String>,
    pub text: String,
}

impl RenderedLine {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{tag} class=\"{class}\">{text}</{tag}>",
            tag = self.tag,
            class = escape_html(&self.classes.join(" ")),
            text = escape_html(&self.text),
        )
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory output surface.
#[derive(Debug, Default)]
pub struct Printer {
    settings: Mutex<PrinterSettings>,
    lines: Mutex<Vec<RenderedLine>>,
}

impl Printer {
    pub fn new(settings: PrinterSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Re-initialize the printer, merging `options` over its current settings.
    pub fn init(&self, options: PrinterOptions) {
        lock(&self.settings).merge(options);
    }

    pub fn settings(&self) -> PrinterSettings {
        lock(&self.settings).clone()
    }

    /// Snapshot of the surface, oldest line first.
    pub fn lines(&self) -> Vec<RenderedLine> {
        lock(&self.lines).clone()
    }

    /// Plain text of every line, oldest first.
    pub fn texts(&self) -> Vec<String> {
        lock(&self.lines).iter().map(|l| l.text.clone()).collect()
    }

    fn wrap(&self, text: &str, category: &str) -> RenderedLine {
        let settings = lock(&self.settings);
        let class = if category.is_empty() {
            settings.class_name.as_str()
        } else {
            category
        };
        RenderedLine {
            tag: settings.tag_name.clone(),
            classes: if class.is_empty() {
                Vec::new()
            } else {
                vec![class.to_string()]
            },
            text: text.to_string(),
        }
    }
}

impl Renderer for Printer {
    fn render(&self, text: &str, category: &str) {
        let line = self.wrap(text, category);
        let container = lock(&self.settings).container.clone();
        tracing::info!(target: "universe_game::render", container = %container, "{}", line);
        lock(&self.lines).push(line);
    }

    fn clear_output(&self) {
        lock(&self.lines).clear();
    }

    fn highlight(&self, position: usize, class: &str) {
        if position == 0 || class.is_empty() {
            return;
        }
        let mut lines = lock(&self.lines);
        if let Some(line) = lines.get_mut(position - 1) {
            if !line.has_class(class) {
                line.classes.push(class.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printer(class_name: &str) -> Printer {
        Printer::new(PrinterSettings {
            container: "output".to_string(),
            class_name: class_name.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_category_falls_back_to_default_class() {
        let p = printer("foo");
        p.render("first", "");
        p.render("second", "event");

        let lines = p.lines();
        assert_eq!(lines[0].classes, vec!["foo"]);
        assert_eq!(lines[1].classes, vec!["event"]);
    }

    #[test]
    fn test_no_class_at_all() {
        let p = printer("");
        p.render("plain", "");
        assert!(p.lines()[0].classes.is_empty());
        assert_eq!(p.lines()[0].to_string(), "<div class=\"\">plain</div>");
    }

    #[test]
    fn test_display_escapes_text() {
        let p = printer("foo");
        p.render("a < b & \"c\"", "");
        assert_eq!(
            p.lines()[0].to_string(),
            "<div class=\"foo\">a &lt; b &amp; &quot;c&quot;</div>"
        );
    }

    #[test]
    fn test_clear_output() {
        let p = printer("foo");
        p.render("one", "");
        p.render("two", "");
        p.clear_output();
        assert!(p.lines().is_empty());
    }

    #[test]
    fn test_highlight_is_one_based_and_ignores_out_of_range() {
        let p = printer("foo");
        p.render("one", "");
        p.render("two", "");

        p.highlight(2, "selected");
        p.highlight(2, "selected");
        p.highlight(0, "selected");
        p.highlight(9, "selected");

        let lines = p.lines();
        assert!(!lines[0].has_class("selected"));
        assert_eq!(lines[1].classes, vec!["foo", "selected"]);
    }

    #[test]
    fn test_init_merges_settings() {
        let p = printer("foo");
        p.init(PrinterOptions {
            tag_name: Some("li".to_string()),
            ..Default::default()
        });

        let settings = p.settings();
        assert_eq!(settings.container, "output");
        assert_eq!(settings.class_name, "foo");
        assert_eq!(settings.tag_name, "li");
    }
}
