//! The page renderer.
//!
//! [`Site`] turns validated requirements, the link table and diagram markup
//! into HTML pages. It does no I/O; the caller decides where pages go.

use chrono::{DateTime, Utc};

mod architecture;
mod layout;
mod requirements;

pub use architecture::missing_diagram;

/// A generated HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The page name, without extension.
    pub name: String,
    /// The complete HTML document.
    pub html: String,
}

impl Page {
    /// The file the page is written to, `<name>.html`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.html", self.name)
    }
}

/// The fixed pages listed in the navigation bar, in order.
pub const NAVIGATION: [(&str, &str); 4] = [
    ("index", "Home"),
    ("architecture", "Architecture"),
    ("high_level", "High-Level Requirements"),
    ("software", "Software Requirements"),
];

/// Whether `name` is taken by one of the fixed pages.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    NAVIGATION.iter().any(|(page, _)| *page == name)
}

/// Renders the pages of one documentation site.
#[derive(Debug, Clone)]
pub struct Site<'a> {
    title: &'a str,
    generated: DateTime<Utc>,
}

impl<'a> Site<'a> {
    /// A site titled `title`, stamped as generated at `generated`.
    #[must_use]
    pub const fn new(title: &'a str, generated: DateTime<Utc>) -> Self {
        Self { title, generated }
    }

    /// The landing page.
    #[must_use]
    pub fn index(&self) -> Page {
        let main = format!(
            r#"
    <h1>Welcome to {}</h1>
    <p>This documentation provides a comprehensive overview of the project, including architecture diagrams, requirements, and implementation details. Use the navigation above to explore different sections.</p>

    <h2>Documentation Sections</h2>
    <div class="cards">
        <div class="requirement">
            <h3>Architecture</h3>
            <p>View system architecture diagrams including runtime, class, and block diagrams.</p>
            <a href="architecture.html" class="btn">View Architecture</a>
        </div>
        <div class="requirement">
            <h3>High-Level Requirements</h3>
            <p>Browse high-level requirements that define the overall project scope.</p>
            <a href="high_level.html" class="btn">View Requirements</a>
        </div>
        <div class="requirement">
            <h3>Software Requirements</h3>
            <p>Explore detailed software requirements with implementation status.</p>
            <a href="software.html" class="btn">View Requirements</a>
        </div>
    </div>
"#,
            escape(self.title)
        );
        self.page("index", "Home", "index", &main)
    }

    fn page(&self, name: &str, heading: &str, nav: &str, main: &str) -> Page {
        Page {
            name: name.to_string(),
            html: layout::document(self.title, heading, nav, main, self.generated),
        }
    }
}

/// Escapes text for inclusion in HTML content or attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
