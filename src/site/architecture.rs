use std::path::Path;

use super::{Page, Site, escape};
use crate::domain::DiagramEntry;

impl Site<'_> {
    /// The architecture hub, with one card per diagram.
    #[must_use]
    pub fn architecture(&self, diagrams: &[DiagramEntry]) -> Page {
        let mut main = String::from(
            "\n    <h1>System Architecture Diagrams</h1>\n    \
             <p>Select a diagram to view it on its dedicated page.</p>\n\n    \
             <div class=\"cards\">\n",
        );

        if diagrams.is_empty() {
            main.push_str("        <p>No diagrams found.</p>\n");
        }

        for diagram in diagrams {
            let title = escape(&diagram.title);
            let summary = diagram
                .summary
                .as_deref()
                .map(escape)
                .unwrap_or_else(|| format!("Rendered from {}.", escape(&file_name(&diagram.file))));
            main.push_str(&format!(
                "        <div class=\"requirement\">\n            <h3>{title}</h3>\n            \
                 <p>{summary}</p>\n            <a class=\"btn\" href=\"{}.html\">Open {}</a>\n        \
                 </div>\n",
                escape(&diagram.slug),
                title.to_lowercase(),
            ));
        }

        main.push_str("    </div>\n");
        self.page("architecture", "Architecture", "architecture", &main)
    }

    /// The page of a single diagram.
    ///
    /// `markup` is embedded as-is: an SVG image, a text fallback, or a
    /// [`missing_diagram`] note.
    #[must_use]
    pub fn diagram(&self, entry: &DiagramEntry, markup: &str) -> Page {
        let title = escape(&entry.title);
        let main = format!(
            "\n    <h1>{title}</h1>\n    <p>Rendered from {}. Edit the PUML file and rebuild docs \
             to refresh.</p>\n    <div class=\"diagram\">\n        {markup}\n    </div>\n    \
             <p style=\"text-align:center; margin-top:1rem;\"><a class=\"btn\" \
             href=\"architecture.html\">&larr; Back to Architecture Hub</a></p>\n",
            escape(&file_name(&entry.file)),
        );
        self.page(&entry.slug, &entry.title, "architecture", &main)
    }
}

/// Markup standing in for a diagram whose source could not be read.
#[must_use]
pub fn missing_diagram(file: &Path) -> String {
    format!(
        "<div class='puml-fallback'><p>Missing or unreadable file: {}</p></div>",
        escape(&file_name(file))
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::site::tests::site;

    fn entry() -> DiagramEntry {
        DiagramEntry {
            file: PathBuf::from("runtime_diagram.puml"),
            title: "Runtime Diagram".to_string(),
            slug: "runtime".to_string(),
            summary: Some("Sequence of runtime interactions.".to_string()),
        }
    }

    #[test]
    fn hub_links_each_diagram() {
        let discovered = DiagramEntry::from_file(PathBuf::from("flows/data_flow.puml"));
        let page = site().architecture(&[entry(), discovered]);

        assert_eq!(page.file_name(), "architecture.html");
        assert!(page.html.contains(r#"href="runtime.html">Open runtime diagram</a>"#));
        assert!(page.html.contains("Sequence of runtime interactions."));
        assert!(page.html.contains(r#"href="data_flow.html""#));
        assert!(page.html.contains("Rendered from data_flow.puml."));
    }

    #[test]
    fn diagram_page_embeds_markup() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>";
        let page = site().diagram(&entry(), svg);

        assert_eq!(page.file_name(), "runtime.html");
        assert!(page.html.contains(svg));
        assert!(page.html.contains("Rendered from runtime_diagram.puml."));
        assert!(page.html.contains(r#"<a href="architecture.html" class="active">"#));
    }

    #[test]
    fn missing_diagram_names_the_file() {
        let markup = missing_diagram(Path::new("architecture/class_diagram.puml"));
        assert!(markup.contains("Missing or unreadable file: class_diagram.puml"));
    }
}
