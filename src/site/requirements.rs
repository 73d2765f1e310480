use super::{Page, Site, escape};
use crate::domain::{Level, LinkTable, RequirementRecord};

impl Site<'_> {
    /// The page listing every requirement at `level`.
    ///
    /// When the level's input could not be loaded, pass the reason as
    /// `notice`; it is shown in place of the introduction.
    #[must_use]
    pub fn requirements(
        &self,
        level: Level,
        records: &[RequirementRecord],
        links: &LinkTable,
        notice: Option<&str>,
    ) -> Page {
        let title = level.title();
        let mut main = format!("\n    <h1>{title}</h1>\n");

        let intro = match notice {
            Some(notice) => format!("    <p class=\"notice\">{}</p>\n", escape(notice)),
            None => format!(
                "    <p>This section contains all {} with their current status and details.</p>\n",
                title.to_lowercase()
            ),
        };
        main.push_str(&intro);

        for record in records {
            main.push_str(&card(level, record, links));
        }

        self.page(level.page(), title, level.page(), &main)
    }
}

fn card(level: Level, record: &RequirementRecord, links: &LinkTable) -> String {
    let id = escape(record.id());
    let status = record.status();
    let slug = escape(&status.slug());

    let mut card = format!(
        "\n    <div class=\"requirement status-{slug}\" id=\"{id}\">\n        \
         <h3>{id}: {}</h3>\n        \
         <p><strong>Status:</strong> <span class=\"status-badge badge-{slug}\">{}</span></p>\n        \
         <p><strong>Refines:</strong> {}</p>\n        \
         <p><strong>Description:</strong></p>\n        <p>{}</p>\n",
        escape(record.name()),
        escape(&status.to_string()),
        refines(level, record, links),
        escape(record.description().replace("> ", "").trim()),
    );

    let children = match level {
        Level::HighLevel => links.refined_by(record.id()),
        Level::Software => None,
    };
    if let Some(children) = children {
        card.push_str("        <p><strong>Refined by:</strong></p><ul>");
        for child in children {
            card.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape(&child.to_string()),
                escape(child.id())
            ));
        }
        card.push_str("</ul>\n");
    }

    card.push_str("    </div>\n");
    card
}

fn refines(level: Level, record: &RequirementRecord, links: &LinkTable) -> String {
    let Some(target) = record.refines() else {
        return "N/A".to_string();
    };

    match (level, links.parent_of(record.id())) {
        (Level::Software, Some(parent)) => format!(
            "<a href=\"{}\">{}</a>",
            escape(&parent.to_string()),
            escape(target)
        ),
        (Level::Software, None) => format!(
            "{} <span class=\"dangling\">(unresolved)</span>",
            escape(target)
        ),
        (Level::HighLevel, _) => escape(target),
    }
}
