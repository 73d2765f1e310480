use chrono::{DateTime, Datelike, Utc};

use super::{NAVIGATION, escape};

const STYLE: &str = r"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            line-height: 1.6;
            color: #000;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            background-color: white;
            min-height: 100vh;
            box-shadow: 0 0 20px rgba(0,0,0,0.1);
        }
        header {
            background: linear-gradient(135deg, #4facfe 0%, #00f2fe 100%);
            color: white;
            padding: 2rem 0;
            text-align: center;
        }
        header h1 { font-size: 2.5rem; margin-bottom: 0.5rem; }
        nav { background-color: #f8f9fa; padding: 1rem 0; border-bottom: 1px solid #e9ecef; }
        nav .nav-container { display: flex; justify-content: center; flex-wrap: wrap; }
        nav a {
            margin: 0 1rem;
            text-decoration: none;
            color: #495057;
            font-weight: 500;
            padding: 0.5rem 1rem;
            border-radius: 5px;
        }
        nav a:hover, nav .active { background-color: #007bff; color: white; }
        main { padding: 2rem; }
        h1, h2, h3 { color: #000; margin-bottom: 1rem; }
        main h1 { font-size: 2rem; border-bottom: 3px solid #3498db; padding-bottom: 0.5rem; }
        h2 { font-size: 1.5rem; margin-top: 2rem; }
        .cards {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
            gap: 1rem;
            margin-top: 2rem;
        }
        .requirement {
            background-color: #f8f9fa;
            border: 1px solid #dee2e6;
            border-left: 5px solid #dee2e6;
            border-radius: 8px;
            padding: 1.5rem;
            margin-bottom: 1.5rem;
        }
        .requirement p { margin-bottom: 0.5rem; }
        .status-draft { border-left-color: #ffc107; }
        .status-in-progress { border-left-color: #17a2b8; }
        .status-in-review { border-left-color: #6c757d; }
        .status-finished { border-left-color: #28a745; }
        .status-badge {
            padding: 0.2rem 0.6rem;
            border-radius: 20px;
            font-size: 0.85rem;
            font-weight: 600;
            display: inline-block;
            margin-left: 0.5rem;
            background-color: #e2e3e5;
        }
        .badge-draft { background-color: #fff3cd; color: #856404; }
        .badge-in-progress { background-color: #d1ecf1; color: #0c5460; }
        .badge-in-review { background-color: #e2e3e5; color: #383d41; }
        .badge-finished { background-color: #d4edda; color: #155724; }
        .dangling { color: #b02a37; font-size: 0.85rem; }
        .notice { color: #b02a37; font-weight: 600; }
        .diagram {
            background-color: white;
            border: 1px solid #dee2e6;
            border-radius: 8px;
            padding: 1rem;
            margin-bottom: 2rem;
            text-align: center;
        }
        .diagram svg { max-width: 100%; height: auto; }
        .puml-fallback { background-color: #f8f9fa; padding: 1rem; border-radius: 5px; text-align: left; }
        pre {
            background-color: #f8f9fa;
            border: 1px solid #dee2e6;
            border-radius: 5px;
            padding: 1rem;
            overflow-x: auto;
            white-space: pre-wrap;
        }
        footer { background-color: #343a40; color: white; text-align: center; padding: 1rem 0; margin-top: 2rem; }
        .btn {
            display: inline-block;
            background-color: #007bff;
            color: white;
            padding: 0.5rem 1rem;
            text-decoration: none;
            border-radius: 5px;
        }
        .btn:hover { background-color: #0056b3; }
        @media (max-width: 768px) {
            nav .nav-container { flex-direction: column; }
            main { padding: 1rem; }
        }
";

/// Wraps `main` in the shared page layout.
///
/// `nav` is the navigation entry to mark as active.
pub(super) fn document(
    site_title: &str,
    heading: &str,
    nav: &str,
    main: &str,
    generated: DateTime<Utc>,
) -> String {
    let site_title = escape(site_title);

    let mut html = String::with_capacity(STYLE.len() + main.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!(
        "    <title>{} - {site_title}</title>\n",
        escape(heading)
    ));
    html.push_str("    <style>");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n    <div class=\"container\">\n");
    html.push_str(&format!(
        "        <header>\n            <h1>{site_title}</h1>\n            \
         <p>Comprehensive project overview and requirements</p>\n        </header>\n"
    ));
    html.push_str(&navigation(nav));
    html.push_str("\n<main>");
    html.push_str(main);
    html.push_str("</main>\n");
    html.push_str(&footer(&site_title, generated));
    html.push_str("    </div>\n</body>\n</html>\n");
    html
}

fn navigation(current: &str) -> String {
    let mut nav = String::from("<nav><div class=\"nav-container\">");
    for (page, title) in NAVIGATION {
        let class = if page == current { " class=\"active\"" } else { "" };
        nav.push_str(&format!("<a href=\"{page}.html\"{class}>{title}</a>"));
    }
    nav.push_str("</div></nav>");
    nav
}

/// `site_title` must already be escaped.
fn footer(site_title: &str, generated: DateTime<Utc>) -> String {
    format!(
        "        <footer>\n            <p>&copy; {} {site_title}. Generated automatically on {}.</p>\n        </footer>\n",
        generated.year(),
        generated.format("%Y-%m-%d %H:%M UTC"),
    )
}
