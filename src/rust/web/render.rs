//! Server-side HTML rendering. Every dynamic string goes through [`escape_html`].

use std::fmt::Write;

use crate::classifier::{ClassificationResult, Label};
use crate::knowledge::{CategoryInfo, LinkKind};
use crate::model_slot::ModelStatus;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; min-height: 100vh; color: #222; }
main { flex: 1; padding: 2rem; }
aside { width: 22rem; background: #f4f6f4; padding: 1.5rem; border-left: 1px solid #dde; }
.notice { padding: .75rem 1rem; border-radius: 4px; margin: .5rem 0; }
.success { background: #e3f5e6; } .info { background: #e4eefa; }
.warning { background: #fdf3d8; } .error { background: #fbe1e1; }
.scores td { padding: .1rem .75rem .1rem 0; }
img.upload { max-width: 300px; border: 1px solid #ccc; }
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    fn css_class(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }
}

/// A classified upload ready for display.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub file_name: String,
    pub image_data_uri: String,
    pub result: ClassificationResult,
    pub info: &'static CategoryInfo,
}

pub struct PageView<'a> {
    pub status: ModelStatus,
    pub notices: Vec<Notice>,
    pub outcome: Option<&'a UploadOutcome>,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(title: &str, main: &str, aside: Option<&str>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head>\n<body>\n<main>\n{}\n</main>\n",
        escape_html(title),
        STYLE,
        main
    );
    if let Some(aside) = aside {
        let _ = write!(html, "<aside>\n{}\n</aside>\n", aside);
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn render_notice(html: &mut String, notice: &Notice) {
    let _ = writeln!(
        html,
        "<div class=\"notice {}\">{}</div>",
        notice.level.css_class(),
        escape_html(&notice.message)
    );
}

fn render_model_status(html: &mut String, status: ModelStatus) {
    match status {
        ModelStatus::Loaded => {
            render_notice(html, &Notice::new(NoticeLevel::Success, "Model is loaded and ready."));
        }
        ModelStatus::Downloaded => {
            render_notice(html, &Notice::new(NoticeLevel::Info, "Model is downloaded but not loaded yet."));
            html.push_str("<form method=\"post\" action=\"/model/download\"><button type=\"submit\">Load model</button></form>\n");
        }
        ModelStatus::Missing => {
            render_notice(html, &Notice::new(NoticeLevel::Warning, "Model not downloaded yet."));
            html.push_str("<form method=\"post\" action=\"/model/download\"><button type=\"submit\">Download model</button></form>\n");
        }
    }
}

/// Tips are written as "Heading: detail"; the heading is emphasised.
fn render_tip(tip: &str) -> String {
    match tip.split_once(": ") {
        Some((heading, detail)) => format!("<strong>{}:</strong> {}", escape_html(heading), escape_html(detail)),
        None => escape_html(tip),
    }
}

/// Description, examples, disposal tips and links for one category.
pub fn render_sidebar(label: Label, info: &CategoryInfo) -> String {
    let mut html = String::new();
    html.push_str("<h2>Waste Information</h2>\n");
    let _ = writeln!(html, "<h3>{}</h3>\n<p>{}</p>", escape_html(label.as_str()), escape_html(&info.description));

    html.push_str("<h3>Example Items</h3>\n<ul>\n");
    for item in &info.example_items {
        let _ = writeln!(html, "<li>{}</li>", escape_html(item));
    }
    html.push_str("</ul>\n<h3>Proper Disposal Tips</h3>\n<ul>\n");
    for tip in &info.disposal_tips {
        let _ = writeln!(html, "<li>{}</li>", render_tip(tip));
    }
    html.push_str("</ul>\n<h3>Learn More</h3>\n<ul>\n");
    for link in &info.reference_links {
        let kind = match link.kind {
            LinkKind::Video => "Video",
            LinkKind::Article => "Article",
        };
        let _ = writeln!(
            html,
            "<li>{}: <a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></li>",
            kind,
            escape_html(&link.url),
            escape_html(&link.title)
        );
    }
    html.push_str("</ul>\n");
    html
}

fn render_outcome(html: &mut String, outcome: &UploadOutcome) {
    let result = &outcome.result;
    let _ = writeln!(
        html,
        "<h2>Result</h2>\n<img class=\"upload\" src=\"{}\" alt=\"{}\">",
        outcome.image_data_uri,
        escape_html(&outcome.file_name)
    );
    render_notice(
        html,
        &Notice::new(
            NoticeLevel::Success,
            format!(
                "Predicted Waste Class: {} with {:.2}% confidence",
                result.label,
                result.rounded_confidence()
            ),
        ),
    );
    html.push_str("<table class=\"scores\">\n");
    for (label, score) in &result.scores {
        let _ = writeln!(html, "<tr><td>{}</td><td>{:.2}%</td></tr>", escape_html(label.as_str()), score * 100.0);
    }
    html.push_str("</table>\n");
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut main = String::new();
    main.push_str("<h1>Waste Sorting Classifier</h1>\n");
    render_model_status(&mut main, view.status);
    for notice in &view.notices {
        render_notice(&mut main, notice);
    }

    main.push_str(concat!(
        "<p>Upload an image of waste and the model will sort it.</p>\n",
        "<form method=\"post\" action=\"/classify\" enctype=\"multipart/form-data\">\n",
        "<input type=\"file\" name=\"image\" accept=\".jpg,.jpeg,.png\" required>\n",
        "<button type=\"submit\">Classify</button>\n",
        "</form>\n"
    ));

    let aside = view.outcome.map(|outcome| {
        render_outcome(&mut main, outcome);
        render_sidebar(outcome.result.label, outcome.info)
    });

    document("Waste Classification", &main, aside.as_deref())
}

pub fn render_category_page(label: Label, info: &CategoryInfo) -> String {
    let main = format!(
        "<h1>{}</h1>\n<p><a href=\"/\">Back to the classifier</a></p>\n",
        escape_html(label.as_str())
    );
    document(label.as_str(), &main, Some(&render_sidebar(label, info)))
}

pub fn render_not_found(what: &str) -> String {
    let main = format!(
        "<h1>Not found</h1>\n<div class=\"notice error\">{}</div>\n<p><a href=\"/\">Back to the classifier</a></p>\n",
        escape_html(what)
    );
    document("Not found", &main, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_tip_heading_is_emphasised() {
        assert_eq!(render_tip("Reuse: Clean jars"), "<strong>Reuse:</strong> Clean jars");
        assert_eq!(render_tip("No heading"), "No heading");
    }

    #[test]
    fn test_missing_model_offers_download() {
        let html = render_page(&PageView { status: ModelStatus::Missing, notices: vec![], outcome: None });
        assert!(html.contains("Model not downloaded yet."));
        assert!(html.contains("action=\"/model/download\""));
        assert!(!html.contains("<aside>"));
    }

    #[test]
    fn test_sidebar_lists_every_section() {
        let info = KnowledgeBase::builtin().lookup(Label::Glass);
        let html = render_sidebar(Label::Glass, info);
        assert!(html.contains("Example Items"));
        assert!(html.contains("Proper Disposal Tips"));
        assert!(html.contains("https://www.nrdc.org/stories/glass-recycling-explained"));
        assert!(html.to_lowercase().contains("recycl"));
    }
}
