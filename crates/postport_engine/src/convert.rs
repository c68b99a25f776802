use postport_core::MarkupConverter;

/// Best-effort HTML to Markdown via `html2md`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl MarkupConverter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> String {
        html2md::parse_html(html)
    }
}
