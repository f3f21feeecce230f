//! Renders assistant replies, which the model writes in markdown.

use pulldown_cmark::{html, Event, Options, Parser};

/// Converts markdown to HTML. Raw HTML in the source is emitted as escaped
/// text, so the output is safe to insert into the page unescaped.
pub fn render(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
