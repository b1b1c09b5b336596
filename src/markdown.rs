use std::collections::HashMap;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use rocket::serde::{Deserialize, Serialize};

use crate::highlight::{Highlight, escape_html};

/// A markdown file together with its rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct RenderedDocument {
    pub path: String,
    pub html: String,
    pub raw: String,
}

fn markdown_options() -> Options {
    Options::empty()
        | Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

pub fn render_markdown(markdown: &str, highlighter: &impl Highlight) -> String {
    let mut events = highlight_code_blocks(Parser::new_ext(markdown, markdown_options()), highlighter);
    assign_heading_ids(&mut events);

    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, events.into_iter());
    rendered
}

/// Replaces every code block with pre-rendered, highlighted markup.
fn highlight_code_blocks<'a>(
    parser: impl Iterator<Item = Event<'a>>,
    highlighter: &impl Highlight,
) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut open_block: Option<(Option<String>, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => None,
                };
                open_block = Some((language, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, source)) = open_block.take() {
                    let markup = code_block_html(highlighter, language.as_deref(), &source);
                    events.push(Event::Html(markup.into()));
                }
            }
            Event::Text(text) if open_block.is_some() => {
                if let Some((_, source)) = open_block.as_mut() {
                    source.push_str(&text);
                }
            }
            event => events.push(event),
        }
    }

    events
}

/// The first word of a fence info string, if any.
fn fence_language(info: &str) -> Option<String> {
    info.split_whitespace().next().map(str::to_owned)
}

fn code_block_html(highlighter: &impl Highlight, language: Option<&str>, source: &str) -> String {
    let class = match language {
        Some(language) => format!("hljs language-{}", escape_html(language)),
        None => "hljs".to_owned(),
    };
    format!(
        "<pre><code class=\"{class}\">{}</code></pre>\n",
        highlighter.highlight(source, language)
    )
}

fn heading_slug(text: &str) -> String {
    let slug = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug
    }
}

/// Gives every heading without an explicit `{#id}` an anchor derived from its
/// text. Repeated anchors get a numeric suffix.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut taken: HashMap<String, usize> = HashMap::new();
    for event in events.iter() {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            taken.insert(id.to_string(), 0);
        }
    }

    let mut heading_start = None;
    let mut heading_text = String::new();
    for index in 0..events.len() {
        match &events[index] {
            Event::Start(Tag::Heading { id: None, .. }) => {
                heading_start = Some(index);
                heading_text.clear();
                continue;
            }
            Event::Text(text) | Event::Code(text) if heading_start.is_some() => {
                heading_text.push_str(text);
                continue;
            }
            Event::End(TagEnd::Heading(_)) => {}
            _ => continue,
        }

        let Some(start) = heading_start.take() else {
            continue;
        };
        let slug = unique_slug(&mut taken, heading_slug(&heading_text));
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
            *id = Some(slug.into());
        }
    }
}

fn unique_slug(taken: &mut HashMap<String, usize>, slug: String) -> String {
    let mut suffix = match taken.get(&slug) {
        Some(count) => *count,
        None => {
            taken.insert(slug.clone(), 0);
            return slug;
        }
    };

    loop {
        suffix += 1;
        let candidate = format!("{slug}-{suffix}");
        if !taken.contains_key(&candidate) {
            taken.insert(candidate.clone(), 0);
            taken.insert(slug, suffix);
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Verbatim;

    impl Highlight for Verbatim {
        fn highlight(&self, source: &str, language: Option<&str>) -> String {
            format!("[{}]{}", language.unwrap_or("auto"), escape_html(source))
        }
    }

    #[test]
    fn fenced_blocks_go_through_the_highlighter() {
        let html = render_markdown("```python title=x\nprint(1)\n```\n", &Verbatim);
        assert_eq!(
            html,
            "<pre><code class=\"hljs language-python\">[python]print(1)\n</code></pre>\n"
        );
    }

    #[test]
    fn unlabelled_blocks_are_auto_detected() {
        let html = render_markdown("```\na < b\n```\n\n    indented\n", &Verbatim);
        assert!(html.contains("<pre><code class=\"hljs\">[auto]a &lt; b\n</code></pre>"), "{html}");
        assert!(html.contains("<pre><code class=\"hljs\">[auto]indented\n</code></pre>"), "{html}");
    }

    #[test]
    fn headings_get_unique_anchors() {
        let html = render_markdown(
            "# Getting Started\n\n## Setup `cargo`\n\n## Setup `cargo`\n\n## Custom {#own}\n",
            &Verbatim,
        );
        assert!(html.contains("<h1 id=\"getting-started\">"), "{html}");
        assert!(html.contains("<h2 id=\"setup-cargo\">"), "{html}");
        assert!(html.contains("<h2 id=\"setup-cargo-1\">"), "{html}");
        assert!(html.contains("<h2 id=\"own\">"), "{html}");
    }

    #[test]
    fn punctuation_only_headings_still_get_an_anchor() {
        let html = render_markdown("# ???\n", &Verbatim);
        assert!(html.contains("<h1 id=\"section\">"), "{html}");
    }

    #[test]
    fn tables_and_task_lists_are_enabled() {
        let html = render_markdown("| a |\n|---|\n| 1 |\n\n- [x] done\n", &Verbatim);
        assert!(html.contains("<table>"), "{html}");
        assert!(html.contains("type=\"checkbox\""), "{html}");
    }
}
