//! Terminal rendering of conversation messages
//!
//! Model replies are markdown. They are flattened to plain text suitable for
//! a terminal: markers disappear, lists get bullets or numbers, link targets
//! follow their label in parentheses.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use crate::message::{ChatMessage, Role};

/// Number of sources shown under a reply
pub const MAX_SOURCES_SHOWN: usize = 3;

/// Flatten markdown to plain text
#[must_use]
pub fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::new();
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut links: Vec<String> = Vec::new();
    let mut in_code_block = false;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::List(start)) => {
                ensure_line_start(&mut out);
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                ensure_line_start(&mut out);
                let depth = lists.len().saturating_sub(1);
                out.push_str(&"  ".repeat(depth));
                match lists.last_mut() {
                    Some(Some(n)) => {
                        out.push_str(&format!("{n}. "));
                        *n += 1;
                    }
                    _ => out.push_str("• "),
                }
            }
            Event::End(TagEnd::Item) => ensure_line_start(&mut out),
            Event::End(TagEnd::Paragraph) => {
                if lists.is_empty() {
                    out.push_str("\n\n");
                } else {
                    ensure_line_start(&mut out);
                }
            }
            Event::End(TagEnd::Heading(_)) => out.push_str("\n\n"),
            Event::Start(Tag::CodeBlock(kind)) => {
                ensure_line_start(&mut out);
                in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind
                    && !lang.is_empty()
                {
                    tracing::trace!(lang = %lang, "rendering code block");
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                out.push('\n');
            }
            Event::Start(Tag::Link { dest_url, .. }) => links.push(dest_url.to_string()),
            Event::End(TagEnd::Link) => {
                if let Some(url) = links.pop() {
                    out.push_str(&format!(" ({url})"));
                }
            }
            Event::Text(text) if in_code_block => {
                for line in text.lines() {
                    out.push_str("    ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                ensure_line_start(&mut out);
                out.push_str("────────\n\n");
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn ensure_line_start(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Short label for a source URL: its host name, or the URL itself
#[must_use]
pub fn source_label(source: &str) -> String {
    url::Url::parse(source)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
        .unwrap_or_else(|| source.to_string())
}

/// Render a message for the terminal
#[must_use]
pub fn render_message(message: &ChatMessage) -> String {
    match message.role() {
        Role::User => format!("you › {}", message.text()),
        Role::Model => {
            let mut out = markdown_to_text(message.text());

            let sources: Vec<String> = message
                .sources()
                .iter()
                .take(MAX_SOURCES_SHOWN)
                .map(|s| source_label(s))
                .collect();
            if !sources.is_empty() {
                out.push_str("\n\nSources: ");
                out.push_str(&sources.join(", "));
            }

            if !message.suggestions().is_empty() {
                out.push('\n');
                for (i, suggestion) in message.suggestions().iter().enumerate() {
                    out.push_str(&format!("\n  [{}] {suggestion}", i + 1));
                }
            }

            out
        }
    }
}
