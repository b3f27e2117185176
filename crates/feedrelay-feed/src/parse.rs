//! Tolerant RSS 2.0 / Atom entry extraction.
//!
//! Walks the document with a quick-xml event reader and collects raw entries.
//! Malformed XML never fails the whole feed: parsing stops at the first
//! reader error and returns the entries completed so far.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::types::RawEntry;

/// Element names treated as date-like fields, kept raw for the resolver.
const DATE_ELEMENTS: &[&str] = &[
    "pubDate",
    "published",
    "updated",
    "created",
    "modified",
    "date",
    "dc:date",
];

/// Body-markup elements in order of preference when building `description`.
const BODY_ELEMENTS: &[&str] = &["description", "summary", "content:encoded", "content"];

#[derive(Default)]
struct EntryBuffers {
    title: String,
    bodies: Vec<(String, String)>,
    link_text: String,
    link: Option<String>,
    links: Vec<String>,
    date_fields: Vec<(String, String)>,
}

impl EntryBuffers {
    fn body_mut(&mut self, name: &str) -> &mut String {
        let idx = match self.bodies.iter().position(|(n, _)| n == name) {
            Some(i) => i,
            None => {
                self.bodies.push((name.to_string(), String::new()));
                self.bodies.len() - 1
            }
        };
        &mut self.bodies[idx].1
    }

    fn into_entry(mut self) -> RawEntry {
        if self.link.is_none() && !self.link_text.is_empty() {
            self.link = Some(self.link_text.trim().to_string());
        }
        if let Some(url) = &self.link {
            // Main link leads the ordered list; enclosures/media follow.
            self.links.insert(0, url.clone());
        }

        let description = BODY_ELEMENTS.iter().find_map(|name| {
            self.bodies
                .iter()
                .find(|(n, v)| n == name && !v.trim().is_empty())
                .map(|(_, v)| v.trim().to_string())
        });

        RawEntry {
            title: non_empty(self.title),
            description,
            link: self.link,
            links: self.links,
            date_fields: self.date_fields,
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
        .filter(|v| !v.trim().is_empty())
}

/// Parse a feed document into raw entries, best effort.
///
/// Handles both RSS `<item>` and Atom `<entry>` elements. A reader error mid
/// document logs a warning and returns whatever entries were complete.
#[must_use]
pub fn parse_feed(xml: &str) -> Vec<RawEntry> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut buffers: Option<EntryBuffers> = None;
    let mut current_tag = String::new();
    // While set, text accumulates into this body buffer and nested markup
    // events inside it are ignored rather than clobbering `current_tag`.
    let mut body_field: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "item" | "entry" => {
                        buffers = Some(EntryBuffers::default());
                        current_tag.clear();
                        body_field = None;
                    }
                    _ => {
                        if let Some(bufs) = buffers.as_mut() {
                            if body_field.is_some() {
                                // Nested markup inside a body element; skip.
                            } else if BODY_ELEMENTS.contains(&name.as_str()) {
                                body_field = Some(name);
                            } else if name == "link" {
                                if let Some(href) = attribute(&e, "href") {
                                    push_link(bufs, &e, href);
                                } else {
                                    current_tag = name;
                                }
                            } else {
                                current_tag = name;
                            }
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(bufs) = buffers.as_mut() {
                    if body_field.is_none() {
                        match name.as_str() {
                            "link" => {
                                if let Some(href) = attribute(&e, "href") {
                                    push_link(bufs, &e, href);
                                }
                            }
                            "enclosure" | "media:content" | "media:thumbnail" => {
                                if let Some(url) = attribute(&e, "url") {
                                    bufs.links.push(url);
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "item" | "entry" => {
                        if let Some(bufs) = buffers.take() {
                            entries.push(bufs.into_entry());
                        }
                        current_tag.clear();
                        body_field = None;
                    }
                    _ => {
                        if body_field.as_deref() == Some(name.as_str()) {
                            body_field = None;
                        }
                        if current_tag == name {
                            current_tag.clear();
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(bufs) = buffers.as_mut() {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    record_text(bufs, &current_tag, body_field.as_deref(), &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(bufs) = buffers.as_mut() {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    record_text(bufs, &current_tag, body_field.as_deref(), &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(error = %e, "malformed feed XML — keeping entries parsed so far");
                break;
            }
            _ => {}
        }
    }

    entries
}

fn push_link(bufs: &mut EntryBuffers, e: &BytesStart<'_>, href: String) {
    let rel = attribute(e, "rel");
    let is_alternate = rel.as_deref().is_none_or(|r| r == "alternate");
    if bufs.link.is_none() && is_alternate {
        bufs.link = Some(href);
    } else {
        bufs.links.push(href);
    }
}

fn record_text(bufs: &mut EntryBuffers, current_tag: &str, body_field: Option<&str>, text: &str) {
    if let Some(field) = body_field {
        bufs.body_mut(field).push_str(text);
        return;
    }
    match current_tag {
        "title" => bufs.title.push_str(text),
        "link" => bufs.link_text.push_str(text),
        tag if DATE_ELEMENTS.contains(&tag) => {
            if bufs.date_fields.iter().all(|(n, _)| n != tag) {
                bufs.date_fields.push((tag.to_string(), text.to_string()));
            }
        }
        _ => {}
    }
}
