//! XML parser for sitemap documents
//!
//! This module parses the two document shapes of the sitemap protocol:
//! - a sitemap index: root `<sitemapindex>` with `<sitemap><loc>` children
//! - a leaf sitemap: root `<urlset>` with `<url><loc>` children plus
//!   optional `<lastmod>`, `<changefreq>` and `<priority>` metadata
//!
//! Real-world sitemaps are inconsistent about the protocol namespace, so tag
//! matching accepts both the standard namespace and bare, un-namespaced tags.
//! Field values are passed through verbatim; changefreq and priority are
//! never validated or parsed to numbers.

use crate::ParseError;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// The standard sitemap protocol namespace
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One `<sitemap>` entry from a sitemap index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexEntry {
    /// Location of the referenced sitemap document
    pub loc: Option<String>,

    /// Last modification date of the referenced sitemap (opaque text)
    pub lastmod: Option<String>,
}

/// One `<url>` entry from a leaf sitemap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlEntry {
    /// Page URL; required by the protocol, but real documents omit it
    pub loc: Option<String>,

    /// Last modification date (opaque text, not parsed)
    pub lastmod: Option<String>,

    /// Expected change cadence (passed through verbatim)
    pub changefreq: Option<String>,

    /// Relative crawl priority (passed through verbatim)
    pub priority: Option<String>,
}

/// A parsed sitemap document, classified by its root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// A `<sitemapindex>` document referencing other sitemaps
    Index(Vec<IndexEntry>),

    /// A `<urlset>` document listing page URLs
    UrlSet(Vec<UrlEntry>),
}

/// Returns true when a resolved element name matches a sitemap protocol tag
///
/// Matches the tag either under the standard sitemap namespace or under no
/// namespace at all; tags bound to any other namespace never match.
///
/// # Arguments
///
/// * `ns` - The namespace resolution for the element
/// * `local` - The element's local name
/// * `tag` - The bare protocol tag to match against (e.g. `b"loc"`)
pub fn is_sitemap_tag(ns: &ResolveResult, local: &[u8], tag: &[u8]) -> bool {
    if local != tag {
        return false;
    }
    match ns {
        ResolveResult::Bound(Namespace(uri)) => *uri == SITEMAP_NS.as_bytes(),
        ResolveResult::Unbound => true,
        ResolveResult::Unknown(_) => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootKind {
    Index,
    UrlSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    LastMod,
    ChangeFreq,
    Priority,
}

/// Parses one sitemap document and classifies it by root element
///
/// # Arguments
///
/// * `body` - The raw XML text
///
/// # Returns
///
/// * `Ok(SitemapDocument::Index)` - Root was `<sitemapindex>`
/// * `Ok(SitemapDocument::UrlSet)` - Root was `<urlset>`
/// * `Err(ParseError)` - Malformed XML, unrecognized root, or empty input
pub fn parse_sitemap_document(body: &str) -> Result<SitemapDocument, ParseError> {
    let mut reader = NsReader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut root: Option<RootKind> = None;
    let mut index_entries: Vec<IndexEntry> = Vec::new();
    let mut url_entries: Vec<UrlEntry> = Vec::new();
    let mut current: Option<UrlEntry> = None;
    let mut field: Option<Field> = None;
    // Open-element depth; the entry's depth pins field capture to its
    // direct children, and a non-zero depth at EOF means a truncated
    // document
    let mut depth: usize = 0;
    let mut entry_depth: usize = 0;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                depth += 1;
                let name = e.local_name();
                let local = name.as_ref();
                match root {
                    None => root = Some(classify_root(&ns, local)?),
                    Some(kind) => {
                        if current.is_none() {
                            if is_sitemap_tag(&ns, local, entry_tag(kind)) {
                                current = Some(UrlEntry::default());
                                entry_depth = depth;
                            }
                        } else if field.is_none() && depth == entry_depth + 1 {
                            field = classify_field(kind, &ns, local);
                        }
                    }
                }
            }
            (ns, Event::Empty(e)) => {
                let name = e.local_name();
                let local = name.as_ref();
                match root {
                    None => root = Some(classify_root(&ns, local)?),
                    Some(kind) => {
                        // A self-closing entry has no <loc> at all
                        if current.is_none() && is_sitemap_tag(&ns, local, entry_tag(kind)) {
                            push_entry(
                                kind,
                                UrlEntry::default(),
                                &mut index_entries,
                                &mut url_entries,
                            );
                        }
                    }
                }
            }
            (_, Event::Text(t)) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    append_field(entry, f, &t.unescape()?);
                }
            }
            (_, Event::CData(t)) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    append_field(entry, f, &String::from_utf8_lossy(&t.into_inner()));
                }
            }
            (ns, Event::End(e)) => {
                let name = e.local_name();
                let local = name.as_ref();
                if field.is_some() && depth == entry_depth + 1 {
                    field = None;
                } else if let (Some(kind), Some(_)) = (root, current.as_ref()) {
                    if depth == entry_depth && is_sitemap_tag(&ns, local, entry_tag(kind)) {
                        let entry = current.take().unwrap_or_default();
                        push_entry(kind, entry, &mut index_entries, &mut url_entries);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            (_, Event::Eof) => {
                if depth > 0 {
                    return Err(ParseError::UnexpectedEof);
                }
                break;
            }
            _ => {}
        }
    }

    match root {
        Some(RootKind::Index) => Ok(SitemapDocument::Index(index_entries)),
        Some(RootKind::UrlSet) => Ok(SitemapDocument::UrlSet(url_entries)),
        None => Err(ParseError::Empty),
    }
}

/// Classifies the root element or rejects the document
fn classify_root(ns: &ResolveResult, local: &[u8]) -> Result<RootKind, ParseError> {
    if is_sitemap_tag(ns, local, b"sitemapindex") {
        Ok(RootKind::Index)
    } else if is_sitemap_tag(ns, local, b"urlset") {
        Ok(RootKind::UrlSet)
    } else {
        Err(ParseError::UnrecognizedRoot(
            String::from_utf8_lossy(local).into_owned(),
        ))
    }
}

/// The per-entry container tag for each document shape
fn entry_tag(kind: RootKind) -> &'static [u8] {
    match kind {
        RootKind::Index => b"sitemap",
        RootKind::UrlSet => b"url",
    }
}

/// Maps a child tag inside an entry to the field it fills, if any
fn classify_field(kind: RootKind, ns: &ResolveResult, local: &[u8]) -> Option<Field> {
    if is_sitemap_tag(ns, local, b"loc") {
        return Some(Field::Loc);
    }
    if is_sitemap_tag(ns, local, b"lastmod") {
        return Some(Field::LastMod);
    }
    if kind == RootKind::UrlSet {
        if is_sitemap_tag(ns, local, b"changefreq") {
            return Some(Field::ChangeFreq);
        }
        if is_sitemap_tag(ns, local, b"priority") {
            return Some(Field::Priority);
        }
    }
    None
}

/// Appends text to the field currently being captured
fn append_field(entry: &mut UrlEntry, field: Field, text: &str) {
    let slot = match field {
        Field::Loc => &mut entry.loc,
        Field::LastMod => &mut entry.lastmod,
        Field::ChangeFreq => &mut entry.changefreq,
        Field::Priority => &mut entry.priority,
    };
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_string()),
    }
}

/// Finalizes a completed entry into the right output list
fn push_entry(
    kind: RootKind,
    entry: UrlEntry,
    index_entries: &mut Vec<IndexEntry>,
    url_entries: &mut Vec<UrlEntry>,
) {
    match kind {
        RootKind::Index => index_entries.push(IndexEntry {
            loc: normalize(entry.loc),
            lastmod: normalize(entry.lastmod),
        }),
        RootKind::UrlSet => url_entries.push(UrlEntry {
            loc: normalize(entry.loc),
            lastmod: normalize(entry.lastmod),
            changefreq: normalize(entry.changefreq),
            priority: normalize(entry.priority),
        }),
    }
}

/// Trims a captured value and drops it entirely when empty
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACED_URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>http://example.com/p1</loc>
    <lastmod>2024-01-01</lastmod>
    <changefreq>daily</changefreq>
    <priority>0.8</priority>
  </url>
  <url>
    <loc>http://example.com/p2</loc>
  </url>
</urlset>"#;

    const BARE_URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset>
  <url>
    <loc>http://example.com/p1</loc>
    <lastmod>2024-01-01</lastmod>
    <changefreq>daily</changefreq>
    <priority>0.8</priority>
  </url>
  <url>
    <loc>http://example.com/p2</loc>
  </url>
</urlset>"#;

    #[test]
    fn test_parse_namespaced_urlset() {
        let doc = parse_sitemap_document(NAMESPACED_URLSET).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc.as_deref(), Some("http://example.com/p1"));
        assert_eq!(entries[0].lastmod.as_deref(), Some("2024-01-01"));
        assert_eq!(entries[0].changefreq.as_deref(), Some("daily"));
        assert_eq!(entries[0].priority.as_deref(), Some("0.8"));
        assert_eq!(entries[1].loc.as_deref(), Some("http://example.com/p2"));
        assert_eq!(entries[1].lastmod, None);
        assert_eq!(entries[1].changefreq, None);
        assert_eq!(entries[1].priority, None);
    }

    #[test]
    fn test_namespaced_and_bare_documents_parse_identically() {
        let namespaced = parse_sitemap_document(NAMESPACED_URLSET).unwrap();
        let bare = parse_sitemap_document(BARE_URLSET).unwrap();
        assert_eq!(namespaced, bare);
    }

    #[test]
    fn test_parse_sitemap_index() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap>
    <loc>https://example.com/a.xml</loc>
    <lastmod>2024-02-02</lastmod>
  </sitemap>
  <sitemap>
    <loc>https://example.com/b.xml</loc>
  </sitemap>
</sitemapindex>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::Index(entries) = doc else {
            panic!("expected index");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc.as_deref(), Some("https://example.com/a.xml"));
        assert_eq!(entries[0].lastmod.as_deref(), Some("2024-02-02"));
        assert_eq!(entries[1].loc.as_deref(), Some("https://example.com/b.xml"));
    }

    #[test]
    fn test_url_entry_without_loc_is_kept_with_none() {
        let body = r#"<urlset>
  <url>
    <lastmod>2024-01-01</lastmod>
  </url>
  <url>
    <loc>http://example.com/ok</loc>
  </url>
</urlset>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc, None);
        assert_eq!(entries[0].lastmod.as_deref(), Some("2024-01-01"));
        assert_eq!(entries[1].loc.as_deref(), Some("http://example.com/ok"));
    }

    #[test]
    fn test_empty_loc_treated_as_missing() {
        let body = r#"<urlset><url><loc>   </loc></url></urlset>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].loc, None);
    }

    #[test]
    fn test_cdata_loc() {
        let body = r#"<urlset><url><loc><![CDATA[http://example.com/a?x=1&y=2]]></loc></url></urlset>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(
            entries[0].loc.as_deref(),
            Some("http://example.com/a?x=1&y=2")
        );
    }

    #[test]
    fn test_escaped_entities_in_loc() {
        let body = r#"<urlset><url><loc>http://example.com/a?x=1&amp;y=2</loc></url></urlset>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(
            entries[0].loc.as_deref(),
            Some("http://example.com/a?x=1&y=2")
        );
    }

    #[test]
    fn test_self_closing_url_entry() {
        let body = r#"<urlset><url/><url><loc>http://example.com/ok</loc></url></urlset>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc, None);
        assert_eq!(entries[1].loc.as_deref(), Some("http://example.com/ok"));
    }

    #[test]
    fn test_unknown_child_tags_ignored() {
        let body = r#"<urlset>
  <url>
    <loc>http://example.com/p1</loc>
    <image>http://example.com/p1.png</image>
  </url>
</urlset>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].loc.as_deref(), Some("http://example.com/p1"));
    }

    #[test]
    fn test_loc_inside_unknown_container_is_not_captured() {
        // Only direct children of <url> fill fields, matching how the
        // protocol nests extension elements like images
        let body = r#"<urlset>
  <url>
    <wrapper><loc>http://example.com/wrong</loc></wrapper>
    <loc>http://example.com/right</loc>
  </url>
</urlset>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].loc.as_deref(), Some("http://example.com/right"));
    }

    #[test]
    fn test_lastmod_inside_nested_sitemap_entry_container() {
        let body = r#"<sitemapindex>
  <sitemap>
    <loc>https://example.com/a.xml</loc>
    <extra><lastmod>2020-01-01</lastmod></extra>
  </sitemap>
</sitemapindex>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::Index(entries) = doc else {
            panic!("expected index");
        };
        assert_eq!(entries[0].loc.as_deref(), Some("https://example.com/a.xml"));
        assert_eq!(entries[0].lastmod, None);
    }

    #[test]
    fn test_unrecognized_root() {
        let result = parse_sitemap_document("<html><body>not a sitemap</body></html>");
        assert!(matches!(result, Err(ParseError::UnrecognizedRoot(root)) if root == "html"));
    }

    #[test]
    fn test_truncated_document_is_rejected() {
        // quick-xml does not flag missing end tags at EOF on its own, so
        // the parser has to notice the still-open elements itself
        let result = parse_sitemap_document("<urlset><url><loc>broken");
        assert!(matches!(result, Err(ParseError::UnexpectedEof)));
    }

    #[test]
    fn test_truncated_document_without_entries_is_rejected() {
        let result = parse_sitemap_document("<urlset>");
        assert!(matches!(result, Err(ParseError::UnexpectedEof)));
    }

    #[test]
    fn test_mismatched_end_tag_is_rejected() {
        let result = parse_sitemap_document("<urlset><url></urlset>");
        assert!(matches!(result, Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_empty_document() {
        let result = parse_sitemap_document("");
        assert!(matches!(result, Err(ParseError::Empty)));
    }

    #[test]
    fn test_empty_urlset() {
        let doc = parse_sitemap_document("<urlset></urlset>").unwrap();
        assert_eq!(doc, SitemapDocument::UrlSet(vec![]));
    }

    #[test]
    fn test_foreign_namespace_tags_do_not_match() {
        // loc bound to a non-sitemap namespace must not fill the field
        let body = r#"<urlset xmlns:x="http://example.com/other">
  <url>
    <x:loc>http://example.com/wrong</x:loc>
    <loc>http://example.com/right</loc>
  </url>
</urlset>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(entries[0].loc.as_deref(), Some("http://example.com/right"));
    }

    #[test]
    fn test_changefreq_and_priority_pass_through_verbatim() {
        // Out-of-range or misspelled values are not the parser's problem
        let body = r#"<urlset><url>
  <loc>http://example.com/p</loc>
  <changefreq>sometimes</changefreq>
  <priority>7.5</priority>
</url></urlset>"#;
        let doc = parse_sitemap_document(body).unwrap();
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(entries[0].changefreq.as_deref(), Some("sometimes"));
        assert_eq!(entries[0].priority.as_deref(), Some("7.5"));
    }
}
