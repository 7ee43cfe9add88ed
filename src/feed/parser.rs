use quick_xml::escape::{resolve_html5_entity, resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// SEC-003: Maximum element nesting accepted in a feed document.
const MAX_DEPTH: usize = 64;

/// Errors raised while reading the RSS document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Unclosed element <{0}> at end of document")]
    Unclosed(String),

    #[error("Feed nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    #[error("Feed is not valid UTF-8")]
    InvalidUtf8,
}

/// Fields of one `<item>` exactly as they appear in the document, before any
/// cleanup or fallback is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub dc_creator: Option<String>,
    pub creator: Option<String>,
    pub pub_date: Option<String>,
    /// Text of the first `<category>` only; attributes are ignored.
    pub category: Option<String>,
}

/// Which `<item>` child is currently collecting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    DcCreator,
    Creator,
    PubDate,
    Category,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" => Some(Self::Description),
            b"dc:creator" => Some(Self::DcCreator),
            b"creator" => Some(Self::Creator),
            b"pubDate" => Some(Self::PubDate),
            b"category" => Some(Self::Category),
            _ => None,
        }
    }

    fn slot<'a>(self, item: &'a mut RawItem) -> &'a mut Option<String> {
        match self {
            Self::Title => &mut item.title,
            Self::Link => &mut item.link,
            Self::Description => &mut item.description,
            Self::DcCreator => &mut item.dc_creator,
            Self::Creator => &mut item.creator,
            Self::PubDate => &mut item.pub_date,
            Self::Category => &mut item.category,
        }
    }
}

/// Resolves a named reference: the five XML builtins first, then the
/// HTML5 table (`&nbsp;`, `&hellip;`, `&eacute;`, ...).
///
/// SEC-002: quick-xml never expands `<!ENTITY>` declarations, so a document
/// cannot define names of its own; only these fixed tables are consulted.
fn resolve_entity(name: &str) -> Option<&'static str> {
    resolve_predefined_entity(name).or_else(|| resolve_html5_entity(name))
}

/// Longest reference body considered when scanning leniently.
const MAX_REFERENCE_LEN: usize = 32;

/// Decodes escaped feed text.
///
/// quick-xml rejects the whole node on the first unknown reference. In that
/// case the node is decoded one reference at a time and unknown references
/// are kept literally, so `Caf&eacute;` next to `&foo;` still decodes.
fn unescape_text(raw: &str) -> String {
    match unescape_with(raw, resolve_entity) {
        Ok(text) => text.into_owned(),
        Err(e) => {
            tracing::debug!(error = %e, "Unrecognized reference in feed text, decoding leniently");
            unescape_lenient(raw)
        }
    }
}

fn unescape_lenient(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let resolved = after
            .find(';')
            .filter(|end| *end <= MAX_REFERENCE_LEN)
            .and_then(|end| resolve_reference(&after[..end]).map(|r| (end, r)));

        match resolved {
            Some((end, replacement)) => {
                out.push_str(&replacement);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// A single reference body (without `&` and `;`), named or numeric.
fn resolve_reference(body: &str) -> Option<String> {
    if let Some(number) = body.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code)
            .filter(|c| *c != '\0')
            .map(String::from);
    }
    resolve_entity(body).map(str::to_string)
}

/// Reads every `rss/channel/item` from an RSS 2.0 document.
///
/// Documents without an `<rss>` root yield no items rather than an error.
/// Repeated children keep the first occurrence for `category` and the last
/// for everything else.
pub fn parse_items(bytes: &[u8]) -> Result<Vec<RawItem>, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut items = Vec::new();
    let mut current: Option<RawItem> = None;
    let mut field: Option<(Field, String)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                path.push(name);
                if path.len() > MAX_DEPTH {
                    return Err(ParseError::MaxDepthExceeded(MAX_DEPTH));
                }

                if is_item_path(&path) {
                    current = Some(RawItem::default());
                } else if current.is_some() && path.len() == 4 {
                    field = Field::from_name(&path[3]).map(|f| (f, String::new()));
                }
            }
            Ok(Event::Empty(e)) => {
                if current.is_some() && path.len() == 3 {
                    if let Some(item) = current.as_mut() {
                        record_empty(&e, item);
                    }
                } else if path.len() == 2 && is_channel_path(&path) && e.name().as_ref() == b"item"
                {
                    items.push(RawItem::default());
                }
            }
            Ok(Event::Text(e)) => {
                if let Some((_, text)) = field.as_mut() {
                    let raw = std::str::from_utf8(&e).map_err(|_| ParseError::InvalidUtf8)?;
                    text.push_str(&unescape_text(raw));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some((_, text)) = field.as_mut() {
                    text.push_str(std::str::from_utf8(&e).map_err(|_| ParseError::InvalidUtf8)?);
                }
            }
            Ok(Event::End(_)) => {
                if current.is_some() && path.len() == 4 {
                    if let (Some((f, text)), Some(item)) = (field.take(), current.as_mut()) {
                        store_field(item, f, text);
                    }
                } else if is_item_path(&path) {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = path.last() {
        return Err(ParseError::Unclosed(
            String::from_utf8_lossy(open).into_owned(),
        ));
    }

    Ok(items)
}

fn is_channel_path(path: &[Vec<u8>]) -> bool {
    path.len() >= 2 && path[0] == b"rss" && path[1] == b"channel"
}

fn is_item_path(path: &[Vec<u8>]) -> bool {
    path.len() == 3 && is_channel_path(path) && path[2] == b"item"
}

fn store_field(item: &mut RawItem, field: Field, text: String) {
    let slot = field.slot(item);
    if field == Field::Category && slot.is_some() {
        return;
    }
    *slot = Some(text);
}

/// Self-closing children such as `<category/>` count as present but empty.
fn record_empty(e: &BytesStart<'_>, item: &mut RawItem) {
    if let Some(field) = Field::from_name(e.name().as_ref()) {
        store_field(item, field, String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wrap(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/"><channel>
<title>RadioRadioX</title>
{items}
</channel></rss>"#
        )
    }

    #[test]
    fn test_reads_all_fields() {
        let xml = wrap(
            r#"<item>
                <title>Weekend Lineup</title>
                <link>https://radioradiox.com/weekend</link>
                <dc:creator><![CDATA[DJ Nova]]></dc:creator>
                <pubDate>Tue, 05 Mar 2024 18:30:00 +0000</pubDate>
                <category><![CDATA[Shows]]></category>
                <category><![CDATA[News]]></category>
                <description><![CDATA[<p>Big weekend [&#8230;]</p>]]></description>
            </item>"#,
        );

        let items = parse_items(xml.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title.as_deref(), Some("Weekend Lineup"));
        assert_eq!(item.link.as_deref(), Some("https://radioradiox.com/weekend"));
        assert_eq!(item.dc_creator.as_deref(), Some("DJ Nova"));
        assert_eq!(item.category.as_deref(), Some("Shows"));
        assert_eq!(
            item.description.as_deref(),
            Some("<p>Big weekend [&#8230;]</p>")
        );
    }

    #[test]
    fn test_escaped_markup_is_unescaped() {
        let xml = wrap(
            "<item><title>Hi &#8217;there&#8217;</title>\
             <description>&lt;p&gt;Hello&nbsp;[&#8230;]&lt;/p&gt;</description></item>",
        );
        let items = parse_items(xml.as_bytes()).unwrap();
        assert_eq!(items[0].title.as_deref(), Some("Hi ’there’"));
        assert_eq!(
            items[0].description.as_deref(),
            Some("<p>Hello\u{a0}[…]</p>")
        );
    }

    #[test]
    fn test_html_entities_decoded_alongside_markup() {
        let xml = wrap(
            "<item><title>Caf&eacute; &amp; Bar</title>\
             <description>&lt;p&gt;Live at the Caf&eacute; tonight&lt;/p&gt;</description></item>",
        );
        let items = parse_items(xml.as_bytes()).unwrap();
        assert_eq!(items[0].title.as_deref(), Some("Café & Bar"));
        assert_eq!(
            items[0].description.as_deref(),
            Some("<p>Live at the Café tonight</p>")
        );
    }

    #[test]
    fn test_unknown_reference_kept_literally() {
        let xml = wrap(
            "<item><description>&lt;b&gt;Caf&eacute;&lt;/b&gt; &amp; &bogus; &#8230; &#x2019;</description></item>",
        );
        let items = parse_items(xml.as_bytes()).unwrap();
        assert_eq!(
            items[0].description.as_deref(),
            Some("<b>Café</b> & &bogus; … ’")
        );
    }

    #[test]
    fn test_lenient_scan_handles_bare_ampersands() {
        assert_eq!(unescape_lenient("R&B &amp; soul &unknown"), "R&B & soul &unknown");
        assert_eq!(unescape_lenient("&#0; &#xZZ;"), "&#0; &#xZZ;");
    }

    #[test]
    fn test_category_attributes_ignored() {
        let xml = wrap(r#"<item><category domain="https://radioradiox.com/c">Events</category></item>"#);
        let items = parse_items(xml.as_bytes()).unwrap();
        assert_eq!(items[0].category.as_deref(), Some("Events"));
    }

    #[test]
    fn test_items_keep_document_order() {
        let xml = wrap("<item><title>one</title></item><item><title>two</title></item><item/>");
        let items = parse_items(xml.as_bytes()).unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.clone()).collect();
        assert_eq!(
            titles,
            vec![Some("one".to_string()), Some("two".to_string()), None]
        );
    }

    #[test]
    fn test_items_outside_channel_ignored() {
        let xml = "<rss><item><title>stray</title></item><channel></channel></rss>";
        assert!(parse_items(xml.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_non_rss_document_yields_nothing() {
        let xml = "<feed><entry><title>atom</title></entry></feed>";
        assert!(parse_items(xml.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        let xml = "<rss><channel><item><title>x</link></item></channel></rss>";
        assert!(matches!(
            parse_items(xml.as_bytes()),
            Err(ParseError::Xml(_))
        ));
    }

    #[test]
    fn test_truncated_document_rejected() {
        let xml = "<rss><channel><item><title>cut off";
        assert!(parse_items(xml.as_bytes()).is_err());
    }

    #[test]
    fn test_excessive_nesting_rejected() {
        let xml = format!("{}{}", "<a>".repeat(MAX_DEPTH + 1), "</a>".repeat(MAX_DEPTH + 1));
        assert!(matches!(
            parse_items(xml.as_bytes()),
            Err(ParseError::MaxDepthExceeded(_))
        ));
    }
}
