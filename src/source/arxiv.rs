use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use url::Url;

use crate::{
    http::{FetchError, Transport},
    source::{Hit, SearchBackend},
    text::normalize_ws,
};

const API_URL: &str = "https://export.arxiv.org/api/query";

/// arXiv export API, searched on the title field.
pub struct Arxiv {
    max_results: u32,
}

impl Arxiv {
    pub fn new(max_results: u32) -> Self {
        Arxiv {
            max_results: max_results.max(1),
        }
    }

    pub fn query_url(&self, title: &str) -> String {
        // The title field search chokes on quotes and colons inside the phrase.
        let phrase: String = title
            .chars()
            .map(|c| if c == '"' || c == ':' { ' ' } else { c })
            .collect();
        let mut url = Url::parse(API_URL).expect("static arXiv API URL");
        url.query_pairs_mut()
            .append_pair("search_query", &format!("ti:\"{}\"", normalize_ws(&phrase)))
            .append_pair("start", "0")
            .append_pair("max_results", &self.max_results.to_string());
        url.into()
    }
}

impl SearchBackend for Arxiv {
    fn search(&self, http: &dyn Transport, query: &str) -> Result<Vec<Hit>, FetchError> {
        let atom = http.get_text(&self.query_url(query), &[])?;
        match parse_feed(&atom) {
            Ok(hits) => Ok(hits),
            Err(e) => {
                tracing::debug!("unreadable arXiv feed: {e}");
                Ok(Vec::new())
            }
        }
    }
}

/// Pull `(title, pdf link)` out of every `<entry>` of an Atom feed.
pub fn parse_feed(xml: &str) -> anyhow::Result<Vec<Hit>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut hits = Vec::new();
    let mut in_entry = false;
    let mut in_title = false;
    let mut title = String::new();
    let mut pdf: Option<String> = None;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = e.name();
                if is_local(name.as_ref(), "entry") {
                    in_entry = true;
                    title.clear();
                    pdf = None;
                } else if in_entry && is_local(name.as_ref(), "title") {
                    in_title = true;
                } else if in_entry && is_local(name.as_ref(), "link") {
                    take_pdf_link(&e, &mut pdf);
                }
            }
            Ok(Event::Empty(e)) => {
                if in_entry && is_local(e.name().as_ref(), "link") {
                    take_pdf_link(&e, &mut pdf);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if is_local(name.as_ref(), "entry") {
                    in_entry = false;
                    hits.push(Hit::new(&normalize_ws(&title), pdf.as_deref()));
                } else if is_local(name.as_ref(), "title") {
                    in_title = false;
                }
            }
            Ok(Event::Text(t)) if in_title => {
                title.push_str(&String::from_utf8_lossy(t.as_ref()));
            }
            Ok(Event::CData(t)) if in_title => {
                title.push_str(&String::from_utf8_lossy(t.as_ref()));
            }
            Ok(Event::GeneralRef(r)) if in_title => {
                if let Ok(Some(c)) = r.resolve_char_ref() {
                    title.push(c);
                } else if let Some(s) =
                    quick_xml::escape::resolve_predefined_entity(&String::from_utf8_lossy(&r))
                {
                    title.push_str(s);
                }
            }
            Err(e) => return Err(anyhow::anyhow!("XML parse error: {e}")),
            _ => {}
        }
        buf.clear();
    }
    Ok(hits)
}

fn is_local(name: &[u8], target: &str) -> bool {
    // Compare local name ignoring namespace prefixes.
    if let Some(pos) = name.iter().rposition(|&b| b == b':') {
        &name[pos + 1..] == target.as_bytes()
    } else {
        name == target.as_bytes()
    }
}

fn get_attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| String::from_utf8_lossy(a.value.as_ref()).to_string())
}

fn take_pdf_link(e: &BytesStart<'_>, pdf: &mut Option<String>) {
    let is_pdf = get_attr_value(e, b"title").as_deref() == Some("pdf")
        || get_attr_value(e, b"type").as_deref() == Some("application/pdf");
    if is_pdf
        && pdf.is_none()
        && let Some(href) = get_attr_value(e, b"href")
    {
        *pdf = Some(href);
    }
}
