use scraper::ElementRef;

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Canonical form used for keyword matching and title comparison.
///
/// Every character outside alphanumerics and whitespace becomes a space, so
/// `"Backdoor-Attack!"` and `"backdoor attack"` compare equal.
pub fn normalize_title(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    normalize_ws(&mapped).to_lowercase()
}

/// Plain single-line text of an element, entities decoded.
pub fn element_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

/// Make `name` safe to use as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    const MAX_BYTES: usize = 200;
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .filter(|c| !c.is_control())
        .collect();
    let mut out = normalize_ws(&cleaned);
    if out.len() > MAX_BYTES {
        let mut cut = MAX_BYTES;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out = out.trim_end().to_string();
    }
    let out = out.trim_matches('.').to_string();
    if out.is_empty() { "untitled".to_string() } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn html_text(s: &str) -> String {
        element_text(Html::parse_fragment(s).root_element())
    }

    #[test]
    fn normalize_title_ignores_case_and_punctuation() {
        assert_eq!(normalize_title("Backdoor-Attack!"), "backdoor attack");
        assert_eq!(
            normalize_title("  BadNets:\n Identifying   Vulnerabilities "),
            "badnets identifying vulnerabilities"
        );
    }

    #[test]
    fn html_text_decodes_named_and_numeric_entities() {
        assert_eq!(html_text("S&amp;P &#38; &#x26;"), "S&P & &");
        assert_eq!(
            html_text("Jos&eacute; M&uuml;ller &hellip; Attacks"),
            "José Müller … Attacks"
        );
        assert_eq!(
            html_text("&ldquo;Clean&rdquo;&nbsp;Labels &ndash; Poisoning"),
            "\u{201c}Clean\u{201d} Labels – Poisoning"
        );
    }

    #[test]
    fn html_text_strips_markup() {
        assert_eq!(
            html_text("<span class=\"title\">Trojaning <i>Attack</i> on\n Neural Networks.</span>"),
            "Trojaning Attack on Neural Networks."
        );
    }

    #[test]
    fn sanitize_filename_removes_separators() {
        assert_eq!(sanitize_filename("A/B: C? <D>"), "AB C D");
        assert_eq!(sanitize_filename("..."), "untitled");
        let long = "x".repeat(500);
        assert_eq!(sanitize_filename(&long).len(), 200);
    }
}
