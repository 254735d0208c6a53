use serde::Serialize;
use tracing::warn;

use crate::models::RecordId;

const LINK_TAG: &str = "856";

/// Link-type labels marking an 856 field as pointing at the document itself.
const DOCUMENT_LINK_LABELS: &[&str] = &[
    "Linkki verkkoaineistoon",
    "Yhteenveto-osa",
    "Digitoitu julkaisu",
];

/// Electronic location of a catalogued document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogueLink {
    pub id: RecordId,
    pub url: String,
}

/// Splits a catalogue line into `(code, value)` pairs at each `$$` marker.
/// Text before the first marker is not a subfield and is dropped.
pub fn split_subfields(line: &str) -> Vec<(char, &str)> {
    line.split("$$")
        .skip(1)
        .filter_map(|chunk| {
            let mut chars = chunk.chars();
            let code = chars.next()?;
            Some((code, chars.as_str()))
        })
        .collect()
}

/// Value of the last subfield with `code`, the way a keyed lookup sees it.
pub fn subfield<'a>(subfields: &[(char, &'a str)], code: char) -> Option<&'a str> {
    subfields
        .iter()
        .rev()
        .find(|(c, _)| *c == code)
        .map(|(_, value)| *value)
}

/// Document link of one catalogue line, if it carries one.
pub fn link_from_line(line: &str) -> Option<CatalogueLink> {
    let line = line.trim();
    let id = RecordId::parse(line.get(..9)?).ok()?;
    if line.get(10..13)? != LINK_TAG {
        return None;
    }
    if !DOCUMENT_LINK_LABELS.iter().any(|label| line.contains(label)) {
        return None;
    }

    let subfields = split_subfields(line);
    let url = subfield(&subfields, 'u')
        .and_then(|u| u.split_whitespace().next())
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"));
    let Some(url) = url else {
        warn!(%id, "document link without a usable URL, skipping");
        return None;
    };

    Some(CatalogueLink {
        id,
        url: url.to_string(),
    })
}

/// All document links in a catalogue export, in line order.
pub fn extract_links<'a, I>(lines: I) -> Vec<CatalogueLink>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().filter_map(link_from_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_subfields_in_order() {
        let parts = split_subfields("123456789 24510 L $$aMain$$bSub $$c");
        assert_eq!(parts, vec![('a', "Main"), ('b', "Sub "), ('c', "")]);
    }

    #[test]
    fn later_subfield_overrides_earlier() {
        let parts = split_subfields("x $$uone$$utwo");
        assert_eq!(subfield(&parts, 'u'), Some("two"));
        assert_eq!(subfield(&parts, 'z'), None);
    }

    #[test]
    fn extracts_labelled_http_links() {
        let line = "123456789 85641 L $$uhttps://example.org/handle/1 extra$$yLinkki verkkoaineistoon";
        let link = link_from_line(line).unwrap();
        assert_eq!(link.id.as_str(), "123456789");
        assert_eq!(link.url, "https://example.org/handle/1");
    }

    #[test]
    fn skips_unlabelled_or_non_http_links() {
        assert!(link_from_line("123456789 85641 L $$uhttps://example.org$$yKansikuva").is_none());
        assert!(
            link_from_line("123456789 85641 L $$uftp://example.org$$yDigitoitu julkaisu").is_none()
        );
        assert!(link_from_line("123456789 85641 L $$yDigitoitu julkaisu").is_none());
        assert!(
            link_from_line("123456789 24510 L $$ahttps://x$$yDigitoitu julkaisu").is_none()
        );
    }

    #[test]
    fn extracts_links_across_lines() {
        let export = "\
123456789 24510 L $$aTitle
123456789 85641 L $$uhttp://a.example/1$$zYhteenveto-osa
987654321 85640 L $$uhttps://b.example/2$$yDigitoitu julkaisu
";
        let links = extract_links(export.lines());
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].id.as_str(), "987654321");
    }
}
