use percent_encoding::percent_decode_str;
use url::Url;

/// Where the current selection is published for sharing, the terminal
/// counterpart of the page's `#fragment`.
pub trait Location {
    /// Decoded fragment, `None` when absent or empty.
    fn fragment(&self) -> Option<String>;
    fn set_fragment(&mut self, value: &str);
}

#[derive(Debug, Clone)]
pub struct ShareLink {
    url: Url,
}

impl ShareLink {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Same link on a sub-page, e.g. `teachers`, without the fragment.
    pub fn page(&self, path: &str) -> Self {
        let mut url = self.url.clone();
        url.set_fragment(None);
        if let Ok(joined) = url.join(path) {
            url = joined;
        }
        Self { url }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl Location for ShareLink {
    fn fragment(&self) -> Option<String> {
        let raw = self.url.fragment()?;
        let decoded = percent_decode_str(raw).decode_utf8_lossy().into_owned();
        (!decoded.is_empty()).then_some(decoded)
    }

    fn set_fragment(&mut self, value: &str) {
        self.url.set_fragment(Some(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(s: &str) -> ShareLink {
        ShareLink::new(Url::parse(s).unwrap())
    }

    #[test]
    fn fragment_is_encoded_and_decoded() {
        let mut l = link("https://ystuty.ru/");
        l.set_fragment("ЭИС-46,ЭИС-47 Б");
        assert!(l.as_str().starts_with("https://ystuty.ru/#%D0%AD"));
        assert!(!l.as_str().contains(' '));
        assert_eq!(l.fragment().as_deref(), Some("ЭИС-46,ЭИС-47 Б"));
    }

    #[test]
    fn empty_fragment_reads_as_none() {
        assert_eq!(link("https://ystuty.ru/#").fragment(), None);
        assert_eq!(link("https://ystuty.ru/").fragment(), None);
    }

    #[test]
    fn page_drops_fragment() {
        let l = link("https://ystuty.ru/#ЭИС-46").page("teachers");
        assert_eq!(l.as_str(), "https://ystuty.ru/teachers");
        assert_eq!(l.fragment(), None);
    }
}
