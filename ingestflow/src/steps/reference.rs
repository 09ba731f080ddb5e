//! Embedded-reference detection.

use regex::Regex;

use crate::errors::Result;

const VIDEO_ID: &str = r"([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)";

/// Extracts an identifier from content using patterns tried in order.
///
/// The first pattern that matches with a non-empty capture group wins.
/// An optional URL template (`{id}` placeholder) turns an identifier back
/// into a canonical link.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    patterns: Vec<Regex>,
    url_template: Option<String>,
}

impl ReferenceExtractor {
    /// Compiles the given patterns, highest priority first.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            url_template: None,
        })
    }

    /// Sets the canonical link template; `{id}` is replaced by the identifier.
    #[must_use]
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = Some(template.into());
        self
    }

    /// Patterns recognising YouTube video links.
    pub fn youtube() -> Result<Self> {
        Self::new([
            format!(r"youtube\.com/watch\?(?:[^\s#]*&)?v={VIDEO_ID}"),
            format!(r"youtu\.be/{VIDEO_ID}"),
            format!(r"youtube(?:-nocookie)?\.com/embed/{VIDEO_ID}"),
            format!(r"youtube\.com/shorts/{VIDEO_ID}"),
            format!(r"youtube\.com/live/{VIDEO_ID}"),
        ])
        .map(|ex| ex.with_url_template("https://www.youtube.com/watch?v={id}"))
    }

    /// Canonical link for an identifier, if a template is set.
    #[must_use]
    pub fn url_for(&self, id: &str) -> Option<String> {
        self.url_template
            .as_ref()
            .map(|template| template.replace("{id}", id))
    }

    /// Returns the identifier of the first recognised reference.
    #[must_use]
    pub fn extract(&self, content: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            pattern.captures_iter(content).find_map(|caps| {
                caps.iter()
                    .skip(1)
                    .flatten()
                    .find(|m| !m.as_str().is_empty())
                    .map(|m| m.as_str().to_string())
            })
        })
    }

    /// Returns true if any pattern yields an identifier.
    #[must_use]
    pub fn is_match(&self, content: &str) -> bool {
        self.extract(content).is_some()
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if there are no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yt() -> ReferenceExtractor {
        ReferenceExtractor::youtube().unwrap()
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            yt().extract("Check this out: https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_other_params() {
        assert_eq!(
            yt().extract("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42s"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_embed_shorts_live() {
        let ex = yt();
        assert_eq!(ex.extract("see youtu.be/abcdefghijk."), Some("abcdefghijk".to_string()));
        assert_eq!(
            ex.extract("<iframe src=\"https://www.youtube-nocookie.com/embed/A1b2C3d4E5f\">"),
            Some("A1b2C3d4E5f".to_string())
        );
        assert_eq!(
            ex.extract("https://youtube.com/shorts/zzzzzzzzzz_"),
            Some("zzzzzzzzzz_".to_string())
        );
        assert_eq!(
            ex.extract("https://www.youtube.com/live/-----------"),
            Some("-----------".to_string())
        );
    }

    #[test]
    fn test_priority_order() {
        let content = "https://youtu.be/BBBBBBBBBBB and https://www.youtube.com/watch?v=AAAAAAAAAAA";
        assert_eq!(yt().extract(content), Some("AAAAAAAAAAA".to_string()));
    }

    #[test]
    fn test_rejects_wrong_length_ids() {
        let ex = yt();
        assert_eq!(ex.extract("https://youtu.be/short"), None);
        assert_eq!(ex.extract("https://youtu.be/abcdefghijkl"), None);
    }

    #[test]
    fn test_no_reference() {
        let ex = yt();
        assert_eq!(ex.extract("No links here."), None);
        assert!(!ex.is_match(""));
        assert_eq!(ex.len(), 5);
    }

    #[test]
    fn test_custom_patterns_first_non_empty_group() {
        let ex = ReferenceExtractor::new([r"vimeo\.com/(\d*)", r"id:(\w+)|ref:(\w+)"]).unwrap();

        assert_eq!(ex.extract("ref:xyz"), Some("xyz".to_string()));
        assert_eq!(ex.extract("vimeo.com/123"), Some("123".to_string()));
        assert_eq!(ex.extract("vimeo.com/ id:abc"), Some("abc".to_string()));
    }

    #[test]
    fn test_url_for() {
        assert_eq!(
            yt().url_for("dQw4w9WgXcQ").as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );

        let vimeo = ReferenceExtractor::new([r"vimeo\.com/(\d+)"]).unwrap();
        assert_eq!(vimeo.url_for("123"), None);
        let vimeo = vimeo.with_url_template("https://vimeo.com/{id}");
        assert_eq!(vimeo.url_for("123").as_deref(), Some("https://vimeo.com/123"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(ReferenceExtractor::new(["("]).is_err());
        assert!(ReferenceExtractor::new(Vec::<String>::new()).unwrap().is_empty());
    }
}
