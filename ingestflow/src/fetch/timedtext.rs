//! Parser for YouTube timed-text XML.

use regex::Regex;

use crate::errors::Result;

/// Extracts plain text from a `<transcript><text ..>..</text></transcript>` document.
#[derive(Debug, Clone)]
pub struct TimedTextParser {
    segment: Regex,
    numeric_entity: Regex,
}

impl TimedTextParser {
    /// Compiles the parser.
    pub fn new() -> Result<Self> {
        Ok(Self {
            segment: Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>")?,
            numeric_entity: Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);")?,
        })
    }

    /// Joins every segment into one space-separated string.
    ///
    /// Returns an empty string when the document has no text segments.
    #[must_use]
    pub fn parse(&self, xml: &str) -> String {
        let mut out = String::new();
        for caps in self.segment.captures_iter(xml) {
            // YouTube double-escapes, so decode twice.
            let once = self.decode(&caps[1]);
            let text = self.decode(&once);
            for word in text.split_whitespace() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(word);
            }
        }
        out
    }

    fn decode(&self, raw: &str) -> String {
        let named = raw
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'");
        let numeric = self.numeric_entity.replace_all(&named, |caps: &regex::Captures<'_>| {
            let code = &caps[1];
            let parsed = code
                .strip_prefix('x')
                .map_or_else(|| code.parse().ok(), |hex| u32::from_str_radix(hex, 16).ok());
            parsed
                .and_then(char::from_u32)
                .map_or_else(|| caps[0].to_string(), String::from)
        });
        numeric.replace("&amp;", "&")
    }
}
