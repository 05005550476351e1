//! Title normalization.
//!
//! Theater sites decorate the same film in many ways ("Dune OV", "Dune (OmU)",
//! "Preview: Dune", "„Dune“ - Sondervorstellung"). Everything is reduced to a
//! canonical, title-cased name plus a set of edition tags.

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

/// Edition tag carried alongside a canonical title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Extra {
    ThreeD,
    Ov,
    OmU,
    Schulkino,
}

impl Extra {
    pub fn label(self) -> &'static str {
        match self {
            Extra::ThreeD => "3D",
            Extra::Ov => "OV",
            Extra::OmU => "OmU",
            Extra::Schulkino => "Schulkino",
        }
    }
}

impl fmt::Display for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trailing language/format markers, checked against the lowercased title.
const SUFFIXES: &[(&str, Option<Extra>)] = &[
    (" omu", Some(Extra::OmU)),
    (" (omu)", Some(Extra::OmU)),
    (" ov", Some(Extra::Ov)),
    (" (ov)", Some(Extra::Ov)),
    (" df", None),
    (" (df)", None),
    (" 2d", None),
    (" (2d)", None),
    (" 3d", Some(Extra::ThreeD)),
    (" (3d)", Some(Extra::ThreeD)),
];

static PREFIXES: LazyLock<Vec<(Regex, Option<Extra>)>> = LazyLock::new(|| {
    [
        (
            r"^original (montag|dienstag|mittwoch|donnerstag|freitag|samstag|sonntag): ",
            None,
        ),
        (r"^preview: ", None),
        // "<Filmclub oder Reihe> präsentiert: <Film>"; the presenter name varies, so
        // everything up to the first "präsentiert: " goes.
        (r"^.*?präsentiert: ", None),
        (r"^schulkino: ", Some(Extra::Schulkino)),
        (r"^fantasy filmfest: ", None),
        (r"^best of cinema: ", None),
    ]
    .into_iter()
    .map(|(pattern, extra)| {
        let re = Regex::new(&format!("(?i){pattern}")).expect("invalid regex: title prefix");
        (re, extra)
    })
    .collect()
});

const QUOTE_OPEN: char = '„';
const QUOTE_CLOSE: char = '“';

/// A normalized title: canonical name plus edition tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub canonical: String,
    pub extras: BTreeSet<Extra>,
}

impl Title {
    pub fn parse(raw: &str) -> Self {
        let mut text = raw.to_lowercase().replace('–', "-");
        let mut extras = BTreeSet::new();

        loop {
            let before = text.clone();

            for (suffix, extra) in SUFFIXES {
                if text.ends_with(suffix) {
                    text.truncate(text.len() - suffix.len());
                    extras.extend(*extra);
                }
            }

            if text.ends_with('*') {
                text.pop();
            }

            for (re, extra) in PREFIXES.iter() {
                let matched = re.find(&text).map(|m| m.end());
                if let Some(end) = matched {
                    text.replace_range(..end, "");
                    extras.extend(*extra);
                }
            }

            if let Some(inner) = between_quotes(&text) {
                text = inner.to_string();
            }

            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                text = trimmed.to_string();
            }

            if text == before {
                break;
            }
        }

        Title {
            canonical: title_case(&text),
            extras,
        }
    }

    /// Re-normalizes the canonical name with extra `markers` appended
    /// (e.g. `" 3D (OmU)"`) and merges the resulting tags into this title's.
    pub fn with_markers(&self, markers: &str) -> Self {
        let mut merged = Title::parse(&format!("{}{}", self.canonical, markers));
        merged.extras.extend(self.extras.iter().copied());
        merged
    }

    /// Sorted, comma-joined, parenthesized tag list, or empty.
    pub fn extras_display(&self) -> String {
        if self.extras.is_empty() {
            return String::new();
        }
        let mut labels: Vec<&str> = self.extras.iter().map(|e| e.label()).collect();
        labels.sort_unstable();
        format!("({})", labels.join(", "))
    }
}

/// `(canonical_title, extras_display)` for a raw title string.
pub fn normalize(raw: &str) -> (String, String) {
    let title = Title::parse(raw);
    let extras = title.extras_display();
    (title.canonical, extras)
}

fn between_quotes(text: &str) -> Option<&str> {
    let open = text.find(QUOTE_OPEN)? + QUOTE_OPEN.len_utf8();
    let close = text[open..].find(QUOTE_CLOSE)?;
    Some(&text[open..open + close])
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_whitespace() || c == '-' {
            word_start = true;
            out.push(c);
        } else if word_start && c.is_alphanumeric() {
            word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
