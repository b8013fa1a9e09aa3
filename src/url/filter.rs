use std::collections::BTreeSet;

/// Predicate deciding whether a discovered link is on-topic
///
/// A link is admitted when its lowercase form contains at least one keyword
/// and contains the required domain substring. Both checks are plain
/// substring tests: `"ma"` matches `"drama"`, and that is intended.
///
/// # Examples
///
/// ```
/// use topic_harvester::url::AdmissionFilter;
///
/// let filter = AdmissionFilter::new(["msc"], "example.edu");
/// assert!(filter.accepts("https://example.edu/admissions/graduate/MSc-AI/apply"));
/// assert!(!filter.accepts("https://example.edu/about"));
/// assert!(!filter.accepts("https://other.org/msc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionFilter {
    keywords: BTreeSet<String>,
    required_domain_substring: String,
}

impl AdmissionFilter {
    /// Creates a filter; keywords and domain substring are lowercased
    pub fn new<I, S>(keywords: I, required_domain_substring: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            required_domain_substring: required_domain_substring.to_lowercase(),
        }
    }

    /// The configured keywords, lowercased
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// The required domain substring, lowercased
    pub fn required_domain_substring(&self) -> &str {
        &self.required_domain_substring
    }

    /// Returns true if the link contains any keyword (case-insensitive)
    pub fn matches_keywords(&self, link: &str) -> bool {
        let lower = link.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Returns true if the link contains the required domain substring
    pub fn matches_domain(&self, link: &str) -> bool {
        link.to_lowercase()
            .contains(self.required_domain_substring.as_str())
    }

    /// Returns true if the link passes both checks
    pub fn accepts(&self, link: &str) -> bool {
        self.matches_keywords(link) && self.matches_domain(link)
    }
}
