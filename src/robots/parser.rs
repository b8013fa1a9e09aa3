//! Robots.txt rule evaluation using the robotstxt crate

use robotstxt::DefaultMatcher;

/// Rules from one host's robots.txt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsPolicy {
    /// No usable robots.txt; everything is allowed
    AllowAll,
    /// Raw robots.txt body, evaluated on demand
    Rules(String),
}

impl RobotsPolicy {
    /// Builds a policy from a robots.txt body; a blank body allows everything
    pub fn from_content(content: &str) -> Self {
        if content.trim().is_empty() {
            Self::AllowAll
        } else {
            Self::Rules(content.to_string())
        }
    }

    /// Checks whether `url` may be fetched by `agent`
    ///
    /// `agent` is the product token (crawler name), not the full header.
    ///
    /// # Examples
    ///
    /// ```
    /// use topic_harvester::robots::RobotsPolicy;
    ///
    /// let policy = RobotsPolicy::from_content("User-agent: *\nDisallow: /private");
    /// assert!(policy.is_allowed("https://example.edu/msc", "TopicHarvester"));
    /// assert!(!policy.is_allowed("https://example.edu/private/x", "TopicHarvester"));
    /// ```
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Rules(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, agent, url)
            }
        }
    }
}
