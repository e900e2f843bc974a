//! robots.txt policy checking
//!
//! The policy is fetched fresh for every request through the shared
//! [`HttpClient`]. Status handling:
//! - 401/403 on robots.txt means no access to the site at all
//! - any other 4xx means there is no enforceable policy
//! - everything else is parsed as a ruleset
//!
//! Transport failures are fail-open by default (configurable).

use crate::client::HttpClient;
use percent_encoding::{utf8_percent_encode, CONTROLS};
use std::sync::Arc;
use texting_robots::Robot;
use tracing::{debug, warn};
use url::Url;

/// Result of consulting a site's robots policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsDecision {
    /// The policy permits the fetch
    Allowed,
    /// The policy forbids the fetch
    Denied(String),
    /// No policy could be found; treated as allowed
    PolicyAbsent,
}

/// Parsed robots exclusion ruleset
///
/// Group selection and rule matching follow RFC 9309 and are delegated to
/// `texting_robots`. Rule paths are percent-encoded up front so that a
/// non-ASCII rule matches the encoded path that [`Url::path`] yields.
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    normalized: String,
}

impl RobotsPolicy {
    /// Parse robots.txt content
    pub fn parse(text: &str) -> Self {
        let normalized = text
            .lines()
            .map(encode_rule_line)
            .collect::<Vec<_>>()
            .join("\n");
        Self { normalized }
    }

    /// Decide whether `user_agent` may fetch `url`
    pub fn is_allowed(&self, user_agent: &str, url: &Url) -> bool {
        if url.path() == "/robots.txt" {
            return true;
        }

        let token = product_token(user_agent);
        let robot = match Robot::new(&token, self.normalized.as_bytes()) {
            Ok(robot) => robot,
            Err(e) => {
                debug!(error = %e, "Unparseable robots.txt, allowing");
                return true;
            }
        };

        let mut target = url.path().to_string();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }
        robot.allowed(&target)
    }
}

/// Percent-encode the path of an Allow/Disallow line, leaving other lines as-is
fn encode_rule_line(line: &str) -> String {
    let Some((field, value)) = line.split_once(':') else {
        return line.to_string();
    };
    let directive = field.trim().to_ascii_lowercase();
    if directive != "allow" && directive != "disallow" {
        return line.to_string();
    }
    format!("{}: {}", field, utf8_percent_encode(value.trim(), CONTROLS))
}

/// The product token robots groups are matched against: `DocFetch/1.0 (x)` -> `docfetch`
fn product_token(user_agent: &str) -> String {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|part| !part.is_empty())
        .unwrap_or("*")
        .to_ascii_lowercase()
}

/// Derive `scheme://host[:port]/robots.txt` from a page URL
pub fn robots_url(url: &Url) -> Url {
    let mut robots = url.clone();
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    // Fails only for URLs that cannot carry credentials; nothing to strip then
    let _ = robots.set_username("");
    let _ = robots.set_password(None);
    robots
}

/// Fetches robots.txt and evaluates it against a URL
#[derive(Debug, Clone)]
pub struct RobotsChecker {
    client: Arc<HttpClient>,
    fail_open: bool,
}

impl RobotsChecker {
    /// Create a checker sharing the given client
    pub fn new(client: Arc<HttpClient>, fail_open: bool) -> Self {
        Self { client, fail_open }
    }

    /// Check whether `user_agent` may fetch `url`
    pub async fn check(&self, url: &Url, user_agent: &str) -> RobotsDecision {
        let robots = robots_url(url);

        let response = match self.client.get(&robots, user_agent).await {
            Ok(response) => response,
            Err(e) => {
                if self.fail_open {
                    warn!(robots_url = %robots, error = %e, "Failed to fetch robots.txt, treating as absent");
                    return RobotsDecision::PolicyAbsent;
                }
                warn!(robots_url = %robots, error = %e, "Failed to fetch robots.txt, denying");
                return RobotsDecision::Denied(format!(
                    "{} could not be retrieved ({})",
                    robots, e
                ));
            }
        };

        match response.status {
            401 | 403 => {
                return RobotsDecision::Denied(format!(
                    "{} returned status {}, assuming autonomous fetching is not allowed",
                    robots, response.status
                ));
            }
            400..=499 => {
                debug!(robots_url = %robots, status = response.status, "No robots policy");
                return RobotsDecision::PolicyAbsent;
            }
            _ => {}
        }

        let policy = RobotsPolicy::parse(&response.text());
        if policy.is_allowed(user_agent, url) {
            RobotsDecision::Allowed
        } else {
            RobotsDecision::Denied(format!(
                "{} specifies that {} may not fetch {}",
                robots, user_agent, url
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_robots_url() {
        assert_eq!(
            robots_url(&url("https://example.com/a/b?q=1#frag")).as_str(),
            "https://example.com/robots.txt"
        );
        assert_eq!(
            robots_url(&url("http://user:pw@127.0.0.1:8080/x")).as_str(),
            "http://127.0.0.1:8080/robots.txt"
        );
    }

    #[test]
    fn test_product_token() {
        assert_eq!(product_token("DocFetch/1.0 (Autonomous)"), "docfetch");
        assert_eq!(product_token("Googlebot"), "googlebot");
        assert_eq!(product_token("  "), "*");
    }

    #[test]
    fn test_encode_rule_line() {
        assert_eq!(encode_rule_line("Disallow: /café"), "Disallow: /caf%C3%A9");
        assert_eq!(encode_rule_line("Allow:\t/a b"), "Allow: /a b");
        assert_eq!(encode_rule_line("User-agent: Bötbot"), "User-agent: Bötbot");
        assert_eq!(encode_rule_line("# Disallow: /é"), "# Disallow: /é");
    }

    #[test]
    fn test_wildcards_and_anchors() {
        let text = "User-agent: *\nDisallow: /*.pdf$\nDisallow: /private\n";
        let policy = RobotsPolicy::parse(text);
        assert!(!policy.is_allowed("Bot", &url("https://example.com/docs/file.pdf")));
        assert!(policy.is_allowed("Bot", &url("https://example.com/docs/file.pdf.html")));
        assert!(!policy.is_allowed("Bot", &url("https://example.com/private/page")));
        assert!(policy.is_allowed("Bot", &url("https://example.com/public")));
    }

    #[test]
    fn test_non_ascii_rule_matches_encoded_path() {
        let policy = RobotsPolicy::parse("User-agent: *\nDisallow: /café\n");
        assert!(!policy.is_allowed("Bot", &url("https://example.com/café/x")));
        assert!(!policy.is_allowed("Bot", &url("https://example.com/caf%C3%A9")));
        assert!(policy.is_allowed("Bot", &url("https://example.com/cafe")));
    }

    #[test]
    fn test_disallow_all() {
        let policy = RobotsPolicy::parse("User-agent: *\nDisallow: /\n");
        assert!(!policy.is_allowed("AnyBot/1.0", &url("https://example.com/page")));
        assert!(policy.is_allowed("AnyBot/1.0", &url("https://example.com/robots.txt")));
    }

    #[test]
    fn test_empty_disallow_allows_all() {
        let policy = RobotsPolicy::parse("User-agent: *\nDisallow:\n");
        assert!(policy.is_allowed("AnyBot/1.0", &url("https://example.com/page")));
    }

    #[test]
    fn test_comments_stripped() {
        let text = "# full line comment\nUser-agent: * # everyone\n  # indented comment\nDisallow: /secret # hidden\n";
        let policy = RobotsPolicy::parse(text);
        assert!(!policy.is_allowed("Bot", &url("https://example.com/secret/x")));
        assert!(policy.is_allowed("Bot", &url("https://example.com/open")));
    }

    #[test]
    fn test_longest_match_wins() {
        let text = "User-agent: *\nDisallow: /docs\nAllow: /docs/public\n";
        let policy = RobotsPolicy::parse(text);
        assert!(policy.is_allowed("Bot", &url("https://example.com/docs/public/a")));
        assert!(!policy.is_allowed("Bot", &url("https://example.com/docs/private")));
    }

    #[test]
    fn test_allow_wins_tie() {
        let text = "User-agent: *\nDisallow: /page\nAllow: /page\n";
        let policy = RobotsPolicy::parse(text);
        assert!(policy.is_allowed("Bot", &url("https://example.com/page")));
    }

    #[test]
    fn test_specific_agent_group() {
        let text = "\
User-agent: *
Disallow: /

User-agent: DocFetch
Disallow: /admin
";
        let policy = RobotsPolicy::parse(text);
        let ua = "DocFetch/1.0 (Autonomous)";
        assert!(policy.is_allowed(ua, &url("https://example.com/page")));
        assert!(!policy.is_allowed(ua, &url("https://example.com/admin")));
        assert!(!policy.is_allowed("OtherBot", &url("https://example.com/page")));
    }

    #[test]
    fn test_grouped_agents_share_rules() {
        let text = "User-agent: alpha\nUser-agent: beta\nDisallow: /x\n";
        let policy = RobotsPolicy::parse(text);
        assert!(!policy.is_allowed("alpha", &url("https://example.com/x")));
        assert!(!policy.is_allowed("beta", &url("https://example.com/x")));
        assert!(policy.is_allowed("gamma", &url("https://example.com/x")));
    }

    #[test]
    fn test_query_is_matched() {
        let policy = RobotsPolicy::parse("User-agent: *\nDisallow: /*?session=\n");
        assert!(!policy.is_allowed("Bot", &url("https://example.com/p?session=1")));
        assert!(policy.is_allowed("Bot", &url("https://example.com/p?page=1")));
    }

    #[test]
    fn test_no_groups_allows() {
        let policy = RobotsPolicy::parse("<html><body>Server error</body></html>");
        assert!(policy.is_allowed("Bot", &url("https://example.com/anything")));
    }
}
