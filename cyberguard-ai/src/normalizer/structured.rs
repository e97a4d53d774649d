//! Structured provider payloads (claims database and news index)
//!
//! Extracts item counts, reputable-source counts and evidence lines. Payloads
//! that do not match the expected shape degrade to `UNKNOWN`.

use crate::types::{Coverage, ProviderKind, Verdict, VerdictLabel};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::ai_verdict::MAX_EVIDENCE;

/// Outlets and fact-checkers treated as reputable
pub const REPUTABLE_DOMAINS: &[&str] = &[
    "reuters.com",
    "apnews.com",
    "ap.org",
    "bbc.com",
    "bbc.co.uk",
    "npr.org",
    "pbs.org",
    "cnn.com",
    "nytimes.com",
    "washingtonpost.com",
    "theguardian.com",
    "factcheck.org",
    "politifact.com",
    "snopes.com",
    "fullfact.org",
];

/// Rating fragments that mark a reviewed claim as false or misleading
const FLAGGED_RATINGS: &[&str] = &[
    "false",
    "fake",
    "misleading",
    "incorrect",
    "inaccurate",
    "pants on fire",
    "fabricated",
    "distort",
    "unsupported",
    "no evidence",
    "not true",
    "wrong",
];

// ============================================================================
// Fact Check Tools payload
// ============================================================================

#[derive(Debug, Deserialize)]
struct ClaimSearch {
    #[serde(default)]
    claims: Vec<Claim>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claim {
    #[serde(default)]
    text: String,
    #[serde(default)]
    claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimReview {
    publisher: Option<Publisher>,
    url: Option<String>,
    textual_rating: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    name: Option<String>,
    site: Option<String>,
}

impl ClaimReview {
    fn is_reputable(&self) -> bool {
        let site = self.publisher.as_ref().and_then(|p| p.site.as_deref());
        site.map(is_reputable).unwrap_or(false)
            || self.url.as_deref().map(is_reputable).unwrap_or(false)
    }

    fn is_flagged(&self) -> bool {
        self.textual_rating
            .as_deref()
            .map(|r| {
                let r = r.to_lowercase();
                FLAGGED_RATINGS.iter().any(|f| r.contains(f))
            })
            .unwrap_or(false)
    }
}

/// Normalize a claims-search payload
pub fn normalize_claims(value: &Value) -> Verdict {
    let search: ClaimSearch = match serde_json::from_value(value.clone()) {
        Ok(search) => search,
        Err(e) => {
            debug!(error = %e, "Unexpected claims payload");
            return Verdict::unknown(ProviderKind::Claims, "Unrecognized claims payload");
        }
    };

    let found = search.claims.len();
    let reputable = search
        .claims
        .iter()
        .filter(|c| c.claim_review.iter().any(ClaimReview::is_reputable))
        .count();
    let flagged = search
        .claims
        .iter()
        .filter(|c| c.claim_review.iter().any(ClaimReview::is_flagged))
        .count();

    let evidence = search
        .claims
        .iter()
        .take(MAX_EVIDENCE)
        .map(|claim| match claim.claim_review.first() {
            Some(review) => {
                let publisher = review
                    .publisher
                    .as_ref()
                    .and_then(|p| p.name.as_deref())
                    .unwrap_or("unknown reviewer");
                let rating = review.textual_rating.as_deref().unwrap_or("unrated");
                format!("{} ({}: {})", claim.text, publisher, rating)
            }
            None => claim.text.clone(),
        })
        .collect();

    let label = if flagged > 0 {
        VerdictLabel::Disputed
    } else if found > 0 {
        VerdictLabel::ClaimsFound
    } else {
        VerdictLabel::NoClaims
    };

    Verdict {
        provider: ProviderKind::Claims,
        label,
        confidence_pct: count_confidence(found),
        evidence,
        rationale: format!(
            "{} related fact-check(s) found, {} from reputable reviewers, {} rated false or misleading",
            found, reputable, flagged
        ),
        coverage: Some(Coverage {
            found,
            reputable,
            flagged,
        }),
    }
}

// ============================================================================
// NewsAPI payload
// ============================================================================

#[derive(Debug, Deserialize)]
struct NewsSearch {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    source: Option<ArticleSource>,
    title: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// Normalize a news-search payload
pub fn normalize_news(value: &Value) -> Verdict {
    let search: NewsSearch = match serde_json::from_value(value.clone()) {
        Ok(search) => search,
        Err(e) => {
            debug!(error = %e, "Unexpected news payload");
            return Verdict::unknown(ProviderKind::News, "Unrecognized news payload");
        }
    };

    let found = search.articles.len();
    let reputable = search
        .articles
        .iter()
        .filter(|a| a.url.as_deref().map(is_reputable).unwrap_or(false))
        .count();

    let evidence = search
        .articles
        .iter()
        .take(MAX_EVIDENCE)
        .map(|a| {
            let title = a.title.as_deref().unwrap_or("(untitled)");
            match a.source.as_ref().and_then(|s| s.name.as_deref()) {
                Some(source) => format!("{} ({})", title, source),
                None => title.to_string(),
            }
        })
        .collect();

    let label = if found == 0 {
        VerdictLabel::NoCoverage
    } else if reputable > 0 {
        VerdictLabel::Corroborated
    } else {
        VerdictLabel::Uncorroborated
    };

    Verdict {
        provider: ProviderKind::News,
        label,
        confidence_pct: count_confidence(found),
        evidence,
        rationale: format!(
            "{} related article(s) found, {} from reputable outlets",
            found, reputable
        ),
        coverage: Some(Coverage {
            found,
            reputable,
            flagged: 0,
        }),
    }
}

/// More returned items → more confidence in the count-based label
fn count_confidence(found: usize) -> u8 {
    (50 + 10 * found.min(4)) as u8
}

/// Whether a URL or bare site belongs to an allow-listed domain
pub fn is_reputable(url_or_site: &str) -> bool {
    let Some(host) = host_of(url_or_site) else {
        return false;
    };
    REPUTABLE_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
}

/// Host of an article URL, or of a `publisher.site` value given without a scheme
fn host_of(url_or_site: &str) -> Option<String> {
    let trimmed = url_or_site.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{}", trimmed))
    };
    let url = parsed.ok()?;
    url.host_str()
        .map(|h| h.trim_end_matches('.').to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reputable_matching() {
        assert!(is_reputable("https://www.reuters.com/world/article"));
        assert!(is_reputable("politifact.com"));
        assert!(is_reputable("http://news.bbc.co.uk:80/x"));
        assert!(!is_reputable("https://notreuters.com/x"));
        assert!(!is_reputable("https://reuters.com.evil.example/x"));
        assert!(!is_reputable(""));
        assert!(!is_reputable("not a url at all"));
    }

    #[test]
    fn test_reputable_uses_parsed_host() {
        // Backslash ends the authority for http(s); the host is evil.example
        assert!(!is_reputable("https://evil.example\\@reuters.com/story"));
        assert!(!is_reputable("https://reuters.com@evil.example/story"));
        assert!(!is_reputable("evil.example\\@reuters.com"));
        assert!(is_reputable("https://user@www.reuters.com/story"));
        assert!(is_reputable("HTTPS://WWW.SNOPES.COM./fact-check"));
    }

    #[test]
    fn test_claims_flagged_is_disputed() {
        let payload = json!({
            "claims": [
                {
                    "text": "Drinking bleach cures flu",
                    "claimReview": [{
                        "publisher": {"name": "PolitiFact", "site": "politifact.com"},
                        "url": "https://www.politifact.com/factchecks/x",
                        "textualRating": "Pants on Fire"
                    }]
                },
                {
                    "text": "Flu season starts in autumn",
                    "claimReview": [{
                        "publisher": {"name": "Some Blog", "site": "blog.example"},
                        "textualRating": "True"
                    }]
                }
            ]
        });

        let verdict = normalize_claims(&payload);
        assert_eq!(verdict.label, VerdictLabel::Disputed);
        assert_eq!(
            verdict.coverage,
            Some(Coverage {
                found: 2,
                reputable: 1,
                flagged: 1
            })
        );
        assert_eq!(
            verdict.evidence[0],
            "Drinking bleach cures flu (PolitiFact: Pants on Fire)"
        );
    }

    #[test]
    fn test_empty_claims_object() {
        let verdict = normalize_claims(&json!({}));
        assert_eq!(verdict.label, VerdictLabel::NoClaims);
        assert_eq!(verdict.coverage.unwrap().found, 0);
    }

    #[test]
    fn test_malformed_claims_degrade() {
        let verdict = normalize_claims(&json!({"claims": "nope"}));
        assert_eq!(verdict.label, VerdictLabel::Unknown);
        assert_eq!(verdict.confidence_pct, 0);
        assert!(verdict.coverage.is_none());
    }

    #[test]
    fn test_news_corroborated() {
        let payload = json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"name": "Reuters"}, "title": "Budget approved", "url": "https://www.reuters.com/a"},
                {"source": {"name": "Blog"}, "title": "Hot take", "url": "https://blog.example/b"}
            ]
        });
        let verdict = normalize_news(&payload);
        assert_eq!(verdict.label, VerdictLabel::Corroborated);
        let coverage = verdict.coverage.unwrap();
        assert_eq!(coverage.found, 2);
        assert_eq!(coverage.reputable, 1);
        assert_eq!(verdict.evidence, vec!["Budget approved (Reuters)", "Hot take (Blog)"]);
    }

    #[test]
    fn test_news_spoofed_url_not_reputable() {
        let payload = json!({
            "status": "ok",
            "totalResults": 1,
            "articles": [
                {"source": {"name": "Reuters"}, "title": "Shock claim", "url": "https://evil.example\\@reuters.com/story"}
            ]
        });
        let verdict = normalize_news(&payload);
        assert_eq!(verdict.label, VerdictLabel::Uncorroborated);
        assert_eq!(verdict.coverage.unwrap().reputable, 0);
    }

    #[test]
    fn test_news_no_coverage() {
        let verdict = normalize_news(&json!({"status": "ok", "totalResults": 0, "articles": []}));
        assert_eq!(verdict.label, VerdictLabel::NoCoverage);
        assert_eq!(verdict.confidence_pct, 50);
    }
}
