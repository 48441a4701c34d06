// URL checker - trusted domains, blacklist, reputation provider, heuristics
use redis::AsyncCommands;
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use url::{Host, Url};

use crate::db::Database;
use crate::error::Result;
use crate::models::BlacklistEntry;
use crate::services::blacklist_service::BlacklistService;
use crate::services::providers::{LanguageModel, ReputationReport, UrlReputationProvider};
use crate::utils::url::{host_of, is_trusted_host, normalize_url, parse_absolute};

const SUSPICIOUS_TLDS: &[&str] = &["xyz", "top", "tk", "ml", "ga", "cf", "gq", "zip", "click", "icu"];

const LURE_KEYWORDS: &[&str] = &[
    "login", "verify", "account", "secure", "update", "bank", "wallet", "confirm", "bonus",
    "prize", "gift", "free", "otp",
];

/// Heuristic scores at or above this are not considered safe
const UNSAFE_SCORE: u8 = 40;
const DANGEROUS_SCORE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Suspicious,
    Dangerous,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicAnalysis {
    pub score: u8,
    pub signals: Vec<String>,
}

impl HeuristicAnalysis {
    pub fn risk_level(&self) -> RiskLevel {
        match self.score {
            s if s >= DANGEROUS_SCORE => RiskLevel::Dangerous,
            s if s >= UNSAFE_SCORE => RiskLevel::Suspicious,
            _ => RiskLevel::Safe,
        }
    }
}

/// Which layer decided, with that layer's evidence
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CheckOutcome {
    Trusted {
        host: String,
    },
    Blacklist {
        entry: BlacklistEntry,
    },
    Virustotal {
        report: ReputationReport,
        cached: bool,
    },
    Heuristic {
        analysis: HeuristicAnalysis,
        #[serde(skip_serializing_if = "Option::is_none")]
        commentary: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlCheckResult {
    pub url: String,
    pub normalized_url: String,
    pub safe: bool,
    pub risk_level: RiskLevel,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

pub struct UrlCheckerService {
    db: Database,
    reputation: Option<Arc<dyn UrlReputationProvider>>,
    llm: Option<Arc<dyn LanguageModel>>,
    cache_ttl_secs: u64,
}

impl UrlCheckerService {
    pub fn new(
        db: Database,
        reputation: Option<Arc<dyn UrlReputationProvider>>,
        llm: Option<Arc<dyn LanguageModel>>,
        cache_ttl_secs: u64,
    ) -> Self {
        Self {
            db,
            reputation,
            llm,
            cache_ttl_secs,
        }
    }

    pub async fn check(&self, raw: &str) -> Result<UrlCheckResult> {
        let normalized_url = normalize_url(raw)?;
        let parsed = parse_absolute(raw)?;
        let host = host_of(&parsed).unwrap_or_default();

        if is_trusted_host(&host) {
            tracing::debug!(host = %host, "URL on trusted domain");
            return Ok(UrlCheckResult {
                url: raw.trim().to_string(),
                normalized_url,
                safe: true,
                risk_level: RiskLevel::Safe,
                outcome: CheckOutcome::Trusted { host },
            });
        }

        let blacklist = BlacklistService::new(self.db.clone());
        if let Some(entry) = blacklist.find_active(&normalized_url).await? {
            tracing::info!(normalized_url = %normalized_url, entry_id = %entry.id, "URL is blacklisted");
            return Ok(UrlCheckResult {
                url: raw.trim().to_string(),
                normalized_url,
                safe: false,
                risk_level: RiskLevel::Dangerous,
                outcome: CheckOutcome::Blacklist { entry },
            });
        }

        Ok(self.assess_unlisted(raw, &parsed, normalized_url).await)
    }

    /// Reputation provider first, heuristics when it has nothing to say.
    /// Never fails: provider and cache errors fall through to heuristics.
    pub async fn assess_unlisted(&self, raw: &str, parsed: &Url, normalized_url: String) -> UrlCheckResult {
        let url = raw.trim().to_string();

        if let Some((report, cached)) = self.reputation_lookup(parsed.as_str(), &normalized_url).await {
            let risk_level = if report.malicious > 0 {
                RiskLevel::Dangerous
            } else if report.suspicious > 0 {
                RiskLevel::Suspicious
            } else {
                RiskLevel::Safe
            };

            return UrlCheckResult {
                url,
                normalized_url,
                safe: report.is_safe(),
                risk_level,
                outcome: CheckOutcome::Virustotal { report, cached },
            };
        }

        let analysis = analyze_heuristics(raw, parsed);
        let commentary = self.commentary(&url, &analysis).await;

        UrlCheckResult {
            url,
            normalized_url,
            safe: analysis.score < UNSAFE_SCORE,
            risk_level: analysis.risk_level(),
            outcome: CheckOutcome::Heuristic { analysis, commentary },
        }
    }

    async fn reputation_lookup(&self, url: &str, normalized_url: &str) -> Option<(ReputationReport, bool)> {
        let provider = self.reputation.as_ref()?;
        let key = format!("url_reputation:{}", normalized_url);

        if let Some(report) = self.cached_report(&key).await {
            return Some((report, true));
        }

        match provider.lookup(url).await {
            Ok(Some(report)) if report.total_engines() == 0 => {
                tracing::debug!(normalized_url, "Reputation report has no engine verdicts yet");
                None
            }
            Ok(Some(report)) => {
                self.store_report(&key, &report).await;
                Some((report, false))
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "Reputation lookup failed");
                None
            }
        }
    }

    async fn cached_report(&self, key: &str) -> Option<ReputationReport> {
        let mut conn = match self.db.get_redis_conn().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, skipping reputation cache");
                return None;
            }
        };

        let raw: Option<String> = match conn.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Reputation cache read failed");
                return None;
            }
        };

        raw.and_then(|json| serde_json::from_str(&json).ok())
    }

    async fn store_report(&self, key: &str, report: &ReputationReport) {
        let Ok(json) = serde_json::to_string(report) else {
            return;
        };

        match self.db.get_redis_conn().await {
            Ok(mut conn) => {
                if let Err(e) = conn.set_ex::<_, _, ()>(key, json, self.cache_ttl_secs).await {
                    tracing::warn!(error = %e, "Reputation cache write failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Redis unavailable, reputation not cached"),
        }
    }

    async fn commentary(&self, url: &str, analysis: &HeuristicAnalysis) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let signals = if analysis.signals.is_empty() {
            "none".to_string()
        } else {
            analysis.signals.join("; ")
        };
        let prompt = format!(
            "You help ordinary people avoid online scams. In two or three short sentences, \
             explain whether the following URL looks risky and what the user should do.\n\
             URL: {}\nRisk score (0-100): {}\nDetected signals: {}",
            url, analysis.score, signals
        );

        match llm.generate(&prompt).await {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                tracing::warn!(model = llm.name(), error = %e, "URL commentary generation failed");
                None
            }
        }
    }
}

/// Score a URL from its shape alone. 0 is clean, 100 is the cap.
pub fn analyze_heuristics(raw: &str, url: &Url) -> HeuristicAnalysis {
    let mut score: u32 = 0;
    let mut signals = Vec::new();
    let host = host_of(url).unwrap_or_default();

    let mut flag = |points: u32, signal: String| {
        score += points;
        signals.push(signal);
    };

    match url.host() {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {
            flag(30, "Host is a raw IP address".to_string());
        }
        Some(Host::Domain(domain)) if domain.parse::<IpAddr>().is_ok() => {
            flag(30, "Host is a raw IP address".to_string());
        }
        _ => {}
    }

    if let Some(tld) = host.rsplit('.').next() {
        if SUSPICIOUS_TLDS.contains(&tld) {
            flag(20, format!("Top-level domain .{} is common in scams", tld));
        }
    }

    if !url.username().is_empty() || url.password().is_some() {
        flag(25, "URL hides its real destination behind '@'".to_string());
    }

    if host.split('.').any(|label| label.starts_with("xn--")) {
        flag(20, "Internationalized domain that may imitate another site".to_string());
    }

    if raw.trim().chars().count() > 75 {
        flag(10, "Unusually long URL".to_string());
    }

    if host.matches('-').count() >= 3 {
        flag(10, "Many hyphens in the domain".to_string());
    }

    if host.split('.').count() > 4 {
        flag(10, "Deeply nested subdomains".to_string());
    }

    let lowered = raw.to_lowercase();
    let keywords: Vec<&str> = LURE_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lowered.contains(k))
        .collect();
    if !keywords.is_empty() {
        let points = (keywords.len() as u32 * 10).min(30);
        flag(points, format!("Contains lure words: {}", keywords.join(", ")));
    }

    if lowered.trim_start().starts_with("http://") {
        flag(10, "Connection is not encrypted (http)".to_string());
    }

    HeuristicAnalysis {
        score: score.min(100) as u8,
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::providers::{ProviderError, ProviderResult};
    use async_trait::async_trait;

    fn analyze(raw: &str) -> HeuristicAnalysis {
        analyze_heuristics(raw, &parse_absolute(raw).unwrap())
    }

    #[test]
    fn clean_url_scores_zero() {
        let analysis = analyze("https://example.org/news");
        assert_eq!(analysis.score, 0);
        assert!(analysis.signals.is_empty());
        assert_eq!(analysis.risk_level(), RiskLevel::Safe);
    }

    #[test]
    fn phishing_shaped_url_is_dangerous() {
        let analysis = analyze("http://secure-login-bank-verify.xyz/account/update");
        assert!(analysis.score >= DANGEROUS_SCORE, "score {}", analysis.score);
        assert_eq!(analysis.risk_level(), RiskLevel::Dangerous);
    }

    #[test]
    fn ip_host_and_userinfo_are_flagged() {
        let analysis = analyze("https://paypal.com@192.168.10.4/");
        assert!(analysis.signals.iter().any(|s| s.contains("IP address")));
        assert!(analysis.signals.iter().any(|s| s.contains('@')));
        assert!(analysis.score >= UNSAFE_SCORE);
    }

    #[test]
    fn punycode_is_flagged() {
        let analysis = analyze("https://xn--pypal-4ve.com");
        assert!(analysis.signals.iter().any(|s| s.contains("Internationalized")));
    }

    #[test]
    fn score_is_capped() {
        let raw = "http://user@login-verify-secure-bank-account-update.a.b.c.xyz/confirm/wallet/bonus/prize/gift/free/otp";
        assert_eq!(analyze(raw).score, 100);
    }

    struct FixedReputation(Option<ReputationReport>);

    #[async_trait]
    impl UrlReputationProvider for FixedReputation {
        async fn lookup(&self, _url: &str) -> ProviderResult<Option<ReputationReport>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
            Err(ProviderError::Status(503))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn checker(
        reputation: Option<Arc<dyn UrlReputationProvider>>,
        llm: Option<Arc<dyn LanguageModel>>,
    ) -> UrlCheckerService {
        let mut config = Config::load().unwrap();
        // Port 1 refuses connections, so cache access fails fast and is skipped
        config.redis.url = "redis://127.0.0.1:1".to_string();
        let db = Database::connect_lazy(&config).unwrap();
        UrlCheckerService::new(db, reputation, llm, 60)
    }

    #[tokio::test]
    async fn reputation_verdict_wins_over_heuristics() {
        let report = ReputationReport {
            malicious: 4,
            suspicious: 0,
            harmless: 50,
            undetected: 10,
            last_analysis_date: None,
        };
        let service = checker(Some(Arc::new(FixedReputation(Some(report)))), None);

        let raw = "https://example.org";
        let result = service
            .assess_unlisted(raw, &parse_absolute(raw).unwrap(), "example.org".to_string())
            .await;

        assert!(!result.safe);
        assert_eq!(result.risk_level, RiskLevel::Dangerous);
        assert!(matches!(result.outcome, CheckOutcome::Virustotal { cached: false, .. }));
    }

    #[tokio::test]
    async fn report_without_engine_verdicts_falls_back_to_heuristics() {
        let empty = ReputationReport {
            malicious: 0,
            suspicious: 0,
            harmless: 0,
            undetected: 0,
            last_analysis_date: None,
        };
        let service = checker(Some(Arc::new(FixedReputation(Some(empty)))), None);

        let raw = "http://secure-login-verify.top/account";
        let result = service
            .assess_unlisted(raw, &parse_absolute(raw).unwrap(), normalize_url(raw).unwrap())
            .await;

        assert!(matches!(result.outcome, CheckOutcome::Heuristic { .. }));
        assert!(!result.safe);
    }

    #[tokio::test]
    async fn falls_back_to_heuristics_without_commentary_on_model_failure() {
        let service = checker(
            Some(Arc::new(FixedReputation(None))),
            Some(Arc::new(FailingModel)),
        );

        let raw = "http://free-gift.top/claim";
        let result = service
            .assess_unlisted(raw, &parse_absolute(raw).unwrap(), normalize_url(raw).unwrap())
            .await;

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "heuristic");
        assert!(json.get("commentary").is_none());
        assert!(!result.safe);
    }
}
