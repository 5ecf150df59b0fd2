// src/matching/name.rs - Token/slug-based company name extraction
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::models::core::CompanyKey;

static LEADING_PROTOCOL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(http//)?((www|web)\.)?").expect("valid protocol prefix pattern")
});
static SEGMENT_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[./]").expect("valid separator pattern"));
static BOILERPLATE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(corp-|corporate-|about-|info-|en-|shop-)").expect("valid prefix pattern")
});
static BOILERPLATE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-(corp|corporate|about|info|en|shop)$").expect("valid suffix pattern")
});

/// Tokens that never carry a company's identity: generic and country TLDs,
/// language codes, and web/business boilerplate.
pub static COMMON_TERMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Generic TLDs
        "com", "org", "net", "info", "biz", "edu", "gov", "mil", "int", "ac", "co", "io", "ai",
        "app", "dev", "tech", "online", "store", "shop", "blog", "site", "cloud", "design",
        "agency", "marketing", "digital",
        // Country code TLDs
        "us", "uk", "ca", "au", "de", "fr", "jp", "cn", "in", "ru", "br", "it", "nl", "es", "se",
        "no", "fi", "dk", "ch", "at", "be", "nz", "sg", "ae", "kr", "za", "mx", "ar", "cl", "pl",
        "cz", "gr", "hu", "pt", "ro", "th", "tr", "ua", "vn", "ph", "my", "id", "tw", "hk", "me",
        "eu",
        // Common URL words and abbreviations
        "about", "contact", "support", "help", "faq", "news", "corp", "corporate", "company",
        "inc", "incorporated", "llc", "ltd", "limited", "group", "intl", "international",
        "global", "worldwide", "local", "official", "home", "main", "index", "web", "portal",
        "login", "signup", "register", "account", "user", "customer", "client", "partner",
        "vendor", "supplier", "en", "eng", "english", "fra", "french", "deu", "german", "esp",
        "spanish", "ita", "italian", "por", "portuguese", "rus", "russian", "chi", "chinese",
        "jpn", "japanese",
        // E-commerce related
        "buy", "sell", "sale", "discount", "deal", "offer", "product", "item", "catalog",
        "category", "cart", "checkout", "payment", "order", "shipping", "delivery",
        // Business and corporate terms
        "careers", "jobs", "hr", "human-resources", "recruitment", "investor", "investors",
        "shareholders", "press", "media", "pr", "public-relations", "legal", "privacy", "terms",
        "conditions", "policy", "policies", "services", "solutions", "products", "projects",
        "portfolio", "business",
        // Technology-related
        "apps", "api", "developer", "webmaster", "admin", "sys", "system", "network", "host",
        "domain", "email", "mail", "webmail", "server", "database", "data", "analytics", "stats",
        "metrics",
        // Social media and community
        "social", "community", "forum", "chat", "discuss", "connect", "follow", "like", "share",
        "tweet", "post", "profile", "member",
        // Miscellaneous
        "page", "pages", "sites", "internet", "virtual", "mobile", "desktop", "platform",
        "service", "tool", "resource", "guide", "tutorial", "learn", "education", "training",
        "course", "program",
    ]
    .into_iter()
    .collect()
});

/// Slug-style company name: the URL's non-boilerplate tokens joined by
/// hyphens. Independent of the domain key; a join uses one or the other.
pub fn extract_company_name(url: &str) -> CompanyKey {
    let stripped = LEADING_PROTOCOL.replace(url, "");
    let parts: Vec<&str> = SEGMENT_SEPARATORS.split(&stripped).collect();

    let mut kept: Vec<&str> = parts
        .iter()
        .copied()
        .filter(|part| !part.is_empty() && !COMMON_TERMS.contains(part.to_lowercase().as_str()))
        .collect();

    // Everything was boilerplate; keep the raw tokens instead.
    if kept.is_empty() {
        kept = parts.iter().copied().filter(|part| !part.is_empty()).collect();
    }

    let joined = kept.join("-");
    let without_prefix = BOILERPLATE_PREFIX.replace(&joined, "");
    let company_name = BOILERPLATE_SUFFIX.replace(&without_prefix, "").into_owned();

    if company_name.is_empty() && parts.len() >= 2 {
        return CompanyKey::new(parts[parts.len() - 2]);
    }
    CompanyKey::new(company_name)
}
