// src/matching/url.rs - Domain-based company key extraction
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::net::IpAddr;
use url::Url as StdUrl;

use crate::models::core::CompanyKey;

static DUPLICATED_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://http//").expect("valid duplicated-scheme pattern"));
static HAS_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("valid scheme pattern"));
static NETLOC_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([a-z0-9+.\-]*:)?//").expect("valid netloc prefix pattern"));

/// Registrable names whose URLs identify a company by profile path, not host.
const SOCIAL_PROFILE_HOSTS: [&str; 3] = ["linkedin", "facebook", "zaubacorp"];
const PROFILE_MARKERS: [&str; 2] = ["/company/", "/in/"];

/// Shared-platform names under which the tenant subdomain is the brand.
const HOSTING_PLATFORM_NAMES: [&str; 4] = ["business", "webflow", "site", "com"];

const BOILERPLATE_SEGMENTS: [&str; 8] = [
    "www", "web", "corp", "corporate", "about", "info", "shop", "company",
];

pub static COUNTRY_CODES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ac", "ad", "ae", "af", "ag", "ai", "al", "am", "ao", "aq", "ar", "as", "at", "au", "aw", "ax", "az",
        "ba", "bb", "bd", "be", "bf", "bg", "bh", "bi", "bj", "bl", "bm", "bn", "bo", "bq", "br", "bs", "bt",
        "bv", "bw", "by", "bz", "ca", "cc", "cd", "cf", "cg", "ch", "ci", "ck", "cl", "cm", "cn", "co", "cr",
        "cu", "cv", "cw", "cx", "cy", "cz", "de", "dj", "dk", "dm", "do", "dz", "ec", "ee", "eg", "eh", "er",
        "es", "et", "eu", "fi", "fj", "fk", "fm", "fo", "fr", "ga", "gb", "gd", "ge", "gf", "gg", "gh", "gi",
        "gl", "gm", "gn", "gp", "gq", "gr", "gs", "gt", "gu", "gw", "gy", "hk", "hm", "hn", "hr", "ht", "hu",
        "id", "ie", "il", "im", "in", "io", "iq", "ir", "is", "it", "je", "jm", "jo", "jp", "ke", "kg", "kh",
        "ki", "km", "kn", "kp", "kr", "kw", "ky", "kz", "la", "lb", "lc", "li", "lk", "lr", "ls", "lt", "lu",
        "lv", "ly", "ma", "mc", "md", "me", "mf", "mg", "mh", "mk", "ml", "mm", "mn", "mo", "mp", "mq", "mr",
        "ms", "mt", "mu", "mv", "mw", "mx", "my", "mz", "na", "nc", "ne", "nf", "ng", "ni", "nl", "no", "np",
        "nr", "nu", "nz", "om", "pa", "pe", "pf", "pg", "ph", "pk", "pl", "pm", "pn", "pr", "ps", "pt", "pw",
        "py", "qa", "re", "ro", "rs", "ru", "rw", "sa", "sb", "sc", "sd", "se", "sg", "sh", "si", "sk", "sl",
        "sm", "sn", "so", "sr", "ss", "st", "sv", "sx", "sy", "sz", "tc", "td", "tf", "tg", "th", "tj", "tk",
        "tl", "tm", "tn", "to", "tr", "tt", "tv", "tw", "tz", "ua", "ug", "uk", "us", "uy", "uz", "va", "vc",
        "ve", "vg", "vi", "vn", "vu", "wf", "ws", "ye", "yt", "za", "zm", "zw",
    ]
    .into_iter()
    .collect()
});

/// A host split along public-suffix boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostParts {
    pub subdomain: String,
    pub name: String,
    pub suffix: String,
}

impl HostParts {
    /// `name.suffix`, skipping whichever side is empty.
    pub fn registrable_domain(&self) -> String {
        match (self.name.is_empty(), self.suffix.is_empty()) {
            (false, false) => format!("{}.{}", self.name, self.suffix),
            (false, true) => self.name.clone(),
            (true, _) => self.suffix.clone(),
        }
    }
}

/// Derives the company key for a URL. Never fails: unparsable input degrades
/// to whatever host-like text can be recovered, lowercased.
pub fn extract_domain_and_company(url: &str) -> CompanyKey {
    let url = repair_scheme(url);
    let parts = split_host(&url);

    if SOCIAL_PROFILE_HOSTS.contains(&parts.name.as_str()) {
        let profile = extract_profile_slug(&url);
        if !profile.is_empty() {
            return CompanyKey::new(profile);
        }
    }

    let registrable = parts.registrable_domain();
    let company_name = if !parts.subdomain.is_empty()
        && (COUNTRY_CODES.contains(parts.name.as_str())
            || HOSTING_PLATFORM_NAMES.contains(&parts.name.as_str()))
    {
        format!("{}.{}", parts.subdomain, registrable)
    } else {
        registrable
    };

    let cleaned: Vec<&str> = company_name
        .split('.')
        .filter(|segment| !is_boilerplate_segment(segment))
        .collect();

    CompanyKey::new(cleaned.join(".").to_lowercase())
}

/// `https://http//host` and `http://http//host` both become `http://host`.
pub fn repair_scheme(url: &str) -> String {
    DUPLICATED_SCHEME.replace(url, "http://").into_owned()
}

fn is_boilerplate_segment(segment: &str) -> bool {
    let lowered = segment.to_lowercase();
    BOILERPLATE_SEGMENTS.contains(&lowered.as_str())
}

/// Splits the URL's host into subdomain, registrable name and ICANN public
/// suffix. Hosts with no known suffix keep their last label as the name.
pub fn split_host(url: &str) -> HostParts {
    let host = host_of(url);
    if host.is_empty() {
        return HostParts::default();
    }
    if is_ip_address(&host) {
        return HostParts {
            name: host,
            ..Default::default()
        };
    }

    match icann_suffix(&host) {
        Some(suffix) => {
            let prefix = host
                .strip_suffix(suffix)
                .and_then(|p| p.strip_suffix('.'))
                .unwrap_or("");
            let (subdomain, name) = split_last_label(prefix);
            HostParts {
                subdomain: subdomain.to_string(),
                name: name.to_string(),
                suffix: suffix.to_string(),
            }
        }
        None => {
            let (subdomain, name) = split_last_label(&host);
            HostParts {
                subdomain: subdomain.to_string(),
                name: name.to_string(),
                suffix: String::new(),
            }
        }
    }
}

fn split_last_label(host: &str) -> (&str, &str) {
    match host.rsplit_once('.') {
        Some((rest, last)) => (rest, last),
        None => ("", host),
    }
}

/// Longest matching suffix from the ICANN section of the public suffix list.
/// Suffixes from the private section resolve to their ICANN parent.
fn icann_suffix(host: &str) -> Option<&str> {
    let suffix = psl::suffix(host.as_bytes())?;
    if !suffix.is_known() {
        return None;
    }
    let suffix_len = suffix.as_bytes().len();
    if suffix_len > host.len() {
        return None;
    }
    let matched = &host[host.len() - suffix_len..];

    match suffix.typ() {
        Some(psl::Type::Private) => {
            let (_, parent) = matched.split_once('.')?;
            icann_suffix(&host[host.len() - parent.len()..])
        }
        _ => Some(matched),
    }
}

fn host_of(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let with_scheme: Cow<str> = if HAS_SCHEME.is_match(trimmed) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("http://{}", trimmed.trim_start_matches('/')))
    };

    let host = StdUrl::parse(&with_scheme)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| netloc_host(trimmed));

    host.trim_start_matches('[')
        .trim_end_matches(']')
        .trim_matches('.')
        .to_lowercase()
}

/// Manual authority extraction for strings the URL parser rejects.
fn netloc_host(url: &str) -> String {
    let without_scheme = NETLOC_PREFIX.replace(url, "");
    let authority = without_scheme
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    let host_port = authority.rsplit('@').next().unwrap_or("");
    let host = if host_port.starts_with('[') {
        host_port.split(']').next().unwrap_or("")
    } else {
        host_port.split(':').next().unwrap_or("")
    };
    host.trim().to_string()
}

pub fn is_ip_address(candidate: &str) -> bool {
    candidate
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
}

/// Profile slug from a social or registry URL: the last path segment after a
/// `/company/` or `/in/` marker, or the whole string when neither occurs,
/// reduced to lowercase alphanumerics, hyphens and underscores.
pub fn extract_profile_slug(url: &str) -> String {
    let lowered = url.to_ascii_lowercase();
    let cut = [lowered.find('?'), lowered.find("/about")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(url.len());
    let decoded = percent_decode_str(&url[..cut]).decode_utf8_lossy();

    let decoded_lower = decoded.to_lowercase();
    let entity: &str = if PROFILE_MARKERS.iter().any(|m| decoded_lower.contains(m)) {
        decoded.trim_end_matches('/').rsplit('/').next().unwrap_or("")
    } else {
        &decoded
    };

    entity
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
