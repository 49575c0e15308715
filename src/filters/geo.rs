// src/filters/geo.rs
//! Geographic filter: admits only locations unambiguously inside the target
//! country (United States by default).
//!
//! Rules run in strict priority order over the lower-cased location:
//!
//! 1. empty → reject
//! 2. negative keyword (foreign country/city, "remote - uk", ...) → reject
//! 3. positive keyword ("united states", "(usa)", "remote - us", ...) → accept
//! 4. bare location-agnostic word ("remote", "worldwide", ...) → reject
//! 5. a trailing comma component starting with a subdivision code ("Austin, TX") → accept;
//!    a code written all in lowercase is an ordinary word here ("Remote, or hybrid")
//! 6. a full subdivision name ("Colorado") → accept
//! 7. a standalone two-letter uppercase subdivision code ("Remote TX") → accept
//! 8. a major target-country city → accept
//! 9. otherwise → reject
//!
//! Negatives come first: they short-circuit positives and every later heuristic.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ingest::types::GeoPolicy;

/// Which rule settled a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoRule {
    Empty,
    Negative,
    Positive,
    BareAgnostic,
    TrailingCode,
    SubdivisionName,
    UppercaseCode,
    City,
    NoMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoDecision {
    pub accepted: bool,
    pub rule: GeoRule,
}

impl GeoDecision {
    fn accept(rule: GeoRule) -> Self {
        Self {
            accepted: true,
            rule,
        }
    }
    fn reject(rule: GeoRule) -> Self {
        Self {
            accepted: false,
            rule,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeoFilter {
    negative: Vec<String>,
    /// Target phrases that embed a negative token ("new mexico") and are
    /// blanked out before the negative scan.
    masked: Vec<String>,
    positive: Vec<String>,
    bare: HashSet<String>,
    codes: HashSet<String>,
    subdivisions: Vec<String>,
    cities: Vec<String>,
}

impl Default for GeoFilter {
    fn default() -> Self {
        Self::united_states()
    }
}

fn owned(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

impl GeoFilter {
    pub fn united_states() -> Self {
        Self {
            negative: owned(us::NEGATIVE),
            masked: owned(us::MASKED),
            positive: owned(us::POSITIVE),
            bare: us::BARE.iter().map(|s| s.to_string()).collect(),
            codes: us::STATES.iter().map(|(code, _)| code.to_string()).collect(),
            subdivisions: us::STATES.iter().map(|(_, name)| name.to_string()).collect(),
            cities: owned(us::CITIES),
        }
    }

    /// Full classification of one location string.
    pub fn classify(&self, location: &str) -> GeoDecision {
        let trimmed = location.trim();
        let lower = trimmed.to_lowercase();

        // 1
        if lower.is_empty() {
            return GeoDecision::reject(GeoRule::Empty);
        }

        // 2
        let mut unmasked = lower.clone();
        for m in &self.masked {
            unmasked = unmasked.replace(m.as_str(), " ");
        }
        if self.negative.iter().any(|n| contains_phrase(&unmasked, n)) {
            return GeoDecision::reject(GeoRule::Negative);
        }

        // 3
        if self.positive.iter().any(|p| contains_phrase(&lower, p)) {
            return GeoDecision::accept(GeoRule::Positive);
        }

        // 4
        if self.bare.contains(lower.as_str()) {
            return GeoDecision::reject(GeoRule::BareAgnostic);
        }

        // 5
        let trailing_code = trimmed.split(',').skip(1).any(|part| {
            part.split_whitespace()
                .next()
                .map(|tok| tok.trim_matches(|c: char| !c.is_alphanumeric()))
                .filter(|tok| !tok.chars().all(char::is_lowercase))
                .is_some_and(|tok| self.codes.contains(tok.to_lowercase().as_str()))
        });
        if trailing_code {
            return GeoDecision::accept(GeoRule::TrailingCode);
        }

        // 6
        if self.subdivisions.iter().any(|s| contains_phrase(&lower, s)) {
            return GeoDecision::accept(GeoRule::SubdivisionName);
        }

        // 7
        static RE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2}\b").unwrap());
        if RE_CODE
            .find_iter(trimmed)
            .any(|m| self.codes.contains(m.as_str().to_lowercase().as_str()))
        {
            return GeoDecision::accept(GeoRule::UppercaseCode);
        }

        // 8
        if self.cities.iter().any(|c| contains_phrase(&lower, c)) {
            return GeoDecision::accept(GeoRule::City);
        }

        // 9
        GeoDecision::reject(GeoRule::NoMatch)
    }

    /// Default predicate: blank locations are rejected.
    pub fn is_target(&self, location: &str) -> bool {
        self.classify(location).accepted
    }

    /// Looser predicate for sources that filter by country server-side: a blank
    /// location is taken on trust.
    pub fn is_target_lenient(&self, location: &str) -> bool {
        location.trim().is_empty() || self.is_target(location)
    }

    pub fn admits(&self, location: &str, policy: GeoPolicy) -> bool {
        match policy {
            GeoPolicy::Strict => self.is_target(location),
            GeoPolicy::AllowBlank => self.is_target_lenient(location),
        }
    }
}

/// Substring match that respects word boundaries on alphanumeric edges, so
/// "india" does not fire inside "indiana" while "(usa)" still matches verbatim.
fn contains_phrase(hay: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let edge_left = phrase.chars().next().is_some_and(char::is_alphanumeric);
    let edge_right = phrase.chars().next_back().is_some_and(char::is_alphanumeric);

    let mut start = 0;
    while let Some(pos) = hay[start..].find(phrase) {
        let i = start + pos;
        let j = i + phrase.len();
        let left_ok = !edge_left || hay[..i].chars().next_back().map_or(true, |c| !c.is_alphanumeric());
        let right_ok = !edge_right || hay[j..].chars().next().map_or(true, |c| !c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        start = i + hay[i..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

mod us {
    pub const NEGATIVE: &[&str] = &[
        // countries and regions
        "india", "canada", "united kingdom", "uk", "england", "scotland", "wales", "ireland",
        "germany", "deutschland", "france", "spain", "portugal", "italy", "netherlands",
        "belgium", "switzerland", "austria", "poland", "romania", "ukraine", "sweden", "norway",
        "denmark", "finland", "czech republic", "czechia", "hungary", "greece", "turkey",
        "israel", "uae", "united arab emirates", "saudi arabia", "egypt", "nigeria", "kenya",
        "south africa", "brazil", "argentina", "chile", "colombia", "peru", "mexico",
        "philippines", "vietnam", "thailand", "malaysia", "singapore", "indonesia", "china",
        "hong kong", "taiwan", "japan", "korea", "australia", "new zealand", "pakistan",
        "bangladesh", "sri lanka", "europe", "emea", "apac", "latam", "asia",
        // provinces and cities
        "ontario", "quebec", "british columbia", "alberta", "bangalore", "bengaluru",
        "hyderabad", "chennai", "pune", "mumbai", "delhi", "noida", "gurgaon", "gurugram",
        "kolkata", "london", "edinburgh", "paris", "amsterdam", "madrid", "barcelona", "lisbon",
        "warsaw", "krakow", "bucharest", "kyiv", "stockholm", "copenhagen", "zurich", "berlin",
        "munich", "münchen", "hamburg", "cologne", "prague", "brussels", "oslo", "helsinki", "toronto",
        "vancouver", "montreal", "ottawa", "calgary", "sao paulo", "são paulo", "buenos aires",
        "bogota", "manila", "tokyo", "seoul", "sydney", "melbourne", "tel aviv", "dubai",
        "cairo", "lagos", "nairobi", "cape town",
        // remote with a foreign region
        "remote - uk", "remote - eu", "remote - europe", "remote - canada", "remote - india",
        "remote - latam", "remote - emea", "remote - apac",
    ];

    pub const MASKED: &[&str] = &["new mexico", "new england"];

    pub const POSITIVE: &[&str] = &[
        "united states", "united states of america", "usa", "u.s.a.", "u.s.", "(us)",
        "(usa)", "us", "remote - us", "remote - usa", "remote (us)", "us remote", "us-remote",
        "anywhere in the us", "us only", "nationwide",
    ];

    pub const BARE: &[&str] = &[
        "remote", "worldwide", "anywhere", "global", "remote - anywhere", "remote - worldwide",
        "remote - global", "distributed", "work from home", "wfh", "hybrid", "on-site",
        "onsite", "in office", "multiple locations", "various", "flexible", "remote first",
        "remote-first", "home based", "home-based",
    ];

    pub const STATES: &[(&str, &str)] = &[
        ("al", "alabama"), ("ak", "alaska"), ("az", "arizona"), ("ar", "arkansas"),
        ("ca", "california"), ("co", "colorado"), ("ct", "connecticut"), ("de", "delaware"),
        ("fl", "florida"), ("ga", "georgia"), ("hi", "hawaii"), ("id", "idaho"),
        ("il", "illinois"), ("in", "indiana"), ("ia", "iowa"), ("ks", "kansas"),
        ("ky", "kentucky"), ("la", "louisiana"), ("me", "maine"), ("md", "maryland"),
        ("ma", "massachusetts"), ("mi", "michigan"), ("mn", "minnesota"), ("ms", "mississippi"),
        ("mo", "missouri"), ("mt", "montana"), ("ne", "nebraska"), ("nv", "nevada"),
        ("nh", "new hampshire"), ("nj", "new jersey"), ("nm", "new mexico"), ("ny", "new york"),
        ("nc", "north carolina"), ("nd", "north dakota"), ("oh", "ohio"), ("ok", "oklahoma"),
        ("or", "oregon"), ("pa", "pennsylvania"), ("ri", "rhode island"),
        ("sc", "south carolina"), ("sd", "south dakota"), ("tn", "tennessee"), ("tx", "texas"),
        ("ut", "utah"), ("vt", "vermont"), ("va", "virginia"), ("wa", "washington"),
        ("wv", "west virginia"), ("wi", "wisconsin"), ("wy", "wyoming"),
        ("dc", "district of columbia"),
    ];

    pub const CITIES: &[&str] = &[
        "new york city", "nyc", "san francisco", "los angeles", "seattle", "austin", "boston",
        "chicago", "denver", "atlanta", "dallas", "houston", "miami", "phoenix",
        "philadelphia", "san diego", "san jose", "portland", "minneapolis", "detroit",
        "pittsburgh", "salt lake city", "raleigh", "charlotte", "nashville", "bay area",
        "silicon valley", "brooklyn", "manhattan", "palo alto", "mountain view", "sunnyvale",
        "menlo park", "redmond", "bellevue", "st. louis", "kansas city", "columbus",
        "indianapolis", "baltimore", "las vegas", "orlando", "tampa", "sacramento",
        "san antonio", "reston", "mclean", "plano", "irvine", "santa clara", "boulder",
        "milwaukee", "cincinnati", "cleveland", "omaha", "albuquerque",
    ];
}
