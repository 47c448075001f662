//! Stylized incident title synthesis.
//!
//! Submitted incidents get a generated codename-style title: a two-word
//! name drawn from a per-type pool, followed by a reference suffix built
//! from the incident type and the last four digits of the current unix
//! timestamp, e.g. `Phantom Hook #PHISHING_4821`. The suffix is a display
//! reference, not a uniqueness guarantee.

use chrono::Utc;
use rand::seq::SliceRandom;

const PHISHING_TITLES: &[&str] = &[
    "Poseidon Net",
    "Digital Deception",
    "Phantom Hook",
    "Shadow Bait",
    "Trojan Wave",
];

const MALWARE_TITLES: &[&str] = &[
    "Binary Storm",
    "Code Venom",
    "Cyber Plague",
    "Digital Infection",
    "System Havoc",
];

const DDOS_TITLES: &[&str] = &[
    "Tsunami Strike",
    "Digital Flood",
    "Network Storm",
    "Bandwidth Siege",
    "Traffic Tempest",
];

const DATA_BREACH_TITLES: &[&str] = &[
    "Data Eclipse",
    "Vault Break",
    "Shadow Leak",
    "Info Breach",
    "Cyber Heist",
];

const UNAUTHORIZED_ACCESS_TITLES: &[&str] = &[
    "Ghost Entry",
    "Phantom Access",
    "Shadow Gate",
    "Stealth Breach",
    "Dark Portal",
];

const RANSOMWARE_TITLES: &[&str] = &[
    "Crypto Siege",
    "Locked Vault",
    "Ransom Tide",
    "Cipher Grip",
    "Frozen Assets",
];

const DEFAULT_TITLES: &[&str] = &[
    "Cyber Incident",
    "Security Event",
    "Digital Disruption",
    "System Alert",
    "Network Event",
];

/// Generates a stylized title for an incident of the given type.
///
/// The result matches `<word> <word> #<TYPE>_<4 digits>` where `<TYPE>` is
/// the upper-cased type name with whitespace replaced by underscores.
pub fn generate_incident_title(type_name: &str) -> String {
    let pool = match type_name {
        "Phishing" => PHISHING_TITLES,
        "Malware" => MALWARE_TITLES,
        "DDoS" => DDOS_TITLES,
        "Data Breach" => DATA_BREACH_TITLES,
        "Unauthorized Access" => UNAUTHORIZED_ACCESS_TITLES,
        "Ransomware" => RANSOMWARE_TITLES,
        _ => DEFAULT_TITLES,
    };

    let name = pool
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Security Event");

    let prefix = type_prefix(type_name);
    let suffix = timestamp_suffix();

    format!("{} #{}_{}", name, prefix, suffix)
}

/// Upper-cases a type name and collapses whitespace runs to underscores.
fn type_prefix(type_name: &str) -> String {
    type_name
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Last four digits of the current unix millisecond timestamp.
fn timestamp_suffix() -> String {
    let millis = Utc::now().timestamp_millis();
    format!("{:04}", millis.rem_euclid(10_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_title_matches_expected_pattern() {
        let pattern = Regex::new(r"^\w+ \w+ #PHISHING_\d{4}$").unwrap();
        for _ in 0..20 {
            let title = generate_incident_title("Phishing");
            assert!(pattern.is_match(&title), "unexpected title: {}", title);
        }
    }

    #[test]
    fn test_multi_word_type_prefix() {
        let pattern = Regex::new(r"^\w+ \w+ #DATA_BREACH_\d{4}$").unwrap();
        let title = generate_incident_title("Data Breach");
        assert!(pattern.is_match(&title), "unexpected title: {}", title);
    }

    #[test]
    fn test_unknown_type_uses_default_pool() {
        let title = generate_incident_title("Insider Threat");
        assert!(title.contains("#INSIDER_THREAT_"));
        let name = title.split(" #").next().unwrap();
        assert!(DEFAULT_TITLES.contains(&name));
    }

    #[test]
    fn test_suffix_is_four_digits() {
        let suffix = timestamp_suffix();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
