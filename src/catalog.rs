//! The static source catalog: every feed polled by a run, with its category,
//! priority and display color.
//!
//! The catalog is compiled in. Lower priority numbers are more important; an
//! entry reported by several feeds keeps the best priority among them.

use std::collections::{HashMap, HashSet};

use crate::util::validate_url;

/// Category assigned when none of an entry's source names is in the catalog.
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Color paired with [`UNCATEGORIZED`].
pub const DEFAULT_COLOR: &str = "#FFFFFF";

const MEDIUM_TAG_FEED: &str = "https://medium.com/feed/tag/";

/// One feed to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub url: String,
    /// Human-readable name derived from the URL's last path segment.
    pub name: String,
    pub category: String,
    /// Lower is more important.
    pub priority: u32,
    /// Display hint, opaque to the pipeline.
    pub color: String,
    pub active: bool,
}

impl SourceRecord {
    /// Builds an active record, deriving its name from `url`.
    pub fn new(url: &str, category: &str, priority: u32, color: &str) -> Self {
        Self {
            url: url.to_string(),
            name: derive_name(url),
            category: category.to_string(),
            priority,
            color: color.to_string(),
            active: true,
        }
    }
}

struct CategoryGroup {
    category: &'static str,
    priority: u32,
    color: &'static str,
    tags: &'static [&'static str],
}

const GROUPS: &[CategoryGroup] = &[
    CategoryGroup {
        category: "Core Security",
        priority: 1,
        color: "#FF6B6B",
        tags: &[
            "cybersecurity", "information-security", "infosec", "security", "cyber-security",
            "security-research", "cyber-threat", "security-awareness",
        ],
    },
    CategoryGroup {
        category: "Bug Bounty",
        priority: 2,
        color: "#4ECDC4",
        tags: &[
            "bug-bounty", "bug-bounty-tips", "bug-bounty-writeup", "bugbounty-writeup",
            "bug-bounty-hunter", "bug-bounty-program", "ethical-hacking", "hackerone", "bugcrowd",
            "bounty-program", "bounties", "responsible-disclosure", "vulnerability-disclosure",
        ],
    },
    CategoryGroup {
        category: "Penetration Testing",
        priority: 3,
        color: "#45B7D1",
        tags: &[
            "penetration-testing", "pentesting", "pentest", "red-team", "red-teaming", "hacking",
            "exploitation", "exploit", "offensive-security", "security-testing",
        ],
    },
    CategoryGroup {
        category: "Web Security",
        priority: 4,
        color: "#96CEB4",
        tags: &[
            "web-security", "application-security", "web-application-security", "xss",
            "xss-attack", "cross-site-scripting", "sql-injection", "sqli", "ssrf", "idor", "csrf",
            "rce", "remote-code-execution", "lfi", "local-file-inclusion", "rfi", "file-upload",
            "path-traversal", "command-injection",
        ],
    },
    CategoryGroup {
        category: "API & Mobile",
        priority: 5,
        color: "#FFEAA7",
        tags: &[
            "api-security", "rest-api-security", "graphql-security", "mobile-security",
            "android-security", "ios-security", "mobile-app-security", "oauth", "jwt",
            "authentication", "authorization",
        ],
    },
    CategoryGroup {
        category: "Cloud Security",
        priority: 6,
        color: "#DDA0DD",
        tags: &[
            "cloud-security", "aws-security", "azure-security", "gcp-security",
            "google-cloud-security", "kubernetes-security", "docker-security",
            "container-security", "serverless-security", "devsecops", "infrastructure-security",
        ],
    },
    CategoryGroup {
        category: "Tools & OSINT",
        priority: 7,
        color: "#74B9FF",
        tags: &[
            "cybersecurity-tools", "security-tools", "recon", "reconnaissance", "osint", "dorking",
            "google-dorking", "google-dork", "dorks", "github-dorking", "subdomain-enumeration",
            "subdomain-takeover", "port-scanning", "vulnerability-scanning",
        ],
    },
    CategoryGroup {
        category: "Security Tools",
        priority: 8,
        color: "#A29BFE",
        tags: &[
            "burp-suite", "nmap", "metasploit", "wireshark", "nessus", "shodan", "censys",
            "masscan", "sqlmap", "nikto", "gobuster", "dirb", "ffuf", "nuclei",
        ],
    },
    CategoryGroup {
        category: "Malware & Threats",
        priority: 9,
        color: "#FD79A8",
        tags: &[
            "malware-analysis", "malware", "reverse-engineering", "threat-intelligence",
            "threat-hunting", "apt", "advanced-persistent-threat", "ransomware", "phishing",
            "social-engineering", "threat-analysis",
        ],
    },
    CategoryGroup {
        category: "Forensics & IR",
        priority: 10,
        color: "#FDCB6E",
        tags: &[
            "digital-forensics", "forensics", "incident-response", "dfir", "memory-forensics",
            "disk-forensics", "network-forensics", "mobile-forensics", "cloud-forensics",
            "volatility",
        ],
    },
    CategoryGroup {
        category: "Crypto & Privacy",
        priority: 11,
        color: "#E17055",
        tags: &[
            "cryptography", "encryption", "cryptocurrency-security", "blockchain-security",
            "smart-contract-security", "defi-security", "privacy", "data-privacy", "gdpr", "tls",
            "ssl",
        ],
    },
    CategoryGroup {
        category: "Network Security",
        priority: 12,
        color: "#00B894",
        tags: &[
            "network-security", "firewall", "ids", "ips", "vpn", "zero-trust",
            "network-monitoring", "packet-analysis", "network-forensics",
        ],
    },
    CategoryGroup {
        category: "Vuln Research",
        priority: 13,
        color: "#6C5CE7",
        tags: &[
            "vulnerability", "vulnerability-research", "cve", "zero-day", "zeroday",
            "exploit-development", "buffer-overflow", "heap-exploitation", "rop",
            "return-oriented-programming", "shellcode", "fuzzing",
        ],
    },
    CategoryGroup {
        category: "Blue Team & SOC",
        priority: 14,
        color: "#00CEC9",
        tags: &[
            "blue-team", "soc", "security-operations", "siem", "security-monitoring",
            "endpoint-security", "edr", "xdr", "security-orchestration", "soar",
        ],
    },
    CategoryGroup {
        category: "Compliance & Governance",
        priority: 15,
        color: "#FD79A8",
        tags: &[
            "compliance", "security-governance", "risk-management", "security-audit",
            "security-assessment", "pci-dss", "hipaa", "sox", "iso-27001", "nist", "cis-controls",
        ],
    },
    CategoryGroup {
        category: "AI/ML Security",
        priority: 16,
        color: "#FF6B9D",
        tags: &[
            "ai-security", "machine-learning-security", "ml-security",
            "artificial-intelligence-security", "adversarial-attacks", "model-poisoning",
            "ai-privacy", "federated-learning-security", "deepfake-detection", "ai-ethics",
            "llm-security", "chatgpt-security", "prompt-injection", "ai-poisoning",
            "model-extraction", "ai-backdoor",
        ],
    },
    CategoryGroup {
        category: "IoT & Hardware",
        priority: 17,
        color: "#4ECDC4",
        tags: &[
            "iot-security", "internet-of-things-security", "hardware-security",
            "embedded-security", "firmware-security", "hardware-hacking", "pcb-security",
            "side-channel-attacks", "automotive-security", "industrial-security",
            "scada-security", "smart-home-security",
        ],
    },
    CategoryGroup {
        category: "DevSecOps & CI/CD",
        priority: 18,
        color: "#96CEB4",
        tags: &[
            "devsecops", "cicd-security", "pipeline-security", "secure-coding", "sast", "dast",
            "iast", "software-composition-analysis", "container-scanning", "secrets-management",
            "secure-software-development", "shift-left-security",
        ],
    },
    CategoryGroup {
        category: "Social Engineering",
        priority: 19,
        color: "#FF9F43",
        tags: &[
            "social-engineering", "phishing", "pretexting", "baiting", "quid-pro-quo",
            "tailgating", "vishing", "smishing", "spear-phishing", "whaling",
            "business-email-compromise", "security-awareness-training",
        ],
    },
    CategoryGroup {
        category: "Zero Trust & Modern Architecture",
        priority: 20,
        color: "#A55EEA",
        tags: &[
            "zero-trust", "zero-trust-architecture", "zero-trust-security", "microsegmentation",
            "software-defined-perimeter", "conditional-access", "identity-verification",
            "device-trust", "network-segmentation", "secure-access-service-edge", "sase", "ztna",
        ],
    },
    CategoryGroup {
        category: "Threat Intelligence",
        priority: 21,
        color: "#26D0CE",
        tags: &[
            "threat-intelligence", "threat-hunting", "cyber-threat-intelligence",
            "indicators-of-compromise", "ioc", "tactics-techniques-procedures", "ttp",
            "mitre-attack", "mitre-att-ck", "cyber-kill-chain", "diamond-model",
            "threat-modeling",
        ],
    },
    CategoryGroup {
        category: "Privacy & Data Protection",
        priority: 22,
        color: "#FD79A8",
        tags: &[
            "data-privacy", "privacy", "gdpr", "ccpa", "data-protection", "privacy-by-design",
            "data-minimization", "consent-management", "right-to-be-forgotten",
            "privacy-impact-assessment", "data-subject-rights", "privacy-engineering",
        ],
    },
    CategoryGroup {
        category: "Quantum & Post-Quantum",
        priority: 23,
        color: "#6C5CE7",
        tags: &[
            "quantum-computing-security", "post-quantum-cryptography", "quantum-cryptography",
            "quantum-key-distribution", "quantum-resistant-algorithms", "quantum-supremacy",
            "quantum-attacks", "lattice-cryptography", "nist-pqc", "quantum-safe",
            "quantum-threat", "cryptographic-agility",
        ],
    },
    CategoryGroup {
        category: "Specialized Security",
        priority: 24,
        color: "#00B894",
        tags: &[
            "satellite-security", "space-security", "supply-chain-security", "third-party-risk",
            "vendor-risk-management", "critical-infrastructure", "operational-technology",
            "ot-security", "maritime-security", "aviation-security", "healthcare-security",
            "financial-security",
        ],
    },
    CategoryGroup {
        category: "Bug Bounty Platforms",
        priority: 25,
        color: "#E17055",
        tags: &[
            "hackerone", "bugcrowd", "intigriti", "yeswehack", "synack", "cobalt", "zerocopter",
            "federacy", "open-bug-bounty", "google-vrp", "microsoft-bounty", "facebook-bounty",
        ],
    },
];

/// Returns the compiled-in catalog in polling order.
pub fn default_catalog() -> Vec<SourceRecord> {
    build_catalog(GROUPS.iter().flat_map(|group| {
        group.tags.iter().map(move |tag| {
            SourceRecord::new(
                &format!("{MEDIUM_TAG_FEED}{tag}"),
                group.category,
                group.priority,
                group.color,
            )
        })
    }))
}

/// Normalizes a list of records into a catalog.
///
/// Records with invalid URLs are skipped. A URL listed more than once keeps
/// its first occurrence so that `url` stays unique.
pub fn build_catalog(records: impl IntoIterator<Item = SourceRecord>) -> Vec<SourceRecord> {
    let mut seen = HashSet::new();
    let mut catalog = Vec::new();

    for record in records {
        if let Err(e) = validate_url(&record.url) {
            tracing::warn!(url = %record.url, error = %e, "Skipping invalid feed URL");
            continue;
        }
        if !seen.insert(record.url.clone()) {
            tracing::debug!(
                url = %record.url,
                category = %record.category,
                "Duplicate feed URL in catalog, keeping first occurrence"
            );
            continue;
        }
        catalog.push(record);
    }

    catalog
}

/// Derives a display name from a feed URL's last path segment.
///
/// `-` separates words; known security acronyms are upper-cased (or given
/// their conventional casing), other words get an upper-case first letter.
///
/// ```
/// use secfeed::catalog::derive_name;
///
/// assert_eq!(derive_name("https://medium.com/feed/tag/sql-injection"), "SQL Injection");
/// assert_eq!(derive_name("https://medium.com/feed/tag/ios-security"), "iOS Security");
/// ```
pub fn derive_name(url: &str) -> String {
    let segment = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);

    segment
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| match acronym(word) {
            Some(fixed) => fixed.to_string(),
            None => capitalize(word),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn acronym(word: &str) -> Option<&'static str> {
    let fixed = match word.to_ascii_lowercase().as_str() {
        "xss" => "XSS",
        "sql" => "SQL",
        "api" => "API",
        "aws" => "AWS",
        "gcp" => "GCP",
        "rce" => "RCE",
        "lfi" => "LFI",
        "rfi" => "RFI",
        "csrf" => "CSRF",
        "ssrf" => "SSRF",
        "idor" => "IDOR",
        "osint" => "OSINT",
        "siem" => "SIEM",
        "soc" => "SOC",
        "edr" => "EDR",
        "xdr" => "XDR",
        "iam" => "IAM",
        "mfa" => "MFA",
        "2fa" => "2FA",
        "vpn" => "VPN",
        "tls" => "TLS",
        "ssl" => "SSL",
        "pki" => "PKI",
        "cve" => "CVE",
        "apt" => "APT",
        "ios" => "iOS",
        "gdpr" => "GDPR",
        "hipaa" => "HIPAA",
        "sox" => "SOX",
        "iso" => "ISO",
        "nist" => "NIST",
        "cis" => "CIS",
        "dfir" => "DFIR",
        "jwt" => "JWT",
        "oauth" => "OAuth",
        "defi" => "DeFi",
        "nft" => "NFT",
        "ai" => "AI",
        "ml" => "ML",
        "iot" => "IoT",
        _ => return None,
    };
    Some(fixed)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `source name -> (category, color)` lookup built once from the catalog.
///
/// When two records share a name, the first one in catalog order wins.
#[derive(Debug, Default, Clone)]
pub struct CategoryIndex {
    by_name: HashMap<String, (String, String)>,
}

impl CategoryIndex {
    pub fn new(sources: &[SourceRecord]) -> Self {
        let mut by_name = HashMap::with_capacity(sources.len());
        for source in sources {
            by_name
                .entry(source.name.clone())
                .or_insert_with(|| (source.category.clone(), source.color.clone()));
        }
        Self { by_name }
    }

    /// Category and color of the first name in `source_names` found in the
    /// catalog, or [`UNCATEGORIZED`] / [`DEFAULT_COLOR`].
    pub fn lookup<'a>(&'a self, source_names: &[String]) -> (&'a str, &'a str) {
        source_names
            .iter()
            .find_map(|name| self.by_name.get(name))
            .map(|(category, color)| (category.as_str(), color.as_str()))
            .unwrap_or((UNCATEGORIZED, DEFAULT_COLOR))
    }

    /// Category only; see [`CategoryIndex::lookup`].
    pub fn category_of<'a>(&'a self, source_names: &[String]) -> &'a str {
        self.lookup(source_names).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_name_acronyms_and_title_case() {
        assert_eq!(derive_name("https://medium.com/feed/tag/bug-bounty"), "Bug Bounty");
        assert_eq!(derive_name("https://medium.com/feed/tag/xss"), "XSS");
        assert_eq!(derive_name("https://medium.com/feed/tag/oauth"), "OAuth");
        assert_eq!(derive_name("https://medium.com/feed/tag/defi-security"), "DeFi Security");
        assert_eq!(derive_name("https://medium.com/feed/tag/iso-27001"), "ISO 27001");
        assert_eq!(derive_name("https://example.com/feeds/red-team/"), "Red Team");
    }

    #[test]
    fn test_default_catalog_has_unique_urls() {
        let catalog = default_catalog();
        let unique: HashSet<_> = catalog.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(unique.len(), catalog.len());
        assert!(catalog.iter().all(|s| s.active && s.priority >= 1));
    }

    #[test]
    fn test_default_catalog_keeps_first_occurrence() {
        let catalog = default_catalog();
        // devsecops is listed under Cloud Security (6) and DevSecOps & CI/CD (18)
        let devsecops: Vec<_> = catalog
            .iter()
            .filter(|s| s.url.ends_with("/devsecops"))
            .collect();
        assert_eq!(devsecops.len(), 1);
        assert_eq!(devsecops[0].category, "Cloud Security");
        assert_eq!(devsecops[0].priority, 6);
        assert_eq!(catalog[0].name, "Cybersecurity");
    }

    #[test]
    fn test_build_catalog_skips_invalid_urls() {
        let catalog = build_catalog(vec![
            SourceRecord::new("file:///etc/passwd", "Bad", 1, "#000000"),
            SourceRecord::new("https://example.com/feed/osint", "Tools", 2, "#111111"),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name, "OSINT");
    }

    #[test]
    fn test_category_index_first_match_and_fallback() {
        let sources = vec![
            SourceRecord::new("https://example.com/tag/osint", "Tools & OSINT", 7, "#74B9FF"),
            SourceRecord::new("https://example.com/tag/malware", "Malware", 9, "#FD79A8"),
        ];
        let index = CategoryIndex::new(&sources);

        let names = vec!["Renamed Feed".to_string(), "Malware".to_string(), "OSINT".to_string()];
        assert_eq!(index.lookup(&names), ("Malware", "#FD79A8"));

        let unknown = vec!["Gone".to_string()];
        assert_eq!(index.lookup(&unknown), (UNCATEGORIZED, DEFAULT_COLOR));
        assert_eq!(index.category_of(&[]), UNCATEGORIZED);
    }
}
