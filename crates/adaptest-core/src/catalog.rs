//! The fixed CISSP domain catalog.
//!
//! Static configuration: eight domains, each with an ordered topic list.
//! Never mutated at runtime.

use crate::model::DomainId;

/// One subject domain of the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub id: DomainId,
    pub name: &'static str,
    pub short: &'static str,
    pub topics: &'static [&'static str],
}

pub const DOMAINS: [Domain; 8] = [
    Domain {
        id: 1,
        name: "Security & Risk Management",
        short: "Risk Mgmt",
        topics: &[
            "risk management",
            "BIA",
            "threat modeling",
            "security policies",
            "ALE calculations",
            "business continuity",
            "legal regulations",
            "due care",
        ],
    },
    Domain {
        id: 2,
        name: "Asset Security",
        short: "Asset Sec",
        topics: &[
            "data classification",
            "data lifecycle",
            "media sanitization",
            "data ownership",
            "privacy protection",
            "data remanence",
            "retention policies",
        ],
    },
    Domain {
        id: 3,
        name: "Security Architecture & Engineering",
        short: "Architecture",
        topics: &[
            "cryptography",
            "PKI",
            "security models",
            "Bell-LaPadula",
            "Biba",
            "Clark-Wilson",
            "TPM",
            "cloud security",
            "secure design principles",
        ],
    },
    Domain {
        id: 4,
        name: "Communication & Network Security",
        short: "Network Sec",
        topics: &[
            "OSI model",
            "firewalls",
            "VPN",
            "IPSec",
            "TLS",
            "wireless security",
            "DMZ",
            "network attacks",
            "VLAN",
            "network protocols",
        ],
    },
    Domain {
        id: 5,
        name: "Identity & Access Management",
        short: "IAM",
        topics: &[
            "authentication",
            "MFA",
            "SSO",
            "SAML",
            "OAuth",
            "Kerberos",
            "RBAC",
            "MAC",
            "DAC",
            "provisioning",
            "identity federation",
        ],
    },
    Domain {
        id: 6,
        name: "Security Assessment & Testing",
        short: "Assessment",
        topics: &[
            "penetration testing",
            "vulnerability assessment",
            "security audits",
            "CVSS",
            "log review",
            "black box testing",
            "OWASP",
            "SOC reports",
        ],
    },
    Domain {
        id: 7,
        name: "Security Operations",
        short: "Sec Ops",
        topics: &[
            "incident response",
            "digital forensics",
            "disaster recovery",
            "backup strategies",
            "SIEM",
            "chain of custody",
            "RTO RPO",
            "change management",
        ],
    },
    Domain {
        id: 8,
        name: "Software Development Security",
        short: "Dev Sec",
        topics: &[
            "SDLC",
            "DevSecOps",
            "OWASP Top 10",
            "secure coding",
            "input validation",
            "static analysis",
            "software testing",
            "application threats",
        ],
    },
];

/// Look up a domain by id.
pub fn domain(id: DomainId) -> Option<&'static Domain> {
    DOMAINS.iter().find(|d| d.id == id)
}

/// Parse a comma-separated domain list ("1,3,5") or "all".
pub fn parse_domain_list(s: &str) -> Result<Vec<DomainId>, String> {
    if s.trim().eq_ignore_ascii_case("all") {
        return Ok(DOMAINS.iter().map(|d| d.id).collect());
    }
    s.split(',')
        .map(|part| {
            let part = part.trim().trim_start_matches(['D', 'd']);
            part.parse::<DomainId>()
                .ok()
                .filter(|id| domain(*id).is_some())
                .ok_or_else(|| format!("invalid domain: '{part}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_eight_domains_in_order() {
        let ids: Vec<DomainId> = DOMAINS.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(DOMAINS.iter().all(|d| d.topics.len() >= 7));
    }

    #[test]
    fn lookup() {
        assert_eq!(domain(5).map(|d| d.short), Some("IAM"));
        assert!(domain(0).is_none());
        assert!(domain(9).is_none());
    }

    #[test]
    fn parse_lists() {
        assert_eq!(parse_domain_list("all").unwrap().len(), 8);
        assert_eq!(parse_domain_list("1, D3,5").unwrap(), vec![1, 3, 5]);
        assert!(parse_domain_list("2,9").is_err());
        assert!(parse_domain_list("x").is_err());
    }
}
