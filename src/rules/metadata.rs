use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Static description of a rule. Immutable once registered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Globally unique, stable identifier (e.g., "AVD-GCP-0023").
    pub id: String,
    /// Older or alternate identifiers resolving to the same rule.
    #[serde(default)]
    pub aliases: Vec<String>,
    pub provider: Provider,
    pub service: String,
    /// Kebab-case slug, unique within provider + service.
    pub short_code: String,
    pub summary: String,
    pub impact: String,
    pub resolution: String,
    pub explanation: String,
    #[serde(default)]
    pub links: Vec<String>,
    pub severity: Severity,
    /// Example fixtures keyed by configuration language (e.g., "terraform").
    #[serde(default)]
    pub examples: BTreeMap<String, LanguageExamples>,
}

impl RuleMetadata {
    /// `{provider}-{service}-{short_code}`, the human-facing rule name.
    pub fn long_id(&self) -> String {
        format!("{}-{}-{}", self.provider, self.service, self.short_code)
    }

    /// Every name this rule answers to: id, aliases, long id.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.aliases.len() + 2);
        names.push(self.id.clone());
        names.extend(self.aliases.iter().cloned());
        let long_id = self.long_id();
        if !names.contains(&long_id) {
            names.push(long_id);
        }
        names
    }
}

/// Per-language fixtures and remediation guidance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageExamples {
    #[serde(default)]
    pub good: Vec<String>,
    #[serde(default)]
    pub bad: Vec<String>,
    #[serde(default)]
    pub remediation_markdown: String,
    #[serde(default)]
    pub links: Vec<String>,
}

impl LanguageExamples {
    pub fn is_empty(&self) -> bool {
        self.good.is_empty() && self.bad.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Azure,
    Cloudstack,
    Digitalocean,
    Github,
    Google,
    Kubernetes,
    Nifcloud,
    Openstack,
    Oracle,
    #[default]
    Unknown,
}

impl Provider {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aws" => Some(Self::Aws),
            "azure" => Some(Self::Azure),
            "cloudstack" => Some(Self::Cloudstack),
            "digitalocean" => Some(Self::Digitalocean),
            "github" => Some(Self::Github),
            "google" | "gcp" => Some(Self::Google),
            "kubernetes" | "k8s" => Some(Self::Kubernetes),
            "nifcloud" => Some(Self::Nifcloud),
            "openstack" => Some(Self::Openstack),
            "oracle" => Some(Self::Oracle),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Azure => write!(f, "azure"),
            Self::Cloudstack => write!(f, "cloudstack"),
            Self::Digitalocean => write!(f, "digitalocean"),
            Self::Github => write!(f, "github"),
            Self::Google => write!(f, "google"),
            Self::Kubernetes => write!(f, "kubernetes"),
            Self::Nifcloud => write!(f, "nifcloud"),
            Self::Openstack => write!(f, "openstack"),
            Self::Oracle => write!(f, "oracle"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "info" | "informational" => Some(Self::Informational),
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Informational => write!(f, "informational"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}
