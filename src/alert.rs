//! Security alert records for the three GitHub alert feeds.
//!
//! Each feed has its own payload shape; [`Alert`] ties them together with
//! accessors for the fields every kind carries.

use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    CodeScanning,
    Dependabot,
    SecretScanning,
}

impl AlertKind {
    /// Value written to the report's "Alert Type" column.
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::CodeScanning => "Code Scanning",
            AlertKind::Dependabot => "Dependabot",
            AlertKind::SecretScanning => "Secret Scanning",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeScanningAlert {
    pub number: u64,
    pub rule: CodeScanningRule,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeScanningRule {
    pub description: String,
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependabotAlert {
    pub number: u64,
    pub security_advisory: SecurityAdvisory,
    pub vulnerable_version_range: Option<String>,
    /// Newer payloads carry package and range information here instead.
    #[serde(default)]
    pub security_vulnerability: Option<SecurityVulnerability>,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityAdvisory {
    pub description: Option<String>,
    pub severity: String,
    pub package: Option<AdvisoryPackage>,
    pub patched_versions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryPackage {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityVulnerability {
    pub package: Option<AdvisoryPackage>,
    pub vulnerable_version_range: Option<String>,
    pub first_patched_version: Option<PatchedVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatchedVersion {
    pub identifier: String,
}

impl DependabotAlert {
    pub fn package_name(&self) -> Option<&str> {
        self.security_advisory
            .package
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .or_else(|| {
                self.security_vulnerability
                    .as_ref()
                    .and_then(|v| v.package.as_ref())
                    .and_then(|p| p.name.as_deref())
            })
    }

    pub fn vulnerable_range(&self) -> Option<&str> {
        self.vulnerable_version_range.as_deref().or_else(|| {
            self.security_vulnerability
                .as_ref()
                .and_then(|v| v.vulnerable_version_range.as_deref())
        })
    }

    pub fn patched_versions(&self) -> Option<&str> {
        self.security_advisory.patched_versions.as_deref().or_else(|| {
            self.security_vulnerability
                .as_ref()
                .and_then(|v| v.first_patched_version.as_ref())
                .map(|p| p.identifier.as_str())
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecretScanningAlert {
    pub number: u64,
    pub secret_type_display_name: String,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
}

#[derive(Debug, Clone)]
pub enum Alert {
    CodeScanning(CodeScanningAlert),
    Dependabot(DependabotAlert),
    SecretScanning(SecretScanningAlert),
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        match self {
            Alert::CodeScanning(_) => AlertKind::CodeScanning,
            Alert::Dependabot(_) => AlertKind::Dependabot,
            Alert::SecretScanning(_) => AlertKind::SecretScanning,
        }
    }

    pub fn number(&self) -> u64 {
        match self {
            Alert::CodeScanning(a) => a.number,
            Alert::Dependabot(a) => a.number,
            Alert::SecretScanning(a) => a.number,
        }
    }

    pub fn state(&self) -> &str {
        match self {
            Alert::CodeScanning(a) => &a.state,
            Alert::Dependabot(a) => &a.state,
            Alert::SecretScanning(a) => &a.state,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            Alert::CodeScanning(a) => &a.created_at,
            Alert::Dependabot(a) => &a.created_at,
            Alert::SecretScanning(a) => &a.created_at,
        }
    }

    pub fn updated_at(&self) -> &str {
        match self {
            Alert::CodeScanning(a) => &a.updated_at,
            Alert::Dependabot(a) => &a.updated_at,
            Alert::SecretScanning(a) => &a.updated_at,
        }
    }

    pub fn html_url(&self) -> &str {
        match self {
            Alert::CodeScanning(a) => &a.html_url,
            Alert::Dependabot(a) => &a.html_url,
            Alert::SecretScanning(a) => &a.html_url,
        }
    }
}
