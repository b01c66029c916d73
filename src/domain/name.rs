//! Splitting a domain name into registrable label and public suffix

use std::fmt;

use crate::domain::error::DomainError;

/// A registrable domain split the way the registrar addresses it:
/// `example.co.uk` becomes SLD `example` and TLD `co.uk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainName {
    pub sld: String,
    pub tld: String,
}

impl DomainName {
    /// Parse a fully qualified name against the public suffix list.
    ///
    /// Subdomains are reduced to their registrable part. A bare suffix
    /// (e.g. `co.uk`) has no label and is rejected.
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        let normalized = name.trim().trim_end_matches('.').to_ascii_lowercase();
        if normalized.is_empty() || normalized.split('.').any(str::is_empty) {
            return Err(DomainError::UnparseableName(name.to_string()));
        }

        let registrable = psl::domain_str(&normalized)
            .ok_or_else(|| DomainError::UnparseableName(name.to_string()))?;
        let suffix = psl::suffix_str(registrable)
            .ok_or_else(|| DomainError::UnparseableName(name.to_string()))?;

        let sld = registrable
            .strip_suffix(suffix)
            .and_then(|rest| rest.strip_suffix('.'))
            .filter(|label| !label.is_empty())
            .ok_or_else(|| DomainError::UnparseableName(name.to_string()))?;

        Ok(Self {
            sld: sld.to_string(),
            tld: suffix.to_string(),
        })
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.sld, self.tld)
    }
}
