use bon::Builder;
use time::Duration;
use time::OffsetDateTime;

use super::name::Name;
use crate::error::{CertwrightError, Result};

/// Distinguished name parameters for building an X.509 certificate.
///
/// A convenience for the common attributes; convert with
/// [`to_name`](Self::to_name) and hand the result to
/// [`Certificate::set_subject`](crate::cert::Certificate::set_subject).
///
/// # Fields
/// * `common_name` - The common name (CN).
/// * `country` - The country (C).
/// * `state` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `organization` - The organization (O).
/// * `organization_unit` - The organizational unit (OU).
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    #[builder(into)]
    pub common_name: String,
    #[builder(into)]
    pub country: Option<String>,
    #[builder(into)]
    pub state: Option<String>,
    #[builder(into)]
    pub locality: Option<String>,
    #[builder(into)]
    pub organization: Option<String>,
    #[builder(into)]
    pub organization_unit: Option<String>,
}

impl DistinguishedName {
    /// Builds a [`Name`] in the order C, ST, L, O, OU, CN, leaving out unset
    /// attributes.
    pub fn to_name(&self) -> Result<Name> {
        let mut name = Name::new();
        let optional = [
            ("C", &self.country),
            ("ST", &self.state),
            ("L", &self.locality),
            ("O", &self.organization),
            ("OU", &self.organization_unit),
        ];
        for (field, value) in optional {
            if let Some(value) = value {
                name.add_entry(field, value)?;
            }
        }
        name.add_entry("CN", &self.common_name)?;
        Ok(name)
    }

    /// Picks the common attributes out of `name`. Fails if it has no CN.
    pub fn from_name(name: &Name) -> Result<Self> {
        let common_name = name
            .get("CN")
            .ok_or_else(|| CertwrightError::InvalidInput("name has no common name".to_string()))?;
        Ok(Self {
            common_name,
            country: name.get("C"),
            state: name.get("ST"),
            locality: name.get("L"),
            organization: name.get("O"),
            organization_unit: name.get("OU"),
        })
    }
}

impl TryFrom<&DistinguishedName> for Name {
    type Error = CertwrightError;

    fn try_from(value: &DistinguishedName) -> Result<Self> {
        value.to_name()
    }
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    ///
    /// # Arguments
    /// * `days` - The number of days for the validity period.
    ///
    /// # Returns
    /// A `Validity` object.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }
}
