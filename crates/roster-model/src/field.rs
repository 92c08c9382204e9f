//! Canonical destination fields.
//!
//! A source column is mapped onto at most one of these fields per detector
//! run. The set is closed: the learned-mapping store keeps exactly one
//! category per variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RosterError;

/// A canonical field of the provider roster template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// National Provider Identifier, the fixed-length numeric provider id.
    Npi,
    FirstName,
    LastName,
    Gender,
    /// Credential suffixes such as MD, DO, NP.
    ProfessionalSuffix,
    /// Link or file name of the provider photo.
    Headshot,
    AdditionalLanguages,
    /// Adult, pediatric or both.
    PatientsAccepted,
    Specialty,
    LocationId,
    LocationName,
    LocationTypeRaw,
    PracticeId,
    /// Cloud practice id, `pt_`-prefixed.
    PracticeCloudId,
    PracticeName,
    AddressLine1,
    AddressLine2,
    City,
    /// Two-letter US state or DC code.
    State,
    Zip,
}

impl FieldKind {
    /// Every canonical field, in template order.
    pub const ALL: [FieldKind; 20] = [
        FieldKind::Npi,
        FieldKind::FirstName,
        FieldKind::LastName,
        FieldKind::Gender,
        FieldKind::ProfessionalSuffix,
        FieldKind::Headshot,
        FieldKind::AdditionalLanguages,
        FieldKind::PatientsAccepted,
        FieldKind::Specialty,
        FieldKind::LocationId,
        FieldKind::LocationName,
        FieldKind::LocationTypeRaw,
        FieldKind::PracticeId,
        FieldKind::PracticeCloudId,
        FieldKind::PracticeName,
        FieldKind::AddressLine1,
        FieldKind::AddressLine2,
        FieldKind::City,
        FieldKind::State,
        FieldKind::Zip,
    ];

    /// Raw key used in exported mappings (e.g. `firstName`).
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Npi => "npi",
            FieldKind::FirstName => "firstName",
            FieldKind::LastName => "lastName",
            FieldKind::Gender => "gender",
            FieldKind::ProfessionalSuffix => "professionalSuffix",
            FieldKind::Headshot => "headshot",
            FieldKind::AdditionalLanguages => "additionalLanguages",
            FieldKind::PatientsAccepted => "patientsAccepted",
            FieldKind::Specialty => "specialty",
            FieldKind::LocationId => "locationId",
            FieldKind::LocationName => "locationName",
            FieldKind::LocationTypeRaw => "locationTypeRaw",
            FieldKind::PracticeId => "practiceId",
            FieldKind::PracticeCloudId => "practiceCloudId",
            FieldKind::PracticeName => "practiceName",
            FieldKind::AddressLine1 => "addressLine1",
            FieldKind::AddressLine2 => "addressLine2",
            FieldKind::City => "city",
            FieldKind::State => "state",
            FieldKind::Zip => "zip",
        }
    }

    /// Column header of the field in the destination template.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Npi => "NPI Number",
            FieldKind::FirstName => "First Name",
            FieldKind::LastName => "Last Name",
            FieldKind::Gender => "Gender",
            FieldKind::ProfessionalSuffix => "Professional Suffix 1-3",
            FieldKind::Headshot => "Headshot Link",
            FieldKind::AdditionalLanguages => "Additional Languages Spoken 1-3",
            FieldKind::PatientsAccepted => "Patients Accepted",
            FieldKind::Specialty => "Specialty",
            FieldKind::LocationId => "Location ID",
            FieldKind::LocationName => "Location Name",
            FieldKind::LocationTypeRaw => "Location Type_Raw",
            FieldKind::PracticeId => "Practice ID",
            FieldKind::PracticeCloudId => "Practice Cloud ID",
            FieldKind::PracticeName => "Practice Name",
            FieldKind::AddressLine1 => "Address Line 1",
            FieldKind::AddressLine2 => "Address Line 2",
            FieldKind::City => "City",
            FieldKind::State => "State",
            FieldKind::Zip => "ZIP",
        }
    }

    /// True for the identifier field, the only one detected by full-scan scoring.
    pub fn is_identifier(&self) -> bool {
        matches!(self, FieldKind::Npi)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = RosterError;

    /// Accepts either the raw key or the template label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FieldKind::ALL
            .into_iter()
            .find(|field| {
                field.as_str().eq_ignore_ascii_case(wanted)
                    || field.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| RosterError::UnknownField(s.to_string()))
    }
}
