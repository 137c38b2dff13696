//! Regional phone number validation.
//!
//! Numbers in international form (`+` followed by the country code) are
//! accepted for any region if they look like E.164. Anything else must match
//! the national format of the configured region.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;
use serde::Deserialize;

use crate::error::{IdentityError, Result};

/// Region whose national numbering plan is used for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum PhoneRegion {
    #[default]
    In,
    Us,
    Gb,
}

impl PhoneRegion {
    fn national_pattern(self) -> &'static Regex {
        static IN: OnceLock<Regex> = OnceLock::new();
        static US: OnceLock<Regex> = OnceLock::new();
        static GB: OnceLock<Regex> = OnceLock::new();

        match self {
            PhoneRegion::In => IN.get_or_init(|| {
                Regex::new(r"^(?:0|91)?[6-9]\d{9}$").expect("Failed to compile IN phone regex")
            }),
            PhoneRegion::Us => US.get_or_init(|| {
                Regex::new(r"^1?[2-9]\d{2}[2-9]\d{6}$").expect("Failed to compile US phone regex")
            }),
            PhoneRegion::Gb => GB.get_or_init(|| {
                Regex::new(r"^0\d{9,10}$").expect("Failed to compile GB phone regex")
            }),
        }
    }

    /// Generate a random number that is valid in this region.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> String {
        match self {
            PhoneRegion::In => format!(
                "{}{:09}",
                rng.gen_range(6..=9),
                rng.gen_range(0..1_000_000_000u32)
            ),
            PhoneRegion::Us => format!(
                "{}{}{:04}",
                rng.gen_range(200..=999),
                rng.gen_range(200..=999),
                rng.gen_range(0..10_000)
            ),
            PhoneRegion::Gb => format!("07{:09}", rng.gen_range(0..1_000_000_000u32)),
        }
    }
}

impl fmt::Display for PhoneRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            PhoneRegion::In => "IN",
            PhoneRegion::Us => "US",
            PhoneRegion::Gb => "GB",
        };
        f.write_str(code)
    }
}

impl FromStr for PhoneRegion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(PhoneRegion::In),
            "US" => Ok(PhoneRegion::Us),
            "GB" => Ok(PhoneRegion::Gb),
            other => Err(format!("unsupported phone region '{}'", other)),
        }
    }
}

impl TryFrom<String> for PhoneRegion {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

fn e164_pattern() -> &'static Regex {
    static E164: OnceLock<Regex> = OnceLock::new();
    E164.get_or_init(|| Regex::new(r"^\+[1-9]\d{6,14}$").expect("Failed to compile E.164 regex"))
}

/// Validate a phone number for `region` and return it trimmed.
///
/// Spaces, dots, dashes and parentheses are ignored while matching but kept
/// in the returned value.
pub fn clean_phone_number(number: &str, region: PhoneRegion) -> Result<String> {
    let trimmed = number.trim();
    let compact: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if compact.is_empty() {
        return Err(IdentityError::validation("phone_number", "Phone number is required"));
    }

    let valid = if compact.starts_with('+') {
        e164_pattern().is_match(&compact)
    } else {
        region.national_pattern().is_match(&compact)
    };

    if !valid {
        return Err(IdentityError::validation(
            "phone_number",
            format!("'{}' is not a valid {} phone number", trimmed, region),
        ));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indian_numbers() {
        assert!(clean_phone_number("9876543217", PhoneRegion::In).is_ok());
        assert!(clean_phone_number("098765 43217", PhoneRegion::In).is_ok());
        assert!(clean_phone_number("+91 98765 43217", PhoneRegion::In).is_ok());
        // Mobile numbers start with 6-9
        assert!(clean_phone_number("1876543217", PhoneRegion::In).is_err());
        assert!(clean_phone_number("98765", PhoneRegion::In).is_err());
    }

    #[test]
    fn test_us_numbers() {
        assert!(clean_phone_number("(415) 555-2671", PhoneRegion::Us).is_ok());
        assert!(clean_phone_number("1-415-555-2671", PhoneRegion::Us).is_ok());
        assert!(clean_phone_number("015-555-2671", PhoneRegion::Us).is_err());
    }

    #[test]
    fn test_gb_numbers() {
        assert!(clean_phone_number("07911 123456", PhoneRegion::Gb).is_ok());
        assert!(clean_phone_number("7911123456", PhoneRegion::Gb).is_err());
    }

    #[test]
    fn test_keeps_original_formatting() {
        let cleaned = clean_phone_number("  (415) 555-2671 ", PhoneRegion::Us).unwrap();
        assert_eq!(cleaned, "(415) 555-2671");
    }

    #[test]
    fn test_empty_and_letters_rejected() {
        assert!(matches!(
            clean_phone_number("   ", PhoneRegion::In),
            Err(IdentityError::Validation { field: "phone_number", .. })
        ));
        assert!(clean_phone_number("98765abcde", PhoneRegion::In).is_err());
    }

    #[test]
    fn test_samples_are_valid() {
        let mut rng = rand::thread_rng();
        for region in [PhoneRegion::In, PhoneRegion::Us, PhoneRegion::Gb] {
            for _ in 0..50 {
                let number = region.sample(&mut rng);
                assert!(
                    clean_phone_number(&number, region).is_ok(),
                    "{} sample {} rejected",
                    region,
                    number
                );
            }
        }
    }

    #[test]
    fn test_region_parsing() {
        assert_eq!("us".parse::<PhoneRegion>().unwrap(), PhoneRegion::Us);
        assert!("xx".parse::<PhoneRegion>().is_err());
    }

    #[test]
    fn test_region_deserializes_in_any_case() {
        use serde::de::{IntoDeserializer, value::Error};

        for (raw, expected) in [("us", PhoneRegion::Us), ("GB", PhoneRegion::Gb), ("In", PhoneRegion::In)] {
            let region: std::result::Result<PhoneRegion, Error> =
                PhoneRegion::deserialize(raw.into_deserializer());
            assert_eq!(region.unwrap(), expected);
        }

        let unknown: std::result::Result<PhoneRegion, Error> =
            PhoneRegion::deserialize("xx".into_deserializer());
        assert!(unknown.is_err());
    }
}
