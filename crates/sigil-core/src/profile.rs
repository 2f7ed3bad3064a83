//! Profile trust and completeness scoring
//!
//! Pure functions over profile and verification data. No crypto; lives here
//! because the identity store consumes these next to the key material.

use serde::{Deserialize, Serialize};

/// Cap on the trust level a profile can accumulate.
pub const MAX_TRUST_LEVEL: u32 = 99;

/// One social-proof verification attached to a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub service: String,
    pub identifier: String,
    pub valid: bool,
}

/// The subset of a profile the scoring functions look at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Count of valid verifications, capped at [`MAX_TRUST_LEVEL`].
pub fn calculate_trust_level(verifications: &[Verification]) -> u32 {
    verifications
        .iter()
        .filter(|v| v.valid)
        .take(MAX_TRUST_LEVEL as usize)
        .count() as u32
}

/// Fraction of profile items considered complete, in `0.0..=1.0`.
///
/// Two items count: a non-empty name, and at most one verification.
pub fn calculate_profile_completeness(
    profile: &Profile,
    verifications: &[Verification],
) -> f64 {
    const TOTAL_ITEMS: u32 = 2;
    const MAX_VERIFICATION_ITEMS: u32 = 1;

    let mut complete = 0;

    if profile.name.as_deref().is_some_and(|name| !name.is_empty()) {
        complete += 1;
    }

    complete += calculate_trust_level(verifications).min(MAX_VERIFICATION_ITEMS);

    f64::from(complete) / f64::from(TOTAL_ITEMS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verification(valid: bool) -> Verification {
        Verification {
            service: "github".to_string(),
            identifier: "someone".to_string(),
            valid,
        }
    }

    #[test]
    fn test_trust_level_counts_valid_only() {
        assert_eq!(calculate_trust_level(&[]), 0);
        assert_eq!(
            calculate_trust_level(&[verification(true), verification(false), verification(true)]),
            2
        );
    }

    #[test]
    fn test_trust_level_is_capped() {
        let many: Vec<Verification> = (0..150).map(|_| verification(true)).collect();
        assert_eq!(calculate_trust_level(&many), MAX_TRUST_LEVEL);
    }

    #[test]
    fn test_completeness_empty_profile() {
        let profile = Profile::default();
        assert_eq!(calculate_profile_completeness(&profile, &[]), 0.0);
    }

    #[test]
    fn test_completeness_name_only() {
        let profile = Profile {
            name: Some("Satoshi".to_string()),
            ..Profile::default()
        };
        assert_eq!(calculate_profile_completeness(&profile, &[]), 0.5);
    }

    #[test]
    fn test_completeness_empty_name_does_not_count() {
        let profile = Profile {
            name: Some(String::new()),
            ..Profile::default()
        };
        assert_eq!(calculate_profile_completeness(&profile, &[]), 0.0);
    }

    #[test]
    fn test_completeness_full() {
        let profile = Profile {
            name: Some("Satoshi".to_string()),
            ..Profile::default()
        };
        // More verifications than the single counted item
        let verifications = vec![verification(true), verification(true)];
        assert_eq!(calculate_profile_completeness(&profile, &verifications), 1.0);
    }

    #[test]
    fn test_completeness_verification_only() {
        let profile = Profile::default();
        assert_eq!(
            calculate_profile_completeness(&profile, &[verification(true)]),
            0.5
        );
    }
}
