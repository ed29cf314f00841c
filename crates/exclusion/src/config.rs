use core_types::{ChannelType, SubChannel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-call exclusion configuration. Passed explicitly into the engine on
/// every invocation; there is no process-wide exclusion state, so several
/// reporting scenarios can be evaluated side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExclusionConfig {
    /// Remove the employee channel's contribution from DTC.
    #[serde(default)]
    pub exclude_employee_channel: bool,
    /// Remove the social channel's contribution from DTC.
    #[serde(default)]
    pub exclude_social: bool,
    /// Derived channels to produce, in addition to those the flags imply.
    #[serde(default)]
    pub derive_channels: BTreeSet<ChannelType>,
}

impl ExclusionConfig {
    /// The full reporting scenario: both exclusion variants plus the core
    /// business composite.
    pub fn standard() -> Self {
        Self {
            exclude_employee_channel: true,
            exclude_social: true,
            derive_channels: BTreeSet::from([
                ChannelType::DtcExcludingEmployee,
                ChannelType::DtcExcludingEmployeeAndSocial,
                ChannelType::CoreBusiness,
            ]),
        }
    }

    /// The derived channels this configuration asks for: the explicit set,
    /// plus the variants implied by the boolean flags.
    pub fn requested_channels(&self) -> BTreeSet<ChannelType> {
        let mut requested = self.derive_channels.clone();
        if self.exclude_employee_channel {
            requested.insert(ChannelType::DtcExcludingEmployee);
        }
        if self.exclude_employee_channel && self.exclude_social {
            requested.insert(ChannelType::DtcExcludingEmployeeAndSocial);
        }
        requested.retain(|c| c.is_derived());
        requested
    }
}

/// How a derived channel is constructed from base-channel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationRule {
    pub channel: ChannelType,
    /// Sub-channel contributions subtracted from DTC, field-wise.
    pub excludes: &'static [SubChannel],
    /// Whether the result is then composed with the platform channel's sums.
    pub composes_with_platform: bool,
}

const RULES: [DerivationRule; 3] = [
    DerivationRule {
        channel: ChannelType::DtcExcludingEmployee,
        excludes: &[SubChannel::Employee],
        composes_with_platform: false,
    },
    DerivationRule {
        channel: ChannelType::DtcExcludingEmployeeAndSocial,
        excludes: &[SubChannel::Employee, SubChannel::Social],
        composes_with_platform: false,
    },
    DerivationRule {
        channel: ChannelType::CoreBusiness,
        excludes: &[SubChannel::Employee, SubChannel::Social],
        composes_with_platform: true,
    },
];

/// The registry mapping each derived channel to its construction rule.
/// Base channels have no rule.
pub fn derivation_rule(channel: ChannelType) -> Option<&'static DerivationRule> {
    RULES.iter().find(|r| r.channel == channel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_derived_channel_has_a_rule() {
        for channel in [
            ChannelType::DtcExcludingEmployee,
            ChannelType::DtcExcludingEmployeeAndSocial,
            ChannelType::CoreBusiness,
        ] {
            assert!(derivation_rule(channel).is_some());
        }
    }

    #[test]
    fn base_channels_have_no_rule() {
        for channel in ChannelType::BASE {
            assert!(derivation_rule(channel).is_none());
        }
    }

    #[test]
    fn flags_imply_derived_channels() {
        let config = ExclusionConfig {
            exclude_employee_channel: true,
            exclude_social: true,
            derive_channels: BTreeSet::new(),
        };
        let requested = config.requested_channels();
        assert!(requested.contains(&ChannelType::DtcExcludingEmployee));
        assert!(requested.contains(&ChannelType::DtcExcludingEmployeeAndSocial));
        assert!(!requested.contains(&ChannelType::CoreBusiness));
    }

    #[test]
    fn base_channels_are_dropped_from_requests() {
        let config = ExclusionConfig {
            derive_channels: BTreeSet::from([ChannelType::Total, ChannelType::CoreBusiness]),
            ..ExclusionConfig::default()
        };
        let requested = config.requested_channels();
        assert_eq!(requested.len(), 1);
        assert!(requested.contains(&ChannelType::CoreBusiness));
    }
}
