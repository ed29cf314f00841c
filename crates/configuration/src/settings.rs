use crate::error::ConfigError;
use core_types::ChannelType;
use exclusion::ExclusionConfig;
use rust_decimal::Decimal;
use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Every section is optional in the TOML file. Anything left out falls back
/// to the built-in defaults, so an empty (or missing) file is a valid
/// configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub report: ReportSettings,
    pub validation: ValidationSettings,
    pub exclusion: ExclusionSettings,
}

impl Settings {
    /// Rejects values the type system cannot: a tolerance that is zero or
    /// negative would make every hierarchy and identity check fail (or pass)
    /// meaninglessly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.relative_tolerance <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "relative_tolerance must be positive, got {}",
                self.validation.relative_tolerance
            )));
        }
        Ok(())
    }
}

/// Controls which channels appear in the rendered report.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// The channels to include in report output, in display order.
    pub channels: Vec<ChannelType>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            channels: vec![
                ChannelType::Platform,
                ChannelType::DirectToConsumer,
                ChannelType::Total,
                ChannelType::DtcExcludingEmployee,
                ChannelType::DtcExcludingEmployeeAndSocial,
                ChannelType::CoreBusiness,
            ],
        }
    }
}

/// Controls the consistency checks run over the monthly metric set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Relative tolerance used for hierarchy and ratio-identity checks.
    /// 0.005 corresponds to 0.5%.
    pub relative_tolerance: Decimal,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            relative_tolerance: Decimal::new(5, 3),
        }
    }
}

/// Controls which derived channels the exclusion engine produces.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExclusionSettings {
    /// Produce the DTC-excluding-employee channel.
    pub exclude_employee_channel: bool,
    /// Produce the DTC-excluding-employee-and-social channel.
    pub exclude_social: bool,
    /// Additional derived channels requested explicitly by name.
    pub derive_channels: Vec<ChannelType>,
}

impl Default for ExclusionSettings {
    fn default() -> Self {
        Self {
            exclude_employee_channel: true,
            exclude_social: true,
            derive_channels: vec![ChannelType::CoreBusiness],
        }
    }
}

impl ExclusionSettings {
    /// Converts the settings section into the engine's configuration type.
    pub fn to_config(&self) -> ExclusionConfig {
        ExclusionConfig {
            exclude_employee_channel: self.exclude_employee_channel,
            exclude_social: self.exclude_social,
            derive_channels: self.derive_channels.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_match_the_standard_report() {
        let settings = Settings::default();
        assert_eq!(settings.validation.relative_tolerance, dec!(0.005));
        assert!(settings.exclusion.exclude_employee_channel);
        assert!(settings.exclusion.exclude_social);
        assert_eq!(settings.report.channels.len(), 6);
    }

    #[test]
    fn to_config_expands_flags_into_derived_channels() {
        let settings = ExclusionSettings::default();
        let requested = settings.to_config().requested_channels();
        assert!(requested.contains(&ChannelType::DtcExcludingEmployee));
        assert!(requested.contains(&ChannelType::DtcExcludingEmployeeAndSocial));
        assert!(requested.contains(&ChannelType::CoreBusiness));
    }

    #[test]
    fn non_positive_tolerance_is_rejected() {
        let mut settings = Settings::default();
        settings.validation.relative_tolerance = Decimal::ZERO;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        settings.validation.relative_tolerance = dec!(-0.01);
        assert!(settings.validate().is_err());

        settings.validation.relative_tolerance = dec!(0.005);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let settings: Settings =
            toml::from_str("[validation]\nrelative_tolerance = \"0.01\"\n").unwrap();
        assert_eq!(settings.validation.relative_tolerance, dec!(0.01));
        assert!(settings.exclusion.exclude_social);
    }
}
