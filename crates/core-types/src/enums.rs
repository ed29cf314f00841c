use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A sales channel, either observed in the daily input or derived downstream.
///
/// The set is closed on purpose: derived channels are constructed by an
/// explicit registry in the exclusion engine, never by string dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    /// Third-party marketplace sales.
    #[serde(rename = "PLATFORM")]
    Platform,
    /// Owned-channel sales (the only channel carrying sub-channel breakdowns).
    #[serde(rename = "DTC")]
    DirectToConsumer,
    /// Platform + direct-to-consumer.
    #[serde(rename = "TOTAL")]
    Total,
    /// DTC with the employee channel's contribution removed.
    #[serde(rename = "DTC_EXCL_EMPLOYEE")]
    DtcExcludingEmployee,
    /// DTC with both the employee channel and social contributions removed.
    #[serde(rename = "DTC_EXCL_EMPLOYEE_SOCIAL")]
    DtcExcludingEmployeeAndSocial,
    /// Platform + DTC excluding employee and social.
    #[serde(rename = "CORE_BUSINESS")]
    CoreBusiness,
}

impl ChannelType {
    /// The channels that may appear on a `DailyRecord`.
    pub const BASE: [ChannelType; 3] = [
        ChannelType::Platform,
        ChannelType::DirectToConsumer,
        ChannelType::Total,
    ];

    /// Returns true if this channel can appear in the daily input.
    pub fn is_base(&self) -> bool {
        matches!(
            self,
            ChannelType::Platform | ChannelType::DirectToConsumer | ChannelType::Total
        )
    }

    /// Returns true if this channel only exists in monthly output.
    pub fn is_derived(&self) -> bool {
        !self.is_base()
    }

    /// The stable label used in reports, config files and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ChannelType::Platform => "PLATFORM",
            ChannelType::DirectToConsumer => "DTC",
            ChannelType::Total => "TOTAL",
            ChannelType::DtcExcludingEmployee => "DTC_EXCL_EMPLOYEE",
            ChannelType::DtcExcludingEmployeeAndSocial => "DTC_EXCL_EMPLOYEE_SOCIAL",
            ChannelType::CoreBusiness => "CORE_BUSINESS",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChannelType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLATFORM" => Ok(ChannelType::Platform),
            "DTC" => Ok(ChannelType::DirectToConsumer),
            "TOTAL" => Ok(ChannelType::Total),
            "DTC_EXCL_EMPLOYEE" => Ok(ChannelType::DtcExcludingEmployee),
            "DTC_EXCL_EMPLOYEE_SOCIAL" => Ok(ChannelType::DtcExcludingEmployeeAndSocial),
            "CORE_BUSINESS" => Ok(ChannelType::CoreBusiness),
            other => Err(CoreError::UnknownChannel(other.to_string())),
        }
    }
}

/// A named sub-channel of the direct-to-consumer channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubChannel {
    /// Promotion channel with committed return-on-spend targets.
    #[serde(rename = "SOCIAL")]
    Social,
    /// Internal promotional channel with steep discounts.
    #[serde(rename = "EMPLOYEE")]
    Employee,
    /// Paid advertising placements.
    #[serde(rename = "ADVERTISING")]
    Advertising,
    /// Unattributed organic traffic.
    #[serde(rename = "ORGANIC")]
    Organic,
}

impl SubChannel {
    pub const ALL: [SubChannel; 4] = [
        SubChannel::Social,
        SubChannel::Employee,
        SubChannel::Advertising,
        SubChannel::Organic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SubChannel::Social => "SOCIAL",
            SubChannel::Employee => "EMPLOYEE",
            SubChannel::Advertising => "ADVERTISING",
            SubChannel::Organic => "ORGANIC",
        }
    }
}

impl fmt::Display for SubChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SubChannel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SOCIAL" => Ok(SubChannel::Social),
            "EMPLOYEE" => Ok(SubChannel::Employee),
            "ADVERTISING" => Ok(SubChannel::Advertising),
            "ORGANIC" => Ok(SubChannel::Organic),
            other => Err(CoreError::UnknownSubChannel(other.to_string())),
        }
    }
}

/// Every metric field a monthly result carries, summable sums and derived
/// ratios alike. Drives the per-field growth maps and generic field access
/// through [`crate::MonthlyMetric::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Gmv,
    Net,
    GmvUnits,
    NetUnits,
    Uv,
    Buyers,
    Orders,
    PaidTraffic,
    FreeTraffic,
    CancelAmount,
    ReturnAmount,
    Aov,
    Atv,
    Aur,
    Cr,
    Upt,
    RepeatRate,
    CancelRate,
    ReturnRate,
    Rrc,
    RrcAfterCancel,
}

impl Metric {
    pub const ALL: [Metric; 21] = [
        Metric::Gmv,
        Metric::Net,
        Metric::GmvUnits,
        Metric::NetUnits,
        Metric::Uv,
        Metric::Buyers,
        Metric::Orders,
        Metric::PaidTraffic,
        Metric::FreeTraffic,
        Metric::CancelAmount,
        Metric::ReturnAmount,
        Metric::Aov,
        Metric::Atv,
        Metric::Aur,
        Metric::Cr,
        Metric::Upt,
        Metric::RepeatRate,
        Metric::CancelRate,
        Metric::ReturnRate,
        Metric::Rrc,
        Metric::RrcAfterCancel,
    ];

    /// Percentage-typed metrics, expected to lie in `[0, 100]` when defined.
    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            Metric::Cr
                | Metric::CancelRate
                | Metric::ReturnRate
                | Metric::Rrc
                | Metric::RrcAfterCancel
        )
    }

    /// Metrics that aggregate by summation (as opposed to derived ratios).
    pub fn is_summable(&self) -> bool {
        matches!(
            self,
            Metric::Gmv
                | Metric::Net
                | Metric::GmvUnits
                | Metric::NetUnits
                | Metric::Uv
                | Metric::Buyers
                | Metric::Orders
                | Metric::PaidTraffic
                | Metric::FreeTraffic
                | Metric::CancelAmount
                | Metric::ReturnAmount
        )
    }
}
