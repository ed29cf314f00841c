use core_types::MonthlyMetric;
use rust_decimal::Decimal;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A stateless calculator for deriving ratio metrics from monthly sums.
#[derive(Debug, Default)]
pub struct MetricCalculator {}

impl MetricCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `numerator / denominator`, undefined when the denominator is zero.
    fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
        if denominator.is_zero() {
            None
        } else {
            Some(numerator / denominator)
        }
    }

    /// Average order value: gross value / orders.
    pub fn average_order_value(&self, gmv: Decimal, orders: u64) -> Option<Decimal> {
        Self::ratio(gmv, Decimal::from(orders))
    }

    /// Average transaction value: gross value / buyers.
    pub fn average_transaction_value(&self, gmv: Decimal, buyers: u64) -> Option<Decimal> {
        Self::ratio(gmv, Decimal::from(buyers))
    }

    /// Average unit retail: gross value / gross units.
    pub fn average_unit_retail(&self, gmv: Decimal, gmv_units: u64) -> Option<Decimal> {
        Self::ratio(gmv, Decimal::from(gmv_units))
    }

    /// Conversion rate in percent: buyers / unique visitors x 100.
    pub fn conversion_rate(&self, buyers: u64, uv: u64) -> Option<Decimal> {
        Self::ratio(Decimal::from(buyers), Decimal::from(uv)).map(|r| r * HUNDRED)
    }

    /// Units per transaction: gross units / orders.
    pub fn units_per_transaction(&self, gmv_units: u64, orders: u64) -> Option<Decimal> {
        Self::ratio(Decimal::from(gmv_units), Decimal::from(orders))
    }

    /// Repeat rate: orders / buyers.
    pub fn repeat_rate(&self, orders: u64, buyers: u64) -> Option<Decimal> {
        Self::ratio(Decimal::from(orders), Decimal::from(buyers))
    }

    /// Cancel rate in percent: cancelled amount / gross value x 100.
    pub fn cancel_rate(&self, cancel_amount: Decimal, gmv: Decimal) -> Option<Decimal> {
        Self::ratio(cancel_amount, gmv).map(|r| r * HUNDRED)
    }

    /// Return rate in percent: returned amount / gross value x 100.
    pub fn return_rate(&self, return_amount: Decimal, gmv: Decimal) -> Option<Decimal> {
        Self::ratio(return_amount, gmv).map(|r| r * HUNDRED)
    }

    /// Total refund rate (RRC) in percent: cancel rate + return rate.
    pub fn total_refund_rate(
        &self,
        cancel_amount: Decimal,
        return_amount: Decimal,
        gmv: Decimal,
    ) -> Option<Decimal> {
        Self::ratio(cancel_amount + return_amount, gmv).map(|r| r * HUNDRED)
    }

    /// Refund rate after cancellations in percent:
    /// returned amount / (gross value - cancelled amount) x 100.
    pub fn refund_rate_after_cancel(
        &self,
        return_amount: Decimal,
        gmv: Decimal,
        cancel_amount: Decimal,
    ) -> Option<Decimal> {
        Self::ratio(return_amount, gmv - cancel_amount).map(|r| r * HUNDRED)
    }

    /// Derives every ratio field of `metric` from its current sums, in place.
    ///
    /// Callers that adjust sums (aggregation, exclusion, YTD accumulation)
    /// must call this afterwards; ratios are never carried over or combined.
    pub fn recompute(&self, metric: &mut MonthlyMetric) {
        metric.aov = self.average_order_value(metric.gmv, metric.orders);
        metric.atv = self.average_transaction_value(metric.gmv, metric.buyers);
        metric.aur = self.average_unit_retail(metric.gmv, metric.gmv_units);
        metric.cr = self.conversion_rate(metric.buyers, metric.uv);
        metric.upt = self.units_per_transaction(metric.gmv_units, metric.orders);
        metric.repeat_rate = self.repeat_rate(metric.orders, metric.buyers);
        metric.cancel_rate = self.cancel_rate(metric.cancel_amount, metric.gmv);
        metric.return_rate = self.return_rate(metric.return_amount, metric.gmv);
        metric.rrc = self.total_refund_rate(metric.cancel_amount, metric.return_amount, metric.gmv);
        metric.rrc_after_cancel =
            self.refund_rate_after_cancel(metric.return_amount, metric.gmv, metric.cancel_amount);
    }
}

/// True when `actual` is within a relative `tolerance` of `expected`.
///
/// Monthly sums come from floating-point-free Decimal arithmetic, but the
/// books they mirror are rounded upstream, so hierarchy and identity checks
/// always compare within a tolerance rather than exactly.
pub fn within_relative_tolerance(actual: Decimal, expected: Decimal, tolerance: Decimal) -> bool {
    if expected.is_zero() {
        return actual.is_zero();
    }
    ((actual - expected) / expected).abs() <= tolerance
}
