use rust_decimal::Decimal;
use serde::Serialize;

/// Query parameter carrying the selected bucket on the order list.
pub const COST_BUCKET_PARAM: &str = "order_total_cost";

/// Fixed upper thresholds for narrowing the order list by total cost.
/// Buckets overlap: an order totalling 50 falls into all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBucket {
    UpTo100,
    UpTo500,
    UpTo1000,
    UpTo10000,
}

/// One entry of the filter sidebar.
#[derive(Debug, Clone, Serialize)]
pub struct CostBucketChoice {
    pub value: &'static str,
    pub label: &'static str,
}

impl CostBucket {
    pub const ALL: [CostBucket; 4] = [
        CostBucket::UpTo100,
        CostBucket::UpTo500,
        CostBucket::UpTo1000,
        CostBucket::UpTo10000,
    ];

    pub fn threshold(self) -> Decimal {
        match self {
            CostBucket::UpTo100 => Decimal::from(100),
            CostBucket::UpTo500 => Decimal::from(500),
            CostBucket::UpTo1000 => Decimal::from(1000),
            CostBucket::UpTo10000 => Decimal::from(10000),
        }
    }

    pub fn param(self) -> &'static str {
        match self {
            CostBucket::UpTo100 => "<100",
            CostBucket::UpTo500 => "<500",
            CostBucket::UpTo1000 => "<1000",
            CostBucket::UpTo10000 => "<10000",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CostBucket::UpTo100 => "less than 100rub",
            CostBucket::UpTo500 => "less than 500rub",
            CostBucket::UpTo1000 => "less than 1000rub",
            CostBucket::UpTo10000 => "less than 10000rub",
        }
    }

    /// Resolve a selector from the query string. Absent, `all` and
    /// unrecognized values all mean "no bucket": the list stays unfiltered.
    pub fn from_param(raw: Option<&str>) -> Option<Self> {
        let raw = raw?.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return None;
        }
        let bucket = Self::ALL.into_iter().find(|b| b.param() == raw);
        if bucket.is_none() {
            tracing::debug!(value = %raw, "Ignoring unrecognized cost bucket");
        }
        bucket
    }

    pub fn matches(self, total: Decimal) -> bool {
        total <= self.threshold()
    }

    pub fn choices() -> Vec<CostBucketChoice> {
        Self::ALL
            .into_iter()
            .map(|b| CostBucketChoice {
                value: b.param(),
                label: b.label(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_param_known_values() {
        assert_eq!(CostBucket::from_param(Some("<100")), Some(CostBucket::UpTo100));
        assert_eq!(CostBucket::from_param(Some("<500")), Some(CostBucket::UpTo500));
        assert_eq!(CostBucket::from_param(Some("<1000")), Some(CostBucket::UpTo1000));
        assert_eq!(CostBucket::from_param(Some("<10000")), Some(CostBucket::UpTo10000));
    }

    #[test]
    fn test_from_param_fails_open() {
        assert_eq!(CostBucket::from_param(None), None);
        assert_eq!(CostBucket::from_param(Some("")), None);
        assert_eq!(CostBucket::from_param(Some("all")), None);
        assert_eq!(CostBucket::from_param(Some("<42")), None);
        assert_eq!(CostBucket::from_param(Some("cheap")), None);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(CostBucket::UpTo100.matches(Decimal::from(100)));
        assert!(!CostBucket::UpTo100.matches(Decimal::new(10001, 2)));
        assert!(CostBucket::UpTo10000.matches(Decimal::from(10000)));
    }

    #[test]
    fn test_buckets_overlap() {
        let total = Decimal::from(50);
        assert!(CostBucket::ALL.iter().all(|b| b.matches(total)));
    }

    #[test]
    fn test_zero_total_matches_every_bucket() {
        assert!(CostBucket::ALL.iter().all(|b| b.matches(Decimal::ZERO)));
    }

    #[test]
    fn test_example_order_matches_low_buckets() {
        let total = Decimal::new(3000, 2) + Decimal::new(4550, 2);
        assert_eq!(total, Decimal::new(7550, 2));
        assert!(CostBucket::UpTo100.matches(total));
        assert!(CostBucket::UpTo500.matches(total));
    }

    #[test]
    fn test_choices_round_trip_through_param() {
        for choice in CostBucket::choices() {
            assert!(CostBucket::from_param(Some(choice.value)).is_some());
        }
    }
}
