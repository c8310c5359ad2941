//! On-demand pricing table
//!
//! The table is built once at startup and passed by reference to the sampler
//! and the report engine. It is never mutated after construction, so cost
//! math is reproducible across a pass and across report runs.

use crate::error::{CostwatchError, Result};
use std::collections::HashMap;

/// Immutable instance-type -> hourly USD rate mapping
#[derive(Debug, Clone)]
pub struct PricingTable {
    rates: HashMap<String, f64>,
}

impl PricingTable {
    /// Hourly rate for an instance type.
    ///
    /// A miss is recoverable: callers decide whether to skip the affected
    /// instance or abort.
    pub fn rate(&self, instance_type: &str) -> Result<f64> {
        self.rates
            .get(instance_type)
            .copied()
            .ok_or_else(|| CostwatchError::UnknownInstanceType(instance_type.to_string()))
    }

    pub fn contains(&self, instance_type: &str) -> bool {
        self.rates.contains_key(instance_type)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        // https://aws.amazon.com/ec2/pricing/on-demand/
        [
            ("m4.large", 0.10),
            ("t2.micro", 0.0116),
            ("m4.xlarge", 0.20),
            ("c4.4xlarge", 0.796),
            ("t2.xlarge", 0.1856),
            ("t2.2xlarge", 0.3712),
        ]
        .into_iter()
        .map(|(t, r)| (t.to_string(), r))
        .collect()
    }
}

impl FromIterator<(String, f64)> for PricingTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_known_type() {
        let table = PricingTable::default();
        assert_eq!(table.rate("t2.micro").unwrap(), 0.0116);
        assert_eq!(table.rate("c4.4xlarge").unwrap(), 0.796);
    }

    #[test]
    fn test_rate_unknown_type() {
        let table = PricingTable::default();
        let err = table.rate("p5.48xlarge").unwrap_err();
        assert!(matches!(err, CostwatchError::UnknownInstanceType(t) if t == "p5.48xlarge"));
    }

    #[test]
    fn test_rate_is_idempotent() {
        let table = PricingTable::default();
        let first = table.rate("m4.large").unwrap();
        let second = table.rate("m4.large").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_iterator() {
        let table: PricingTable =
            [("x1.custom".to_string(), 1.5)].into_iter().collect();
        assert_eq!(table.rate("x1.custom").unwrap(), 1.5);
        assert!(!table.contains("t2.micro"));
        assert_eq!(table.len(), 1);
    }
}
