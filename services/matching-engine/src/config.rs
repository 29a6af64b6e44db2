//! Engine tunables

use rust_decimal::Decimal;

/// Matching engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Buffer applied to the best ask when reserving for a market buy
    /// without a caller-supplied price cap: reservation price =
    /// best ask × (1 + buffer). The unused portion is refunded after
    /// matching.
    pub market_slippage_buffer: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            market_slippage_buffer: Decimal::from_str_exact("0.05").unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_buffer() {
        let config = EngineConfig::default();
        assert_eq!(
            config.market_slippage_buffer,
            Decimal::from_str_exact("0.05").unwrap()
        );
    }
}
