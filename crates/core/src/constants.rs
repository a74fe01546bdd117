/// Prefix for quote numbers (`MW-<YYYY><MM>-<NNN>`)
pub const QUOTE_NUMBER_PREFIX: &str = "MW";

/// Decimal precision for monetary amounts
pub const MONEY_DECIMAL_PRECISION: u32 = 2;

/// Minimum width of the per-period sequence component in quote numbers
pub const QUOTE_SEQUENCE_WIDTH: usize = 3;
