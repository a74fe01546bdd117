//! Cost calculation for quotes.
//!
//! Pure and deterministic: work request line items in, priced breakdown out.
//! Monetary results are rounded to two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::MONEY_DECIMAL_PRECISION;
use crate::errors::ValidationError;
use crate::work_requests::MaterialInput;
use crate::{Error, Result};

use super::quotes_model::{CostBreakdown, QuoteLine};

const LABOR_DESCRIPTION: &str = "Labor";

/// Rounds a monetary amount to two decimal places.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the full cost breakdown for a quote.
///
/// A material without a unit price is priced at zero. Labor is priced at the
/// configured hourly rate; zero labor hours produce no labor line. Negative
/// inputs are the only failure mode.
pub fn compute(
    materials: &[MaterialInput],
    labor_hours: Decimal,
    hourly_rate: Decimal,
    vat_rate: Decimal,
) -> Result<CostBreakdown> {
    if labor_hours < Decimal::ZERO {
        return Err(invalid("labor hours cannot be negative"));
    }
    if hourly_rate < Decimal::ZERO {
        return Err(invalid("hourly rate cannot be negative"));
    }
    if vat_rate < Decimal::ZERO {
        return Err(invalid("VAT rate cannot be negative"));
    }

    let mut lines = Vec::with_capacity(materials.len() + 1);
    let mut subtotal = Decimal::ZERO;

    for material in materials {
        if material.quantity < Decimal::ZERO {
            return Err(invalid(&format!(
                "material '{}' has a negative quantity",
                material.description
            )));
        }
        let unit_price = material.unit_price.unwrap_or(Decimal::ZERO);
        if unit_price < Decimal::ZERO {
            return Err(invalid(&format!(
                "material '{}' has a negative unit price",
                material.description
            )));
        }
        let line_total = round_money(material.quantity * unit_price);
        subtotal += line_total;
        lines.push(QuoteLine::Material {
            description: material.description.clone(),
            quantity: material.quantity,
            unit_price,
            line_total,
        });
    }

    if labor_hours > Decimal::ZERO {
        let line_total = round_money(labor_hours * hourly_rate);
        subtotal += line_total;
        lines.push(QuoteLine::Labor {
            description: LABOR_DESCRIPTION.to_string(),
            hours: labor_hours,
            hourly_rate,
            line_total,
        });
    }

    let vat_amount = round_money(subtotal * vat_rate);
    let total = subtotal + vat_amount;

    Ok(CostBreakdown {
        lines,
        subtotal,
        vat_rate,
        vat_amount,
        total,
    })
}

fn invalid(message: &str) -> Error {
    Error::Validation(ValidationError::InvalidInput(message.to_string()))
}
