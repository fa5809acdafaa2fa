// SPDX-License-Identifier: Apache-2.0
//! Pure emission calculator: `(category, type, amount) → kg CO2e`.

use crate::catalog::FactorCatalog;
use serde::Serialize;

/// Validation errors from [`calculate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    /// The category is not a key of the factor catalog.
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    /// The activity type is not a key within the resolved category.
    #[error("unknown activity type `{0}`")]
    UnknownActivityType(String),
}

/// Result of one emission calculation. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    /// Echo of the requested category.
    pub category: String,
    /// Echo of the requested activity type.
    #[serde(rename = "type")]
    pub activity: String,
    /// Echo of the requested amount, accepted as given.
    pub amount: f64,
    /// Unit of the matched factor.
    pub unit: &'static str,
    /// `factor * amount`, exactly; no rounding applied.
    #[serde(rename = "carbonKg")]
    pub carbon_kg: f64,
    /// Description of the matched factor.
    pub description: &'static str,
}

/// Convert an activity quantity into a kg-CO2e estimate.
///
/// Zero and negative amounts pass through unchecked; the catalog is the only
/// thing validated. Pure and side-effect free, safe under concurrency.
pub fn calculate(
    catalog: &FactorCatalog,
    category: &str,
    activity: &str,
    amount: f64,
) -> Result<Calculation, CalcError> {
    let activities = catalog
        .category(category)
        .ok_or_else(|| CalcError::UnknownCategory(category.to_owned()))?;
    let matched = activities
        .get(activity)
        .ok_or_else(|| CalcError::UnknownActivityType(activity.to_owned()))?;
    Ok(Calculation {
        category: category.to_owned(),
        activity: activity.to_owned(),
        amount,
        unit: matched.unit,
        carbon_kg: matched.factor * amount,
        description: matched.description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carbon_is_exactly_factor_times_amount_for_every_entry() {
        let catalog = FactorCatalog::builtin();
        for (category, activity, f) in catalog.entries() {
            for amount in [-3.5, 0.0, 1.0, 2.5, 1000.0] {
                let calc = calculate(&catalog, category, activity, amount)
                    .expect("catalog entry must calculate");
                assert_eq!(calc.carbon_kg, f.factor * amount);
                assert_eq!(calc.unit, f.unit);
            }
        }
    }

    #[test]
    fn ten_km_by_car_is_2_1_kg() {
        let catalog = FactorCatalog::builtin();
        let calc = calculate(&catalog, "transport", "car_km", 10.0).expect("car_km");
        assert_eq!(calc.carbon_kg, 2.1);
        assert_eq!(calc.unit, "km");
    }

    #[test]
    fn unknown_category_is_rejected() {
        let catalog = FactorCatalog::builtin();
        let err = calculate(&catalog, "bogus", "car_km", 1.0).expect_err("bogus category");
        assert_eq!(err, CalcError::UnknownCategory("bogus".into()));
    }

    #[test]
    fn unknown_activity_type_is_rejected() {
        let catalog = FactorCatalog::builtin();
        let err = calculate(&catalog, "transport", "bogus", 1.0).expect_err("bogus type");
        assert_eq!(err, CalcError::UnknownActivityType("bogus".into()));
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let catalog = FactorCatalog::builtin();
        let calc = calculate(&catalog, "food", "beef_meal", 2.0).expect("beef_meal");
        let json = serde_json::to_value(&calc).unwrap();
        assert_eq!(json["type"], "beef_meal");
        assert_eq!(json["carbonKg"], 13.22);
        assert_eq!(json["amount"], 2.0);
    }
}
