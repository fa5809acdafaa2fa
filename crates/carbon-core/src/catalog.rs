// SPDX-License-Identifier: Apache-2.0
//! The fixed emission-factor catalog: category → activity type → factor.

use serde::Serialize;
use std::collections::BTreeMap;

/// One emission factor: kg CO2e per unit of activity, plus display metadata.
///
/// Factors are single-significant-digit policy constants, not measurements;
/// zero is a valid factor (walking and cycling emit nothing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionFactor {
    /// kg CO2e emitted per `unit` of activity. Always `>= 0`.
    pub factor: f64,
    /// Unit the activity amount is counted in (km, meal, kWh, ...).
    pub unit: &'static str,
    /// Short display name for the activity.
    pub name: &'static str,
    /// One-line description of what one unit represents.
    pub description: &'static str,
}

const fn factor(
    factor: f64,
    unit: &'static str,
    name: &'static str,
    description: &'static str,
) -> EmissionFactor {
    EmissionFactor {
        factor,
        unit,
        name,
        description,
    }
}

const TRANSPORT: &[(&str, EmissionFactor)] = &[
    ("car_km", factor(0.21, "km", "Private car", "Petrol car, per km")),
    ("bus_km", factor(0.089, "km", "Bus", "City bus, per km")),
    ("subway_km", factor(0.035, "km", "Metro", "Metro, per km")),
    ("bike_km", factor(0.0, "km", "Bicycle", "Zero-emission travel")),
    ("walk_km", factor(0.0, "km", "Walking", "Zero-emission travel")),
    ("plane_km", factor(0.255, "km", "Plane", "Air travel, per km")),
    ("train_km", factor(0.041, "km", "High-speed rail", "Rail, per km")),
    ("ev_km", factor(0.053, "km", "Electric car", "Battery EV, per km")),
];

const FOOD: &[(&str, EmissionFactor)] = &[
    ("beef_meal", factor(6.61, "meal", "Beef meal", "One beef-based meal")),
    ("pork_meal", factor(1.72, "meal", "Pork meal", "One pork-based meal")),
    (
        "chicken_meal",
        factor(0.98, "meal", "Chicken meal", "One chicken-based meal"),
    ),
    ("fish_meal", factor(0.84, "meal", "Fish meal", "One fish-based meal")),
    (
        "vegetarian_meal",
        factor(0.39, "meal", "Vegetarian meal", "One vegetarian meal"),
    ),
    ("milk_liter", factor(1.39, "L", "Milk", "One litre of milk")),
];

const ENERGY: &[(&str, EmissionFactor)] = &[
    (
        "electricity_kwh",
        factor(0.785, "kWh", "Electricity", "Grid average, per kWh"),
    ),
    (
        "natural_gas_m3",
        factor(2.09, "m³", "Natural gas", "Per cubic metre"),
    ),
    ("coal_kg", factor(2.77, "kg", "Coal", "Per kilogram")),
];

const SHOPPING: &[(&str, EmissionFactor)] = &[
    (
        "clothes_item",
        factor(10.0, "item", "New clothing", "One ordinary garment"),
    ),
    (
        "electronics_small",
        factor(20.0, "item", "Small electronics", "Phones, earbuds and the like"),
    ),
    (
        "electronics_large",
        factor(100.0, "item", "Large appliance", "TVs, fridges and the like"),
    ),
    ("plastic_bag", factor(0.01, "bag", "Plastic bag", "One single-use bag")),
];

/// Immutable catalog of emission factors, keyed by category and activity type.
///
/// Built once at startup via [`FactorCatalog::builtin`] and shared by
/// reference; never mutated afterwards, so concurrent reads need no
/// synchronization. Serializes to the wire shape
/// `{category: {activity_type: EmissionFactor}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct FactorCatalog {
    categories: BTreeMap<&'static str, BTreeMap<&'static str, EmissionFactor>>,
}

impl FactorCatalog {
    /// Build the built-in catalog: `transport`, `food`, `energy`, `shopping`.
    ///
    /// Activity keys are unique within a category by construction (map
    /// semantics); category keys are disjoint.
    pub fn builtin() -> Self {
        let categories = [
            ("transport", TRANSPORT),
            ("food", FOOD),
            ("energy", ENERGY),
            ("shopping", SHOPPING),
        ]
        .into_iter()
        .map(|(name, entries)| (name, entries.iter().copied().collect()))
        .collect();
        Self { categories }
    }

    /// Look up one category's activity map.
    pub fn category(
        &self,
        category: &str,
    ) -> Option<&BTreeMap<&'static str, EmissionFactor>> {
        self.categories.get(category)
    }

    /// Look up a single factor by (category, activity type).
    pub fn factor(&self, category: &str, activity: &str) -> Option<&EmissionFactor> {
        self.categories.get(category)?.get(activity)
    }

    /// Iterate all `(category, activity, factor)` triples.
    pub fn entries(
        &self,
    ) -> impl Iterator<Item = (&'static str, &'static str, &EmissionFactor)> + '_ {
        self.categories.iter().flat_map(|(category, activities)| {
            activities
                .iter()
                .map(move |(activity, f)| (*category, *activity, f))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_the_four_categories() {
        let catalog = FactorCatalog::builtin();
        for name in ["transport", "food", "energy", "shopping"] {
            assert!(catalog.category(name).is_some(), "missing category {name}");
        }
        assert_eq!(catalog.entries().count(), 21);
    }

    #[test]
    fn factors_are_non_negative() {
        let catalog = FactorCatalog::builtin();
        for (category, activity, f) in catalog.entries() {
            assert!(
                f.factor >= 0.0,
                "negative factor for {category}/{activity}"
            );
            assert!(!f.unit.is_empty());
        }
    }

    #[test]
    fn serializes_as_nested_maps() {
        let catalog = FactorCatalog::builtin();
        let json = serde_json::to_value(&catalog).unwrap();
        let car = &json["transport"]["car_km"];
        assert_eq!(car["factor"], 0.21);
        assert_eq!(car["unit"], "km");
        assert!(car["name"].is_string());
        assert!(car["description"].is_string());
    }
}
