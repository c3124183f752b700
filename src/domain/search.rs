//! Filtrage et tri du catalogue.
//!
//! Le catalogue public est chargé en entier puis filtré en mémoire :
//! mots-clés (ET de tous les termes), égalités par champ, bornes inclusives,
//! puis un des quatre tris fixes. Les annonces dont le pack premium est
//! en cours passent devant les autres.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::vehicle::{Vehicle, VehicleCategory};

/// Ordre de tri des résultats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Plus récentes d'abord
    Recent,
    PriceAsc,
    PriceDesc,
    MileageAsc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Recent
    }
}

/// Critères de recherche (aussi stockés tels quels dans les recherches sauvegardées)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub keyword: Option<String>,
    pub category: Option<VehicleCategory>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub location: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub mileage_min: Option<i32>,
    pub mileage_max: Option<i32>,
    pub sort: SortOrder,
}

impl SearchFilters {
    fn keyword_tokens(&self) -> Vec<String> {
        self.keyword
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    /// Vrai si l'annonce satisfait tous les critères (le tri est ignoré)
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.matches_with_tokens(vehicle, &self.keyword_tokens())
    }

    fn matches_with_tokens(&self, vehicle: &Vehicle, tokens: &[String]) -> bool {
        if !tokens.is_empty() {
            let haystack = [
                Some(vehicle.title.as_str()),
                Some(vehicle.description.as_str()),
                vehicle.brand.as_deref(),
                vehicle.model.as_deref(),
            ]
            .iter()
            .flatten()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

            if !tokens.iter().all(|token| haystack.contains(token.as_str())) {
                return false;
            }
        }

        if let Some(category) = self.category {
            if vehicle.category != category {
                return false;
            }
        }

        text_equals(&self.brand, &vehicle.brand)
            && text_equals(&self.model, &vehicle.model)
            && text_equals(&self.fuel_type, &vehicle.fuel_type)
            && text_equals(&self.transmission, &vehicle.transmission)
            && text_equals(&self.location, &vehicle.location)
            && in_range(Some(vehicle.price), self.price_min, self.price_max)
            && in_range(vehicle.year, self.year_min, self.year_max)
            && in_range(vehicle.mileage, self.mileage_min, self.mileage_max)
    }
}

/// Égalité insensible à la casse; un critère vide est ignoré
fn text_equals(filter: &Option<String>, value: &Option<String>) -> bool {
    match filter.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(expected) => value
            .as_deref()
            .map_or(false, |v| v.trim().eq_ignore_ascii_case(expected)),
    }
}

/// Bornes inclusives; une valeur absente échoue dès qu'une borne est posée
fn in_range<T: PartialOrd + Copy>(value: Option<T>, min: Option<T>, max: Option<T>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

fn compare(sort: SortOrder, a: &Vehicle, b: &Vehicle) -> Ordering {
    match sort {
        SortOrder::Recent => b.created_at.cmp(&a.created_at),
        SortOrder::PriceAsc => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
        SortOrder::PriceDesc => b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal),
        SortOrder::MileageAsc => match (a.mileage, b.mileage) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Filtre puis trie le catalogue
pub fn apply(filters: &SearchFilters, vehicles: Vec<Vehicle>, now: DateTime<Utc>) -> Vec<Vehicle> {
    let tokens = filters.keyword_tokens();

    let mut results: Vec<Vehicle> = vehicles
        .into_iter()
        .filter(|v| filters.matches_with_tokens(v, &tokens))
        .collect();

    results.sort_by(|a, b| {
        b.premium_active(now)
            .cmp(&a.premium_active(now))
            .then_with(|| compare(filters.sort, a, b))
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::{fixtures::content, PremiumPack};
    use chrono::Duration;
    use uuid::Uuid;

    fn listing(title: &str, price: f64, age_days: i64) -> Vehicle {
        let now = Utc::now();
        let mut v = Vehicle::new(Uuid::new_v4(), content(title, price), now - Duration::days(age_days));
        v.approve(now);
        v
    }

    fn titles(vehicles: &[Vehicle]) -> Vec<&str> {
        vehicles.iter().map(|v| v.title.as_str()).collect()
    }

    #[test]
    fn test_keyword_is_and_of_tokens() {
        let mut a = listing("Peugeot 208 GT Line", 12000.0, 1);
        a.description = "Essence, première main".into();
        let b = listing("Peugeot 308", 15000.0, 2);
        let c = listing("Renault Clio GT", 9000.0, 3);

        let filters = SearchFilters {
            keyword: Some("  peugeot   GT ".into()),
            ..Default::default()
        };
        let results = apply(&filters, vec![a, b, c], Utc::now());
        assert_eq!(titles(&results), vec!["Peugeot 208 GT Line"]);
    }

    #[test]
    fn test_keyword_searches_description_brand_model() {
        let mut a = listing("Roadster", 20000.0, 1);
        a.brand = Some("BMW".into());
        a.model = Some("Z4".into());
        a.description = "Carnet d'entretien complet".into();

        let by_brand = SearchFilters { keyword: Some("bmw z4".into()), ..Default::default() };
        assert!(by_brand.matches(&a));
        let by_description = SearchFilters { keyword: Some("entretien".into()), ..Default::default() };
        assert!(by_description.matches(&a));
        let miss = SearchFilters { keyword: Some("bmw diesel".into()), ..Default::default() };
        assert!(!miss.matches(&a));
    }

    #[test]
    fn test_empty_keyword_matches_everything() {
        let filters = SearchFilters { keyword: Some("   ".into()), ..Default::default() };
        let results = apply(&filters, vec![listing("A1", 1.0, 1), listing("A2", 2.0, 2)], Utc::now());
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_equality_predicates_ignore_case() {
        let mut moto = listing("MT-07", 6500.0, 1);
        moto.category = VehicleCategory::Motorcycle;
        moto.brand = Some("Yamaha".into());
        moto.location = Some("Lyon".into());
        let car = listing("Clio", 9000.0, 1);

        let filters = SearchFilters {
            category: Some(VehicleCategory::Motorcycle),
            brand: Some("yamaha".into()),
            location: Some("LYON".into()),
            ..Default::default()
        };
        let results = apply(&filters, vec![moto, car], Utc::now());
        assert_eq!(titles(&results), vec!["MT-07"]);
    }

    #[test]
    fn test_ranges_are_inclusive_and_require_value() {
        let mut a = listing("A", 5000.0, 1);
        a.year = Some(2015);
        a.mileage = Some(80000);
        let mut b = listing("B", 10000.0, 2);
        b.year = Some(2020);
        b.mileage = None;
        let mut c = listing("C", 15000.0, 3);
        c.year = Some(2022);
        c.mileage = Some(10000);

        let price = SearchFilters {
            price_min: Some(5000.0),
            price_max: Some(10000.0),
            ..Default::default()
        };
        assert_eq!(
            titles(&apply(&price, vec![a.clone(), b.clone(), c.clone()], Utc::now())),
            vec!["A", "B"]
        );

        let mileage = SearchFilters { mileage_max: Some(80000), ..Default::default() };
        assert_eq!(
            titles(&apply(&mileage, vec![a.clone(), b.clone(), c.clone()], Utc::now())),
            vec!["A", "C"]
        );

        let year = SearchFilters { year_min: Some(2020), year_max: Some(2021), ..Default::default() };
        assert_eq!(titles(&apply(&year, vec![a, b, c], Utc::now())), vec!["B"]);
    }

    #[test]
    fn test_sort_orders() {
        let mut a = listing("A", 3000.0, 3);
        a.mileage = Some(50000);
        let mut b = listing("B", 1000.0, 1);
        b.mileage = None;
        let mut c = listing("C", 2000.0, 2);
        c.mileage = Some(20000);
        let all = vec![a, b, c];
        let now = Utc::now();

        let sorted = |sort| {
            let filters = SearchFilters { sort, ..Default::default() };
            titles(&apply(&filters, all.clone(), now))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };

        assert_eq!(sorted(SortOrder::Recent), vec!["B", "C", "A"]);
        assert_eq!(sorted(SortOrder::PriceAsc), vec!["B", "C", "A"]);
        assert_eq!(sorted(SortOrder::PriceDesc), vec!["A", "C", "B"]);
        assert_eq!(sorted(SortOrder::MileageAsc), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_active_premium_comes_first() {
        let now = Utc::now();
        let cheap = listing("Cheap", 100.0, 1);
        let mut boosted = listing("Boosted", 900.0, 5);
        boosted.activate_premium(PremiumPack::Daily, now);
        let mut expired = listing("Expired", 50.0, 5);
        expired.activate_premium(PremiumPack::Daily, now - Duration::days(3));

        let filters = SearchFilters { sort: SortOrder::PriceAsc, ..Default::default() };
        let results = apply(&filters, vec![cheap, boosted, expired], now);
        assert_eq!(titles(&results), vec!["Boosted", "Expired", "Cheap"]);
    }

    #[test]
    fn test_filters_deserialize_from_query_string() {
        let filters: SearchFilters =
            serde_json::from_str(r#"{"keyword":"golf","sort":"price_desc","price_max":20000}"#)
                .unwrap();
        assert_eq!(filters.sort, SortOrder::PriceDesc);
        assert_eq!(filters.price_max, Some(20000.0));
        assert_eq!(filters.category, None);
    }
}
