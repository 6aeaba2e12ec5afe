//! Filter Engine
//!
//! Reduces the catalog to the cultivars matching every selected value of every
//! non-empty category. Both trait categories match against the union of a
//! cultivar's two trait sets. The sentinel record always survives.

use crate::catalog::{Catalog, Cultivar, FlowerType, MarketType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown {category} value: {value}")]
    UnknownValue { category: &'static str, value: String },
}

/// Selected values per filter category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub flower_type: BTreeSet<FlowerType>,
    pub market_type: BTreeSet<MarketType>,
    pub attributes: BTreeSet<String>,
    pub attribute2: BTreeSet<String>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.flower_type.is_empty()
            && self.market_type.is_empty()
            && self.attributes.is_empty()
            && self.attribute2.is_empty()
    }

    /// "Clear All"
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn toggle_flower_type(&mut self, value: FlowerType) {
        toggle(&mut self.flower_type, value);
    }

    pub fn toggle_market_type(&mut self, value: MarketType) {
        toggle(&mut self.market_type, value);
    }

    /// Toggle a tag of the `attributes` category. Any tag the catalog uses in
    /// either trait field is accepted.
    pub fn toggle_attribute(&mut self, catalog: &Catalog, value: &str) -> Result<(), FilterError> {
        check_trait(&catalog.trait_domain(), "attributes", value)?;
        toggle(&mut self.attributes, value.to_string());
        Ok(())
    }

    pub fn toggle_attribute2(&mut self, catalog: &Catalog, value: &str) -> Result<(), FilterError> {
        check_trait(&catalog.trait_domain(), "attribute2", value)?;
        toggle(&mut self.attribute2, value.to_string());
        Ok(())
    }

    /// Check that every selected trait is used somewhere in the catalog
    pub fn validate(&self, catalog: &Catalog) -> Result<(), FilterError> {
        let domain = catalog.trait_domain();
        for value in &self.attributes {
            check_trait(&domain, "attributes", value)?;
        }
        for value in &self.attribute2 {
            check_trait(&domain, "attribute2", value)?;
        }
        Ok(())
    }

    fn matches(&self, cultivar: &Cultivar) -> bool {
        self.flower_type.iter().all(|ft| cultivar.flower_type == *ft)
            && self.market_type.iter().all(|mt| cultivar.market_type == *mt)
            && self
                .attributes
                .iter()
                .chain(&self.attribute2)
                .all(|tag| cultivar.has_trait(tag))
    }
}

fn check_trait(domain: &BTreeSet<&str>, category: &'static str, value: &str) -> Result<(), FilterError> {
    if domain.contains(value) {
        Ok(())
    } else {
        Err(FilterError::UnknownValue {
            category,
            value: value.to_string(),
        })
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if set.contains(&value) {
        set.remove(&value);
    } else {
        set.insert(value);
    }
}

/// Cultivars matching the filter state, catalog order preserved
pub fn filter_catalog<'a>(catalog: &'a Catalog, filters: &FilterState) -> Vec<&'a Cultivar> {
    catalog
        .iter()
        .filter(|c| c.is_sentinel() || filters.matches(c))
        .collect()
}

/// Values still present in the filtered subset, per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableOptions {
    pub flower_type: BTreeSet<FlowerType>,
    pub market_type: BTreeSet<MarketType>,
    pub attributes: BTreeSet<String>,
    pub attribute2: BTreeSet<String>,
}

pub fn available_options(catalog: &Catalog, filters: &FilterState) -> AvailableOptions {
    let mut options = AvailableOptions::default();
    for cultivar in filter_catalog(catalog, filters) {
        if cultivar.is_sentinel() {
            continue;
        }
        options.flower_type.insert(cultivar.flower_type);
        options.market_type.insert(cultivar.market_type);
        options.attributes.extend(cultivar.attributes.iter().cloned());
        options.attribute2.extend(cultivar.attribute2.iter().cloned());
    }
    options
}

/// One filter button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption<T> {
    pub value: T,
    pub selected: bool,
    pub enabled: bool,
}

/// Button state for every domain value of every category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub flower_type: Vec<FilterOption<FlowerType>>,
    pub market_type: Vec<FilterOption<MarketType>>,
    pub attributes: Vec<FilterOption<String>>,
    pub attribute2: Vec<FilterOption<String>>,
}

/// A category's buttons plus any tag selected there from the other trait set
fn with_selected<'a>(mut domain: BTreeSet<&'a str>, selected: &'a BTreeSet<String>) -> BTreeSet<&'a str> {
    domain.extend(selected.iter().map(String::as_str));
    domain
}

/// A button is enabled if its value survives the applied filters or is
/// already selected, so a selection can always be undone.
pub fn filter_options(catalog: &Catalog, filters: &FilterState) -> FilterOptions {
    let narrowed = available_options(catalog, filters);

    fn option<T: Ord + Clone>(value: T, selected: &BTreeSet<T>, narrowed: &BTreeSet<T>) -> FilterOption<T> {
        let is_selected = selected.contains(&value);
        FilterOption {
            enabled: is_selected || narrowed.contains(&value),
            selected: is_selected,
            value,
        }
    }

    FilterOptions {
        flower_type: FlowerType::ALL
            .into_iter()
            .map(|v| option(v, &filters.flower_type, &narrowed.flower_type))
            .collect(),
        market_type: MarketType::ALL
            .into_iter()
            .map(|v| option(v, &filters.market_type, &narrowed.market_type))
            .collect(),
        attributes: with_selected(catalog.attribute_domain(), &filters.attributes)
            .into_iter()
            .map(|v| option(v.to_string(), &filters.attributes, &narrowed.attributes))
            .collect(),
        attribute2: with_selected(catalog.attribute2_domain(), &filters.attribute2)
            .into_iter()
            .map(|v| option(v.to_string(), &filters.attribute2, &narrowed.attribute2))
            .collect(),
    }
}
