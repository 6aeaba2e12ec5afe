//! Cultivar Catalog
//!
//! Static in-memory list of cultivar records. Built once at startup from
//! `data/catalog.json` and never mutated afterwards.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Intro record that is always part of a filtered result
pub const SENTINEL_ID: &str = "debug";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cultivar with empty id at position {0}")]
    EmptyId(usize),
    #[error("duplicate cultivar id: {0}")]
    DuplicateId(String),
}

/// Flowering-trigger classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlowerType {
    #[serde(rename = "Day-Neutral")]
    DayNeutral,
    #[serde(rename = "Short-Day")]
    ShortDay,
}

impl FlowerType {
    pub const ALL: [FlowerType; 2] = [FlowerType::DayNeutral, FlowerType::ShortDay];
}

/// Planting season / market the cultivar is sold into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarketType {
    #[serde(rename = "Fall Plant")]
    FallPlant,
    #[serde(rename = "Summer Plant")]
    SummerPlant,
    #[serde(rename = "Eastern Fall Plant")]
    EasternFallPlant,
}

impl MarketType {
    pub const ALL: [MarketType; 3] = [
        MarketType::FallPlant,
        MarketType::SummerPlant,
        MarketType::EasternFallPlant,
    ];
}

/// Performance snapshot shown on the cultivar card
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CultivarStats {
    #[serde(rename = "yield")]
    pub yield_per_plant: f64,
    pub brix: f64,
    pub shelf_life: f64,
    pub fruit_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cultivar {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub description: String,
    pub flower_type: FlowerType,
    pub market_type: MarketType,
    /// Trait tags, first set
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Trait tags, second set. Matched together with `attributes`.
    #[serde(default)]
    pub attribute2: Vec<String>,
    #[serde(default)]
    pub stats: CultivarStats,
}

impl Cultivar {
    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_ID
    }

    /// True if the tag is present in either trait set
    pub fn has_trait(&self, tag: &str) -> bool {
        self.attributes.iter().chain(&self.attribute2).any(|t| t == tag)
    }

    /// Union of both trait sets, first occurrence wins
    pub fn key_attributes(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.attributes
            .iter()
            .chain(&self.attribute2)
            .map(String::as_str)
            .filter(|t| seen.insert(*t))
            .collect()
    }

    fn dedup_traits(&mut self) {
        dedup_in_place(&mut self.attributes);
        dedup_in_place(&mut self.attribute2);
    }
}

fn dedup_in_place(tags: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    tags.retain(|t| seen.insert(t.clone()));
}

/// Immutable cultivar list with an id index
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cultivars: Vec<Cultivar>,
    index: FxHashMap<String, usize>,
}

impl Catalog {
    pub fn new(mut cultivars: Vec<Cultivar>) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::default();
        for (pos, cultivar) in cultivars.iter_mut().enumerate() {
            if cultivar.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(pos));
            }
            cultivar.dedup_traits();
            if index.insert(cultivar.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(cultivar.id.clone()));
            }
        }
        Ok(Self { cultivars, index })
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let cultivars: Vec<Cultivar> = serde_json::from_slice(bytes)?;
        Self::new(cultivars)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_slice(&bytes)
    }

    pub fn get(&self, id: &str) -> Option<&Cultivar> {
        self.index.get(id).map(|&pos| &self.cultivars[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Cultivar> {
        self.cultivars.iter()
    }

    pub fn as_slice(&self) -> &[Cultivar] {
        &self.cultivars
    }

    pub fn len(&self) -> usize {
        self.cultivars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cultivars.is_empty()
    }

    /// Every tag used in the `attributes` field across the catalog
    pub fn attribute_domain(&self) -> BTreeSet<&str> {
        self.cultivars
            .iter()
            .flat_map(|c| c.attributes.iter().map(String::as_str))
            .collect()
    }

    /// Every tag used in the `attribute2` field across the catalog
    pub fn attribute2_domain(&self) -> BTreeSet<&str> {
        self.cultivars
            .iter()
            .flat_map(|c| c.attribute2.iter().map(String::as_str))
            .collect()
    }

    /// Every tag in either trait field. Both trait filter categories
    /// accept any value from this union.
    pub fn trait_domain(&self) -> BTreeSet<&str> {
        self.cultivars
            .iter()
            .flat_map(|c| c.attributes.iter().chain(&c.attribute2).map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn cultivar(
        id: &str,
        flower_type: FlowerType,
        market_type: MarketType,
        attributes: &[&str],
        attribute2: &[&str],
    ) -> Cultivar {
        Cultivar {
            id: id.to_string(),
            name: id.to_string(),
            emoji: String::new(),
            description: String::new(),
            flower_type,
            market_type,
            attributes: attributes.iter().map(|s| s.to_string()).collect(),
            attribute2: attribute2.iter().map(|s| s.to_string()).collect(),
            stats: CultivarStats::default(),
        }
    }

    /// Small catalog covering every filter category
    pub fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            cultivar(SENTINEL_ID, FlowerType::DayNeutral, MarketType::FallPlant, &[], &[]),
            cultivar(
                "x",
                FlowerType::DayNeutral,
                MarketType::FallPlant,
                &["fusarium resistant"],
                &["high yields"],
            ),
            cultivar(
                "y",
                FlowerType::ShortDay,
                MarketType::SummerPlant,
                &["cold tolerant", "organic"],
                &["large fruit"],
            ),
            cultivar(
                "z",
                FlowerType::DayNeutral,
                MarketType::EasternFallPlant,
                &["organic", "high yields"],
                &["fusarium resistant"],
            ),
        ])
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_parse_catalog_json() {
        let json = r#"[
            {
                "id": "ruby-coast",
                "name": "Ruby Coast",
                "emoji": "🍓",
                "flowerType": "Day-Neutral",
                "marketType": "Eastern Fall Plant",
                "attributes": ["organic"],
                "attribute2": ["high yields"],
                "stats": {"yield": 2.1, "brix": 9.5, "shelfLife": 7, "fruitWeight": 28}
            }
        ]"#;
        let catalog = Catalog::from_json_slice(json.as_bytes()).unwrap();
        let c = catalog.get("ruby-coast").unwrap();
        assert_eq!(c.flower_type, FlowerType::DayNeutral);
        assert_eq!(c.market_type, MarketType::EasternFallPlant);
        assert_eq!(c.stats.shelf_life, 7.0);
        assert!(c.has_trait("high yields"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let a = cultivar("a", FlowerType::DayNeutral, MarketType::FallPlant, &[], &[]);
        let err = Catalog::new(vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_key_attributes_union_without_duplicates() {
        let c = cultivar(
            "a",
            FlowerType::ShortDay,
            MarketType::SummerPlant,
            &["organic", "cold tolerant", "organic"],
            &["cold tolerant", "large fruit"],
        );
        assert_eq!(c.key_attributes(), vec!["organic", "cold tolerant", "large fruit"]);
    }

    #[test]
    fn test_insertion_order_and_domains() {
        let catalog = sample_catalog();
        let ids: Vec<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![SENTINEL_ID, "x", "y", "z"]);
        assert!(catalog.attribute_domain().contains("cold tolerant"));
        assert!(!catalog.attribute_domain().contains("large fruit"));
        assert!(catalog.attribute2_domain().contains("large fruit"));
        assert!(catalog.trait_domain().contains("large fruit"));
        assert!(catalog.trait_domain().contains("cold tolerant"));
        assert!(!catalog.trait_domain().contains("purple"));
    }
}
