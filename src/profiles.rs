//! Per-cultivar display configuration
//!
//! Icons, fixed comparison partner and primary-lock flag for each cultivar id.
//! Ids without an entry use `DEFAULT_PROFILE`.

use crate::catalog::{Catalog, Cultivar, SENTINEL_ID};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CultivarProfile {
    pub icon: &'static str,
    pub chart_icon: &'static str,
    /// Comparison partner that replaces any requested comparison
    pub fixed_comparison: Option<&'static str>,
    /// Only ever shown as the primary cultivar, never as a comparison
    pub locked_primary: bool,
}

pub const DEFAULT_PROFILE: CultivarProfile = CultivarProfile {
    icon: "/images/icons/strawberry.svg",
    chart_icon: "/images/icons/strawberry-chart.svg",
    fixed_comparison: None,
    locked_primary: false,
};

// ============================================================================
// EMBEDDED PROFILE TABLE
// ============================================================================

static PROFILES: &[(&str, CultivarProfile)] = &[
    (
        SENTINEL_ID,
        CultivarProfile {
            icon: "/images/icons/intro.svg",
            chart_icon: "/images/icons/intro.svg",
            fixed_comparison: None,
            locked_primary: true,
        },
    ),
    (
        "ruby-coast",
        CultivarProfile {
            icon: "/images/icons/ruby-coast.svg",
            chart_icon: "/images/icons/ruby-coast-chart.svg",
            fixed_comparison: None,
            locked_primary: false,
        },
    ),
    (
        "sierra-dawn",
        CultivarProfile {
            icon: "/images/icons/sierra-dawn.svg",
            chart_icon: "/images/icons/sierra-dawn-chart.svg",
            fixed_comparison: None,
            locked_primary: false,
        },
    ),
    (
        "eastern-crown",
        CultivarProfile {
            icon: "/images/icons/eastern-crown.svg",
            chart_icon: "/images/icons/eastern-crown-chart.svg",
            fixed_comparison: Some("sierra-dawn"),
            locked_primary: false,
        },
    ),
    (
        "harbor-sweet",
        CultivarProfile {
            icon: "/images/icons/harbor-sweet.svg",
            chart_icon: "/images/icons/harbor-sweet-chart.svg",
            fixed_comparison: None,
            locked_primary: true,
        },
    ),
];

pub fn profile_for(id: &str) -> &'static CultivarProfile {
    PROFILES
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, profile)| profile)
        .unwrap_or(&DEFAULT_PROFILE)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("unknown comparison cultivar: {0}")]
    Unknown(String),
    #[error("{0} cannot be used as a comparison")]
    Locked(String),
}

/// Cultivars the primary may be compared against
pub fn comparison_options<'a>(catalog: &'a Catalog, primary_id: &str) -> Vec<&'a Cultivar> {
    if let Some(fixed) = profile_for(primary_id).fixed_comparison {
        return catalog.get(fixed).into_iter().collect();
    }
    catalog
        .iter()
        .filter(|c| c.id != primary_id && !c.is_sentinel() && !profile_for(&c.id).locked_primary)
        .collect()
}

/// Pick the comparison cultivar for a chart request.
///
/// A fixed partner wins over the request; comparing a cultivar with itself
/// yields no comparison.
pub fn resolve_comparison<'a>(
    catalog: &'a Catalog,
    primary_id: &str,
    requested: Option<&str>,
) -> Result<Option<&'a Cultivar>, ComparisonError> {
    if let Some(fixed) = profile_for(primary_id).fixed_comparison {
        return Ok(catalog.get(fixed));
    }
    let Some(requested) = requested.filter(|r| !r.is_empty() && *r != primary_id) else {
        return Ok(None);
    };
    let cultivar = catalog
        .get(requested)
        .ok_or_else(|| ComparisonError::Unknown(requested.to_string()))?;
    if cultivar.is_sentinel() || profile_for(requested).locked_primary {
        return Err(ComparisonError::Locked(requested.to_string()));
    }
    Ok(Some(cultivar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::cultivar;
    use crate::catalog::{FlowerType, MarketType};

    fn catalog() -> Catalog {
        let c = |id: &str| cultivar(id, FlowerType::DayNeutral, MarketType::FallPlant, &[], &[]);
        Catalog::new(vec![
            c(SENTINEL_ID),
            c("ruby-coast"),
            c("sierra-dawn"),
            c("eastern-crown"),
            c("harbor-sweet"),
        ])
        .unwrap()
    }

    #[test]
    fn test_unknown_id_uses_default_profile() {
        assert_eq!(profile_for("no-such-cultivar"), &DEFAULT_PROFILE);
        assert!(profile_for(SENTINEL_ID).locked_primary);
    }

    #[test]
    fn test_fixed_comparison_overrides_request() {
        let catalog = catalog();
        let chosen = resolve_comparison(&catalog, "eastern-crown", Some("ruby-coast")).unwrap();
        assert_eq!(chosen.map(|c| c.id.as_str()), Some("sierra-dawn"));

        let options = comparison_options(&catalog, "eastern-crown");
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, "sierra-dawn");
    }

    #[test]
    fn test_locked_cultivars_not_comparable() {
        let catalog = catalog();
        assert_eq!(
            resolve_comparison(&catalog, "ruby-coast", Some("harbor-sweet")),
            Err(ComparisonError::Locked("harbor-sweet".to_string()))
        );
        let ids: Vec<&str> = comparison_options(&catalog, "ruby-coast")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["sierra-dawn", "eastern-crown"]);
    }

    #[test]
    fn test_self_comparison_dropped() {
        let catalog = catalog();
        assert_eq!(resolve_comparison(&catalog, "ruby-coast", Some("ruby-coast")), Ok(None));
        assert_eq!(resolve_comparison(&catalog, "ruby-coast", None), Ok(None));
        assert_eq!(
            resolve_comparison(&catalog, "ruby-coast", Some("nope")),
            Err(ComparisonError::Unknown("nope".to_string()))
        );
    }
}
