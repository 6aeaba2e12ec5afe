//! Strawberry Cultivar Catalog
//!
//! Data layer and JSON API for the cultivar exploration site:
//! - `catalog`: Static cultivar records loaded once at startup
//! - `filter`: Trait filtering and available-option narrowing
//! - `content`: Localized content records with English fallback
//! - `series` / `chart`: CSV series loading and chart row shaping
//! - `contact`: Contact form validation and email relay
//!
//! The HTTP server lives behind the `api` feature.

pub mod catalog;
pub mod chart;
pub mod config;
pub mod content;
pub mod filter;
pub mod profiles;
pub mod series;
pub mod session;

#[cfg(feature = "api")]
pub mod contact;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use catalog::{Catalog, Cultivar, FlowerType, MarketType, SENTINEL_ID};
pub use chart::{build_radar, build_series, ChartRow, Metric, RadarRow};
pub use config::AppConfig;
pub use content::{CultivarContent, Language};
pub use filter::{available_options, filter_catalog, filter_options, FilterState};
pub use session::{BrowseSession, RequestToken};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
