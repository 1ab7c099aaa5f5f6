use std::ops::{Deref, DerefMut};

use anyhow::Result;
use polars::frame::DataFrame;
use tracing::{info, warn};

use crate::query::IndexedTable;
use crate::schema::{CONFIRMED, COUNTRY_REGION, DEATHS, PROVINCE_STATE};

pub mod chart;
pub mod clean;
mod config;
pub mod enrich;
mod error;
mod fetcher;
mod load;
pub mod preview;
pub mod query;
pub mod schema;

pub use config::{Config, DEFAULT_SOURCE};
pub use error::ExploreError;
pub use fetcher::{retrieve_data, Fetch};
pub use load::{detect_content, CsvLoader, Load, Loader};

#[derive(Debug, Clone)]
pub struct DataSet(DataFrame);

impl Deref for DataSet {
    type Target = DataFrame;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DataSet {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<DataFrame> for DataSet {
    fn from(df: DataFrame) -> Self {
        DataSet(df)
    }
}

impl DataSet {
    pub fn into_inner(self) -> DataFrame {
        self.0
    }
}

/// 每个阶段的中间结果
#[derive(Debug)]
pub struct Exploration {
    pub raw: DataSet,
    pub deduplicated: DataSet,
    pub cleaned: DataSet,
    pub enriched: DataSet,
    pub high_cases: DataSet,
    pub sorted_cases: DataSet,
    pub indexed: IndexedTable,
    pub grouped_cases: DataSet,
    pub merged: DataSet,
    pub pivoted: DataSet,
}

/// 从 source 中获取数据，清洗、派生列，然后做过滤、排序、分组、合并和透视
pub async fn explore(config: &Config) -> Result<Exploration> {
    info!("retrieving data from source: {}", config.source);
    let raw = detect_content(retrieve_data(&config.source).await?).load()?;
    schema::require_columns(&raw)?;
    info!(rows = raw.height(), columns = raw.width(), "loaded daily report");

    preview::report(&raw, config.preview_rows)?;

    let deduplicated = clean::drop_duplicates(&raw)?;
    let cleaned = clean::clean(&raw)?;
    info!(rows = cleaned.height(), "cleaned");

    let enriched = enrich::enrich(&cleaned, config.scale, config.window)?;
    info!(
        "with derived columns:\n{}",
        enriched.head(Some(config.preview_rows))
    );

    let high_cases = query::filter_above(&enriched, CONFIRMED, config.threshold)?;
    if high_cases.height() == 0 {
        warn!(threshold = config.threshold, "no rows above the confirmed threshold");
    }
    let sorted_cases = query::sort_by(&enriched, CONFIRMED, true)?;
    let indexed = IndexedTable::new(&enriched, PROVINCE_STATE)?;
    let grouped_cases = query::group_sum(&enriched, COUNTRY_REGION, CONFIRMED)?;

    let by_confirmed = query::project(&enriched, &[PROVINCE_STATE, CONFIRMED])?;
    let by_deaths = query::project(&enriched, &[PROVINCE_STATE, DEATHS])?;
    let merged = query::merge_on(&by_confirmed, &by_deaths, PROVINCE_STATE)?;

    let pivoted = query::pivot_mean(&enriched, PROVINCE_STATE, &[CONFIRMED, DEATHS])?;

    info!(rows = high_cases.height(), "high cases:\n{}", *high_cases);
    info!("sorted by confirmed:\n{}", sorted_cases.head(Some(config.preview_rows)));
    info!("grouped by {}:\n{}", COUNTRY_REGION, *grouped_cases);
    info!(rows = merged.height(), "merged on {}", PROVINCE_STATE);
    info!("pivoted:\n{}", pivoted.head(Some(config.preview_rows)));

    Ok(Exploration {
        raw,
        deduplicated,
        cleaned,
        enriched,
        high_cases,
        sorted_cases,
        indexed,
        grouped_cases,
        merged,
        pivoted,
    })
}
