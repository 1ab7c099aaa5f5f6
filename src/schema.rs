use anyhow::Result;
use polars::prelude::*;

use crate::error::ExploreError;

pub const PROVINCE_STATE: &str = "Province_State";
pub const COUNTRY_REGION: &str = "Country_Region";
pub const LAST_UPDATE: &str = "Last_Update";
pub const CONFIRMED: &str = "Confirmed";
pub const DEATHS: &str = "Deaths";
pub const RECOVERED: &str = "Recovered";
pub const ACTIVE: &str = "Active";

pub const SEVERITY: &str = "Severity";
pub const CONFIRMED_BINS: &str = "Confirmed_Bins";
pub const NEW_CASES: &str = "New_Cases";
pub const NEW_CASES_MA: &str = "New_Cases_MA";

/// 日报中的计数列
pub const COUNT_COLUMNS: [&str; 4] = [CONFIRMED, DEATHS, RECOVERED, ACTIVE];

pub const REQUIRED_COLUMNS: [&str; 7] = [
    PROVINCE_STATE,
    COUNTRY_REGION,
    LAST_UPDATE,
    CONFIRMED,
    DEATHS,
    RECOVERED,
    ACTIVE,
];

/// 加载后立即检查列，缺列时尽早报错并带上列名
pub fn require_columns(df: &DataFrame) -> Result<(), ExploreError> {
    match REQUIRED_COLUMNS
        .iter()
        .find(|name| df.get_column_index(name).is_none())
    {
        Some(missing) => Err(ExploreError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

/// 按行序取出一列，统一转成 f64，null 保留为 None
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// 任何类型都先转成字符串，数值列得到的是格式化后的文本
pub fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
