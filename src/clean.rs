use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::schema::LAST_UPDATE;
use crate::DataSet;

/// 去掉任意一列为空的行
pub fn drop_missing(ds: &DataSet) -> Result<DataSet> {
    let predicate = ds
        .get_column_names()
        .into_iter()
        .map(|name| col(name.as_str()).is_not_null())
        .reduce(|acc, e| acc.and(e))
        .unwrap_or_else(|| lit(true));

    let df = ds.0.clone().lazy().filter(predicate).collect()?;
    debug!(before = ds.height(), after = df.height(), "dropped rows with missing values");
    Ok(DataSet(df))
}

/// 去掉完全重复的行，保留第一次出现的
pub fn drop_duplicates(ds: &DataSet) -> Result<DataSet> {
    let df = ds
        .0
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    Ok(DataSet(df))
}

/// 日报里 Last_Update 的格式
pub const LAST_UPDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Last_Update 转成毫秒精度的时间戳，无法解析时报错
pub fn parse_timestamps(ds: DataSet) -> Result<DataSet> {
    let df = ds
        .0
        .lazy()
        .with_column(
            col(LAST_UPDATE)
                .str()
                .to_datetime(
                    Some(TimeUnit::Milliseconds),
                    None,
                    StrptimeOptions {
                        format: Some(LAST_UPDATE_FORMAT.into()),
                        strict: true,
                        ..Default::default()
                    },
                    lit("raise"),
                )
                .alias(LAST_UPDATE),
        )
        .collect()?;
    Ok(DataSet(df))
}

pub fn clean(ds: &DataSet) -> Result<DataSet> {
    let cleaned = parse_timestamps(drop_missing(ds)?)?;
    if cleaned.height() == 0 {
        warn!(rows = ds.height(), "every row had a missing value, continuing with an empty table");
    }
    Ok(cleaned)
}
