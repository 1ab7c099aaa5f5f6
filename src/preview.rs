//! 数据概览：head / tail / info / describe / 缺失值 / 重复行

use anyhow::Result;
use polars::prelude::*;
use tracing::info;

const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: DataType,
    pub non_null: usize,
}

pub fn info(df: &DataFrame) -> Vec<ColumnInfo> {
    df.get_columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name().to_string(),
            dtype: c.dtype().clone(),
            non_null: c.len() - c.null_count(),
        })
        .collect()
}

pub fn null_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}

/// 与前面某一行完全相同的行数
pub fn duplicate_count(df: &DataFrame) -> Result<usize> {
    let unique = df
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    Ok(df.height() - unique.height())
}

/// 每个数值列一列统计量，第一列是统计量名称
pub fn describe(df: &DataFrame) -> Result<DataFrame> {
    let mut columns: Vec<Column> = vec![Series::new("statistic".into(), STATISTICS).into()];
    for column in df.get_columns().iter().filter(|c| c.dtype().is_primitive_numeric()) {
        let values = column
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect::<Vec<f64>>();
        columns.push(Series::new(column.name().clone(), summarize(values)).into());
    }
    Ok(DataFrame::new(columns)?)
}

fn summarize(mut values: Vec<f64>) -> Vec<Option<f64>> {
    let n = values.len();
    if n == 0 {
        let mut empty = vec![None; STATISTICS.len()];
        empty[0] = Some(0.0);
        return empty;
    }
    values.sort_by(f64::total_cmp);

    let mean = values.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        (ss / (n - 1) as f64).sqrt()
    });

    vec![
        Some(n as f64),
        Some(mean),
        std,
        Some(values[0]),
        Some(quantile(&values, 0.25)),
        Some(quantile(&values, 0.5)),
        Some(quantile(&values, 0.75)),
        Some(values[n - 1]),
    ]
}

// 线性插值，输入已排序且非空
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// 打印原始数据的概览
pub fn report(df: &DataFrame, rows: usize) -> Result<()> {
    info!("first {} rows:\n{}", rows, df.head(Some(rows)));
    info!("last {} rows:\n{}", rows, df.tail(Some(rows)));

    for c in info(df) {
        info!(column = %c.name, dtype = %c.dtype, non_null = c.non_null, "column info");
    }
    info!("summary statistics:\n{}", describe(df)?);

    for (name, nulls) in null_counts(df).into_iter().filter(|(_, n)| *n > 0) {
        info!(column = %name, nulls, "missing values");
    }
    info!(duplicates = duplicate_count(df)?, rows = df.height(), "duplicate rows");
    Ok(())
}
