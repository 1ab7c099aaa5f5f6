//! 派生列：严重程度、按千缩放、分箱、新增病例及其滑动平均

use std::fmt;

use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::schema::{CONFIRMED, CONFIRMED_BINS, COUNT_COLUMNS, NEW_CASES, NEW_CASES_MA, SEVERITY};
use crate::DataSet;

pub const HIGH_THRESHOLD: f64 = 1_000_000.0;
pub const MEDIUM_THRESHOLD: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// NaN 和负数都落在 Low
    pub fn classify(count: f64) -> Self {
        if count > HIGH_THRESHOLD {
            Severity::High
        } else if count > MEDIUM_THRESHOLD {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const BIN_LABELS: [&str; 4] = ["0-10k", "10k-100k", "100k-1M", "1M+"];

/// 左开右闭的四个区间，最后一个边界是列的最大值
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    edges: [f64; 5],
}

impl Bins {
    pub fn with_max(max: f64) -> Self {
        Bins {
            edges: [0.0, 10_000.0, 100_000.0, 1_000_000.0, max],
        }
    }

    pub fn label(&self, value: f64) -> Option<&'static str> {
        self.edges
            .windows(2)
            .zip(BIN_LABELS)
            .find(|(edge, _)| value > edge[0] && value <= edge[1])
            .map(|(_, label)| label)
    }

    /// 最大值不超过 1M 时 "1M+" 区间为空
    pub fn is_degenerate(&self) -> bool {
        self.edges[4] <= self.edges[3]
    }

    /// 与 label 相同的分箱规则，落在所有区间外时为空
    pub fn expr(&self, column: &str) -> Expr {
        let value = col(column).cast(DataType::Float64);
        self.edges
            .windows(2)
            .zip(BIN_LABELS)
            .rev()
            .fold(null_str(), |acc, (edge, label)| {
                when(
                    value
                        .clone()
                        .gt(lit(edge[0]))
                        .and(value.clone().lt_eq(lit(edge[1]))),
                )
                .then(lit(label))
                .otherwise(acc)
            })
    }
}

/// 与上一行的差值，第一行没有值
pub fn diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    if values.is_empty() {
        return Vec::new();
    }
    std::iter::once(None)
        .chain(values.windows(2).map(|w| Some(w[1]? - w[0]?)))
        .collect()
}

/// 尾随窗口的均值，窗口内有空值或不满一个窗口时为 None
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let sum: Option<f64> = values[i + 1 - window..=i].iter().copied().sum();
            sum.map(|s| s / window as f64)
        })
        .collect()
}

fn null_str() -> Expr {
    lit(NULL).cast(DataType::String)
}

/// Confirmed 为空时 Severity 也为空
pub fn severity_expr() -> Expr {
    let confirmed = col(CONFIRMED).cast(DataType::Float64);
    when(confirmed.clone().is_null())
        .then(null_str())
        .when(confirmed.clone().gt(lit(HIGH_THRESHOLD)))
        .then(lit(Severity::High.as_str()))
        .when(confirmed.gt(lit(MEDIUM_THRESHOLD)))
        .then(lit(Severity::Medium.as_str()))
        .otherwise(lit(Severity::Low.as_str()))
        .alias(SEVERITY)
}

pub fn with_severity(ds: &DataSet) -> Result<DataSet> {
    let df = ds.0.clone().lazy().with_column(severity_expr()).collect()?;
    Ok(DataSet(df))
}

/// 四个计数列除以 factor
pub fn scale_counts(ds: &DataSet, factor: f64) -> Result<DataSet> {
    let df = ds
        .0
        .clone()
        .lazy()
        .with_columns(COUNT_COLUMNS.map(|name| {
            (col(name).cast(DataType::Float64) / lit(factor)).alias(name)
        }))
        .collect()?;
    Ok(DataSet(df))
}

pub fn with_confirmed_bins(ds: &DataSet) -> Result<DataSet> {
    let max = ds
        .column(CONFIRMED)?
        .as_materialized_series()
        .cast(&DataType::Float64)?
        .f64()?
        .max();

    let bins = match max {
        Some(max) => {
            let bins = Bins::with_max(max);
            if bins.is_degenerate() {
                warn!(max, "max confirmed does not exceed 1M, the last bin is empty");
            }
            bins.expr(CONFIRMED)
        }
        None => null_str(),
    };

    let df = ds
        .0
        .clone()
        .lazy()
        .with_column(bins.alias(CONFIRMED_BINS))
        .collect()?;
    Ok(DataSet(df))
}

/// 与上一行的差值，以及它的尾随窗口均值；窗口内有空值时均值为空
pub fn with_new_cases(ds: &DataSet, window: usize) -> Result<DataSet> {
    let confirmed = col(CONFIRMED).cast(DataType::Float64);
    let new_cases = (confirmed.clone() - confirmed.shift(lit(1))).alias(NEW_CASES);
    let average = if window == 0 {
        lit(NULL).cast(DataType::Float64)
    } else {
        col(NEW_CASES).rolling_mean(RollingOptionsFixedWindow {
            window_size: window,
            min_periods: window,
            ..Default::default()
        })
    };

    let df = ds
        .0
        .clone()
        .lazy()
        .with_column(new_cases)
        .with_column(average.alias(NEW_CASES_MA))
        .collect()?;
    Ok(DataSet(df))
}

/// 依次加上 Severity、缩放、Confirmed_Bins、New_Cases、New_Cases_MA
pub fn enrich(ds: &DataSet, factor: f64, window: usize) -> Result<DataSet> {
    let ds = with_severity(ds)?;
    let ds = scale_counts(&ds, factor)?;
    let ds = with_confirmed_bins(&ds)?;
    let ds = with_new_cases(&ds, window)?;
    debug!(columns = ds.width(), "derived columns added");
    Ok(ds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{float_values, str_values};

    #[test]
    fn severity_thresholds() {
        assert_eq!(Severity::classify(1_000_001.0), Severity::High);
        assert_eq!(Severity::classify(1_000_000.0), Severity::Medium);
        assert_eq!(Severity::classify(100_001.0), Severity::Medium);
        assert_eq!(Severity::classify(100_000.0), Severity::Low);
        assert_eq!(Severity::classify(0.0), Severity::Low);
        assert_eq!(Severity::classify(-5.0), Severity::Low);
        assert_eq!(Severity::classify(f64::NAN), Severity::Low);
        assert_eq!(Severity::High.to_string(), "High");
    }

    #[test]
    fn bins_are_right_inclusive() {
        let bins = Bins::with_max(2_345_909.0);
        assert_eq!(bins.label(5_000.0), Some("0-10k"));
        assert_eq!(bins.label(10_000.0), Some("0-10k"));
        assert_eq!(bins.label(50_000.0), Some("10k-100k"));
        assert_eq!(bins.label(500_000.0), Some("100k-1M"));
        assert_eq!(bins.label(1_000_000.0), Some("100k-1M"));
        assert_eq!(bins.label(2_345_909.0), Some("1M+"));
        assert_eq!(bins.label(0.0), None);
        assert_eq!(bins.label(3_000_000.0), None);
        assert!(!bins.is_degenerate());
    }

    #[test]
    fn small_max_leaves_last_bin_empty() {
        let bins = Bins::with_max(900_000.0);
        assert!(bins.is_degenerate());
        assert_eq!(bins.label(900_000.0), Some("100k-1M"));
        assert_eq!(bins.label(1_000_000.0), Some("100k-1M"));
    }

    #[test]
    fn rolling_mean_of_three() {
        let new_cases = [Some(10.0), Some(20.0), Some(30.0), Some(40.0)];
        assert_eq!(
            rolling_mean(&new_cases, 3),
            vec![None, None, Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn rolling_mean_propagates_missing() {
        let new_cases = [None, Some(20.0), Some(30.0), Some(40.0)];
        assert_eq!(
            rolling_mean(&new_cases, 3),
            vec![None, None, None, Some(30.0)]
        );
        assert_eq!(rolling_mean(&new_cases, 0), vec![None; 4]);
    }

    #[test]
    fn diff_starts_without_value() {
        let confirmed = [Some(10.0), Some(30.0), Some(25.0)];
        assert_eq!(diff(&confirmed), vec![None, Some(20.0), Some(-5.0)]);
        assert!(diff(&[]).is_empty());
    }

    fn report() -> PolarsResult<DataFrame> {
        df!(
            "Province_State" => ["Alabama", "Alaska", "California", "Colorado"],
            "Confirmed" => [365_747i64, 5_000, 2_345_909, 50_000],
            "Deaths" => [4_872i64, 206, 26_363, 4_873],
            "Recovered" => [202_137i64, 7_165, 1_000, 18_447],
            "Active" => [158_738i64, 39_648, 2_319_546, 317_878],
        )
    }

    #[test]
    fn severity_column_follows_confirmed() -> Result<()> {
        let ds = with_severity(&DataSet::from(report()?))?;
        let labels = str_values(&ds, SEVERITY)?;
        assert_eq!(
            labels,
            ["Medium", "Low", "High", "Low"]
                .map(|s| Some(s.to_string()))
                .to_vec()
        );
        Ok(())
    }

    #[test]
    fn counts_are_scaled_to_float() -> Result<()> {
        let ds = scale_counts(&DataSet::from(report()?), 1000.0)?;
        assert_eq!(ds.column("Deaths")?.dtype(), &DataType::Float64);
        assert_eq!(float_values(&ds, "Active")?[1], Some(39.648));
        Ok(())
    }

    #[test]
    fn bin_column_uses_column_max() -> Result<()> {
        let ds = with_confirmed_bins(&DataSet::from(report()?))?;
        let bins = str_values(&ds, CONFIRMED_BINS)?;
        assert_eq!(
            bins,
            ["100k-1M", "0-10k", "1M+", "10k-100k"]
                .map(|s| Some(s.to_string()))
                .to_vec()
        );
        Ok(())
    }

    #[test]
    fn columns_agree_with_helpers() -> Result<()> {
        let ds = DataSet::from(df!(
            "Confirmed" => [
                Some(365_747.0), Some(10_000.0), None, Some(1_000_000.0),
                Some(2_345_909.0), Some(100_000.0), Some(0.0), Some(47_019.0),
            ],
        )?);
        let confirmed = float_values(&ds, CONFIRMED)?;

        let severity = str_values(&*with_severity(&ds)?, SEVERITY)?;
        let expected: Vec<_> = confirmed
            .iter()
            .map(|v| v.map(|v| Severity::classify(v).to_string()))
            .collect();
        assert_eq!(severity, expected);

        let bins = Bins::with_max(2_345_909.0);
        let labels = str_values(&*with_confirmed_bins(&ds)?, CONFIRMED_BINS)?;
        let expected: Vec<_> = confirmed
            .iter()
            .map(|v| v.and_then(|v| bins.label(v)).map(str::to_string))
            .collect();
        assert_eq!(labels, expected);

        let derived = with_new_cases(&ds, 2)?;
        let expected_diff = diff(&confirmed);
        assert_eq!(float_values(&derived, NEW_CASES)?, expected_diff);
        let average = float_values(&derived, NEW_CASES_MA)?;
        let expected = rolling_mean(&expected_diff, 2);
        assert_eq!(average.len(), expected.len());
        for (got, want) in average.iter().zip(&expected) {
            match (got, want) {
                (Some(got), Some(want)) => assert!((got - want).abs() < 1e-6, "{got} != {want}"),
                _ => assert_eq!(got, want),
            }
        }
        Ok(())
    }

    #[test]
    fn zero_window_leaves_average_empty() -> Result<()> {
        let ds = with_new_cases(&DataSet::from(report()?), 0)?;
        assert_eq!(ds.column(NEW_CASES_MA)?.null_count(), ds.height());
        Ok(())
    }

    #[test]
    fn enrich_adds_all_columns() -> Result<()> {
        let ds = enrich(&DataSet::from(report()?), 1000.0, 3)?;
        assert_eq!(ds.width(), 9);

        // 分类在缩放之前
        assert_eq!(str_values(&ds, SEVERITY)?[2], Some("High".to_string()));

        let new_cases = float_values(&ds, NEW_CASES)?;
        assert_eq!(new_cases[0], None);
        assert!((new_cases[1].unwrap() - (5.0 - 365.747)).abs() < 1e-9);

        let average = float_values(&ds, NEW_CASES_MA)?;
        assert!(average[..3].iter().all(Option::is_none));
        assert!(average[3].is_some());
        Ok(())
    }
}
