//! 过滤、排序、索引、分组聚合、合并与透视

use std::collections::HashMap;

use anyhow::{bail, Result};
use polars::prelude::*;

use crate::schema::str_values;
use crate::DataSet;

/// column > threshold 的行
pub fn filter_above(ds: &DataSet, column: &str, threshold: f64) -> Result<DataSet> {
    let df = ds
        .0
        .clone()
        .lazy()
        .filter(col(column).gt(lit(threshold)))
        .collect()?;
    Ok(DataSet(df))
}

/// 稳定排序，相同的值保持原来的先后
pub fn sort_by(ds: &DataSet, column: &str, descending: bool) -> Result<DataSet> {
    let df = ds.0.sort(
        [column],
        SortMultipleOptions::default()
            .with_order_descending(descending)
            .with_maintain_order(true),
    )?;
    Ok(DataSet(df))
}

pub fn project(ds: &DataSet, columns: &[&str]) -> Result<DataSet> {
    Ok(DataSet(ds.0.select(columns.iter().copied())?))
}

/// 按 by 分组求 value 的和，组按键升序排列
pub fn group_sum(ds: &DataSet, by: &str, value: &str) -> Result<DataSet> {
    let df = ds
        .0
        .clone()
        .lazy()
        .group_by([col(by)])
        .agg([col(value).sum()])
        .sort([by], SortMultipleOptions::default())
        .collect()?;
    Ok(DataSet(df))
}

/// 内连接，只保留两边都有的键，行序跟随左表
pub fn merge_on(left: &DataSet, right: &DataSet, on: &str) -> Result<DataSet> {
    let df = left
        .0
        .clone()
        .lazy()
        .join(
            right.0.clone().lazy(),
            [col(on)],
            [col(on)],
            JoinArgs {
                maintain_order: MaintainOrderJoin::Left,
                ..JoinArgs::new(JoinType::Inner)
            },
        )
        .collect()?;
    Ok(DataSet(df))
}

/// 每个 index 一行，每个 value 一列；同一 index 有多行时取平均
pub fn pivot_mean(ds: &DataSet, index: &str, values: &[&str]) -> Result<DataSet> {
    let df = ds
        .0
        .clone()
        .lazy()
        .group_by([col(index)])
        .agg(values.iter().map(|v| col(*v).mean()).collect::<Vec<_>>())
        .sort([index], SortMultipleOptions::default())
        .collect()?;
    Ok(DataSet(df))
}

/// 以某一列为索引的表，索引列放在最前；索引列必须是字符串列
#[derive(Debug, Clone)]
pub struct IndexedTable {
    key: String,
    frame: DataFrame,
    positions: HashMap<String, Vec<IdxSize>>,
}

impl IndexedTable {
    pub fn new(ds: &DataSet, key: &str) -> Result<Self> {
        let dtype = ds.column(key)?.dtype();
        if dtype != &DataType::String {
            bail!("index column `{key}` must be a string column, found {dtype}");
        }
        let order = std::iter::once(key.to_string())
            .chain(
                ds.get_column_names()
                    .into_iter()
                    .filter(|name| name.as_str() != key)
                    .map(|name| name.to_string()),
            )
            .collect::<Vec<_>>();
        let frame = ds.0.select(order)?;

        let mut positions: HashMap<String, Vec<IdxSize>> = HashMap::new();
        for (row, value) in str_values(&frame, key)?.into_iter().enumerate() {
            if let Some(value) = value {
                positions.entry(value).or_default().push(row as IdxSize);
            }
        }

        Ok(IndexedTable {
            key: key.to_string(),
            frame,
            positions,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// 索引值对应的所有行，没有时返回 None
    pub fn loc(&self, key: &str) -> Result<Option<DataFrame>> {
        let Some(rows) = self.positions.get(key) else {
            return Ok(None);
        };
        let idx = IdxCa::from_vec("idx".into(), rows.clone());
        Ok(Some(self.frame.take(&idx)?))
    }
}
