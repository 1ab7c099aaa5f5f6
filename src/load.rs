use std::io::Cursor;

use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

use crate::DataSet;

/// 推断列类型时最多读取的行数
const INFER_SCHEMA_ROWS: usize = 100;

pub trait Load {
    type Error;
    fn load(self) -> Result<DataSet, Self::Error>;
}

#[derive(Debug)]
pub enum Loader {
    Csv(CsvLoader),
}

#[derive(Debug)]
pub struct CsvLoader {
    data: String,
    separator: u8,
}

/// 根据表头判断分隔符，逗号和制表符两种
pub fn detect_content(data: String) -> Loader {
    let header = data.lines().next().unwrap_or_default();
    let separator = if header.contains('\t') && !header.contains(',') {
        b'\t'
    } else {
        b','
    };
    Loader::Csv(CsvLoader { data, separator })
}

impl Loader {
    pub fn load(self) -> Result<DataSet> {
        match self {
            Loader::Csv(csv) => csv.load(),
        }
    }
}

impl Load for CsvLoader {
    type Error = anyhow::Error;

    fn load(self) -> Result<DataSet, Self::Error> {
        let separator = self.separator;
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .map_parse_options(|opts| opts.with_separator(separator))
            .into_reader_with_file_handle(Cursor::new(self.data.into_bytes()))
            .finish()?;
        debug!(rows = df.height(), columns = df.width(), "loaded csv");
        Ok(DataSet(df))
    }
}
