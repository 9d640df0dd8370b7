use super::geometry_utils::items_to_geojson;
use super::loader::CSV_HEADER;
use crate::rtree::DataItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// 结果文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 与输入相同的 CSV 格式
    #[default]
    Csv,
    /// GeoJSON FeatureCollection
    #[value(name = "geojson")]
    GeoJson,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::GeoJson => write!(f, "geojson"),
        }
    }
}

/// 结果写出错误
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to write results: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to encode GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// 按指定格式写出结果
pub fn write_results<W: Write>(
    out: &mut W,
    items: &[DataItem],
    format: OutputFormat,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Csv => write_csv(out, items),
        OutputFormat::GeoJson => write_geojson(out, items),
    }
}

/// 写出结果文件（已存在则覆盖）
pub fn write_results_to_file<P: AsRef<Path>>(
    path: P,
    items: &[DataItem],
    format: OutputFormat,
) -> Result<(), OutputError> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_results(&mut out, items, format)?;
    out.flush()?;
    info!(
        "Wrote {} records to {} ({})",
        items.len(),
        path.display(),
        format
    );
    Ok(())
}

/// CSV：表头与输入相同，名称总是加双引号，内部的引号写成两个
pub fn write_csv<W: Write>(out: &mut W, items: &[DataItem]) -> Result<(), OutputError> {
    writeln!(out, "{}", CSV_HEADER)?;
    for item in items {
        writeln!(
            out,
            "{},\"{}\",{},{},{},{},{}",
            item.id,
            item.name.replace('"', "\"\""),
            item.population,
            item.bounds.min_corner.x,
            item.bounds.min_corner.y,
            item.bounds.max_corner.x,
            item.bounds.max_corner.y
        )?;
    }
    Ok(())
}

pub fn write_geojson<W: Write>(out: &mut W, items: &[DataItem]) -> Result<(), OutputError> {
    let geojson = items_to_geojson(items);
    serde_json::to_writer_pretty(&mut *out, &geojson)?;
    writeln!(out)?;
    Ok(())
}
