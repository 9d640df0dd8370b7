use super::regions::{lookup_region, parse_bbox, region_names};
use crate::config::GeorectConfig;
use crate::rtree::Rectangle;
use crate::storage::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "georect",
    version,
    about = "Spatial rectangle queries over CSV data backed by an in-memory R-tree",
    long_about = "georect loads rectangular records from a CSV file into an R-tree index,\nthen finds every record overlapping a query region whose population meets a threshold.\nQuery parameters not given on the command line are asked for interactively."
)]
pub struct CliArgs {
    /// 配置文件路径
    #[arg(short, long, default_value = "georect.toml")]
    pub config: String,

    /// 生成默认配置文件并退出
    #[arg(long)]
    pub generate_config: bool,

    /// Input CSV file (overrides config file)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file for the results (overrides config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Named query region, e.g. "united states", "china", "world"
    #[arg(short, long, conflicts_with = "bbox")]
    pub region: Option<String>,

    /// Query rectangle as minx,miny,maxx,maxy
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    pub bbox: Option<Rectangle>,

    /// Minimum population (inclusive)
    #[arg(short = 'p', long, value_parser = clap::value_parser!(i64).range(0..))]
    pub min_population: Option<i64>,

    /// Minimum entries per node (overrides config file)
    #[arg(long)]
    pub min_entries: Option<usize>,

    /// Maximum entries per node (overrides config file)
    #[arg(long)]
    pub max_entries: Option<usize>,

    /// Log level (overrides config file)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the tree structure after loading
    #[arg(long)]
    pub dump_tree: bool,

    /// Export the tree structure as JSON to this file after loading
    #[arg(long)]
    pub dump_json: Option<PathBuf>,
}

impl CliArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(region) = &self.region {
            if lookup_region(region).is_none() {
                let known: Vec<&str> = region_names().collect();
                return Err(format!(
                    "Unknown region '{}'. Known regions: {}",
                    region,
                    known.join(", ")
                ));
            }
        }
        Ok(())
    }

    /// 命令行参数覆盖配置文件
    pub fn apply_overrides(&self, config: &mut GeorectConfig) {
        if let Some(input) = &self.input {
            config.io.input_file = input.clone();
        }
        if let Some(output) = &self.output {
            config.io.output_file = output.clone();
        }
        if let Some(format) = self.format {
            config.io.output_format = format;
        }
        if let Some(min_entries) = self.min_entries {
            config.index.min_entries = min_entries;
        }
        if let Some(max_entries) = self.max_entries {
            config.index.max_entries = max_entries;
        }
        if let Some(log_level) = &self.log_level {
            config.logging.level = log_level.clone();
        }
    }

    /// 命令行给出的查询矩形（没有给出时为 None，需要交互输入）
    pub fn query_rectangle(&self) -> Option<Rectangle> {
        self.bbox
            .or_else(|| self.region.as_deref().and_then(lookup_region))
    }
}
