use crate::storage::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// georect 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeorectConfig {
    /// 索引配置
    pub index: IndexConfig,

    /// 输入输出配置
    pub io: IoConfig,

    /// 日志配置
    pub logging: LoggingConfig,
}

/// R-tree 分支参数
///
/// 不做校验：超出范围的值在创建树时被钳制
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// 每个节点的最小条目数
    #[serde(default = "default_min_entries")]
    pub min_entries: usize,

    /// 每个节点的最大条目数
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// 输入输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    /// 输入 CSV 文件
    #[serde(default = "default_input_file")]
    pub input_file: PathBuf,

    /// 结果文件
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// 结果格式：csv, geojson
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别：trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 日志输出：stdout, file
    #[serde(default = "default_log_output")]
    pub output: String,

    /// 日志文件路径（当 output = file 时）
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// 默认值函数
// ============================================================================

fn default_min_entries() -> usize {
    2
}

fn default_max_entries() -> usize {
    4
}

fn default_input_file() -> PathBuf {
    PathBuf::from("input_data.csv")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_output() -> String {
    "stdout".to_string()
}

// ============================================================================
// 实现
// ============================================================================

impl Default for GeorectConfig {
    fn default() -> Self {
        Self {
            index: IndexConfig {
                min_entries: default_min_entries(),
                max_entries: default_max_entries(),
            },
            io: IoConfig {
                input_file: default_input_file(),
                output_file: default_output_file(),
                output_format: OutputFormat::default(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                output: default_log_output(),
                log_file: None,
            },
        }
    }
}

impl GeorectConfig {
    /// 从文件加载配置
    ///
    /// 配置加载顺序（优先级从低到高）：
    /// 1. 默认配置（内嵌的 default.toml）
    /// 2. 用户配置文件（可选）
    /// 3. 环境变量（GEORECT__ 前缀，使用双下划线分隔嵌套）
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use georect::config::GeorectConfig;
    ///
    /// // 加载配置（如果文件不存在，使用默认配置）
    /// let config = GeorectConfig::from_file("georect.toml").unwrap();
    /// ```
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let settings = config::Config::builder()
            // 1. 加载默认配置（内嵌）
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            // 2. 加载用户配置（可选，不存在不报错）
            .add_source(config::File::with_name(path).required(false))
            // 3. 加载环境变量（GEORECT__ 前缀，双下划线分隔嵌套）
            .add_source(
                config::Environment::with_prefix("GEORECT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| format!("Failed to load config: {}", e))?;

        Ok(settings
            .try_deserialize()
            .map_err(|e| format!("Failed to parse config: {}", e))?)
    }

    /// 保存配置到文件
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use georect::config::GeorectConfig;
    ///
    /// let config = GeorectConfig::default();
    /// config.save_to_file("georect.toml").unwrap();
    /// ```
    pub fn save_to_file(&self, path: &str) -> crate::Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        std::fs::write(path, toml_string)
            .map_err(|e| format!("Failed to write config file: {}", e))?;
        Ok(())
    }

    /// 验证配置
    ///
    /// 检查日志级别、日志输出目标，以及文件输出时是否给出了日志文件。
    /// 分支参数不在这里检查。
    pub fn validate(&self) -> Result<(), String> {
        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(format!(
                    "Invalid log level: '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ))
            }
        }

        // 验证日志输出
        match self.logging.output.as_str() {
            "stdout" | "file" => {}
            _ => {
                return Err(format!(
                    "Invalid log output: '{}'. Must be one of: stdout, file",
                    self.logging.output
                ))
            }
        }

        // 验证日志文件配置
        if self.logging.output == "file" && self.logging.log_file.is_none() {
            return Err("Log output is 'file' but log_file path is not specified".to_string());
        }

        Ok(())
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        println!("📋 Georect Configuration:");
        println!(
            "   Index:       m={}, M={}",
            self.index.min_entries, self.index.max_entries
        );
        println!();
        println!("   Input File:  {}", self.io.input_file.display());
        println!("   Output File: {}", self.io.output_file.display());
        println!("   Format:      {}", self.io.output_format);
        println!();
        println!("   Log Level:   {}", self.logging.level);
        println!("   Log Output:  {}", self.logging.output);
        if let Some(ref log_file) = self.logging.log_file {
            println!("   Log File:    {}", log_file.display());
        }
        println!();
    }
}
