use georect::client::{CliArgs, OutputFormatter, QueryPrompt};
use georect::config::LoggingConfig;
use georect::storage::{load_from_file, write_results_to_file};
use georect::{GeorectConfig, RTree, Result};
use std::io;
use std::process::ExitCode;
use tracing::{error, info, Level};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", OutputFormatter::format_error(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = CliArgs::parse_args();

    // 生成默认配置文件
    if args.generate_config {
        let config = GeorectConfig::default();
        config.save_to_file(&args.config)?;
        println!("✅ Generated default configuration: {}", args.config);
        println!("📝 You can edit this file and run georect again.");
        return Ok(ExitCode::SUCCESS);
    }

    args.validate()?;

    // 加载配置，命令行参数覆盖配置文件
    let mut config = GeorectConfig::from_file(&args.config)?;
    args.apply_overrides(&mut config);

    // 验证配置
    config.validate()?;

    // 初始化日志系统
    init_logging(&config.logging)?;

    println!("{}", OutputFormatter::format_banner());
    info!("📦 Version: {}", env!("CARGO_PKG_VERSION"));
    config.print_summary();

    // 1. 创建索引并加载数据
    let mut rtree = RTree::new(config.index.min_entries, config.index.max_entries);
    let input = config.io.input_file.display().to_string();
    let stats = match load_from_file(&config.io.input_file, &mut rtree) {
        Ok(stats) => stats,
        Err(e) => {
            error!("Loading '{}' failed: {}", input, e);
            eprintln!("{}", OutputFormatter::format_error(&e.to_string()));
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("{}", OutputFormatter::format_load_stats(&input, &stats));

    if rtree.is_empty() {
        eprintln!(
            "{}",
            OutputFormatter::format_error("R-Tree is empty after loading data. Cannot perform query.")
        );
        return Ok(ExitCode::FAILURE);
    }
    println!("{}", OutputFormatter::format_tree_summary(&rtree));

    // 2. 可选的结构输出
    if args.dump_tree {
        rtree.print_structure(&mut io::stdout().lock())?;
    }
    if let Some(path) = &args.dump_json {
        std::fs::write(path, rtree.export_to_json()?)?;
        info!("Tree structure exported to {}", path.display());
    }

    // 3. 查询参数：命令行给出的优先，其余交互输入
    let mut prompt = QueryPrompt::new(io::stdin().lock(), io::stdout());
    let bounds = match args.query_rectangle() {
        Some(bounds) => bounds,
        None => prompt.ask_query_rectangle()?,
    };
    let min_population = match args.min_population {
        Some(min_population) => min_population,
        None => prompt.ask_population_threshold()?,
    };

    // 4. 查询
    println!();
    println!("{}", OutputFormatter::format_query(&bounds, min_population));
    let results = rtree.search_with_population(&bounds, min_population);
    info!("Query returned {} records", results.len());
    println!("{}", OutputFormatter::format_results(&results));

    // 5. 写出结果
    write_results_to_file(&config.io.output_file, &results, config.io.output_format)?;
    println!(
        "{}",
        OutputFormatter::format_written(&config.io.output_file.display().to_string(), results.len())
    );

    Ok(ExitCode::SUCCESS)
}

/// 初始化日志系统
fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    match (config.output.as_str(), &config.log_file) {
        ("file", Some(log_file)) => {
            // 确保日志目录存在
            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::sync::Mutex::new(file))
                        .with_ansi(false)
                        .with_target(false),
                )
                .with(tracing_subscriber::filter::LevelFilter::from_level(filter))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .with(tracing_subscriber::filter::LevelFilter::from_level(filter))
                .init();
        }
    }

    Ok(())
}
