use crate::rtree::{DataItem, RTree, RTreeError, Rectangle};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// 输入/输出文件使用的表头
pub const CSV_HEADER: &str = "ID,Name,Population,MinX,MinY,MaxX,MaxY";

const COLUMN_COUNT: usize = 7;

/// 一次加载的统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// 读取的总行数（包括表头）
    pub lines: usize,
    /// 成功插入的记录数
    pub loaded: usize,
    /// 被跳过的行数（空行、注释、格式错误）
    pub skipped: usize,
}

/// 加载错误
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("Input is empty or contains only a header")]
    EmptyInput,
    #[error("No valid rows found ({skipped} of {lines} lines skipped)")]
    NoValidRows { lines: usize, skipped: usize },
    #[error("Index failure while loading: {0}")]
    Index(#[from] RTreeError),
}

/// 单行解析错误，只导致该行被跳过
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("expected 7 columns, found {0}")]
    ColumnCount(usize),
    #[error("invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("min corner ({min_x},{min_y}) exceeds max corner ({max_x},{max_y})")]
    InvertedBounds {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    #[error("negative population {0}")]
    NegativePopulation(i64),
    #[error("invalid UTF-8 at byte {0}")]
    Encoding(usize),
}

/// 从文件加载记录到索引中
pub fn load_from_file<P: AsRef<Path>>(path: P, rtree: &mut RTree) -> Result<LoadStats, LoadError> {
    let path = path.as_ref();
    info!("Loading records from {}", path.display());
    let file = File::open(path)?;
    load_from_reader(BufReader::new(file), rtree)
}

/// 从任意按行读取的输入加载记录
///
/// 第一行视为表头。空行和以 `#` 开头的行被跳过，格式错误的行（包括非 UTF-8 的行）
/// 记录警告后跳过；索引本身的结构性错误会立即中止加载。
pub fn load_from_reader<R: BufRead>(reader: R, rtree: &mut RTree) -> Result<LoadStats, LoadError> {
    let mut stats = LoadStats::default();

    for (index, raw) in reader.split(b'\n').enumerate() {
        let mut bytes = raw?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        let line_no = index + 1;
        stats.lines += 1;

        if line_no == 1 {
            check_header(&String::from_utf8_lossy(&bytes));
            continue;
        }

        let line = match decode_line(bytes) {
            Ok(line) => line,
            Err(e) => {
                warn!("Skipping line {}: {}", line_no, e);
                stats.skipped += 1;
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            stats.skipped += 1;
            continue;
        }

        match parse_row(trimmed) {
            Ok(item) => {
                rtree.insert(item)?;
                stats.loaded += 1;
            }
            Err(e) => {
                warn!("Skipping line {}: {}", line_no, e);
                stats.skipped += 1;
            }
        }
    }

    if stats.loaded == 0 {
        return Err(if stats.lines <= 1 {
            LoadError::EmptyInput
        } else {
            LoadError::NoValidRows {
                lines: stats.lines,
                skipped: stats.skipped,
            }
        });
    }

    info!(
        "Loaded {} records ({} lines, {} skipped)",
        stats.loaded, stats.lines, stats.skipped
    );
    Ok(stats)
}

fn decode_line(bytes: Vec<u8>) -> Result<String, RowError> {
    String::from_utf8(bytes).map_err(|e| RowError::Encoding(e.utf8_error().valid_up_to()))
}

fn check_header(line: &str) {
    let header = line.trim_start_matches('\u{feff}');
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let expected: Vec<&str> = CSV_HEADER.split(',').collect();

    if columns == expected {
        debug!("Header matches expected columns");
    } else {
        warn!(
            "Unexpected header '{}', expected '{}'; continuing",
            line.trim(),
            CSV_HEADER
        );
    }
}

/// 解析一行数据：`ID,Name,Population,MinX,MinY,MaxX,MaxY`
///
/// 名称可以用双引号包裹（此时可以包含逗号，`""` 表示一个引号）。
pub fn parse_row(line: &str) -> Result<DataItem, RowError> {
    let fields = split_fields(line);
    if fields.len() != COLUMN_COUNT {
        return Err(RowError::ColumnCount(fields.len()));
    }

    let id = parse_number::<i64>(fields[0], "ID")?;
    let name = unquote(fields[1]);
    let population = parse_number::<i64>(fields[2], "Population")?;
    let min_x = parse_number::<f64>(fields[3], "MinX")?;
    let min_y = parse_number::<f64>(fields[4], "MinY")?;
    let max_x = parse_number::<f64>(fields[5], "MaxX")?;
    let max_y = parse_number::<f64>(fields[6], "MaxY")?;

    if population < 0 {
        return Err(RowError::NegativePopulation(population));
    }

    let bounds = Rectangle::new(min_x, min_y, max_x, max_y);
    if !bounds.is_valid() {
        return Err(RowError::InvertedBounds {
            min_x,
            min_y,
            max_x,
            max_y,
        });
    }

    Ok(DataItem::new(id, name, population, bounds))
}

/// 按引号外的逗号切分，字段已去除首尾空白
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(COLUMN_COUNT);
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(line[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(line[start..].trim());
    fields
}

fn unquote(field: &str) -> String {
    match field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => field.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, name: &'static str) -> Result<T, RowError> {
    field.parse::<T>().map_err(|_| RowError::InvalidNumber {
        field: name,
        value: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(input: &str) -> (RTree, Result<LoadStats, LoadError>) {
        let mut rtree = RTree::default();
        let result = load_from_reader(Cursor::new(input), &mut rtree);
        (rtree, result)
    }

    #[test]
    fn test_parse_row() {
        let item = parse_row("1, New York Area ,8500000,70,40,75,42").unwrap();
        assert_eq!(item.id, 1);
        assert_eq!(item.name, "New York Area");
        assert_eq!(item.population, 8_500_000);
        assert_eq!(item.bounds, Rectangle::new(70.0, 40.0, 75.0, 42.0));
    }

    #[test]
    fn test_parse_row_quoted_name() {
        let item = parse_row("2,\"Washington, D.C.\",700000,-77.2,38.8,-76.9,39.0").unwrap();
        assert_eq!(item.name, "Washington, D.C.");

        let item = parse_row("3,\"The \"\"Big\"\" Town\",10,0,0,1,1").unwrap();
        assert_eq!(item.name, "The \"Big\" Town");
    }

    #[test]
    fn test_parse_row_errors() {
        assert_eq!(parse_row("1,a,10,0,0,1"), Err(RowError::ColumnCount(6)));
        assert_eq!(parse_row("1,a,10,0,0,1,1,1"), Err(RowError::ColumnCount(8)));
        assert_eq!(
            parse_row("x,a,10,0,0,1,1"),
            Err(RowError::InvalidNumber {
                field: "ID",
                value: "x".to_string()
            })
        );
        assert!(matches!(
            parse_row("1,a,10,0,0,abc,1"),
            Err(RowError::InvalidNumber { field: "MaxX", .. })
        ));
        assert!(matches!(
            parse_row("1,a,10,5,0,1,1"),
            Err(RowError::InvertedBounds { .. })
        ));
        assert_eq!(
            parse_row("1,a,-10,0,0,1,1"),
            Err(RowError::NegativePopulation(-10))
        );
    }

    #[test]
    fn test_load_from_reader() {
        let input = "\
ID,Name,Population,MinX,MinY,MaxX,MaxY
1,New York Area,8500000,70,40,75,42
# a comment line

2,Los Angeles Area,4000000,115,33,120,35
3,Broken Row,abc,0,0,1,1
4,Inverted,100,10,10,5,5
5,Chicago Area,2700000,85,41,90,43
";
        let (rtree, result) = load(input);
        let stats = result.unwrap();

        assert_eq!(
            stats,
            LoadStats {
                lines: 8,
                loaded: 3,
                skipped: 4
            }
        );
        assert_eq!(rtree.len(), 3);
        let results = rtree.search(&Rectangle::new(60.0, 30.0, 130.0, 50.0));
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_load_skips_invalid_utf8_row() {
        let input: &[u8] = b"ID,Name,Population,MinX,MinY,MaxX,MaxY\r\n\
1,Good,10,0,0,1,1\r\n\
2,S\xe3o Paulo,20,0,0,1,1\r\n\
3,Also Good,30,0,0,1,1\r\n";
        let mut rtree = RTree::default();
        let stats = load_from_reader(Cursor::new(input), &mut rtree).unwrap();

        assert_eq!(
            stats,
            LoadStats {
                lines: 4,
                loaded: 2,
                skipped: 1
            }
        );
        let mut found: Vec<(i64, String)> = rtree
            .search(&Rectangle::new(0.0, 0.0, 1.0, 1.0))
            .into_iter()
            .map(|item| (item.id, item.name))
            .collect();
        found.sort();
        assert_eq!(
            found,
            vec![(1, "Good".to_string()), (3, "Also Good".to_string())]
        );
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line(b"1,a".to_vec()), Ok("1,a".to_string()));
        assert_eq!(decode_line(b"2,S\xe3o".to_vec()), Err(RowError::Encoding(3)));
    }

    #[test]
    fn test_load_with_unexpected_header() {
        let (rtree, result) = load("id;name\n1,a,10,0,0,1,1\n");
        assert_eq!(result.unwrap().loaded, 1);
        assert_eq!(rtree.len(), 1);
    }

    #[test]
    fn test_load_empty_input() {
        let (_, result) = load("");
        assert!(matches!(result, Err(LoadError::EmptyInput)));

        let (_, result) = load("ID,Name,Population,MinX,MinY,MaxX,MaxY\n");
        assert!(matches!(result, Err(LoadError::EmptyInput)));
    }

    #[test]
    fn test_load_no_valid_rows() {
        let (rtree, result) = load("ID,Name,Population,MinX,MinY,MaxX,MaxY\n# only\nbad\n");
        match result {
            Err(LoadError::NoValidRows { lines, skipped }) => {
                assert_eq!(lines, 3);
                assert_eq!(skipped, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(rtree.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", CSV_HEADER).unwrap();
        for i in 0..20 {
            writeln!(file, "{},Region {},{},{},0,{},1", i, i, i * 1000, i, i + 1).unwrap();
        }
        file.flush().unwrap();

        let mut rtree = RTree::new(2, 4);
        let stats = load_from_file(file.path(), &mut rtree).unwrap();
        assert_eq!(stats.loaded, 20);
        assert_eq!(stats.skipped, 0);
        assert_eq!(rtree.len(), 20);
        assert!(rtree.depth() > 1);
        assert!(rtree.check_invariants().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let mut rtree = RTree::default();
        let result = load_from_file("/nonexistent/georect/input.csv", &mut rtree);
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
