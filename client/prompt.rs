use super::regions::lookup_region;
use crate::rtree::Rectangle;
use std::io::{self, BufRead, Write};
use tracing::warn;

/// 交互式查询参数输入
///
/// 从 `input` 逐行读取回答，提示和错误信息写到 `output`。
/// 输入在得到有效回答之前结束时返回 `io::ErrorKind::UnexpectedEof`。
pub struct QueryPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> QueryPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// 询问查询矩形：内置区域名称，或输入 `manual` 后逐个输入坐标
    pub fn ask_query_rectangle(&mut self) -> io::Result<Rectangle> {
        loop {
            let answer = self.ask(
                "\nEnter region name (e.g., United States, China, World) or type 'manual' for coordinates: ",
            )?;
            let name = answer.trim();

            if name.is_empty() {
                continue;
            }

            if name.eq_ignore_ascii_case("manual") {
                return self.ask_manual_rectangle();
            }

            match lookup_region(name) {
                Some(bounds) => {
                    writeln!(self.output, "Found bounds for '{}': {}", name.to_lowercase(), bounds)?;
                    return Ok(bounds);
                }
                None => {
                    writeln!(
                        self.output,
                        "Input '{}' not recognized as a predefined region or 'manual'. Please try again.",
                        name
                    )?;
                }
            }
        }
    }

    fn ask_manual_rectangle(&mut self) -> io::Result<Rectangle> {
        writeln!(self.output, "Enter bounds manually.")?;
        let min_x = self.ask_coordinate("  Min X (e.g., longitude): ")?;
        let min_y = self.ask_coordinate("  Min Y (e.g., latitude): ")?;
        let max_x = self.ask_coordinate("  Max X (e.g., longitude): ")?;
        let max_y = self.ask_coordinate("  Max Y (e.g., latitude): ")?;

        let bounds = Rectangle::new(min_x, min_y, max_x, max_y);
        if !bounds.is_valid() {
            // 按输入原样使用，搜索会得到空结果
            warn!("Query rectangle {} has min > max, using as entered", bounds);
            writeln!(
                self.output,
                "Warning: Invalid rectangle coordinates (min > max). Using as entered."
            )?;
        }
        Ok(bounds)
    }

    fn ask_coordinate(&mut self, prompt: &str) -> io::Result<f64> {
        loop {
            let answer = self.ask(prompt)?;
            match answer.trim().parse::<f64>() {
                Ok(value) if !value.is_nan() => return Ok(value),
                _ => writeln!(self.output, "Invalid input. Please enter a number.")?,
            }
        }
    }

    /// 询问最小人口阈值，直到得到一个非负整数
    pub fn ask_population_threshold(&mut self) -> io::Result<i64> {
        loop {
            let answer = self.ask("\nEnter minimum population threshold (e.g., 1000000): ")?;
            match answer.trim().parse::<i64>() {
                Ok(value) if value >= 0 => return Ok(value),
                _ => writeln!(
                    self.output,
                    "Invalid input. Please enter a non-negative integer."
                )?,
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before a valid answer was given",
            ));
        }
        Ok(line)
    }
}
