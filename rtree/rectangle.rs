use serde::{Deserialize, Serialize};
use std::fmt;

/// 二维平面上的点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// 矩形边界框 - 用于表示R-tree中的最小边界矩形(MBR)
///
/// 当 `min_corner` 在任一轴上大于 `max_corner` 时，矩形为无效（空）矩形。
/// 无效矩形面积为0，不与任何矩形相交，在合并时被忽略。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min_corner: Point,
    pub max_corner: Point,
}

impl Default for Rectangle {
    /// 默认矩形为无效哨兵值
    fn default() -> Self {
        Rectangle::EMPTY
    }
}

impl Rectangle {
    /// 规范的无效（空）矩形
    ///
    /// min 为 +∞、max 为 -∞，是并集运算的单位元
    pub const EMPTY: Rectangle = Rectangle {
        min_corner: Point::new(f64::INFINITY, f64::INFINITY),
        max_corner: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    /// 创建新的矩形
    ///
    /// 不校验边界：min > max 的输入得到的就是无效矩形
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Rectangle {
            min_corner: Point::new(min_x, min_y),
            max_corner: Point::new(max_x, max_y),
        }
    }

    /// 由两个角点创建矩形
    pub const fn from_corners(min_corner: Point, max_corner: Point) -> Self {
        Rectangle {
            min_corner,
            max_corner,
        }
    }

    /// 判断矩形是否有效（两个轴上都满足 min <= max）
    pub fn is_valid(&self) -> bool {
        self.min_corner.x <= self.max_corner.x && self.min_corner.y <= self.max_corner.y
    }

    /// 计算矩形面积，无效矩形的面积为0
    pub fn area(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        (self.max_corner.x - self.min_corner.x) * (self.max_corner.y - self.min_corner.y)
    }

    /// 判断当前矩形是否包含一个点（边界上的点也算包含）
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min_corner.x
            && p.x <= self.max_corner.x
            && p.y >= self.min_corner.y
            && p.y <= self.max_corner.y
    }

    /// 判断当前矩形是否完全包含另一个矩形
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.min_corner.x >= self.min_corner.x
            && other.max_corner.x <= self.max_corner.x
            && other.min_corner.y >= self.min_corner.y
            && other.max_corner.y <= self.max_corner.y
    }

    /// 判断两个矩形是否相交
    ///
    /// 分离轴判断：任一轴上分离即不相交。无效矩形（包括含 NaN 的）
    /// 永远不与任何矩形相交，包括它自己。
    pub fn intersects(&self, other: &Rectangle) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }
        !(self.max_corner.x < other.min_corner.x
            || self.min_corner.x > other.max_corner.x
            || self.max_corner.y < other.min_corner.y
            || self.min_corner.y > other.max_corner.y)
    }

    /// 扩展当前矩形以包含另一个矩形
    pub fn expand(&mut self, other: &Rectangle) {
        if !other.is_valid() {
            return;
        }
        if !self.is_valid() {
            *self = *other;
            return;
        }
        self.min_corner.x = self.min_corner.x.min(other.min_corner.x);
        self.min_corner.y = self.min_corner.y.min(other.min_corner.y);
        self.max_corner.x = self.max_corner.x.max(other.max_corner.x);
        self.max_corner.y = self.max_corner.y.max(other.max_corner.y);
    }

    /// 计算两个矩形的并集MBR
    pub fn combine(r1: &Rectangle, r2: &Rectangle) -> Rectangle {
        match (r1.is_valid(), r2.is_valid()) {
            (false, false) => Rectangle::EMPTY,
            (false, true) => *r2,
            (true, false) => *r1,
            (true, true) => Rectangle::new(
                r1.min_corner.x.min(r2.min_corner.x),
                r1.min_corner.y.min(r2.min_corner.y),
                r1.max_corner.x.max(r2.max_corner.x),
                r1.max_corner.y.max(r2.max_corner.y),
            ),
        }
    }

    /// 计算扩大到包含另一个矩形所需的面积增量
    pub fn area_increase(&self, other: &Rectangle) -> f64 {
        if !other.is_valid() {
            return 0.0;
        }
        if !self.is_valid() {
            return other.area();
        }
        Rectangle::combine(self, other).area() - self.area()
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min_corner.x, self.min_corner.y, self.max_corner.x, self.max_corner.y
        )
    }
}
