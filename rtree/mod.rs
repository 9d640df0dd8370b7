pub mod algorithms;
pub mod node;
pub mod rectangle;
#[allow(clippy::module_inception)]
pub mod rtree;

// 重新导出主要类型
pub use node::{Entries, Node, NodeId, NodeType};
pub use rectangle::{Point, Rectangle};
pub use rtree::{DataItem, RTree, RTreeError};
