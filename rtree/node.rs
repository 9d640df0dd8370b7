use super::rectangle::Rectangle;
use super::rtree::DataItem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 节点标识
///
/// R-tree 的所有节点存放在树持有的节点池中，`NodeId` 是节点在池中的下标。
/// 父节点通过 `NodeId` 引用子节点，子节点通过 `NodeId` 回指父节点，
/// 节点本身只归节点池所有。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// 节点在节点池中的下标
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// R-tree节点类型
///
/// 用于明确区分R-tree中的两种节点类型，避免概念混淆
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// 叶子节点：包含用户插入的数据记录
    Leaf,
    /// 索引节点：包含指向子节点的引用
    Index,
}

/// 节点内容
///
/// 节点类型由内容的变体决定，构造后不再改变：
/// - Data：叶子节点中的数据记录
/// - Children：索引节点中的子节点引用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entries {
    Data(Vec<DataItem>),
    Children(Vec<NodeId>),
}

impl Entries {
    /// 条目数量（记录数或子节点数）
    pub fn len(&self) -> usize {
        match self {
            Entries::Data(items) => items.len(),
            Entries::Children(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 将下标 `at` 及之后的条目移出，保持原有顺序，返回同类型的内容
    pub(crate) fn split_off(&mut self, at: usize) -> Entries {
        match self {
            Entries::Data(items) => {
                let at = at.min(items.len());
                Entries::Data(items.split_off(at))
            }
            Entries::Children(children) => {
                let at = at.min(children.len());
                Entries::Children(children.split_off(at))
            }
        }
    }
}

/// R-tree节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// 节点的最小边界矩形
    ///
    /// 重新计算后等于所有条目边界的并集，只在一次插入下降过程中短暂超前
    pub mbr: Rectangle,

    /// 父节点（根节点为 None），不拥有父节点
    pub parent: Option<NodeId>,

    /// 节点在树中的层级
    ///
    /// 叶子层的层级为0，根节点层级最高
    pub level: usize,

    entries: Entries,
}

impl Node {
    /// 创建新的叶子节点
    pub fn new_leaf_node() -> Self {
        Self::with_entries(Entries::Data(Vec::new()), 0, None)
    }

    /// 创建新的索引节点
    ///
    /// # 参数
    /// * `level` - 节点在树中的层级，必须 > 0
    pub fn new_index_node(level: usize) -> Self {
        Self::with_entries(Entries::Children(Vec::new()), level, None)
    }

    /// 用给定内容创建节点，MBR 为空，需要调用方重新计算
    pub(crate) fn with_entries(entries: Entries, level: usize, parent: Option<NodeId>) -> Self {
        Node {
            mbr: Rectangle::EMPTY,
            parent,
            level,
            entries,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self.entries {
            Entries::Data(_) => NodeType::Leaf,
            Entries::Children(_) => NodeType::Index,
        }
    }

    /// 检查是否为叶子节点
    pub fn is_leaf_node(&self) -> bool {
        matches!(self.entries, Entries::Data(_))
    }

    /// 检查是否为索引节点
    pub fn is_index_node(&self) -> bool {
        matches!(self.entries, Entries::Children(_))
    }

    /// 条目数量：叶子节点为记录数，索引节点为子节点数
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// 检查节点是否已满
    ///
    /// # 参数
    /// * `max_entries` - 节点允许的最大条目数
    pub fn is_full(&self, max_entries: usize) -> bool {
        self.size() >= max_entries
    }

    /// 检查节点是否需要更多条目
    ///
    /// # 参数
    /// * `min_entries` - 节点要求的最小条目数
    pub fn needs_more_entries(&self, min_entries: usize) -> bool {
        self.size() < min_entries
    }

    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Entries {
        &mut self.entries
    }

    /// 叶子节点中的数据记录（索引节点返回空切片）
    pub fn data(&self) -> &[DataItem] {
        match &self.entries {
            Entries::Data(items) => items,
            Entries::Children(_) => &[],
        }
    }

    /// 索引节点中的子节点（叶子节点返回空切片）
    pub fn children(&self) -> &[NodeId] {
        match &self.entries {
            Entries::Data(_) => &[],
            Entries::Children(children) => children,
        }
    }

    /// 从头计算节点的MBR
    ///
    /// 按条目顺序依次 `expand`；空节点得到无效矩形。
    /// `child_mbr` 返回 None 的子节点（无法解析的引用）会被跳过。
    pub fn compute_mbr<F>(&self, child_mbr: F) -> Rectangle
    where
        F: Fn(NodeId) -> Option<Rectangle>,
    {
        let mut mbr = Rectangle::EMPTY;
        match &self.entries {
            Entries::Data(items) => {
                for item in items {
                    mbr.expand(&item.bounds);
                }
            }
            Entries::Children(children) => {
                for child in children.iter().filter_map(|&id| child_mbr(id)) {
                    mbr.expand(&child);
                }
            }
        }
        mbr
    }
}
