use super::node::{Node, NodeId};
use super::rectangle::Rectangle;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 数据记录：带编号、名称和人口属性的矩形，是索引存储的基本单位
#[derive(Debug, Display, Clone, PartialEq, Serialize, Deserialize)]
#[display(
    fmt = "DataItem {{ id: {}, name: {}, population: {}, bounds: {} }}",
    id,
    name,
    population,
    bounds
)]
pub struct DataItem {
    /// 调用方分配的编号，索引不要求唯一
    pub id: i64,
    pub name: String,
    /// 标量属性，索引不做校验（可以为负）
    pub population: i64,
    /// 记录的空间边界
    pub bounds: Rectangle,
}

impl DataItem {
    pub fn new(id: i64, name: impl Into<String>, population: i64, bounds: Rectangle) -> Self {
        DataItem {
            id,
            name: name.into(),
            population,
            bounds,
        }
    }
}

/// R-tree 结构性错误
///
/// 这些错误意味着插入/分裂的簿记出现了缺陷，不可在本地恢复
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RTreeError {
    #[error("Index node {0} has no children during subtree selection")]
    EmptyIndexNode(NodeId),
    #[error("Index node {0} has no resolvable child during subtree selection")]
    NoValidChild(NodeId),
    #[error("Node {0} does not exist")]
    DanglingNode(NodeId),
    #[error("Invariant violated at node {node}: {reason}")]
    Invariant { node: NodeId, reason: String },
}

/// R-tree主结构
///
/// 所有节点存放在 `nodes` 节点池中，由树独占；节点之间通过 `NodeId` 相互引用。
/// 节点只会在分裂时创建，随树一起销毁。
#[derive(Debug, Clone)]
pub struct RTree {
    nodes: Vec<Node>,
    root: NodeId,
    /// 最大条目数M
    max_entries: usize,
    /// 最小条目数m
    min_entries: usize,
    /// 已插入的记录数
    len: usize,
}

impl RTree {
    /// 创建新的R-tree
    ///
    /// 参数会被钳制而不是拒绝：
    /// - `min_entries := max(2, min_entries)`
    /// - `max_entries := max(3, 2 * min_entries, max_entries)`
    pub fn new(min_entries: usize, max_entries: usize) -> Self {
        let min_entries = min_entries.max(2);
        let max_entries = max_entries.max(min_entries.saturating_mul(2)).max(3);

        if min_entries > max_entries / 2 {
            warn!(
                "RTree min entries ({}) > max entries ({}) / 2, splits may be unbalanced",
                min_entries, max_entries
            );
        }

        RTree {
            nodes: vec![Node::new_leaf_node()],
            root: NodeId(0),
            max_entries,
            min_entries,
            len: 0,
        }
    }

    /// 检查R-tree是否为空
    pub fn is_empty(&self) -> bool {
        self.root_node().map_or(true, |root| root.size() == 0)
    }

    /// 获取已存储的记录数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 获取树的深度（只有一个叶子根节点时为1）
    pub fn depth(&self) -> usize {
        self.root_node().map_or(0, |root| root.level + 1)
    }

    /// 节点总数
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 获取R-tree的根节点MBR（空树为无效矩形）
    pub fn root_mbr(&self) -> Rectangle {
        self.root_node().map_or(Rectangle::EMPTY, |root| root.mbr)
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// 获取最大条目数
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// 获取最小条目数
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// 按标识获取节点
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn root_node(&self) -> Option<&Node> {
        self.node(self.root)
    }

    /// 内部方法：获取节点引用，节点不存在视为结构性错误
    pub(crate) fn node_ref(&self, id: NodeId) -> Result<&Node, RTreeError> {
        self.nodes.get(id.0).ok_or(RTreeError::DanglingNode(id))
    }

    /// 内部方法：获取节点的可变引用，节点不存在视为结构性错误
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, RTreeError> {
        self.nodes.get_mut(id.0).ok_or(RTreeError::DanglingNode(id))
    }

    /// 内部方法：把节点放入节点池，返回新节点的标识
    pub(crate) fn alloc_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    pub(crate) fn record_inserted(&mut self) {
        self.len += 1;
    }

    /// 从头重新计算节点的MBR
    pub(crate) fn update_mbr(&mut self, id: NodeId) -> Result<(), RTreeError> {
        let mbr = self
            .node_ref(id)?
            .compute_mbr(|child| self.nodes.get(child.0).map(|node| node.mbr));
        self.node_mut(id)?.mbr = mbr;
        Ok(())
    }
}

impl Default for RTree {
    /// 使用默认参数创建R-tree（m=2, M=4）
    fn default() -> Self {
        Self::new(2, 4)
    }
}
