use super::super::node::{Entries, NodeId, NodeType};
use super::super::rectangle::Rectangle;
use super::super::rtree::{DataItem, RTree, RTreeError};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// 用于JSON序列化的树结构
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeVisualization {
    /// 根节点（空树为 None）
    pub root: Option<NodeVisualization>,
    /// 树的配置参数
    pub config: TreeConfig,
}

/// 用于JSON序列化的树配置
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_entries: usize,
    pub min_entries: usize,
    pub len: usize,
    pub depth: usize,
}

/// 用于JSON序列化的节点结构
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeVisualization {
    pub id: NodeId,
    /// 节点的最小边界矩形
    pub mbr: Rectangle,
    pub node_type: NodeType,
    pub level: usize,
    /// 数据条目（仅叶子节点）
    pub data_entries: Vec<DataItem>,
    /// 子节点（仅索引节点）
    pub child_nodes: Vec<NodeVisualization>,
}

/// R-tree调试功能实现
impl RTree {
    /// 打印完整的树结构用于调试
    ///
    /// 输出只供人阅读，格式不保证稳定。
    pub fn print_structure<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "--- R-Tree Structure ---")?;
        if self.is_empty() {
            writeln!(out, "(Empty Tree)")?;
        } else {
            self.print_node(out, self.root_id(), 0)?;
        }
        writeln!(out, "------------------------")
    }

    fn print_node<W: Write>(&self, out: &mut W, id: NodeId, depth: usize) -> io::Result<()> {
        let indent = "  ".repeat(depth);
        let Some(node) = self.node(id) else {
            return writeln!(out, "{}(missing node {})", indent, id);
        };

        let kind = if node.is_leaf_node() { "LEAF" } else { "INTERNAL" };
        writeln!(
            out,
            "{}[{} {}] MBR: {} Size: {}",
            indent,
            kind,
            id,
            node.mbr,
            node.size()
        )?;

        match node.entries() {
            Entries::Data(items) => {
                for item in items {
                    writeln!(
                        out,
                        "{}  - Item ID: {}, Name: {}, Pop: {}, Bounds: {}",
                        indent, item.id, item.name, item.population, item.bounds
                    )?;
                }
            }
            Entries::Children(children) => {
                for &child in children {
                    self.print_node(out, child, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    /// 导出树结构为JSON格式，用于可视化
    ///
    /// 无效（空）矩形的无穷大坐标会被序列化为 `null`。
    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        let visualization = self.create_tree_visualization();
        serde_json::to_string_pretty(&visualization)
    }

    /// 创建用于可视化的树结构
    fn create_tree_visualization(&self) -> TreeVisualization {
        TreeVisualization {
            root: if self.is_empty() {
                None
            } else {
                self.create_node_visualization(self.root_id())
            },
            config: TreeConfig {
                max_entries: self.max_entries(),
                min_entries: self.min_entries(),
                len: self.len(),
                depth: self.depth(),
            },
        }
    }

    /// 递归创建节点的可视化结构
    fn create_node_visualization(&self, id: NodeId) -> Option<NodeVisualization> {
        let node = self.node(id)?;
        Some(NodeVisualization {
            id,
            mbr: node.mbr,
            node_type: node.node_type(),
            level: node.level,
            data_entries: node.data().to_vec(),
            child_nodes: node
                .children()
                .iter()
                .filter_map(|&child| self.create_node_visualization(child))
                .collect(),
        })
    }

    /// 检查树的结构不变量
    ///
    /// - 每个节点的MBR等于从头重算的结果
    /// - 非根节点的条目数在 `[min_entries, max_entries)` 之内
    /// - 子节点的 parent 指回父节点，层级恰好低一层
    /// - 所有节点都可以从根到达，记录总数等于 `len()`
    pub fn check_invariants(&self) -> Result<(), RTreeError> {
        let root = self.root_id();
        let root_node = self.node_ref(root)?;
        if root_node.parent.is_some() {
            return Err(invariant(root, "root has a parent"));
        }

        let mut visited = 0;
        let mut records = 0;
        self.check_node(root, &mut visited, &mut records)?;

        if visited != self.node_count() {
            return Err(invariant(
                root,
                format!("{} nodes reachable, {} allocated", visited, self.node_count()),
            ));
        }
        if records != self.len() {
            return Err(invariant(
                root,
                format!("{} records stored, {} inserted", records, self.len()),
            ));
        }
        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        visited: &mut usize,
        records: &mut usize,
    ) -> Result<(), RTreeError> {
        let node = self.node_ref(id)?;
        *visited += 1;

        let expected_mbr = node.compute_mbr(|child| self.node(child).map(|c| c.mbr));
        if node.mbr != expected_mbr {
            return Err(invariant(
                id,
                format!("mbr {} differs from recomputed {}", node.mbr, expected_mbr),
            ));
        }

        if node.size() >= self.max_entries() {
            return Err(invariant(
                id,
                format!("{} entries, max is {}", node.size(), self.max_entries()),
            ));
        }
        if id != self.root_id() && node.needs_more_entries(self.min_entries()) {
            return Err(invariant(
                id,
                format!("{} entries, min is {}", node.size(), self.min_entries()),
            ));
        }

        match node.entries() {
            Entries::Data(items) => {
                if node.level != 0 {
                    return Err(invariant(id, format!("leaf at level {}", node.level)));
                }
                *records += items.len();
            }
            Entries::Children(children) => {
                for &child in children {
                    let child_node = self
                        .node(child)
                        .ok_or_else(|| invariant(id, format!("child {} does not exist", child)))?;
                    if child_node.parent != Some(id) {
                        return Err(invariant(child, format!("parent does not point to {}", id)));
                    }
                    if child_node.level + 1 != node.level {
                        return Err(invariant(
                            child,
                            format!("level {} under parent level {}", child_node.level, node.level),
                        ));
                    }
                    self.check_node(child, visited, records)?;
                }
            }
        }
        Ok(())
    }
}

fn invariant(node: NodeId, reason: impl Into<String>) -> RTreeError {
    RTreeError::Invariant {
        node,
        reason: reason.into(),
    }
}
