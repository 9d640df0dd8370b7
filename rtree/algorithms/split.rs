use super::super::node::{Entries, Node, NodeId};
use super::super::rtree::{RTree, RTreeError};
use tracing::debug;

/// 计算分裂位置：下标 `[0, k)` 的条目留在原节点，`[k, total)` 移入新兄弟节点
///
/// 按条目数量平分，且尽量让两边都不少于 `min_entries`；
/// 条目不足 `2 * min_entries` 时退化为对半分。结果总在 `[1, max(total - 1, 1)]` 之内。
pub(crate) fn split_index(total: usize, min_entries: usize) -> usize {
    let mut k = min_entries.max(total / 2);

    if total > 2 * min_entries {
        if total - k < min_entries {
            k = total - min_entries;
        }
        if k < min_entries {
            k = min_entries;
        }
    } else {
        k = (total + 1) / 2;
    }

    let upper = if total > 1 { total - 1 } else { 1 };
    k.clamp(1, upper)
}

/// 节点分裂算法 - 按插入顺序的线性切分
impl RTree {
    /// 分裂节点，返回新创建的兄弟节点
    ///
    /// 兄弟节点与原节点类型、层级相同，父节点也相同（但尚未挂到父节点下，
    /// 由调用方负责）。移走的子节点会改指向兄弟节点，两个节点的MBR都从头重算。
    pub(crate) fn split_node(&mut self, id: NodeId) -> Result<NodeId, RTreeError> {
        let min_entries = self.min_entries();

        let (moved, level, parent, total, at) = {
            let node = self.node_mut(id)?;
            let total = node.size();
            let at = split_index(total, min_entries);
            let moved = node.entries_mut().split_off(at);
            (moved, node.level, node.parent, total, at)
        };

        let moved_children = match &moved {
            Entries::Children(children) => children.clone(),
            Entries::Data(_) => Vec::new(),
        };

        let sibling = self.alloc_node(Node::with_entries(moved, level, parent));

        // 无法解析的子节点引用直接跳过
        for child in moved_children {
            if let Ok(child_node) = self.node_mut(child) {
                child_node.parent = Some(sibling);
            }
        }

        self.update_mbr(id)?;
        self.update_mbr(sibling)?;

        debug!(
            "Split node {} at level {}: kept {}, moved {} to {}",
            id,
            level,
            at,
            total - at,
            sibling
        );

        Ok(sibling)
    }
}
