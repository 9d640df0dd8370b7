use super::super::node::{Entries, Node, NodeId};
use super::super::rectangle::Rectangle;
use super::super::rtree::{DataItem, RTree, RTreeError};
use tracing::debug;

/// 插入操作相关算法
impl RTree {
    /// 插入新的数据记录
    ///
    /// 从根节点递归下降到选中的叶子，沿途扩展MBR；
    /// 分裂向上传播，根节点分裂时树高恰好加一。
    ///
    /// # 错误
    /// 下降过程中遇到没有可用子节点的索引节点时返回 `RTreeError`，
    /// 这表示树的结构已经损坏。
    pub fn insert(&mut self, item: DataItem) -> Result<(), RTreeError> {
        let root = self.root_id();
        if let Some(sibling) = self.insert_recursive(root, &item)? {
            self.grow_root(root, sibling)?;
        }
        self.record_inserted();
        Ok(())
    }

    /// 根节点分裂：新建索引根节点，旧根和分裂出的兄弟节点成为它的两个子节点
    fn grow_root(&mut self, old_root: NodeId, sibling: NodeId) -> Result<(), RTreeError> {
        let (old_mbr, level) = {
            let node = self.node_ref(old_root)?;
            (node.mbr, node.level)
        };
        let sibling_mbr = self.node_ref(sibling)?.mbr;

        let mut new_root =
            Node::with_entries(Entries::Children(vec![old_root, sibling]), level + 1, None);
        new_root.mbr = Rectangle::combine(&old_mbr, &sibling_mbr);
        let new_root_id = self.alloc_node(new_root);

        self.node_mut(old_root)?.parent = Some(new_root_id);
        self.node_mut(sibling)?.parent = Some(new_root_id);
        self.set_root(new_root_id);

        debug!("Root split, tree depth is now {}", level + 2);
        Ok(())
    }

    /// 递归插入，返回本层分裂产生的新兄弟节点（如果有）
    fn insert_recursive(
        &mut self,
        id: NodeId,
        item: &DataItem,
    ) -> Result<Option<NodeId>, RTreeError> {
        let max_entries = self.max_entries();

        // 先扩展MBR，再做任何决定
        let is_leaf = {
            let node = self.node_mut(id)?;
            node.mbr.expand(&item.bounds);
            node.is_leaf_node()
        };

        if is_leaf {
            self.push_data(id, item.clone())?;
            if self.node_ref(id)?.is_full(max_entries) {
                return self.split_node(id).map(Some);
            }
            return Ok(None);
        }

        let child = self.choose_subtree(id, &item.bounds)?;
        let Some(sibling) = self.insert_recursive(child, item)? else {
            return Ok(None);
        };

        // 下层发生了分裂，把新节点挂到当前节点下
        self.node_mut(sibling)?.parent = Some(id);
        self.push_child(id, sibling)?;
        if self.node_ref(id)?.is_full(max_entries) {
            return self.split_node(id).map(Some);
        }
        Ok(None)
    }

    /// 向叶子节点追加一条记录
    pub(crate) fn push_data(&mut self, id: NodeId, item: DataItem) -> Result<(), RTreeError> {
        match self.node_mut(id)?.entries_mut() {
            Entries::Data(items) => {
                items.push(item);
                Ok(())
            }
            Entries::Children(_) => Err(RTreeError::Invariant {
                node: id,
                reason: "cannot add a record to an index node".to_string(),
            }),
        }
    }

    /// 向索引节点追加一个子节点
    pub(crate) fn push_child(&mut self, id: NodeId, child: NodeId) -> Result<(), RTreeError> {
        match self.node_mut(id)?.entries_mut() {
            Entries::Children(children) => {
                children.push(child);
                Ok(())
            }
            Entries::Data(_) => Err(RTreeError::Invariant {
                node: id,
                reason: "cannot add a child to a leaf node".to_string(),
            }),
        }
    }

    /// 选择子树 - 选择面积增量最小的子节点
    ///
    /// 增量相同时选择当前面积较小的；如果没有任何子节点胜出
    /// （例如增量为 NaN），退回到第一个可解析的子节点。
    pub(crate) fn choose_subtree(
        &self,
        id: NodeId,
        bounds: &Rectangle,
    ) -> Result<NodeId, RTreeError> {
        let children = self.node_ref(id)?.children();
        if children.is_empty() {
            return Err(RTreeError::EmptyIndexNode(id));
        }

        let mut best: Option<NodeId> = None;
        let mut min_increase = f64::MAX;
        let mut min_area = f64::MAX;

        for &child_id in children {
            let Some(child) = self.node(child_id) else {
                continue;
            };
            let area = child.mbr.area();
            let increase = child.mbr.area_increase(bounds);

            if increase < min_increase {
                min_increase = increase;
                min_area = area;
                best = Some(child_id);
            } else if increase == min_increase && (best.is_none() || area < min_area) {
                min_area = area;
                best = Some(child_id);
            }
        }

        best.or_else(|| {
            children
                .iter()
                .copied()
                .find(|&child_id| self.node(child_id).is_some())
        })
        .ok_or(RTreeError::NoValidChild(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn item(id: i64, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> DataItem {
        DataItem::new(
            id,
            format!("City{}", id),
            0,
            Rectangle::new(min_x, min_y, max_x, max_y),
        )
    }

    /// 插入 5 个矩形，第 4 个会让根节点分裂
    fn scenario_tree() -> RTree {
        let mut rtree = RTree::new(2, 3);
        rtree.insert(item(1, 1.0, 1.0, 3.0, 3.0)).unwrap();
        rtree.insert(item(2, 5.0, 5.0, 7.0, 7.0)).unwrap();
        rtree.insert(item(3, 0.0, 5.0, 2.0, 7.0)).unwrap();
        rtree.insert(item(4, 6.0, 1.0, 8.0, 3.0)).unwrap();
        rtree.insert(item(5, 3.0, 3.0, 4.0, 4.0)).unwrap();
        rtree
    }

    #[test]
    fn test_insert_basic() {
        let mut rtree = RTree::default();

        assert!(rtree.is_empty());
        rtree.insert(item(1, 0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(rtree.len(), 1);
        assert!(!rtree.is_empty());

        rtree.insert(item(2, 5.0, 5.0, 15.0, 15.0)).unwrap();
        rtree.insert(item(3, 20.0, 20.0, 30.0, 30.0)).unwrap();
        assert_eq!(rtree.len(), 3);
        assert_eq!(rtree.depth(), 1);
        assert_eq!(rtree.root_mbr(), Rectangle::new(0.0, 0.0, 30.0, 30.0));
    }

    #[test]
    fn test_root_split_grows_depth_by_one() {
        let mut rtree = RTree::new(2, 4);
        for i in 0..3 {
            let x = i as f64 * 2.0;
            rtree.insert(item(i, x, 0.0, x + 1.0, 1.0)).unwrap();
        }
        assert_eq!(rtree.depth(), 1);
        assert_eq!(rtree.node_count(), 1);

        // 第 4 条记录使叶子满，根节点分裂
        rtree.insert(item(3, 6.0, 0.0, 7.0, 1.0)).unwrap();
        assert_eq!(rtree.depth(), 2);
        assert_eq!(rtree.node_count(), 3);
        assert_eq!(rtree.len(), 4);

        let root = rtree.node(rtree.root_id()).unwrap();
        assert!(root.is_index_node());
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.parent, None);
        assert_eq!(root.mbr, Rectangle::new(0.0, 0.0, 7.0, 1.0));
        for &child in root.children() {
            assert_eq!(rtree.node(child).unwrap().parent, Some(rtree.root_id()));
        }
        assert!(rtree.check_invariants().is_ok());
    }

    #[test]
    fn test_depth_grows_monotonically() {
        let mut rtree = RTree::new(2, 4);
        let mut last_depth = rtree.depth();
        for i in 0..200 {
            let x = (i % 20) as f64;
            let y = (i / 20) as f64;
            let before = rtree.depth();
            rtree.insert(item(i, x, y, x + 0.5, y + 0.5)).unwrap();
            let after = rtree.depth();
            assert!(after == before || after == before + 1);
            assert!(after >= last_depth);
            last_depth = after;
        }
        assert_eq!(rtree.len(), 200);
        assert!(rtree.depth() > 2);
    }

    #[test]
    fn test_root_mbr_contains_every_inserted_record() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut rtree = RTree::new(2, 5);
        let mut inserted = Vec::new();

        for i in 0..300 {
            let x = rng.gen_range(-500.0..500.0);
            let y = rng.gen_range(-500.0..500.0);
            let w = rng.gen_range(0.0..20.0);
            let h = rng.gen_range(0.0..20.0);
            let record = item(i, x, y, x + w, y + h);
            inserted.push(record.bounds);
            rtree.insert(record).unwrap();

            let root_mbr = rtree.root_mbr();
            assert!(inserted.iter().all(|bounds| root_mbr.contains(bounds)));
        }

        assert!(rtree.check_invariants().is_ok());
    }

    #[test]
    fn test_insert_invalid_bounds_is_accepted() {
        let mut rtree = RTree::default();
        rtree.insert(item(1, 0.0, 0.0, 1.0, 1.0)).unwrap();
        rtree.insert(item(2, 5.0, 5.0, 4.0, 4.0)).unwrap();

        assert_eq!(rtree.len(), 2);
        // 无效矩形不会改变MBR，也不会被搜索到
        assert_eq!(rtree.root_mbr(), Rectangle::new(0.0, 0.0, 1.0, 1.0));
        let results = rtree.search(&Rectangle::new(-100.0, -100.0, 100.0, 100.0));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);
    }

    #[test]
    fn test_duplicate_ids_are_both_stored() {
        let mut rtree = RTree::default();
        rtree.insert(item(7, 0.0, 0.0, 1.0, 1.0)).unwrap();
        rtree.insert(item(7, 10.0, 10.0, 11.0, 11.0)).unwrap();

        assert_eq!(rtree.len(), 2);
        assert_eq!(rtree.search(&Rectangle::new(0.0, 0.0, 1.0, 1.0)).len(), 1);
        assert_eq!(rtree.search(&Rectangle::new(10.0, 10.0, 11.0, 11.0)).len(), 1);
        assert_eq!(rtree.search(&Rectangle::new(0.0, 0.0, 11.0, 11.0)).len(), 2);
    }

    #[test]
    fn test_choose_subtree() {
        let rtree = scenario_tree();
        let root = rtree.root_id();
        let children = rtree.node(root).unwrap().children().to_vec();
        assert_eq!(children.len(), 2);

        // 两个子节点都不需要扩大，面积较小的第一个子节点胜出
        let chosen = rtree
            .choose_subtree(root, &Rectangle::new(3.0, 3.0, 4.0, 4.0))
            .unwrap();
        assert_eq!(chosen, children[0]);

        // 第二个子节点扩大得更少
        let chosen = rtree
            .choose_subtree(root, &Rectangle::new(8.0, 1.0, 9.0, 2.0))
            .unwrap();
        assert_eq!(chosen, children[1]);
    }

    #[test]
    fn test_choose_subtree_empty_index_node() {
        let mut rtree = RTree::default();
        let empty = rtree.alloc_node(Node::new_index_node(1));

        let result = rtree.choose_subtree(empty, &Rectangle::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(result, Err(RTreeError::EmptyIndexNode(empty)));
    }

    #[test]
    fn test_choose_subtree_all_children_dangling() {
        let mut rtree = RTree::default();
        let index = rtree.alloc_node(Node::new_index_node(1));
        if let Entries::Children(children) = rtree.node_mut(index).unwrap().entries_mut() {
            children.extend([NodeId(90), NodeId(91)]);
        }

        let result = rtree.choose_subtree(index, &Rectangle::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(result, Err(RTreeError::NoValidChild(index)));
    }

    #[test]
    fn test_choose_subtree_falls_back_to_first_resolvable_child() {
        let mut rtree = RTree::default();

        // 无限宽的MBR使面积增量为 NaN，没有子节点能胜出
        let mut wide = Node::new_leaf_node();
        wide.mbr = Rectangle::new(f64::NEG_INFINITY, 0.0, f64::INFINITY, 1.0);
        let first = rtree.alloc_node(wide.clone());
        let second = rtree.alloc_node(wide);

        let index = rtree.alloc_node(Node::new_index_node(1));
        if let Entries::Children(children) = rtree.node_mut(index).unwrap().entries_mut() {
            children.extend([NodeId(99), first, second]);
        }

        let chosen = rtree
            .choose_subtree(index, &Rectangle::new(0.0, 0.0, 1.0, 1.0))
            .unwrap();
        assert_eq!(chosen, first);
    }

    #[test]
    fn test_insert_propagates_structural_error() {
        let mut rtree = RTree::default();
        let broken_root = rtree.alloc_node(Node::new_index_node(1));
        rtree.set_root(broken_root);

        let result = rtree.insert(item(1, 0.0, 0.0, 1.0, 1.0));
        assert_eq!(result, Err(RTreeError::EmptyIndexNode(broken_root)));
        assert_eq!(rtree.len(), 0);
    }

    #[test]
    fn test_push_rejects_mismatched_node_kind() {
        let mut rtree = RTree::default();
        let leaf = rtree.root_id();
        let index = rtree.alloc_node(Node::new_index_node(1));

        assert!(matches!(
            rtree.push_child(leaf, index),
            Err(RTreeError::Invariant { node, .. }) if node == leaf
        ));
        assert!(matches!(
            rtree.push_data(index, item(1, 0.0, 0.0, 1.0, 1.0)),
            Err(RTreeError::Invariant { node, .. }) if node == index
        ));
        assert!(rtree.node_ref(leaf).unwrap().data().is_empty());
        assert!(rtree.node_ref(index).unwrap().children().is_empty());

        rtree.push_data(leaf, item(2, 0.0, 0.0, 1.0, 1.0)).unwrap();
        rtree.push_child(index, leaf).unwrap();
        assert_eq!(rtree.node_ref(leaf).unwrap().size(), 1);
        assert_eq!(rtree.node_ref(index).unwrap().children(), &[leaf]);
    }
}
