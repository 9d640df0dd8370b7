use super::super::node::{Entries, NodeId};
use super::super::rectangle::Rectangle;
use super::super::rtree::{DataItem, RTree};

/// 搜索操作相关算法
impl RTree {
    /// 搜索与查询矩形相交的所有记录
    ///
    /// 边界接触也算相交；无效查询矩形返回空结果。结果按遍历顺序排列，
    /// 是记录的拷贝，与树的后续修改无关。
    pub fn search(&self, query: &Rectangle) -> Vec<DataItem> {
        self.search_filtered(query, None)
    }

    /// 搜索与查询矩形相交且人口不低于 `min_population` 的所有记录
    ///
    /// 阈值只作用于叶子中的记录，索引节点的剪枝仍然只看空间关系。
    pub fn search_with_population(&self, query: &Rectangle, min_population: i64) -> Vec<DataItem> {
        self.search_filtered(query, Some(min_population))
    }

    fn search_filtered(&self, query: &Rectangle, min_population: Option<i64>) -> Vec<DataItem> {
        let mut results = Vec::new();

        if self.root_mbr().intersects(query) {
            self.search_recursive(self.root_id(), query, min_population, &mut results);
        }

        results
    }

    /// 递归搜索
    ///
    /// 只进入MBR与查询矩形相交的子节点；叶子中的记录需与查询相交，
    /// 且在给定阈值时人口不低于阈值。边界接触算作相交。
    fn search_recursive(
        &self,
        id: NodeId,
        query: &Rectangle,
        min_population: Option<i64>,
        results: &mut Vec<DataItem>,
    ) {
        let Some(node) = self.node(id) else {
            return;
        };

        match node.entries() {
            // S2: 叶子节点，逐条检查记录
            Entries::Data(items) => {
                results.extend(
                    items
                        .iter()
                        .filter(|item| item.bounds.intersects(query))
                        .filter(|item| min_population.map_or(true, |min| item.population >= min))
                        .cloned(),
                );
            }
            // S1: 搜索MBR与查询相交的子树
            Entries::Children(children) => {
                for &child_id in children {
                    if let Some(child) = self.node(child_id) {
                        if child.mbr.intersects(query) {
                            self.search_recursive(child_id, query, min_population, results);
                        }
                    }
                }
            }
        }
    }
}
