// R-tree算法模块
//
// 这个模块包含R-tree的所有核心算法实现，按功能分解为不同的子模块：
// - insert: 插入和子树选择
// - split: 节点分裂算法（线性的按数量分裂）
// - search: 搜索和带人口过滤的搜索
// - debug: 调试输出、可视化导出和不变量检查

pub mod debug;
pub mod insert;
pub mod search;
pub mod split;
