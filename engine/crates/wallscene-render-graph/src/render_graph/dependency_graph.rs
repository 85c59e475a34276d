//! 依赖图和拓扑排序
//!
//! 与节点内容无关的有向图：只负责节点 id 分配、连边、邻接查询和拓扑排序。
//! 使用 petgraph 提供图算法，使用 slotmap 提供带代际的节点句柄。

use petgraph::Direction;
use petgraph::algo::{has_path_connecting, is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use slotmap::{SlotMap, new_key_type};

use super::error::RgError;

new_key_type! {
    /// 依赖图中的节点句柄
    ///
    /// 只在一次 graph 构建内有效；`clear` 之后旧句柄会因为代际不同而查不到任何节点。
    pub struct RgNodeId;
}

/// 依赖图
///
/// 边 `u -> v` 表示 v 依赖 u，即 u 必须在 v 之前执行。
#[derive(Default)]
pub struct DependencyGraph {
    /// 有向图：节点权重就是节点自己的 id，方便从 NodeIndex 反查
    graph: DiGraph<RgNodeId, ()>,
    /// 节点 id 到图节点的映射
    indices: SlotMap<RgNodeId, NodeIndex>,
}

// new & init
impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个新节点
    pub fn add_node(&mut self) -> RgNodeId {
        let graph = &mut self.graph;
        let id = self.indices.insert_with_key(|id| graph.add_node(id));
        log::trace!("dependency graph: add node {:?}", id);
        id
    }

    /// 连接 `from -> to`
    ///
    /// 重复连接同一对节点不会产生新的边。
    ///
    /// # Panics
    /// 任意一端不属于当前图时 panic
    pub fn connect(&mut self, from: RgNodeId, to: RgNodeId) {
        debug_assert_ne!(from, to, "dependency graph: self loop on {:?}", from);
        let from_index = self.indices[from];
        let to_index = self.indices[to];
        self.graph.update_edge(from_index, to_index, ());
    }

    /// 清空所有节点和边，之前分配的 id 全部失效
    pub fn clear(&mut self) {
        self.graph.clear();
        self.indices.clear();
    }
}

// query
impl DependencyGraph {
    #[inline]
    pub fn contains(&self, id: RgNodeId) -> bool {
        self.indices.contains_key(id)
    }

    /// 节点在本次构建中的创建序号，从 0 开始；未知节点返回 None
    ///
    /// `clear` 之后 slotmap 会倒序复用空槽，`RgNodeId` 本身的大小关系不反映创建顺序。
    #[inline]
    pub fn creation_index(&self, id: RgNodeId) -> Option<usize> {
        self.indices.get(id).map(|index| index.index())
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// 所有节点，按创建顺序
    pub fn nodes(&self) -> impl Iterator<Item = RgNodeId> + '_ {
        self.graph.node_indices().map(|index| self.graph[index])
    }

    /// 所有边 `(from, to)`
    pub fn edges(&self) -> impl Iterator<Item = (RgNodeId, RgNodeId)> + '_ {
        self.graph.edge_references().map(|edge| (self.graph[edge.source()], self.graph[edge.target()]))
    }

    /// 节点的后继（依赖它的节点），按连接顺序；未知节点返回空
    pub fn nodes_out_of(&self, id: RgNodeId) -> Vec<RgNodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// 节点的前驱（它依赖的节点），按连接顺序；未知节点返回空
    pub fn nodes_into(&self, id: RgNodeId) -> Vec<RgNodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: RgNodeId, direction: Direction) -> Vec<RgNodeId> {
        let Some(&index) = self.indices.get(id) else {
            return Vec::new();
        };
        // petgraph 按连接的逆序返回邻居
        let mut neighbors: Vec<RgNodeId> =
            self.graph.neighbors_directed(index, direction).map(|n| self.graph[n]).collect();
        neighbors.reverse();
        neighbors
    }

    /// 是否存在从 `from` 到 `to` 的路径（节点到自身总是可达）
    pub fn has_path(&self, from: RgNodeId, to: RgNodeId) -> bool {
        match (self.indices.get(from), self.indices.get(to)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// 对所有节点做拓扑排序
    ///
    /// # 返回
    /// - `Ok(order)`: 满足所有边约束的节点顺序
    /// - `Err(RgError::CyclicDependency)`: 图中存在环，携带环上的一个节点
    pub fn topological_order(&self) -> Result<Vec<RgNodeId>, RgError> {
        toposort(&self.graph, None)
            .map(|sorted| sorted.into_iter().map(|index| self.graph[index]).collect())
            .map_err(|cycle| RgError::CyclicDependency(self.graph[cycle.node_id()]))
    }
}
