use super::dependency_graph::RgNodeId;

/// render graph 构建和编译阶段的错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RgError {
    /// 依赖图中存在环，携带环上的一个节点
    ///
    /// 读取先于写入者声明时可能出现：P1 读 A 写 B，之后 P2 读 B 写 A。
    #[error("render graph contains cyclic dependency at node {0:?}")]
    CyclicDependency(RgNodeId),
}
