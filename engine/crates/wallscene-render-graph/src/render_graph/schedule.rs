//! 执行顺序和资源最后使用信息
//!
//! graph 构建完成之后只读地查询：真实 Pass 的拓扑顺序，以及每个纹理版本在这个顺序中的最后一个读取者。

use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::Itertools;

use super::dependency_graph::RgNodeId;
use super::error::RgError;
use super::graph::RenderGraph;

// order
impl<D> RenderGraph<D> {
    /// 真实 Pass 的执行顺序，满足构建过程中记录的所有依赖
    ///
    /// 纹理节点和虚拟 Pass 不会出现在结果中。
    pub fn try_topological_order(&self) -> Result<Vec<RgNodeId>, RgError> {
        let order = self.dg.topological_order()?;
        Ok(order
            .into_iter()
            .filter(|&id| self.pass_nodes.get(id).is_some_and(|pass| !pass.is_virtual()))
            .collect())
    }

    /// 同 `try_topological_order`
    ///
    /// # Panics
    /// 依赖图中存在环
    pub fn topological_order(&self) -> Vec<RgNodeId> {
        self.try_topological_order().unwrap_or_else(|RgError::CyclicDependency(node)| {
            panic!("RenderGraph: cycle detected involving {}", self.node_label(node));
        })
    }

    /// 每个 Pass 是哪些纹理版本的最后一个读取者
    ///
    /// 逆序遍历 `order`，第一次遇到的读取者就是按执行顺序的最后一个读取者。
    /// 结果按 `order` 的顺序为每个 Pass 保留一项，没有需要释放的版本时为空；
    /// 每一项内部按节点创建顺序排列。
    pub fn last_read_texs(&self, order: &[RgNodeId]) -> IndexMap<RgNodeId, Vec<RgNodeId>> {
        let mut last_reads: IndexMap<RgNodeId, Vec<RgNodeId>> = order.iter().map(|&pass| (pass, Vec::new())).collect();
        let mut claimed = HashSet::new();

        for &pass in order.iter().rev() {
            let texs = self
                .reads_of(pass)
                .into_iter()
                .filter(|&tex| claimed.insert(tex))
                .sorted_by_key(|&tex| self.dg.creation_index(tex))
                .collect_vec();
            last_reads[&pass] = texs;
        }

        last_reads
    }

    /// 计算执行顺序和最后读取信息
    pub fn compile(&self) -> Result<RgSchedule, RgError> {
        for tex in self.unused_tex_nodes() {
            log::warn!("RenderGraph: {} is never written or read", self.node_label(tex));
        }

        let order = self.try_topological_order()?;
        let last_reads = self.last_read_texs(&order);
        log::debug!("RenderGraph: compiled {} passes from {} nodes", order.len(), self.dg.node_count());

        Ok(RgSchedule { order, last_reads })
    }
}

/// 编译结果：交给录制命令的阶段使用
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RgSchedule {
    order: Vec<RgNodeId>,
    last_reads: IndexMap<RgNodeId, Vec<RgNodeId>>,
}

impl RgSchedule {
    /// 真实 Pass 的执行顺序
    #[inline]
    pub fn order(&self) -> &[RgNodeId] {
        &self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn last_reads(&self) -> &IndexMap<RgNodeId, Vec<RgNodeId>> {
        &self.last_reads
    }

    /// `pass` 执行完之后不再被读取的纹理版本
    pub fn release_after(&self, pass: RgNodeId) -> &[RgNodeId] {
        self.last_reads.get(&pass).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `pass` 执行完之后可以释放的资源 key，去重
    pub fn release_keys<'rg, D>(&self, rg: &'rg RenderGraph<D>, pass: RgNodeId) -> Vec<&'rg str> {
        self.release_after(pass).iter().filter_map(|&tex| rg.get_tex_node(tex)).map(|tex| tex.key()).unique().collect()
    }

    /// 以日志形式输出执行计划
    pub fn print_schedule<D>(&self, rg: &RenderGraph<D>) {
        let pass_name = |id: RgNodeId| rg.get_pass_node(id).map(|pass| pass.name()).unwrap_or("<unknown>");
        let tex_names = |texs: Vec<RgNodeId>| {
            texs.into_iter()
                .filter_map(|tex| rg.get_tex_node(tex))
                .map(|tex| format!("\"{}\" v{}", tex.key(), tex.version()))
                .join(", ")
        };

        log::info!("╔══════════════════════════════════════════════════════════════════╗");
        log::info!("║              RenderGraph Schedule                                ║");
        log::info!("╠══════════════════════════════════════════════════════════════════╣");
        log::info!(
            "║ Total Passes: {}  |  Execution Order: [{}]",
            self.order.len(),
            self.order.iter().map(|&pass| pass_name(pass)).join(" → ")
        );
        log::info!("╚══════════════════════════════════════════════════════════════════╝");

        for (index, &pass) in self.order.iter().enumerate() {
            log::info!("┌─────────────────────────────────────────────────────────────────┐");
            match rg.get_pass_node(pass) {
                Some(node) => {
                    log::info!("│ [{}/{}] Pass: \"{}\" ({:?})", index + 1, self.order.len(), node.name(), node.pass_type())
                }
                None => log::info!("│ [{}/{}] Pass: <unknown>", index + 1, self.order.len()),
            }
            log::info!("├─────────────────────────────────────────────────────────────────┤");

            let reads = rg.reads_of(pass);
            if !reads.is_empty() {
                log::info!("│ Reads:   {}", tex_names(reads));
            }
            let writes = rg.writes_of(pass);
            if !writes.is_empty() {
                log::info!("│ Writes:  {}", tex_names(writes));
            }
            let release = self.release_after(pass);
            if !release.is_empty() {
                log::info!("│ Release: {}", tex_names(release.to_vec()));
            }
            log::info!("└─────────────────────────────────────────────────────────────────┘");
        }
    }
}
