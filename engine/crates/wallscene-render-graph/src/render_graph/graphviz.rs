//! Graphviz 调试输出

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::config::RgDebugConfig;
use super::graph::RenderGraph;

impl<D> RenderGraph<D> {
    /// 生成 DOT 格式的依赖图
    ///
    /// Pass 为方框（虚拟 Pass 为虚线框），纹理版本为椭圆，标签为 `key v:版本`。
    /// `prune_unused` 为 true 时省略既没有写入者也没有读取者的纹理版本。
    pub fn to_graphviz(&self, prune_unused: bool) -> String {
        let pruned: HashSet<_> = if prune_unused { self.unused_tex_nodes().into_iter().collect() } else { HashSet::new() };
        let indices: HashMap<_, _> =
            self.dg.nodes().filter(|id| !pruned.contains(id)).enumerate().map(|(index, id)| (id, index)).collect();

        let mut output = String::with_capacity(4096);
        output.push_str("digraph rendergraph {\nnode [shape=box]\n");

        for id in self.dg.nodes() {
            let Some(index) = indices.get(&id) else {
                continue;
            };
            if let Some(pass) = self.pass_nodes.get(id) {
                let style = if pass.is_virtual() { " style=dashed" } else { "" };
                output.push_str(&format!("n{}[label={:?}{}]\n", index, pass.name, style));
            } else if let Some(tex) = self.tex_nodes.get(id) {
                let label = format!("{} v:{}", tex.desc.key, tex.version);
                output.push_str(&format!("n{}[label={:?} shape=ellipse]\n", index, label));
            }
        }

        for (from, to) in self.dg.edges() {
            if let (Some(from), Some(to)) = (indices.get(&from), indices.get(&to)) {
                output.push_str(&format!("n{}->n{}\n", from, to));
            }
        }

        output.push('}');
        output
    }

    /// 把依赖图写入 DOT 文件，自动创建父目录
    pub fn dump_graphviz<P: AsRef<Path>>(&self, path: P, prune_unused: bool) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("创建目录失败: {:?}", parent))?;
        }
        fs::write(path, self.to_graphviz(prune_unused)).with_context(|| format!("写入 Graphviz 文件失败: {:?}", path))?;

        log::info!("RenderGraph: graphviz dumped to {:?}", path);
        Ok(())
    }
}

/// 按构建次数决定是否输出 Graphviz
///
/// 由渲染器持有，每次构建完 graph 后调用 `record_build`。
#[derive(Debug, Clone)]
pub struct RgDumpTrigger {
    config: RgDebugConfig,
    build_count: u32,
}

impl RgDumpTrigger {
    pub fn new(config: RgDebugConfig) -> Self {
        Self { config, build_count: 0 }
    }

    #[inline]
    pub fn build_count(&self) -> u32 {
        self.build_count
    }

    #[inline]
    pub fn config(&self) -> &RgDebugConfig {
        &self.config
    }

    /// 记录一次构建，需要时输出
    ///
    /// 返回本次输出的文件路径，没有输出时返回 None。
    pub fn record_build<D>(&mut self, rg: &RenderGraph<D>) -> anyhow::Result<Option<PathBuf>> {
        self.build_count += 1;

        if !self.config.dump_graphviz {
            return Ok(None);
        }
        if self.config.dump_on_build.is_some_and(|n| n != self.build_count) {
            return Ok(None);
        }

        let path = self.config.dump_dir.join(format!("rendergraph-{}.dot", self.build_count));
        rg.dump_graphviz(&path, self.config.prune_unused)?;
        Ok(Some(path))
    }

    pub fn reset(&mut self) {
        self.build_count = 0;
    }
}
