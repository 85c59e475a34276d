use std::collections::HashMap;

use slotmap::SecondaryMap;

use super::builder::RenderGraphBuilder;
use super::dependency_graph::{DependencyGraph, RgNodeId};
use super::pass_node::{RgPassNode, RgPassType};
use super::tex_node::{RgTexDesc, RgTexNode};

/// 一帧的渲染图
///
/// 依赖图中同时存放 Pass 节点和纹理版本节点，节点内容按类型分别存放在两张
/// `SecondaryMap` 中，`pass_nodes` 的 key 集合即为 Pass 节点集合。
///
/// `D` 是渲染器为每个真实 Pass 保存的数据（pipeline 描述、uniform 等），
/// 由 `add_pass` 的 setup 回调产生，虚拟 Pass 没有对应的数据。
///
/// # 生命周期
///
/// 每帧（或场景重新配置时）从头构建，调度结果取走之后可以 `clear` 复用内存。
/// 请求拓扑排序之后不应再修改。
pub struct RenderGraph<D = ()> {
    pub(crate) dg: DependencyGraph,
    pub(crate) tex_nodes: SecondaryMap<RgNodeId, RgTexNode>,
    pub(crate) pass_nodes: SecondaryMap<RgNodeId, RgPassNode>,
    pub(crate) passes: SecondaryMap<RgNodeId, D>,
    /// 每个资源 key 当前最新版本的节点
    pub(crate) key_tex_nodes: HashMap<String, RgNodeId>,
}

impl<D> Default for RenderGraph<D> {
    fn default() -> Self {
        Self {
            dg: DependencyGraph::new(),
            tex_nodes: SecondaryMap::new(),
            pass_nodes: SecondaryMap::new(),
            passes: SecondaryMap::new(),
            key_tex_nodes: HashMap::new(),
        }
    }
}

// new & init
impl<D> RenderGraph<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 丢弃本次构建的所有节点，之前的 `RgNodeId` 全部失效
    pub fn clear(&mut self) {
        self.dg.clear();
        self.tex_nodes.clear();
        self.pass_nodes.clear();
        self.passes.clear();
        self.key_tex_nodes.clear();
    }
}

// pass
impl<D> RenderGraph<D> {
    /// 添加一个真实 Pass
    ///
    /// `setup` 在该 Pass 作为当前 Pass 的 builder 上声明读写，返回值作为 Pass 数据保存。
    ///
    /// # Panics
    /// `pass_type` 为 `Virtual` 时 panic，虚拟 Pass 只能由 builder 创建
    pub fn add_pass<F>(&mut self, name: impl Into<String>, pass_type: RgPassType, setup: F) -> RgNodeId
    where
        F: FnOnce(&mut RenderGraphBuilder<'_, D>) -> D,
    {
        assert!(!pass_type.is_virtual(), "RenderGraph: virtual passes are created by the builder only");

        let pass = self.add_pass_node(name, pass_type);
        let data = {
            let mut builder = RenderGraphBuilder::new(self);
            builder.set_work_pass_node(pass);
            setup(&mut builder)
        };
        self.passes.insert(pass, data);
        pass
    }

    /// 以 `pass` 为当前 Pass 重新打开 builder，追加声明
    ///
    /// `pass` 不是真实 Pass 时返回 false，否则返回 `callback` 的结果。
    pub fn after_build<F>(&mut self, pass: RgNodeId, callback: F) -> bool
    where
        F: FnOnce(&mut RenderGraphBuilder<'_, D>, &mut D) -> bool,
    {
        let Some(mut data) = self.passes.remove(pass) else {
            return false;
        };
        let result = {
            let mut builder = RenderGraphBuilder::new(self);
            builder.set_work_pass_node(pass);
            callback(&mut builder, &mut data)
        };
        self.passes.insert(pass, data);
        result
    }

    pub(crate) fn add_pass_node(&mut self, name: impl Into<String>, pass_type: RgPassType) -> RgNodeId {
        let id = self.dg.add_node();
        self.pass_nodes.insert(id, RgPassNode::new(name, pass_type));
        id
    }
}

// tex version
impl<D> RenderGraph<D> {
    /// 为 `desc.key` 创建版本 0，并登记为该 key 的最新版本
    pub(crate) fn add_tex_node(&mut self, desc: RgTexDesc) -> RgNodeId {
        let id = self.dg.add_node();
        log::debug!("RenderGraph: new tex \"{}\" v0", desc.key);
        self.key_tex_nodes.insert(desc.key.clone(), id);
        self.tex_nodes.insert(id, RgTexNode::first_version(desc));
        id
    }

    /// 在 `prev` 之后追加一个版本，并登记为该 key 的最新版本
    pub(crate) fn add_tex_node_version(&mut self, prev: RgNodeId) -> RgNodeId {
        let node = RgTexNode::next_version_of(prev, &self.tex_nodes[prev]);
        let id = self.dg.add_node();
        log::debug!("RenderGraph: new tex \"{}\" v{}", node.desc.key, node.version);

        self.tex_nodes[prev].next = Some(id);
        self.key_tex_nodes.insert(node.desc.key.clone(), id);
        self.tex_nodes.insert(id, node);
        id
    }
}

// getter
impl<D> RenderGraph<D> {
    #[inline]
    pub fn get_pass_node(&self, id: RgNodeId) -> Option<&RgPassNode> {
        self.pass_nodes.get(id)
    }

    #[inline]
    pub fn get_tex_node(&self, id: RgNodeId) -> Option<&RgTexNode> {
        self.tex_nodes.get(id)
    }

    /// 真实 Pass 的数据
    #[inline]
    pub fn get_pass(&self, id: RgNodeId) -> Option<&D> {
        self.passes.get(id)
    }

    #[inline]
    pub fn get_pass_mut(&mut self, id: RgNodeId) -> Option<&mut D> {
        self.passes.get_mut(id)
    }

    #[inline]
    pub fn is_pass_node(&self, id: RgNodeId) -> bool {
        self.pass_nodes.contains_key(id)
    }

    #[inline]
    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.dg
    }

    /// 所有 Pass 节点（包括虚拟 Pass），按创建顺序
    pub fn pass_nodes(&self) -> impl Iterator<Item = (RgNodeId, &RgPassNode)> {
        self.dg.nodes().filter_map(|id| self.pass_nodes.get(id).map(|pass| (id, pass)))
    }

    /// 所有纹理版本节点，按创建顺序
    pub fn tex_nodes(&self) -> impl Iterator<Item = (RgNodeId, &RgTexNode)> {
        self.dg.nodes().filter_map(|id| self.tex_nodes.get(id).map(|tex| (id, tex)))
    }

    #[inline]
    pub fn pass_count(&self) -> usize {
        self.pass_nodes.len()
    }

    #[inline]
    pub fn tex_node_count(&self) -> usize {
        self.tex_nodes.len()
    }

    /// `key` 当前最新版本
    #[inline]
    pub fn latest_tex_node(&self, key: &str) -> Option<RgNodeId> {
        self.key_tex_nodes.get(key).copied()
    }

    /// `key` 的完整版本链，从版本 0 开始
    pub fn tex_versions(&self, key: &str) -> Vec<RgNodeId> {
        let mut chain = Vec::new();
        let mut cursor = self.latest_tex_node(key);
        while let Some(id) = cursor {
            chain.push(id);
            cursor = self.tex_nodes.get(id).and_then(|node| node.prev);
        }
        chain.reverse();
        chain
    }

    /// 读取 `tex` 这个版本的 Pass
    pub fn readers_of(&self, tex: RgNodeId) -> Vec<RgNodeId> {
        self.dg.nodes_out_of(tex).into_iter().filter(|&id| self.is_pass_node(id)).collect()
    }

    /// `pass` 读取的纹理版本
    pub fn reads_of(&self, pass: RgNodeId) -> Vec<RgNodeId> {
        self.dg.nodes_into(pass).into_iter().filter(|&id| self.tex_nodes.contains_key(id)).collect()
    }

    /// `pass` 写入的纹理版本
    pub fn writes_of(&self, pass: RgNodeId) -> Vec<RgNodeId> {
        self.dg.nodes_out_of(pass).into_iter().filter(|&id| self.tex_nodes.contains_key(id)).collect()
    }

    /// 既没有写入者也没有读取者的纹理版本
    pub fn unused_tex_nodes(&self) -> Vec<RgNodeId> {
        self.tex_nodes()
            .filter(|(id, node)| node.writer.is_none() && self.readers_of(*id).is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// 调试用的节点描述
    pub(crate) fn node_label(&self, id: RgNodeId) -> String {
        if let Some(pass) = self.pass_nodes.get(id) {
            format!("pass \"{}\"", pass.name)
        } else if let Some(tex) = self.tex_nodes.get(id) {
            format!("tex \"{}\" v{}", tex.desc.key, tex.version)
        } else {
            format!("<unknown {:?}>", id)
        }
    }
}
