//! 纹理资源节点
//!
//! 同一个 key 的多个版本通过 prev/next 串成一条版本链，
//! 每个版本都是一次写入之后的不可变快照。

use std::fmt;

use super::dependency_graph::RgNodeId;

/// 纹理来源
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RgTexType {
    /// 来自场景资源或 graph 外部（背景图、上一帧结果等）
    Imported,
    /// graph 内部产生的临时纹理
    #[default]
    Temp,
}

/// 纹理描述
///
/// 对 render graph 来说只有 `key` 有意义，其余字段原样交给渲染器。
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct RgTexDesc {
    /// 调试名称
    pub name: String,
    /// 逻辑资源名，同一个 key 的所有版本共享
    pub key: String,
    pub tex_type: RgTexType,
}

impl RgTexDesc {
    #[inline]
    pub fn new(key: impl Into<String>, tex_type: RgTexType) -> Self {
        let key = key.into();
        Self { name: key.clone(), key, tex_type }
    }

    #[inline]
    pub fn temp(key: impl Into<String>) -> Self {
        Self::new(key, RgTexType::Temp)
    }

    #[inline]
    pub fn imported(key: impl Into<String>) -> Self {
        Self::new(key, RgTexType::Imported)
    }

    #[inline]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// 纹理的一个版本
#[derive(Clone)]
pub struct RgTexNode {
    pub(crate) desc: RgTexDesc,
    pub(crate) version: u32,
    pub(crate) prev: Option<RgNodeId>,
    pub(crate) next: Option<RgNodeId>,
    /// 产生这个版本的 Pass；读取查询可能先于写入者注册，此时为 None
    pub(crate) writer: Option<RgNodeId>,
}

impl RgTexNode {
    /// 版本 0
    pub(crate) fn first_version(desc: RgTexDesc) -> Self {
        Self { desc, version: 0, prev: None, next: None, writer: None }
    }

    /// `prev` 的下一个版本，描述沿用 `prev` 的
    pub(crate) fn next_version_of(prev_id: RgNodeId, prev: &RgTexNode) -> Self {
        Self { desc: prev.desc.clone(), version: prev.version + 1, prev: Some(prev_id), next: None, writer: None }
    }
}

// getter
impl RgTexNode {
    #[inline]
    pub fn desc(&self) -> &RgTexDesc {
        &self.desc
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.desc.key
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    #[inline]
    pub fn tex_type(&self) -> RgTexType {
        self.desc.tex_type
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn prev_version(&self) -> Option<RgNodeId> {
        self.prev
    }

    #[inline]
    pub fn next_version(&self) -> Option<RgNodeId> {
        self.next
    }

    #[inline]
    pub fn writer(&self) -> Option<RgNodeId> {
        self.writer
    }

    #[inline]
    pub fn is_written(&self) -> bool {
        self.writer.is_some()
    }
}

impl fmt::Debug for RgTexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RgTex({} v{})", self.desc.key, self.version)
    }
}
