use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// render graph 的 TOML 配置
///
/// ```toml
/// [debug]
/// dump_graphviz = true
/// dump_on_build = 3
/// dump_dir = "target/render-graph"
/// prune_unused = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderGraphConfig {
    #[serde(default)]
    pub debug: RgDebugConfig,
}

/// 调试输出配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RgDebugConfig {
    /// 是否输出 Graphviz 文件
    pub dump_graphviz: bool,

    /// 只在第 N 次构建时输出（从 1 开始）；为空时每次构建都输出
    pub dump_on_build: Option<u32>,

    /// 输出目录，相对路径由调用方决定基准目录
    pub dump_dir: PathBuf,

    /// 输出时省略没有读写的纹理版本
    pub prune_unused: bool,
}

impl Default for RgDebugConfig {
    fn default() -> Self {
        Self {
            dump_graphviz: false,
            dump_on_build: None,
            dump_dir: PathBuf::from("target/render-graph"),
            prune_unused: true,
        }
    }
}

impl RenderGraphConfig {
    /// 从 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).with_context(|| format!("读取配置文件失败: {:?}", path.as_ref()))?;

        Self::from_toml_str(&content).with_context(|| format!("解析 TOML 配置失败: {:?}", path.as_ref()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: RenderGraphConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("序列化配置失败")?;

        fs::write(path.as_ref(), content).with_context(|| format!("写入配置文件失败: {:?}", path.as_ref()))?;

        Ok(())
    }
}
