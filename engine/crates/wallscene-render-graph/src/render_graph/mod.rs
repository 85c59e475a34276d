//! RenderGraph - 基于资源版本的依赖解析与调度
//!
//! Pass 只需声明 "读取资源 X" / "写入资源 Y"，render graph 负责：
//!
//! - 跟踪每个资源 key 的版本链，写入总是产生新版本，保证正在进行的读取不会被覆盖
//! - 根据读写声明建立 Pass 之间的依赖边（读后写、写后写）
//! - 给出真实 Pass 的执行顺序，以及每个 Pass 之后可以释放的资源版本
//!
//! # 核心概念
//!
//! - **RgNodeId**: 依赖图中的节点句柄，Pass 和纹理版本共用同一个 id 空间
//! - **RgTexNode**: 某个资源 key 的一个版本
//! - **RgPassNode**: 真实 Pass 或只用于锚定依赖的虚拟 Pass
//! - **RenderGraphBuilder**: 唯一的修改入口，把 read/write 转换为依赖边和版本变化
//! - **RgSchedule**: 编译结果，包含执行顺序和 last reader 信息
//!
//! # 使用示例
//!
//! ```ignore
//! use wallscene_render_graph::render_graph::*;
//!
//! let mut rg = RenderGraph::<MyPassDesc>::new();
//! let scene_color = RgTexDesc::temp("sceneColor");
//!
//! rg.add_pass("scene", RgPassType::CustomShader, |builder| {
//!     builder.write_tex(&scene_color);
//!     MyPassDesc::default()
//! });
//! rg.add_pass("blur", RgPassType::CustomShader, |builder| {
//!     builder.read_tex(&scene_color);
//!     builder.write_tex(&scene_color);
//!     MyPassDesc::default()
//! });
//!
//! let schedule = rg.compile()?;
//! for &pass in schedule.order() {
//!     let desc = rg.get_pass(pass);
//!     let release = schedule.release_keys(&rg, pass);
//!     // 录制命令...
//! }
//! ```
//!
//! # 模块结构
//!
//! - `dependency_graph`: 通用有向图和拓扑排序
//! - `tex_node` / `pass_node`: 节点数据
//! - `graph`: RenderGraph 本体和查询
//! - `builder`: 读写声明与版本转换
//! - `schedule`: 执行顺序与 last reader
//! - `graphviz`: 调试输出
//! - `config`: 调试相关配置

mod builder;
mod config;
mod dependency_graph;
mod error;
mod graph;
mod graphviz;
mod pass_node;
mod schedule;
mod tex_node;

pub use builder::RenderGraphBuilder;
pub use config::{RenderGraphConfig, RgDebugConfig};
pub use dependency_graph::{DependencyGraph, RgNodeId};
pub use error::RgError;
pub use graph::RenderGraph;
pub use graphviz::RgDumpTrigger;
pub use pass_node::{RgPassNode, RgPassType};
pub use schedule::RgSchedule;
pub use tex_node::{RgTexDesc, RgTexNode, RgTexType};
