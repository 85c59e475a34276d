//! Wallscene 场景渲染图
//!
//! 每帧根据 Pass 声明的资源读写关系构建依赖图，自动得出执行顺序和资源的最后使用位置。
//! GPU 命令录制、资源分配等不在本 crate 中完成。

pub mod render_graph;
