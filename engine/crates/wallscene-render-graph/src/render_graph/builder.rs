//! Pass 读写声明
//!
//! builder 是修改 render graph 的唯一入口：当前 Pass 上的每一次 `read` / `write`
//! 都会被翻译成依赖边和纹理版本的推进。

use super::dependency_graph::RgNodeId;
use super::graph::RenderGraph;
use super::pass_node::RgPassType;
use super::tex_node::{RgTexDesc, RgTexNode};

/// 在某个 Pass 上声明读写的 builder
///
/// 同一时刻只有一个当前 Pass，通过 `set_work_pass_node` 切换。
pub struct RenderGraphBuilder<'a, D> {
    rg: &'a mut RenderGraph<D>,
    work_pass: Option<RgNodeId>,
}

impl<'a, D> RenderGraphBuilder<'a, D> {
    pub fn new(rg: &'a mut RenderGraph<D>) -> Self {
        Self { rg, work_pass: None }
    }

    #[inline]
    pub fn set_work_pass_node(&mut self, pass: RgNodeId) {
        assert!(self.rg.is_pass_node(pass), "RenderGraphBuilder: {:?} is not a pass node", pass);
        self.work_pass = Some(pass);
    }

    #[inline]
    pub fn work_pass_node(&self) -> Option<RgNodeId> {
        self.work_pass
    }

    #[inline]
    pub fn tex_node(&self, id: RgNodeId) -> Option<&RgTexNode> {
        self.rg.get_tex_node(id)
    }

    /// 只读访问正在构建的 graph
    #[inline]
    pub fn graph(&self) -> &RenderGraph<D> {
        self.rg
    }

    fn require_work_pass(&self, op: &str) -> RgNodeId {
        match self.work_pass {
            Some(pass) => pass,
            None => panic!("RenderGraphBuilder: {} without a work pass", op),
        }
    }
}

// resolve
impl<D> RenderGraphBuilder<'_, D> {
    /// 找到 `desc.key` 本次读写应当使用的版本
    ///
    /// - key 还没有任何版本：创建版本 0
    /// - 写入，且最新版本已经有写入者：创建下一个版本
    /// - 写入，最新版本还没有写入者但当前 Pass 已经读取了它：创建下一个版本
    /// - 其余情况：返回最新版本
    ///
    /// 未写入的最新版本可以被后续的写入者认领，这样读取可以先于写入者声明。
    pub fn create_tex_node(&mut self, desc: &RgTexDesc, write: bool) -> RgNodeId {
        let Some(latest) = self.rg.latest_tex_node(&desc.key) else {
            return self.rg.add_tex_node(desc.clone());
        };
        if !write {
            return latest;
        }

        let written = self.rg.tex_nodes[latest].is_written();
        let read_by_work_pass =
            self.work_pass.is_some_and(|pass| self.rg.dg.nodes_out_of(latest).contains(&pass));
        if written || read_by_work_pass { self.rg.add_tex_node_version(latest) } else { latest }
    }
}

// read & write
impl<D> RenderGraphBuilder<'_, D> {
    /// 当前 Pass 读取 `tex`
    ///
    /// 如果 `tex` 的下一个版本已经有写入者，当前 Pass 必须在它之前执行（write-after-read）。
    ///
    /// # Panics
    /// - 没有当前 Pass
    /// - `tex` 不是纹理节点
    /// - `tex` 正是当前 Pass 写入的版本
    pub fn read(&mut self, tex: RgNodeId) {
        let pass = self.require_work_pass("read");
        let node = &self.rg.tex_nodes[tex];
        assert!(
            node.writer != Some(pass),
            "RenderGraphBuilder: pass \"{}\" reads {:?} which it writes itself",
            self.rg.pass_nodes[pass].name,
            node
        );

        let next_writer = node.next.and_then(|next| self.rg.tex_nodes[next].writer);

        self.rg.dg.connect(tex, pass);
        if let Some(next_writer) = next_writer.filter(|&writer| writer != pass) {
            self.rg.dg.connect(pass, next_writer);
        }
    }

    /// 当前 Pass 写入 `tex`，成为这个版本的写入者
    ///
    /// 上一个版本的所有读取者都要在当前 Pass 之前执行；上一个版本没有读取者时，
    /// 当前 Pass 排在上一个版本的写入者之后。
    ///
    /// # Panics
    /// - 没有当前 Pass
    /// - `tex` 不是纹理节点
    /// - `tex` 已经由其他 Pass 写入
    /// - 当前 Pass 读取了 `tex` 本身
    pub fn write(&mut self, tex: RgNodeId) {
        let pass = self.require_work_pass("write");
        let node = &self.rg.tex_nodes[tex];
        if let Some(writer) = node.writer.filter(|&writer| writer != pass) {
            panic!(
                "RenderGraphBuilder: {:?} is already written by pass \"{}\", pass \"{}\" must write a new version",
                node, self.rg.pass_nodes[writer].name, self.rg.pass_nodes[pass].name
            );
        }
        assert!(
            !self.rg.dg.nodes_out_of(tex).contains(&pass),
            "RenderGraphBuilder: pass \"{}\" writes {:?} which it reads itself",
            self.rg.pass_nodes[pass].name,
            node
        );

        if let Some(prev) = node.prev {
            let readers: Vec<RgNodeId> = self.rg.readers_of(prev).into_iter().filter(|&r| r != pass).collect();
            if readers.is_empty() {
                if let Some(prev_writer) = self.rg.tex_nodes[prev].writer.filter(|&w| w != pass) {
                    self.rg.dg.connect(prev_writer, pass);
                }
            } else {
                for reader in readers {
                    self.rg.dg.connect(reader, pass);
                }
            }
        }

        self.rg.dg.connect(pass, tex);
        self.rg.tex_nodes[tex].writer = Some(pass);
    }

    /// 用一个虚拟 Pass 写入 `tex`
    ///
    /// 用于 graph 外部提供内容的资源（导入的纹理），让它的版本 0 有一个写入者，
    /// 之后的写入者才会排在它的读取者之后。当前 Pass 保持不变。
    ///
    /// # Panics
    /// `tex` 不是版本 0
    pub fn mark_virtual_write(&mut self, tex: RgNodeId) {
        let node = &self.rg.tex_nodes[tex];
        assert!(node.version == 0, "RenderGraphBuilder: virtual write on {:?}, only version 0 is allowed", node);

        let name = format!("virtual:{}", node.desc.key);
        let virtual_pass = self.rg.add_pass_node(name, RgPassType::Virtual);
        log::debug!("RenderGraphBuilder: virtual pass {:?} writes {:?}", virtual_pass, self.rg.tex_nodes[tex]);

        let work_pass = self.work_pass.replace(virtual_pass);
        self.write(tex);
        self.work_pass = work_pass;
    }

    /// 解析 `desc` 并读取，返回读取的版本
    pub fn read_tex(&mut self, desc: &RgTexDesc) -> RgNodeId {
        let tex = self.create_tex_node(desc, false);
        self.read(tex);
        tex
    }

    /// 解析 `desc` 并写入，返回写入的版本
    pub fn write_tex(&mut self, desc: &RgTexDesc) -> RgNodeId {
        let tex = self.create_tex_node(desc, true);
        self.write(tex);
        tex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_color() -> RgTexDesc {
        RgTexDesc::temp("sceneColor")
    }

    #[test]
    fn test_ping_pong_blur() {
        let mut rg = RenderGraph::<()>::new();
        let p1 = rg.add_pass("scene", RgPassType::CustomShader, |builder| {
            builder.write_tex(&scene_color());
        });
        let p2 = rg.add_pass("blur", RgPassType::CustomShader, |builder| {
            builder.read_tex(&scene_color());
            builder.write_tex(&scene_color());
        });
        let p3 = rg.add_pass("present", RgPassType::Copy, |builder| {
            builder.read_tex(&scene_color());
        });

        let versions = rg.tex_versions("sceneColor");
        assert_eq!(versions.len(), 2);
        assert_eq!(rg.get_tex_node(versions[0]).unwrap().writer(), Some(p1));
        assert_eq!(rg.get_tex_node(versions[1]).unwrap().writer(), Some(p2));
        assert_eq!(rg.reads_of(p2), vec![versions[0]]);
        assert_eq!(rg.reads_of(p3), vec![versions[1]]);

        assert_eq!(rg.topological_order(), vec![p1, p2, p3]);
    }

    #[test]
    fn test_versions_of_repeated_writes() {
        let mut rg = RenderGraph::<()>::new();
        let passes: Vec<_> = (0..4)
            .map(|i| {
                rg.add_pass(format!("w{i}"), RgPassType::CustomShader, |builder| {
                    builder.write_tex(&RgTexDesc::temp("k"));
                })
            })
            .collect();

        let versions = rg.tex_versions("k");
        assert_eq!(versions.len(), 4);
        for (i, &id) in versions.iter().enumerate() {
            let node = rg.get_tex_node(id).unwrap();
            assert_eq!(node.version(), i as u32);
            assert_eq!(node.writer(), Some(passes[i]));
            assert_eq!(node.prev_version(), if i == 0 { None } else { Some(versions[i - 1]) });
            assert_eq!(node.next_version(), versions.get(i + 1).copied());
        }

        // 没有读取者时，写入者按版本顺序串起来
        assert_eq!(rg.topological_order(), passes);
    }

    #[test]
    fn test_readers_before_next_writer() {
        let mut rg = RenderGraph::<()>::new();
        let w0 = rg.add_pass("w0", RgPassType::CustomShader, |builder| {
            builder.write_tex(&RgTexDesc::temp("a"));
        });
        let r1 = rg.add_pass("r1", RgPassType::CustomShader, |builder| {
            builder.read_tex(&RgTexDesc::temp("a"));
        });
        let r2 = rg.add_pass("r2", RgPassType::CustomShader, |builder| {
            builder.read_tex(&RgTexDesc::temp("a"));
        });
        let w1 = rg.add_pass("w1", RgPassType::CustomShader, |builder| {
            builder.write_tex(&RgTexDesc::temp("a"));
        });

        let dg = rg.dependency_graph();
        assert!(dg.nodes_into(w1).contains(&r1));
        assert!(dg.nodes_into(w1).contains(&r2));
        assert!(!dg.nodes_into(w1).contains(&w0));

        let order = rg.topological_order();
        let pos = |id| order.iter().position(|&p| p == id).unwrap();
        assert!(pos(w0) < pos(r1));
        assert!(pos(w0) < pos(r2));
        assert!(pos(r1) < pos(w1));
        assert!(pos(r2) < pos(w1));
    }

    #[test]
    fn test_late_reader_before_existing_next_writer() {
        let mut rg = RenderGraph::<()>::new();
        let w0 = rg.add_pass("w0", RgPassType::CustomShader, |builder| {
            builder.write_tex(&RgTexDesc::temp("a"));
        });
        let v0 = rg.latest_tex_node("a").unwrap();
        let w1 = rg.add_pass("w1", RgPassType::CustomShader, |builder| {
            builder.write_tex(&RgTexDesc::temp("a"));
        });

        // 显式读取旧版本：必须排在 v1 的写入者之前
        let late = rg.add_pass("late", RgPassType::CustomShader, |builder| {
            builder.read(v0);
        });

        assert!(rg.dependency_graph().nodes_out_of(late).contains(&w1));
        assert_eq!(rg.topological_order(), vec![w0, late, w1]);
    }

    #[test]
    fn test_read_claimed_by_later_writer() {
        let mut rg = RenderGraph::<()>::new();
        let reader = rg.add_pass("reader", RgPassType::CustomShader, |builder| {
            builder.read_tex(&RgTexDesc::temp("shadow"));
        });
        let writer = rg.add_pass("writer", RgPassType::CustomShader, |builder| {
            builder.write_tex(&RgTexDesc::temp("shadow"));
        });

        assert_eq!(rg.tex_versions("shadow").len(), 1);
        assert_eq!(rg.topological_order(), vec![writer, reader]);
    }

    #[test]
    fn test_read_then_write_unwritten_creates_next_version() {
        let mut rg = RenderGraph::<()>::new();
        let pass = rg.add_pass("modify", RgPassType::CustomShader, |builder| {
            let v0 = builder.read_tex(&RgTexDesc::imported("history"));
            let v1 = builder.write_tex(&RgTexDesc::imported("history"));
            assert_ne!(v0, v1);
        });

        let versions = rg.tex_versions("history");
        assert_eq!(versions.len(), 2);
        assert_eq!(rg.get_tex_node(versions[0]).unwrap().writer(), None);
        assert_eq!(rg.get_tex_node(versions[1]).unwrap().writer(), Some(pass));
        assert!(!rg.dependency_graph().has_cycle());
        assert_eq!(rg.topological_order(), vec![pass]);
    }

    #[test]
    fn test_virtual_write_orders_readers_before_overwrite() {
        let mut rg = RenderGraph::<()>::new();
        let reader = rg.add_pass("reader", RgPassType::CustomShader, |builder| {
            let tex = builder.read_tex(&RgTexDesc::imported("background"));
            builder.mark_virtual_write(tex);
        });
        let writer = rg.add_pass("overwrite", RgPassType::CustomShader, |builder| {
            builder.write_tex(&RgTexDesc::imported("background"));
        });

        assert_eq!(rg.pass_count(), 3);
        let v0 = rg.tex_versions("background")[0];
        let virtual_pass = rg.get_tex_node(v0).unwrap().writer().unwrap();
        assert!(rg.get_pass_node(virtual_pass).unwrap().is_virtual());
        assert!(rg.get_pass(virtual_pass).is_none());

        assert_eq!(rg.topological_order(), vec![reader, writer]);
    }

    #[test]
    fn test_virtual_write_keeps_work_pass() {
        let mut rg = RenderGraph::<()>::new();
        let pass = rg.add_pass("p", RgPassType::CustomShader, |builder| {
            let work = builder.work_pass_node();
            let tex = builder.create_tex_node(&RgTexDesc::imported("env"), false);
            builder.mark_virtual_write(tex);
            assert_eq!(builder.work_pass_node(), work);
            builder.read(tex);
        });

        assert_eq!(rg.reads_of(pass).len(), 1);
    }

    #[test]
    #[should_panic(expected = "is not a pass node")]
    fn test_set_tex_as_work_pass_panics() {
        let mut rg = RenderGraph::<()>::new();
        let tex = rg.add_tex_node(RgTexDesc::temp("a"));
        let mut builder = RenderGraphBuilder::new(&mut rg);
        builder.set_work_pass_node(tex);
    }

    #[test]
    #[should_panic(expected = "read without a work pass")]
    fn test_read_without_work_pass_panics() {
        let mut rg = RenderGraph::<()>::new();
        let tex = rg.add_tex_node(RgTexDesc::temp("a"));
        let mut builder = RenderGraphBuilder::new(&mut rg);
        builder.read(tex);
    }

    #[test]
    #[should_panic(expected = "write without a work pass")]
    fn test_write_without_work_pass_panics() {
        let mut rg = RenderGraph::<()>::new();
        let mut builder = RenderGraphBuilder::new(&mut rg);
        let tex = builder.create_tex_node(&RgTexDesc::temp("a"), true);
        builder.write(tex);
    }

    #[test]
    #[should_panic(expected = "only version 0 is allowed")]
    fn test_virtual_write_on_later_version_panics() {
        let mut rg = RenderGraph::<()>::new();
        rg.add_pass("p0", RgPassType::CustomShader, |builder| {
            builder.write_tex(&RgTexDesc::temp("a"));
        });
        rg.add_pass("p1", RgPassType::CustomShader, |builder| {
            let v1 = builder.write_tex(&RgTexDesc::temp("a"));
            builder.mark_virtual_write(v1);
        });
    }

    #[test]
    #[should_panic(expected = "is already written by pass \"p0\"")]
    fn test_overwrite_same_version_panics() {
        let mut rg = RenderGraph::<()>::new();
        rg.add_pass("p0", RgPassType::CustomShader, |builder| {
            builder.write_tex(&RgTexDesc::temp("a"));
        });
        let v0 = rg.latest_tex_node("a").unwrap();
        rg.add_pass("p1", RgPassType::CustomShader, |builder| {
            builder.write(v0);
        });
    }

    #[test]
    #[should_panic(expected = "which it reads itself")]
    fn test_write_own_read_panics() {
        let mut rg = RenderGraph::<()>::new();
        rg.add_pass("p", RgPassType::CustomShader, |builder| {
            let tex = builder.read_tex(&RgTexDesc::temp("a"));
            builder.write(tex);
        });
    }

    #[test]
    #[should_panic(expected = "which it writes itself")]
    fn test_read_own_write_panics() {
        let mut rg = RenderGraph::<()>::new();
        rg.add_pass("p", RgPassType::CustomShader, |builder| {
            let tex = builder.write_tex(&RgTexDesc::temp("a"));
            builder.read(tex);
        });
    }
}
