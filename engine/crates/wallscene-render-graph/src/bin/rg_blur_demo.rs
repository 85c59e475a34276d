//! 场景 → 双向模糊 → 合成 → 呈现 的 render graph 示例
//!
//! 工作区根目录下存在 `render-graph.toml` 时读取其中的调试配置。

use anyhow::Result;
use wallscene_crate_tools::init_log::init_log;
use wallscene_crate_tools::resource::WallscenePath;
use wallscene_render_graph::render_graph::{
    RenderGraph, RenderGraphConfig, RgDumpTrigger, RgPassType, RgSchedule, RgTexDesc,
};

#[derive(Debug, Clone, Copy)]
enum BlurDirection {
    Horizontal,
    Vertical,
}

/// 每个 Pass 交给渲染器的数据
#[derive(Debug)]
enum DemoPass {
    Scene { layers: u32 },
    Blur { direction: BlurDirection, radius: f32 },
    Composite { inputs: Vec<String> },
    Present,
}

fn build_frame(rg: &mut RenderGraph<DemoPass>, blur_radius: f32) {
    let background = RgTexDesc::imported("background").with_name("wallpaper background");
    let scene_color = RgTexDesc::temp("sceneColor");
    let blur_tmp = RgTexDesc::temp("blurTmp");
    let present = RgTexDesc::imported("present");

    rg.add_pass("scene", RgPassType::CustomShader, |builder| {
        builder.write_tex(&scene_color);
        DemoPass::Scene { layers: 3 }
    });

    // ping-pong: sceneColor -> blurTmp -> sceneColor
    for (src, dst, direction) in
        [(&scene_color, &blur_tmp, BlurDirection::Horizontal), (&blur_tmp, &scene_color, BlurDirection::Vertical)]
    {
        rg.add_pass(format!("blur_{:?}", direction).to_lowercase(), RgPassType::CustomShader, |builder| {
            builder.read_tex(src);
            builder.write_tex(dst);
            DemoPass::Blur { direction, radius: blur_radius }
        });
    }

    let composite = rg.add_pass("composite", RgPassType::CustomShader, |builder| {
        let blurred = builder.read_tex(&scene_color);
        builder.write_tex(&RgTexDesc::temp("composited"));
        let inputs = builder.tex_node(blurred).map(|tex| tex.key().to_string()).into_iter().collect();
        DemoPass::Composite { inputs }
    });

    // 背景图来自 graph 外部，用虚拟写入作为它的版本 0
    rg.after_build(composite, |builder, pass| {
        let tex = builder.create_tex_node(&background, false);
        builder.mark_virtual_write(tex);
        builder.read(tex);
        match pass {
            DemoPass::Composite { inputs } => {
                inputs.push(background.key.clone());
                true
            }
            _ => false,
        }
    });

    rg.add_pass("present", RgPassType::Copy, |builder| {
        builder.read_tex(&RgTexDesc::temp("composited"));
        builder.write_tex(&present);
        DemoPass::Present
    });
}

fn record_frame(rg: &RenderGraph<DemoPass>, schedule: &RgSchedule) {
    for &pass in schedule.order() {
        let (Some(node), Some(data)) = (rg.get_pass_node(pass), rg.get_pass(pass)) else {
            continue;
        };
        log::info!("record {} {:?}, release after: {:?}", node.name(), data, schedule.release_keys(rg, pass));
    }
}

fn main() -> Result<()> {
    init_log();

    let config_path = WallscenePath::config_path("render-graph.toml");
    let mut config = if config_path.exists() {
        RenderGraphConfig::from_file(&config_path)?
    } else {
        log::info!("{:?} not found, using default config", config_path);
        RenderGraphConfig::default()
    };
    config.debug.dump_dir = WallscenePath::resolve(&config.debug.dump_dir);

    let mut dump_trigger = RgDumpTrigger::new(config.debug.clone());
    let mut rg = RenderGraph::<DemoPass>::new();

    // 模拟两次场景重新配置
    for blur_radius in [4.0, 8.0] {
        rg.clear();
        build_frame(&mut rg, blur_radius);

        let schedule = rg.compile()?;
        schedule.print_schedule(&rg);
        record_frame(&rg, &schedule);

        if let Some(path) = dump_trigger.record_build(&rg)? {
            log::info!("render graph dumped: {:?}", path);
        }
    }

    Ok(())
}
