//! # Stage Host
//!
//! 无窗口宿主：用 CPU 画布驱动 `stage-runtime` 的场景切换演示，可导出每一帧。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p stage-host
//! cargo run -p stage-host -- --frames 300 --fps 30
//! cargo run -p stage-host -- --config stage.json --output-dir frames --verbose
//! ```

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use stage_host::DemoRunner;
use stage_runtime::StageConfig;
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(name = "stage-host")]
#[command(about = "场景切换演示 - 无窗口运行，可导出 PNG 帧")]
#[command(version)]
struct Cli {
    /// 配置文件（默认：stage.json，不存在时使用默认配置）
    #[arg(short, long, default_value = "stage.json")]
    config: PathBuf,

    /// 运行帧数
    #[arg(short, long, default_value_t = 180)]
    frames: u32,

    /// 固定帧率，同时决定切换间隔（每秒一次）
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// 帧导出目录
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    if !cli.fps.is_finite() || cli.fps <= 0.0 {
        bail!("帧率必须大于 0: {}", cli.fps);
    }

    let config = StageConfig::load(&cli.config);
    config.validate().context("配置无效")?;
    info!(
        width = config.manager.viewport.width,
        height = config.manager.viewport.height,
        effects = config.effects.len(),
        "配置就绪"
    );

    let mut runner = DemoRunner::new(&config, cli.fps).context("演示场景构建失败")?;
    let report = runner.run(cli.frames, cli.output_dir.as_deref())?;

    info!(
        frames = report.frames,
        scene_changes = report.scene_changes,
        final_scene = ?report.final_scene,
        saved_frames = report.saved_frames,
        "演示结束"
    );
    Ok(())
}
