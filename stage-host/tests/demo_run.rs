//! # 演示运行集成测试
//!
//! 从配置文件构建演示并无窗口运行，不依赖窗口或 GPU。

use stage_host::{DemoInput, DemoRunner, RasterSurface};
use stage_runtime::{Color, Event, StageConfig, Surface};

const CONFIG: &str = r#"{
    "manager": { "viewport": { "width": 48, "height": 32 } },
    "effects": {
        "stage_in": {
            "sections": [ { "duration": 0.2, "start_transparency": 0, "end_transparency": 255 } ]
        }
    }
}"#;

fn load_config() -> StageConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stage.json");
    std::fs::write(&path, CONFIG).unwrap();
    let config = StageConfig::from_file(&path).unwrap();
    config.validate().unwrap();
    config
}

/// 完整跑一轮：title → stage → credits → title
#[test]
fn test_full_cycle() {
    let mut runner = DemoRunner::new(&load_config(), 10.0).unwrap();
    let report = runner.run(35, None).unwrap();

    assert_eq!(report.frames, 35);
    assert_eq!(report.scene_changes, 3);
    assert_eq!(report.final_scene.as_deref(), Some("title"));
    assert_eq!(runner.screen().size().width, 48);
}

/// 过渡结束后画面为 stage 的纯色
#[test]
fn test_stage_frame_after_transition() {
    let mut manager = stage_host::build_manager(&load_config()).unwrap();
    manager.handle_event(&Event::Input(DemoInput::Advance)).unwrap();

    let mut screen = RasterSurface::new_transparent(manager.config().viewport);
    for _ in 0..5 {
        manager.dispatch_notifications().unwrap();
        manager.update(0.1);
        manager.draw(&mut screen);
    }
    manager.dispatch_notifications().unwrap();
    assert!(!manager.is_transitioning());

    manager.draw(&mut screen);
    assert_eq!(screen.pixel(0, 0), Some(Color::rgb(30, 90, 50)));
}

#[test]
fn test_missing_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = StageConfig::load(dir.path().join("absent.json"));
    let runner = DemoRunner::new(&config, 60.0).unwrap();
    assert_eq!(runner.screen().size().width, 1280);
}
