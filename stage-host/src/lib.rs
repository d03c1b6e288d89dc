//! # Stage Host
//!
//! `stage-runtime` 的无窗口宿主层实现，使用 `image` 作为 CPU 光栅化后端。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 实现 `Surface`（见 [`raster`]）
//! - 构建演示场景并驱动固定步长主循环（见 [`demo`]）
//! - 帧导出
//!
//! Host 层不包含动画逻辑，只负责把输入和时间送入 `SceneManager`。

pub mod demo;
pub mod raster;

pub use demo::{ColorScene, DemoInput, DemoReport, DemoRunner, build_manager};
pub use raster::RasterSurface;
