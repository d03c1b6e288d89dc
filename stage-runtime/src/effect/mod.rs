//! # Effect 模块
//!
//! 基于时间的效果引擎。
//!
//! ## 核心概念
//!
//! - `Section`: 一个时间分段，描述位置、尺寸、角度、透明度的起止值
//! - `Effect`: 按顺序播放分段并绘制变换后的图像
//! - `GuiBinding`: 效果运行期间被隐藏的 GUI 元素
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut effect = Effect::new(
//!     vec![
//!         Section::new(0.3).with_start_transparency(0.0).with_end_transparency(255.0),
//!         Section::new(1.0).with_end_angle(360.0),
//!     ],
//!     Some("logo".to_string()),
//! )?;
//!
//! effect.start(logo_image, Vec2::new(100.0, 80.0), Vec2::new(64.0, 64.0), None);
//!
//! // 每帧
//! effect.update(dt);
//! effect.draw(&mut screen);
//! ```

mod binding;
mod engine;
mod section;

pub use binding::{GuiBinding, GuiRef, VisibilityFlag};
pub use engine::{Effect, EffectId};
pub use section::{Section, SectionHook};
