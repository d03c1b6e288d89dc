//! # Stage Runtime
//!
//! 二维动画效果与场景切换的核心库。
//!
//! ## 架构概述
//!
//! `stage-runtime` 是纯逻辑核心，不做 IO，也不绑定具体渲染后端。
//! 渲染能力通过 [`Surface`] trait 由宿主层提供，
//! 完成通知通过 [`Notifier`] 队列交还给宿主的主循环：
//!
//! ```text
//! Host                              Runtime
//!   │                                  │
//!   │──── Event::Input / dt ─────────►│ SceneManager
//!   │                                  │   ├─ Scene
//!   │                                  │   └─ Transition ─ Effect
//!   │◄─── Notifier (TransitionEnded) ──│
//!   │──── Event::Notification ───────►│
//! ```
//!
//! ## 核心类型
//!
//! - [`Effect`] / [`Section`]：分段动画引擎
//! - [`Scene`] / [`Transition`]：由应用实现的能力接口
//! - [`SceneManager`]：场景切换协调器
//! - [`StageConfig`]：可从 JSON 加载的配置
//!
//! ## 模块结构
//!
//! - [`math`]：二维向量
//! - [`surface`]：渲染能力接口
//! - [`event`]：通知、事件与通知队列
//! - [`effect`]：效果引擎
//! - [`scene`]：场景、过渡与管理器
//! - [`config`]：配置
//! - [`error`]：错误类型定义

pub mod config;
pub mod effect;
pub mod error;
pub mod event;
pub mod math;
pub mod scene;
pub mod surface;

#[cfg(test)]
mod test_support;

// 重导出核心类型
pub use config::{EffectDefinition, SceneManagerConfig, StageConfig};
pub use effect::{Effect, EffectId, GuiBinding, GuiRef, Section, SectionHook, VisibilityFlag};
pub use error::{ConfigError, EffectError, SceneError, StageError, StageResult};
pub use event::{Event, Notification, Notifier};
pub use math::Vec2;
pub use scene::{
    EffectTransition, Scene, SceneAction, SceneBindings, SceneManager, SceneRef, Transition,
    TransitionId, TransitionRef,
};
pub use surface::{Color, Offset, Size, Surface};
