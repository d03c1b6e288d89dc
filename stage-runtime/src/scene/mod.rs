//! # Scene 模块
//!
//! 场景与场景切换。
//!
//! ## 核心概念
//!
//! - `Scene`: 应用实现的场景（事件、更新、绘制）
//! - `Transition`: 场景进入/退出时播放的过渡，结束时发出 `TransitionEnded`
//! - `EffectTransition`: 基于 `Effect` 的过渡实现
//! - `SceneManager`: 持有全部场景并协调切换

mod effect_transition;
mod manager;
#[allow(clippy::module_inception)]
mod scene;
mod transition;

pub use effect_transition::EffectTransition;
pub use manager::SceneManager;
pub use scene::{Scene, SceneAction, SceneBindings, SceneRef};
pub use transition::{Transition, TransitionId, TransitionRef};
