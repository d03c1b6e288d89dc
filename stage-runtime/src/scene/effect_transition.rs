//! # EffectTransition 模块
//!
//! 基于 `Effect` 的过渡实现：先把绑定场景绘制到视口大小的画布上，
//! 再由效果对画布做位移、缩放、旋转、淡入淡出。
//!
//! ## 预设
//!
//! - `fade`: 透明度从 `from` 变化到 `to`
//! - `slide`: 画面从 `offset` 滑回原位
//! - `from_definition`: 使用配置文件中定义的分段

use std::fmt;

use tracing::{debug, warn};

use super::scene::SceneRef;
use super::transition::{Transition, TransitionId};
use crate::config::EffectDefinition;
use crate::effect::{Effect, Section};
use crate::error::EffectError;
use crate::event::{Notification, Notifier};
use crate::math::Vec2;
use crate::surface::{Color, Size, Surface};

/// 基于效果的过渡
pub struct EffectTransition<S, E> {
    id: TransitionId,
    effect: Effect<S>,
    scene: Option<SceneRef<S, E>>,
    notifier: Option<Notifier>,
    /// 效果已播放完，但管理器尚未处理结束通知
    finished: bool,
}

impl<S: Surface, E> EffectTransition<S, E> {
    /// 使用任意分段创建过渡
    pub fn new(sections: Vec<Section>) -> Result<Self, EffectError> {
        Self::with_object_id(sections, None)
    }

    fn with_object_id(sections: Vec<Section>, object_id: Option<String>) -> Result<Self, EffectError> {
        Ok(Self {
            id: TransitionId::next(),
            effect: Effect::new(sections, object_id)?,
            scene: None,
            notifier: None,
            finished: false,
        })
    }

    /// 淡入淡出
    pub fn fade(from: f32, to: f32, duration: f32) -> Result<Self, EffectError> {
        Self::new(vec![
            Section::new(duration)
                .with_start_transparency(from)
                .with_end_transparency(to),
        ])
    }

    /// 从 `offset` 滑入到原位
    pub fn slide(offset: Vec2, duration: f32) -> Result<Self, EffectError> {
        Self::new(vec![
            Section::new(duration)
                .with_start_position(offset)
                .with_end_position(Vec2::zero()),
        ])
    }

    /// 使用配置中的效果定义
    pub fn from_definition(definition: &EffectDefinition) -> Result<Self, EffectError> {
        Self::with_object_id(definition.sections.clone(), definition.object_id.clone())
    }

    /// 内部效果（只读）
    pub fn effect(&self) -> &Effect<S> {
        &self.effect
    }

    /// 是否正在播放
    pub fn is_active(&self) -> bool {
        self.effect.is_running()
    }
}

impl<S: Surface, E> Transition<S, E> for EffectTransition<S, E> {
    fn id(&self) -> TransitionId {
        self.id
    }

    fn start(&mut self, scene: SceneRef<S, E>, viewport: Size, notifier: &Notifier) {
        // 每次启动换新 ID，上一轮遗留的结束通知不会误删本轮
        self.id = TransitionId::next();
        self.scene = Some(scene);
        self.notifier = Some(notifier.clone());
        self.finished = false;
        self.effect
            .start(S::new_transparent(viewport), Vec2::zero(), viewport.to_vec2(), None);
        debug!(transition = %self.id, width = viewport.width, height = viewport.height, "过渡开始");
    }

    fn update(&mut self, dt: f32) {
        if !self.effect.is_running() {
            return;
        }
        self.effect.update(dt);
        // 内部效果的通知只用于判断结束，不外传
        self.effect.notifier().drain();

        if !self.effect.is_running() {
            self.finished = true;
            debug!(transition = %self.id, "过渡完成");
            if let Some(notifier) = &self.notifier {
                notifier.post(Notification::TransitionEnded {
                    transition: self.id,
                });
            }
        }
    }

    fn draw(&mut self, surface: &mut S) {
        let Some(scene) = &self.scene else {
            return;
        };

        if self.effect.is_running() {
            if let Some(canvas) = self.effect.image_mut() {
                canvas.fill(Color::TRANSPARENT);
                match scene.try_borrow_mut() {
                    Ok(mut scene) => scene.draw(canvas),
                    Err(_) => warn!(transition = %self.id, "场景正被占用，跳过过渡画面"),
                }
            }
            self.effect.draw(surface);
        } else if self.finished {
            // 结束通知尚未被处理时，直接绘制场景，避免空白帧
            match scene.try_borrow_mut() {
                Ok(mut scene) => scene.draw(surface),
                Err(_) => warn!(transition = %self.id, "场景正被占用，跳过绘制"),
            }
        }
    }

    fn scene(&self) -> Option<SceneRef<S, E>> {
        self.scene.clone()
    }
}

impl<S, E> fmt::Debug for EffectTransition<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectTransition")
            .field("id", &self.id)
            .field("effect", &self.effect)
            .field("bound", &self.scene.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}
