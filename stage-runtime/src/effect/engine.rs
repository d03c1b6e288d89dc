//! # Engine 模块
//!
//! 效果引擎：按顺序播放分段，计算插值后的变换并绘制图像。
//!
//! ## 状态机
//!
//! ```text
//! Idle ──start──► Running(0) ──► Running(1) ──► … ──► Idle
//!                    │                                  ▲
//!                    └────────── terminate() ───────────┘
//! ```
//!
//! 每个分段激活时根据起止值计算变化速率，`update` 按速率累加。
//! 单帧的 `dt` 超过当前分段剩余时间时，剩余部分会继续用于后续分段，
//! 因此一次 `update` 可以跨越多个短分段。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use super::binding::{GuiRef, GuiState};
use super::section::Section;
use crate::error::EffectError;
use crate::event::{Notification, Notifier};
use crate::math::Vec2;
use crate::surface::{Offset, Size, Surface};

static NEXT_EFFECT_ID: AtomicU64 = AtomicU64::new(1);

/// 默认透明度（完全不透明）
const OPAQUE: f32 = 255.0;

/// 效果 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(pub u64);

impl EffectId {
    /// 创建新的效果 ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    fn next() -> Self {
        Self(NEXT_EFFECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EffectId({})", self.0)
    }
}

/// 当前分段的变化速率（每秒）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Rates {
    position: Option<Vec2>,
    size: Option<Vec2>,
    angle: Option<f32>,
    transparency: Option<f32>,
}

/// 把角度归一化到 [0, 360)
fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // 极小的负数取模后可能恰好得到 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// 透明度转换为 8 位 alpha 通道（超出范围的值被截断到 0 - 255）
fn alpha_channel(transparency: f32) -> u8 {
    if transparency.is_nan() {
        return 0;
    }
    transparency.clamp(0.0, OPAQUE) as u8
}

/// 分段起止值解析：有起始值则覆盖当前值，有结束值则给出速率
fn resolve_scalar(current: &mut f32, start: Option<f32>, end: Option<f32>, duration: f32) -> Option<f32> {
    if let Some(start) = start {
        *current = start;
    }
    end.map(|end| (end - *current) / duration)
}

fn resolve_vec2(current: &mut Vec2, start: Option<Vec2>, end: Option<Vec2>, duration: f32) -> Option<Vec2> {
    if let Some(start) = start {
        *current = start;
    }
    end.map(|end| (end - *current) / duration)
}

/// 效果
///
/// 以 `start` 时传入的位置和尺寸为参照，按分段播放位置、尺寸、角度和透明度的变化。
/// 播放完毕或被终止时向 [`Notifier`] 发出 [`Notification::EffectEnded`]。
pub struct Effect<S> {
    id: EffectId,
    object_id: Option<String>,
    sections: Vec<Section>,
    notifier: Notifier,

    section_index: usize,
    running: bool,
    /// 当前分段剩余时间
    timer: f32,

    /// 相对原始位置的偏移
    position: Vec2,
    size: Vec2,
    angle: f32,
    transparency: f32,
    rates: Rates,

    image: Option<S>,
    original_position: Vec2,
    original_size: Vec2,
    gui: Option<GuiState>,
}

impl<S: Surface> Effect<S> {
    /// 创建效果
    ///
    /// 分段列表为空或任一分段时长不大于 0 时返回配置错误。
    pub fn new(sections: Vec<Section>, object_id: Option<String>) -> Result<Self, EffectError> {
        if sections.is_empty() {
            return Err(EffectError::NoSections { object_id });
        }
        if let Some((index, section)) = sections
            .iter()
            .enumerate()
            .find(|(_, section)| !section.has_valid_duration())
        {
            return Err(EffectError::InvalidDuration {
                index,
                duration: section.duration,
                object_id,
            });
        }

        Ok(Self {
            id: EffectId::next(),
            object_id,
            sections,
            notifier: Notifier::new(),
            section_index: 0,
            running: false,
            timer: 0.0,
            position: Vec2::zero(),
            size: Vec2::zero(),
            angle: 0.0,
            transparency: OPAQUE,
            rates: Rates::default(),
            image: None,
            original_position: Vec2::zero(),
            original_size: Vec2::zero(),
            gui: None,
        })
    }

    /// 使用共享的通知队列
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// 开始播放
    ///
    /// # 参数
    /// - `image`: 要绘制的图像
    /// - `position`: 图像原始位置
    /// - `size`: 图像原始尺寸
    /// - `gui`: 可选的 GUI 绑定，运行期间隐藏
    ///
    /// 正在运行时调用会覆盖当前状态重新开始（不发出结束通知）。
    pub fn start(&mut self, image: S, position: Vec2, size: Vec2, gui: Option<GuiRef>) {
        if self.running {
            debug!(effect = %self.id, "效果运行中被重新启动");
            if let Some(gui) = &self.gui {
                gui.restore();
            }
        }
        self.reset();

        self.running = true;
        self.image = Some(image);
        self.original_position = position;
        self.original_size = size;
        self.size = size;
        self.gui = gui.map(GuiState::capture);

        debug!(effect = %self.id, object_id = ?self.object_id, sections = self.sections.len(), "效果开始");
        self.activate_section();
    }

    /// 替换图像，不影响时间轴（用于动画帧）
    pub fn set_image(&mut self, image: S) {
        self.image = Some(image);
    }

    /// 当前图像
    pub fn image(&self) -> Option<&S> {
        self.image.as_ref()
    }

    /// 当前图像的可变引用
    pub fn image_mut(&mut self) -> Option<&mut S> {
        self.image.as_mut()
    }

    /// 终止效果并重置所有状态
    ///
    /// 发出结束通知，但不会触发分段的 `on_end` 回调。
    pub fn terminate(&mut self) {
        if !self.running {
            return;
        }
        if let Some(gui) = &self.gui {
            gui.restore();
        }
        self.reset();
        debug!(effect = %self.id, "效果被终止");
        self.post_end();
    }

    /// 推进时间
    pub fn update(&mut self, dt: f32) {
        if !self.running {
            return;
        }

        let mut remaining = dt;
        loop {
            self.timer -= remaining;
            let section_time = if self.timer < 0.0 {
                self.timer + remaining
            } else {
                remaining
            };
            self.apply_rates(section_time);

            if self.timer > 0.0 {
                return;
            }

            // 当前分段结束
            self.sections[self.section_index].fire_end();
            if self.section_index + 1 >= self.sections.len() {
                self.finish();
                return;
            }
            self.section_index += 1;
            self.activate_section();
            remaining -= section_time;
        }
    }

    /// 绘制到目标表面
    ///
    /// 图像先在原始尺寸的透明画布上绘制，再缩放、旋转。
    /// 旋转后包围盒变大时，按旋转原点与原始尺寸的比例修正位置，
    /// 使旋转原点在视觉上保持不动。
    pub fn draw(&self, surface: &mut S) {
        if !self.running {
            return;
        }
        let Some(image) = &self.image else {
            return;
        };

        let mut canvas = S::new_transparent(Size::from_vec2(self.original_size));
        canvas.blit(image, Offset::default());
        let canvas = canvas.scaled(Size::from_vec2(self.size));
        let mut canvas = canvas.rotated(normalize_angle(self.angle));

        let rotated_size = canvas.size().to_vec2();
        let correction = if rotated_size != self.size {
            let origin = self
                .current_section()
                .rotation_origin
                .unwrap_or(self.size / 2.0);
            let ratio = origin.div_components(self.original_size);
            (rotated_size - self.size).mul_components(ratio).round()
        } else {
            Vec2::zero()
        };

        canvas.set_alpha(alpha_channel(self.transparency));
        let target = self.original_position + (self.position - correction);
        trace!(effect = %self.id, x = target.x, y = target.y, "绘制效果");
        surface.blit(&canvas, Offset::from_vec2(target));
    }

    /// 进入当前分段：重置计时器、计算速率、触发 `on_start`
    fn activate_section(&mut self) {
        let section = &self.sections[self.section_index];
        let duration = section.duration;
        self.timer = duration;

        self.rates = Rates {
            position: resolve_vec2(
                &mut self.position,
                section.start_position,
                section.end_position,
                duration,
            ),
            size: resolve_vec2(&mut self.size, section.start_size, section.end_size, duration),
            angle: resolve_scalar(&mut self.angle, section.start_angle, section.end_angle, duration),
            transparency: resolve_scalar(
                &mut self.transparency,
                section.start_transparency,
                section.end_transparency,
                duration,
            ),
        };
        self.angle = normalize_angle(self.angle);

        trace!(effect = %self.id, index = self.section_index, duration, "进入分段");
        section.fire_start();
    }

    fn apply_rates(&mut self, time: f32) {
        if let Some(rate) = self.rates.position {
            self.position += rate * time;
        }
        if let Some(rate) = self.rates.size {
            self.size += rate * time;
        }
        if let Some(rate) = self.rates.angle {
            self.angle = normalize_angle(self.angle + rate * time);
        }
        if let Some(rate) = self.rates.transparency {
            self.transparency += rate * time;
        }
    }

    /// 全部分段播放完毕：保留最终值，停留在最后一个分段
    fn finish(&mut self) {
        self.running = false;
        self.timer = 0.0;
        debug!(effect = %self.id, "效果播放完毕");
        self.post_end();
        if let Some(gui) = self.gui.take() {
            gui.restore();
        }
    }

    /// 恢复到构造时的默认状态
    fn reset(&mut self) {
        self.section_index = 0;
        self.running = false;
        self.timer = 0.0;
        self.position = Vec2::zero();
        self.size = Vec2::zero();
        self.angle = 0.0;
        self.transparency = OPAQUE;
        self.rates = Rates::default();
        self.image = None;
        self.original_position = Vec2::zero();
        self.original_size = Vec2::zero();
        self.gui = None;
    }

    fn post_end(&self) {
        self.notifier.post(Notification::EffectEnded {
            effect: self.id,
            object_id: self.object_id.clone(),
        });
    }

    // ========== 查询 ==========

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// 当前分段（结束后停留在最后一个分段）
    pub fn current_section(&self) -> &Section {
        &self.sections[self.section_index]
    }

    pub fn section_index(&self) -> usize {
        self.section_index
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 当前分段剩余时间
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// 相对原始位置的偏移
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// 当前角度，范围 [0, 360)
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// 当前透明度（未截断）
    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    pub fn original_position(&self) -> Vec2 {
        self.original_position
    }

    pub fn original_size(&self) -> Vec2 {
        self.original_size
    }
}

impl<S> fmt::Debug for Effect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id)
            .field("object_id", &self.object_id)
            .field("sections", &self.sections.len())
            .field("section_index", &self.section_index)
            .field("running", &self.running)
            .field("timer", &self.timer)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("angle", &self.angle)
            .field("transparency", &self.transparency)
            .finish()
    }
}
