//! # Section 模块
//!
//! 效果的单个时间分段。
//!
//! 所有值都以 `Effect::start` 时记录的原始状态为参照：
//! - 位置是相对原始位置的偏移
//! - 尺寸是绘制时的绝对像素尺寸
//! - 角度单位为度，`end_angle` 大于 `start_angle` 为逆时针（可超过 360）
//! - 透明度范围 0 - 255
//!
//! 省略的 `start_*` 在分段激活时继承效果当前值；省略的 `end_*` 表示该分段内不变化。

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// 分段生命周期回调
pub type SectionHook = Rc<dyn Fn()>;

/// 效果分段
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    /// 持续时长（秒），必须大于 0
    pub duration: f32,
    pub start_position: Option<Vec2>,
    pub end_position: Option<Vec2>,
    pub start_size: Option<Vec2>,
    pub end_size: Option<Vec2>,
    pub start_angle: Option<f32>,
    pub end_angle: Option<f32>,
    /// 旋转原点（相对图像左上角），默认为当前尺寸的中心
    pub rotation_origin: Option<Vec2>,
    pub start_transparency: Option<f32>,
    pub end_transparency: Option<f32>,
    #[serde(skip)]
    on_start: Option<SectionHook>,
    #[serde(skip)]
    on_end: Option<SectionHook>,
}

impl Section {
    /// 创建只有时长的分段
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn with_start_position(mut self, position: impl Into<Vec2>) -> Self {
        self.start_position = Some(position.into());
        self
    }

    pub fn with_end_position(mut self, position: impl Into<Vec2>) -> Self {
        self.end_position = Some(position.into());
        self
    }

    pub fn with_start_size(mut self, size: impl Into<Vec2>) -> Self {
        self.start_size = Some(size.into());
        self
    }

    pub fn with_end_size(mut self, size: impl Into<Vec2>) -> Self {
        self.end_size = Some(size.into());
        self
    }

    pub fn with_start_angle(mut self, angle: f32) -> Self {
        self.start_angle = Some(angle);
        self
    }

    pub fn with_end_angle(mut self, angle: f32) -> Self {
        self.end_angle = Some(angle);
        self
    }

    pub fn with_rotation_origin(mut self, origin: impl Into<Vec2>) -> Self {
        self.rotation_origin = Some(origin.into());
        self
    }

    pub fn with_start_transparency(mut self, transparency: f32) -> Self {
        self.start_transparency = Some(transparency);
        self
    }

    pub fn with_end_transparency(mut self, transparency: f32) -> Self {
        self.end_transparency = Some(transparency);
        self
    }

    /// 设置进入分段时的回调
    pub fn on_start(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_start = Some(Rc::new(hook));
        self
    }

    /// 设置离开分段时的回调（`Effect::terminate` 不会触发）
    pub fn on_end(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_end = Some(Rc::new(hook));
        self
    }

    /// 时长是否有效
    pub fn has_valid_duration(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }

    pub(crate) fn fire_start(&self) {
        if let Some(hook) = &self.on_start {
            hook();
        }
    }

    pub(crate) fn fire_end(&self) {
        if let Some(hook) = &self.on_end {
            hook();
        }
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("duration", &self.duration)
            .field("start_position", &self.start_position)
            .field("end_position", &self.end_position)
            .field("start_size", &self.start_size)
            .field("end_size", &self.end_size)
            .field("start_angle", &self.start_angle)
            .field("end_angle", &self.end_angle)
            .field("rotation_origin", &self.rotation_origin)
            .field("start_transparency", &self.start_transparency)
            .field("end_transparency", &self.end_transparency)
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_section_builder() {
        let section = Section::new(1.5)
            .with_end_position((10.0, 0.0))
            .with_start_angle(90.0)
            .with_end_transparency(0.0);

        assert_eq!(section.duration, 1.5);
        assert_eq!(section.end_position, Some(Vec2::new(10.0, 0.0)));
        assert_eq!(section.start_position, None);
        assert_eq!(section.start_angle, Some(90.0));
        assert_eq!(section.end_transparency, Some(0.0));
        assert!(section.has_valid_duration());
    }

    #[test]
    fn test_invalid_durations() {
        assert!(!Section::new(0.0).has_valid_duration());
        assert!(!Section::new(-1.0).has_valid_duration());
        assert!(!Section::new(f32::NAN).has_valid_duration());
        assert!(!Section::default().has_valid_duration());
    }

    #[test]
    fn test_hooks_shared_between_clones() {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let section = Section::new(1.0).on_end(move || counter.set(counter.get() + 1));
        let copy = section.clone();

        section.fire_end();
        copy.fire_end();
        section.fire_start();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_section_from_json() {
        let json = r#"{
            "duration": 0.5,
            "start_position": [-100.0, 0.0],
            "end_position": [0.0, 0.0],
            "end_transparency": 255.0
        }"#;
        let section: Section = serde_json::from_str(json).unwrap();
        assert_eq!(section.duration, 0.5);
        assert_eq!(section.start_position, Some(Vec2::new(-100.0, 0.0)));
        assert_eq!(section.start_transparency, None);
        assert_eq!(section.end_transparency, Some(255.0));
    }

    #[test]
    fn test_section_json_requires_duration() {
        let result: Result<Section, _> = serde_json::from_str(r#"{ "end_angle": 90.0 }"#);
        assert!(result.is_err());

        let result: Result<Section, _> =
            serde_json::from_str(r#"{ "duration": 1.0, "end_angel": 90.0 }"#);
        assert!(result.is_err());
    }
}
