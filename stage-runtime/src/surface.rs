//! # Surface 模块
//!
//! 渲染能力接口。核心只关心合成顺序，不定义像素格式；
//! 具体光栅化由宿主层实现（见 `stage-host` 的 `RasterSurface`）。

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// 整数像素尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// 创建新的尺寸
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 从浮点尺寸截断得到像素尺寸（负值视为 0）
    pub fn from_vec2(v: Vec2) -> Self {
        Self {
            width: v.x.max(0.0) as u32,
            height: v.y.max(0.0) as u32,
        }
    }

    /// 转为浮点向量
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// 整数像素偏移
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 从浮点坐标截断得到像素偏移
    pub fn from_vec2(v: Vec2) -> Self {
        Self {
            x: v.x as i32,
            y: v.y as i32,
        }
    }
}

/// RGBA 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }
}

/// 可绘制表面
///
/// 支持的操作：
/// - 创建透明画布
/// - 按偏移贴图（blit）
/// - 缩放、旋转（返回新表面）
/// - 整体透明度
pub trait Surface: Sized {
    /// 创建指定尺寸的全透明表面
    fn new_transparent(size: Size) -> Self;

    /// 当前尺寸
    fn size(&self) -> Size;

    /// 用纯色填充整个表面
    fn fill(&mut self, color: Color);

    /// 将 `source` 按其整体透明度合成到 `offset` 处
    fn blit(&mut self, source: &Self, offset: Offset);

    /// 缩放到指定尺寸
    fn scaled(&self, size: Size) -> Self;

    /// 逆时针旋转 `degrees` 度，包围盒随之扩大
    fn rotated(&self, degrees: f32) -> Self;

    /// 设置整体透明度（0 - 255）
    fn set_alpha(&mut self, alpha: u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_from_vec2_truncates() {
        assert_eq!(Size::from_vec2(Vec2::new(10.9, 3.2)), Size::new(10, 3));
        assert_eq!(Size::from_vec2(Vec2::new(-4.0, 2.0)), Size::new(0, 2));
        assert_eq!(Size::new(7, 8).to_vec2(), Vec2::new(7.0, 8.0));
    }

    #[test]
    fn test_offset_from_vec2() {
        assert_eq!(Offset::from_vec2(Vec2::new(3.7, -2.2)), Offset::new(3, -2));
    }
}
