//! 单元测试用的记录型表面。

use crate::surface::{Color, Offset, Size, Surface};

/// 不做光栅化，只记录操作的表面
#[derive(Debug, Clone)]
pub(crate) struct MockSurface {
    pub label: String,
    pub size: Size,
    pub alpha: u8,
    /// 合成进来的内容
    pub content: Vec<String>,
    /// 在此表面上执行过的操作
    pub ops: Vec<String>,
}

impl MockSurface {
    pub fn labeled(label: &str, size: Size) -> Self {
        Self {
            label: label.to_string(),
            size,
            alpha: 255,
            content: Vec::new(),
            ops: Vec::new(),
        }
    }

    /// 场景在表面上留下绘制标记
    pub fn mark(&mut self, what: &str) {
        self.content.push(what.to_string());
        self.ops.push(format!("draw {what}"));
    }

    fn describe(&self) -> String {
        if self.content.is_empty() {
            self.label.clone()
        } else {
            format!("{}({})", self.label, self.content.join(","))
        }
    }
}

impl Surface for MockSurface {
    fn new_transparent(size: Size) -> Self {
        Self::labeled("canvas", size)
    }

    fn size(&self) -> Size {
        self.size
    }

    fn fill(&mut self, color: Color) {
        self.content.clear();
        self.ops
            .push(format!("fill {},{},{},{}", color.r, color.g, color.b, color.a));
    }

    fn blit(&mut self, source: &Self, offset: Offset) {
        let described = source.describe();
        self.ops.push(format!(
            "blit {}@{}x{} alpha={} at ({}, {})",
            described, source.size.width, source.size.height, source.alpha, offset.x, offset.y
        ));
        self.content.push(described);
    }

    fn scaled(&self, size: Size) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    fn rotated(&self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let w = self.size.width as f32;
        let h = self.size.height as f32;
        let size = Size::new(
            (w * cos.abs() + h * sin.abs()).round() as u32,
            (w * sin.abs() + h * cos.abs()).round() as u32,
        );
        Self { size, ..self.clone() }
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }
}
