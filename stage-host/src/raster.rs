//! # Raster 模块
//!
//! 基于 `image::RgbaImage` 的 CPU 画布，实现 `Surface`。
//!
//! - `blit` 做 source-over 合成，源像素 alpha 乘以表面整体 alpha
//! - `scaled` 使用双线性缩放
//! - `rotated` 逆时针旋转，最近邻采样，外接矩形随角度增大

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use stage_runtime::{Color, Offset, Size, Surface};

/// CPU 画布
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    alpha: u8,
}

impl RasterSurface {
    /// 创建填充指定颜色的画布
    pub fn filled(size: Size, color: Color) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(size.width, size.height, to_rgba(color)),
            alpha: 255,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.pixels.width() && y < self.pixels.height() {
            let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x, y);
            Some(Color::rgba(r, g, b, a))
        } else {
            None
        }
    }

    /// 表面整体 alpha
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// 导出为 PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.pixels.save(path)
    }
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

/// source-over 合成
fn blend(dst: Rgba<u8>, src: Rgba<u8>, surface_alpha: u8) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0 * (surface_alpha as f32 / 255.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

impl Surface for RasterSurface {
    fn new_transparent(size: Size) -> Self {
        Self::filled(size, Color::TRANSPARENT)
    }

    fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    fn fill(&mut self, color: Color) {
        let pixel = to_rgba(color);
        for p in self.pixels.pixels_mut() {
            *p = pixel;
        }
    }

    fn blit(&mut self, source: &Self, offset: Offset) {
        let (dw, dh) = (self.pixels.width() as i64, self.pixels.height() as i64);
        for (sx, sy, src) in source.pixels.enumerate_pixels() {
            let x = sx as i64 + offset.x as i64;
            let y = sy as i64 + offset.y as i64;
            if x < 0 || y < 0 || x >= dw || y >= dh {
                continue;
            }
            let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
            *dst = blend(*dst, *src, source.alpha);
        }
    }

    fn scaled(&self, size: Size) -> Self {
        if size == self.size() {
            return self.clone();
        }
        let empty = |s: Size| s.width == 0 || s.height == 0;
        let pixels = if empty(size) || empty(self.size()) {
            RgbaImage::new(size.width, size.height)
        } else {
            imageops::resize(&self.pixels, size.width, size.height, FilterType::Triangle)
        };
        Self {
            pixels,
            alpha: self.alpha,
        }
    }

    fn rotated(&self, degrees: f32) -> Self {
        if degrees.rem_euclid(360.0) == 0.0 {
            return self.clone();
        }

        let (w, h) = (self.pixels.width() as f32, self.pixels.height() as f32);
        let (sin, cos) = degrees.to_radians().sin_cos();
        let new_w = (w * cos.abs() + h * sin.abs()).round() as u32;
        let new_h = (w * sin.abs() + h * cos.abs()).round() as u32;

        let mut pixels = RgbaImage::new(new_w, new_h);
        let (src_cx, src_cy) = (w / 2.0, h / 2.0);
        let (dst_cx, dst_cy) = (new_w as f32 / 2.0, new_h as f32 / 2.0);

        // 逆映射：目标像素中心反向旋转回源图（y 轴向下，逆时针为正）
        for (x, y, pixel) in pixels.enumerate_pixels_mut() {
            let dx = x as f32 + 0.5 - dst_cx;
            let dy = y as f32 + 0.5 - dst_cy;
            let sx = dx * cos - dy * sin + src_cx;
            let sy = dx * sin + dy * cos + src_cy;
            if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                *pixel = *self.pixels.get_pixel(sx as u32, sy as u32);
            }
        }

        Self {
            pixels,
            alpha: self.alpha,
        }
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }
}
