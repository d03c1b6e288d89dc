//! # Demo 模块
//!
//! 无窗口演示：三个纯色场景依次切换，并在标题场景上循环播放一个 logo 效果。
//!
//! ```text
//! title ──Advance──► stage ──Advance──► credits ──Advance──► title
//! ```
//!
//! 过渡优先使用配置文件中的同名效果定义（`title_in` / `stage_in` /
//! `stage_out` / `credits_in`），没有定义时使用内置预设。

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use stage_runtime::{
    Color, Effect, EffectError, EffectTransition, Event, GuiBinding, Offset, Scene, SceneAction,
    SceneBindings, SceneManager, SceneRef, Section, Size, StageConfig, StageResult, Surface,
    TransitionRef, Vec2, VisibilityFlag,
};
use tracing::{debug, info};

use crate::raster::RasterSurface;

/// 演示用的输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoInput {
    /// 前进到下一个场景
    Advance,
}

type DemoTransition = TransitionRef<RasterSurface, DemoInput>;

/// 循环播放的 logo 与它的说明文字
struct Logo {
    effect: Effect<RasterSurface>,
    image: RasterSurface,
    position: Vec2,
    caption: Rc<RefCell<VisibilityFlag>>,
}

impl Logo {
    const SIZE: u32 = 48;

    fn new(viewport: Size) -> Result<Self, EffectError> {
        let side = Self::SIZE as f32;
        let effect = Effect::new(
            vec![
                Section::new(0.4)
                    .with_start_transparency(0.0)
                    .with_end_transparency(255.0),
                Section::new(1.2)
                    .with_end_angle(360.0)
                    .with_end_size(Vec2::new(side * 1.5, side * 1.5)),
                Section::new(0.4).with_end_size(Vec2::new(side, side)),
            ],
            Some("logo".to_string()),
        )?;
        let position = (viewport.to_vec2() - Vec2::new(side, side)) / 2.0;

        let mut logo = Self {
            effect,
            image: RasterSurface::filled(
                Size::new(Self::SIZE, Self::SIZE),
                Color::rgb(240, 200, 60),
            ),
            position,
            caption: VisibilityFlag::shared(true),
        };
        logo.restart();
        Ok(logo)
    }

    fn restart(&mut self) {
        let side = Self::SIZE as f32;
        self.effect.start(
            self.image.clone(),
            self.position,
            Vec2::new(side, side),
            Some(self.caption.clone()),
        );
    }

    fn update(&mut self, dt: f32) {
        self.effect.update(dt);
        for notification in self.effect.notifier().drain() {
            debug!(?notification, "logo 播放完毕");
        }
        if !self.effect.is_running() {
            self.restart();
        }
    }

    fn draw(&self, surface: &mut RasterSurface) {
        if self.caption.borrow().visible() {
            let size = surface.size();
            let bar = RasterSurface::filled(Size::new(size.width / 2, 8), Color::rgb(230, 230, 230));
            let offset = Offset::new((size.width / 4) as i32, (size.height * 3 / 4) as i32);
            surface.blit(&bar, offset);
        }
        self.effect.draw(surface);
    }
}

/// 纯色场景
pub struct ColorScene {
    name: &'static str,
    color: Color,
    next: &'static str,
    bindings: SceneBindings<RasterSurface, DemoInput>,
    logo: Option<Logo>,
}

impl ColorScene {
    pub fn new(name: &'static str, color: Color, next: &'static str) -> Self {
        Self {
            name,
            color,
            next,
            bindings: SceneBindings::new(),
            logo: None,
        }
    }

    fn with_logo(mut self, logo: Logo) -> Self {
        self.logo = Some(logo);
        self
    }
}

impl Scene<RasterSurface, DemoInput> for ColorScene {
    fn handle_event(&mut self, event: &Event<DemoInput>) -> SceneAction {
        match event {
            Event::Input(DemoInput::Advance) => {
                debug!(scene = self.name, next = self.next, "前进");
                SceneAction::change_to(self.next)
            }
            Event::Notification(_) => SceneAction::None,
        }
    }

    fn update(&mut self, dt: f32) {
        if let Some(logo) = &mut self.logo {
            logo.update(dt);
        }
    }

    fn draw(&mut self, surface: &mut RasterSurface) {
        surface.fill(self.color);
        if let Some(logo) = &self.logo {
            logo.draw(surface);
        }
    }

    fn enter_transition(&self) -> Option<DemoTransition> {
        self.bindings.enter_transition()
    }

    fn exit_transition(&self) -> Option<DemoTransition> {
        self.bindings.exit_transition()
    }

    fn update_during_transition(&self) -> bool {
        self.bindings.update_during_transition()
    }
}

/// 配置中有同名定义时使用定义，否则使用预设
fn transition_or(
    config: &StageConfig,
    name: &str,
    preset: impl FnOnce() -> Result<EffectTransition<RasterSurface, DemoInput>, EffectError>,
) -> Result<DemoTransition, EffectError> {
    let transition = match config.effect(name) {
        Some(definition) => {
            debug!(effect = name, "使用配置中的过渡定义");
            EffectTransition::from_definition(definition)?
        }
        None => preset()?,
    };
    Ok(Rc::new(RefCell::new(transition)))
}

/// 构建演示用的场景管理器
pub fn build_manager(config: &StageConfig) -> StageResult<SceneManager<RasterSurface, DemoInput>> {
    let viewport = config.manager.viewport;

    let mut title =
        ColorScene::new("title", Color::rgb(20, 24, 60), "stage").with_logo(Logo::new(viewport)?);
    title.bindings.set_enter_transition(transition_or(config, "title_in", || {
        EffectTransition::fade(0.0, 255.0, 0.5)
    })?);
    title.bindings.set_update_during_transition(true);

    let mut stage = ColorScene::new("stage", Color::rgb(30, 90, 50), "credits");
    stage.bindings.set_enter_transition(transition_or(config, "stage_in", || {
        EffectTransition::slide(Vec2::new(viewport.width as f32, 0.0), 0.6)
    })?);
    stage.bindings.set_exit_transition(transition_or(config, "stage_out", || {
        EffectTransition::fade(255.0, 0.0, 0.4)
    })?);

    let mut credits = ColorScene::new("credits", Color::rgb(90, 20, 30), "title");
    credits.bindings.set_enter_transition(transition_or(config, "credits_in", || {
        EffectTransition::new(vec![
            Section::new(0.6)
                .with_start_size(Vec2::zero())
                .with_end_size(viewport.to_vec2())
                .with_start_transparency(0.0)
                .with_end_transparency(255.0),
        ])
    })?);

    let title: SceneRef<RasterSurface, DemoInput> = Rc::new(RefCell::new(title));
    let stage: SceneRef<RasterSurface, DemoInput> = Rc::new(RefCell::new(stage));
    let credits: SceneRef<RasterSurface, DemoInput> = Rc::new(RefCell::new(credits));

    let mut manager = SceneManager::new(config.manager.clone());
    manager.register_scenes(
        [("title", title), ("stage", stage), ("credits", credits)],
        Some("title"),
    )?;
    Ok(manager)
}

/// 演示运行结果
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub frames: u32,
    pub scene_changes: u32,
    pub final_scene: Option<String>,
    pub saved_frames: u32,
}

/// 固定步长的无窗口主循环
pub struct DemoRunner {
    manager: SceneManager<RasterSurface, DemoInput>,
    screen: RasterSurface,
    dt: f32,
    advance_every: u32,
}

impl DemoRunner {
    /// 每秒发送一次 `Advance`
    pub fn new(config: &StageConfig, fps: f32) -> StageResult<Self> {
        let manager = build_manager(config)?;
        Ok(Self {
            screen: RasterSurface::new_transparent(config.manager.viewport),
            manager,
            dt: 1.0 / fps,
            advance_every: (fps.round() as u32).max(1),
        })
    }

    pub fn manager(&self) -> &SceneManager<RasterSurface, DemoInput> {
        &self.manager
    }

    pub fn screen(&self) -> &RasterSurface {
        &self.screen
    }

    /// 运行 `frames` 帧，提供 `output_dir` 时把每一帧导出为 PNG
    pub fn run(&mut self, frames: u32, output_dir: Option<&Path>) -> anyhow::Result<DemoReport> {
        if let Some(dir) = output_dir {
            fs::create_dir_all(dir).with_context(|| format!("无法创建输出目录: {:?}", dir))?;
        }

        let mut scene_changes = 0;
        let mut saved_frames = 0;
        for frame in 0..frames {
            if frame > 0 && frame % self.advance_every == 0 {
                let before = self.manager.current_key().map(str::to_string);
                self.manager.handle_event(&Event::Input(DemoInput::Advance))?;
                if self.manager.current_key() != before.as_deref() {
                    scene_changes += 1;
                    info!(frame, scene = ?self.manager.current_key(), "场景已切换");
                }
            }

            self.manager.dispatch_notifications()?;
            self.manager.update(self.dt);
            self.manager.draw(&mut self.screen);

            if let Some(dir) = output_dir {
                let path = dir.join(format!("frame_{frame:04}.png"));
                self.screen
                    .save_png(&path)
                    .with_context(|| format!("帧导出失败: {:?}", path))?;
                saved_frames += 1;
            }
        }

        Ok(DemoReport {
            frames,
            scene_changes,
            final_scene: self.manager.current_key().map(str::to_string),
            saved_frames,
        })
    }
}
