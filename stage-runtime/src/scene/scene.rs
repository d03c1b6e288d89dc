//! # Scene 模块
//!
//! 由应用实现的场景接口。

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::transition::TransitionRef;
use crate::event::Event;

/// 共享的场景句柄
pub type SceneRef<S, E> = Rc<RefCell<dyn Scene<S, E>>>;

/// 场景处理事件后向管理器提出的请求
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SceneAction {
    /// 无操作
    #[default]
    None,
    /// 切换到指定场景
    ChangeScene(String),
}

impl SceneAction {
    pub fn change_to(key: impl Into<String>) -> Self {
        Self::ChangeScene(key.into())
    }
}

/// 场景
///
/// 必须实现 `handle_event` / `update` / `draw`。
/// 进入/退出过渡和“过渡期间是否继续更新”都是可选能力，默认没有。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Title {
///     bindings: SceneBindings<RasterSurface, Key>,
/// }
///
/// impl Scene<RasterSurface, Key> for Title {
///     fn handle_event(&mut self, event: &Event<Key>) -> SceneAction {
///         match event {
///             Event::Input(Key::Enter) => SceneAction::change_to("game"),
///             _ => SceneAction::None,
///         }
///     }
///
///     fn update(&mut self, _dt: f32) {}
///
///     fn draw(&mut self, surface: &mut RasterSurface) {
///         surface.fill(Color::rgb(20, 20, 40));
///     }
///
///     fn enter_transition(&self) -> Option<TransitionRef<RasterSurface, Key>> {
///         self.bindings.enter_transition()
///     }
/// }
/// ```
pub trait Scene<S, E> {
    /// 处理事件
    fn handle_event(&mut self, event: &Event<E>) -> SceneAction;

    /// 按时间增量更新
    fn update(&mut self, dt: f32);

    /// 绘制到表面
    fn draw(&mut self, surface: &mut S);

    /// 切换到本场景时播放的过渡
    fn enter_transition(&self) -> Option<TransitionRef<S, E>> {
        None
    }

    /// 离开本场景时播放的过渡
    fn exit_transition(&self) -> Option<TransitionRef<S, E>> {
        None
    }

    /// 过渡期间是否仍然更新本场景
    fn update_during_transition(&self) -> bool {
        false
    }
}

/// 场景可选能力的存储
///
/// 场景内嵌一个 `SceneBindings`，在 `Scene` 实现中转发即可。
pub struct SceneBindings<S, E> {
    enter: Option<TransitionRef<S, E>>,
    exit: Option<TransitionRef<S, E>>,
    update_during_transition: bool,
}

impl<S, E> SceneBindings<S, E> {
    pub fn new() -> Self {
        Self {
            enter: None,
            exit: None,
            update_during_transition: false,
        }
    }

    pub fn set_enter_transition(&mut self, transition: TransitionRef<S, E>) {
        self.enter = Some(transition);
    }

    pub fn set_exit_transition(&mut self, transition: TransitionRef<S, E>) {
        self.exit = Some(transition);
    }

    pub fn set_update_during_transition(&mut self, update: bool) {
        self.update_during_transition = update;
    }

    pub fn enter_transition(&self) -> Option<TransitionRef<S, E>> {
        self.enter.clone()
    }

    pub fn exit_transition(&self) -> Option<TransitionRef<S, E>> {
        self.exit.clone()
    }

    pub fn update_during_transition(&self) -> bool {
        self.update_during_transition
    }
}

impl<S, E> Default for SceneBindings<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> fmt::Debug for SceneBindings<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneBindings")
            .field("enter", &self.enter.is_some())
            .field("exit", &self.exit.is_some())
            .field("update_during_transition", &self.update_during_transition)
            .finish()
    }
}
