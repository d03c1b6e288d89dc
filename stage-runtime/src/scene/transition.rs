//! # Transition 模块
//!
//! 场景切换时由 `SceneManager` 驱动的过渡接口。

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::scene::SceneRef;
use crate::event::Notifier;
use crate::surface::Size;

static NEXT_TRANSITION_ID: AtomicU64 = AtomicU64::new(1);

/// 过渡 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionId(pub u64);

impl TransitionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// 分配一个新的唯一 ID
    pub fn next() -> Self {
        Self(NEXT_TRANSITION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitionId({})", self.0)
    }
}

/// 共享的过渡句柄
pub type TransitionRef<S, E> = Rc<RefCell<dyn Transition<S, E>>>;

/// 过渡
///
/// 过渡自己负责绘制绑定的场景。完成时必须向 `start` 收到的队列
/// 发出引用自身 ID 的 `Notification::TransitionEnded`。
pub trait Transition<S, E> {
    /// 本轮播放的 ID
    fn id(&self) -> TransitionId;

    /// 绑定场景并开始播放
    ///
    /// 重新启动时应分配新的 ID（`TransitionId::next`），
    /// 否则上一轮尚未处理的结束通知会把本轮从运行集合中移除。
    fn start(&mut self, scene: SceneRef<S, E>, viewport: Size, notifier: &Notifier);

    /// 按时间增量更新
    fn update(&mut self, dt: f32);

    /// 绘制（包含绑定场景的画面）
    fn draw(&mut self, surface: &mut S);

    /// 绑定的场景
    fn scene(&self) -> Option<SceneRef<S, E>>;
}
