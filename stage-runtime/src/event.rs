//! # Event 模块
//!
//! 通知与事件。
//!
//! 核心只发出两种通知：
//! - `EffectEnded`：效果播放完毕或被终止
//! - `TransitionEnded`：过渡完成
//!
//! 通知写入显式的 [`Notifier`] 队列，由宿主主循环取出后
//! 再作为 [`Event::Notification`] 送回 `SceneManager::handle_event`。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::effect::EffectId;
use crate::scene::TransitionId;

/// 核心发出的通知
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// 效果结束
    EffectEnded {
        effect: EffectId,
        object_id: Option<String>,
    },
    /// 过渡结束
    TransitionEnded { transition: TransitionId },
}

/// 送入场景管理器的事件
///
/// `E` 为宿主自己的输入事件类型。
#[derive(Debug, Clone, PartialEq)]
pub enum Event<E> {
    /// 核心通知
    Notification(Notification),
    /// 宿主输入
    Input(E),
}

impl<E> Event<E> {
    /// 如果是过渡结束通知，返回对应的过渡 ID
    pub fn transition_ended(&self) -> Option<TransitionId> {
        match self {
            Event::Notification(Notification::TransitionEnded { transition }) => Some(*transition),
            _ => None,
        }
    }
}

impl<E> From<Notification> for Event<E> {
    fn from(notification: Notification) -> Self {
        Event::Notification(notification)
    }
}

/// 通知队列
///
/// 可克隆的共享句柄，克隆出来的句柄写入同一个 FIFO 队列。
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    queue: Rc<RefCell<VecDeque<Notification>>>,
}

impl Notifier {
    /// 创建新的空队列
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条通知
    pub fn post(&self, notification: Notification) {
        self.queue.borrow_mut().push_back(notification);
    }

    /// 取出全部待处理通知（按发出顺序）
    pub fn drain(&self) -> Vec<Notification> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// 取出最早的一条通知
    pub fn pop(&self) -> Option<Notification> {
        self.queue.borrow_mut().pop_front()
    }

    /// 待处理通知数量
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// 是否没有待处理通知
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// 两个句柄是否指向同一个队列
    pub fn same_queue(&self, other: &Notifier) -> bool {
        Rc::ptr_eq(&self.queue, &other.queue)
    }
}
