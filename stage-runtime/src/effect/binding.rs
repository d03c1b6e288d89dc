//! # Binding 模块
//!
//! GUI 元素绑定。效果运行期间隐藏绑定的元素，结束后恢复其原有可见性。

use std::cell::RefCell;
use std::rc::Rc;

/// 可被效果切换可见性的 GUI 元素
pub trait GuiBinding {
    /// 当前是否可见
    fn visible(&self) -> bool;

    /// 设置可见性
    fn set_visible(&mut self, visible: bool);
}

/// 共享的 GUI 绑定句柄
pub type GuiRef = Rc<RefCell<dyn GuiBinding>>;

/// 效果运行期间记录的绑定状态
pub(crate) struct GuiState {
    binding: GuiRef,
    originally_visible: bool,
}

impl GuiState {
    /// 记录原有可见性，可见时隐藏
    pub(crate) fn capture(binding: GuiRef) -> Self {
        let originally_visible = binding.borrow().visible();
        if originally_visible {
            binding.borrow_mut().set_visible(false);
        }
        Self {
            binding,
            originally_visible,
        }
    }

    /// 原本可见时恢复显示
    pub(crate) fn restore(&self) {
        if self.originally_visible {
            self.binding.borrow_mut().set_visible(true);
        }
    }
}

/// 简单的可见性标记，适合没有自己 GUI 层的宿主
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityFlag {
    pub visible: bool,
}

impl VisibilityFlag {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    /// 包装为共享句柄
    pub fn shared(visible: bool) -> Rc<RefCell<VisibilityFlag>> {
        Rc::new(RefCell::new(Self::new(visible)))
    }
}

impl GuiBinding for VisibilityFlag {
    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
