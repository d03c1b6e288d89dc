//! # Manager 模块
//!
//! 场景管理器：持有当前/上一个场景，在切换时启动退出/进入过渡，
//! 并在过渡期间协调事件、更新与绘制。
//!
//! ## 主循环
//!
//! ```rust,ignore
//! loop {
//!     for input in host.poll_inputs() {
//!         manager.handle_event(&Event::Input(input))?;
//!     }
//!     manager.dispatch_notifications()?;
//!     manager.update(dt);
//!     manager.draw(&mut screen);
//! }
//! ```
//!
//! ## 绘制顺序
//!
//! 未被过渡覆盖的场景先画，过渡后画；过渡按优先级升序绘制：
//! 无关场景的过渡 → 上一个场景的过渡 → 当前场景的过渡（最上层）。

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::scene::{SceneAction, SceneRef};
use super::transition::{TransitionId, TransitionRef};
use crate::config::SceneManagerConfig;
use crate::error::SceneError;
use crate::event::{Event, Notifier};
use crate::surface::{Color, Surface};

fn contains<T: ?Sized>(list: &[Rc<T>], item: &Rc<T>) -> bool {
    list.iter().any(|x| Rc::ptr_eq(x, item))
}

fn same<T: ?Sized>(a: &Option<Rc<T>>, b: &Rc<T>) -> bool {
    a.as_ref().is_some_and(|a| Rc::ptr_eq(a, b))
}

/// 场景管理器
pub struct SceneManager<S, E> {
    config: SceneManagerConfig,
    scenes: HashMap<String, SceneRef<S, E>>,
    default_scene: Option<String>,
    current_key: Option<String>,
    current_scene: Option<SceneRef<S, E>>,
    previous_scene: Option<SceneRef<S, E>>,
    transitioning: bool,
    running_transitions: Vec<TransitionRef<S, E>>,
    notifier: Notifier,
}

impl<S: Surface, E> SceneManager<S, E> {
    /// 创建场景管理器，创建后需调用 `register_scenes`
    pub fn new(config: SceneManagerConfig) -> Self {
        Self {
            config,
            scenes: HashMap::new(),
            default_scene: None,
            current_key: None,
            current_scene: None,
            previous_scene: None,
            transitioning: false,
            running_transitions: Vec::new(),
            notifier: Notifier::new(),
        }
    }

    /// 注册全部场景
    ///
    /// # 参数
    /// - `scenes`: 按顺序给出的 (名称, 场景)
    /// - `default_key`: 首个显示的场景，省略时使用第一个场景
    ///
    /// 场景列表为空时管理器没有当前场景，之后的更新/绘制都是空操作。
    pub fn register_scenes<K: Into<String>>(
        &mut self,
        scenes: impl IntoIterator<Item = (K, SceneRef<S, E>)>,
        default_key: Option<&str>,
    ) -> Result<(), SceneError> {
        let mut registry = HashMap::new();
        let mut first_key = None;
        for (key, scene) in scenes {
            let key = key.into();
            if registry.contains_key(&key) {
                return Err(SceneError::DuplicateScene { key });
            }
            first_key.get_or_insert_with(|| key.clone());
            registry.insert(key, scene);
        }

        let default_scene = match default_key {
            Some(key) if !registry.contains_key(key) => {
                return Err(SceneError::UnknownDefaultScene {
                    key: key.to_string(),
                });
            }
            Some(key) => Some(key.to_string()),
            None => first_key,
        };

        self.scenes = registry;
        self.previous_scene = None;
        self.current_scene = default_scene
            .as_ref()
            .and_then(|key| self.scenes.get(key).cloned());
        self.current_key = default_scene.clone();
        self.default_scene = default_scene;

        match &self.default_scene {
            Some(key) => info!(scenes = self.scenes.len(), default = %key, "场景注册完成"),
            None => warn!("场景管理器缺少默认场景"),
        }
        Ok(())
    }

    /// 添加单个场景
    ///
    /// `allow_replace` 为 `false` 时，键已存在则返回错误。
    pub fn add_scene(
        &mut self,
        key: impl Into<String>,
        scene: SceneRef<S, E>,
        allow_replace: bool,
    ) -> Result<(), SceneError> {
        let key = key.into();
        if !allow_replace && self.scenes.contains_key(&key) {
            return Err(SceneError::DuplicateScene { key });
        }
        debug!(scene = %key, "添加场景");
        self.scenes.insert(key, scene);
        Ok(())
    }

    /// 切换到另一个场景，播放退出和进入过渡
    pub fn change_scene(&mut self, key: &str) -> Result<(), SceneError> {
        let next = self
            .scenes
            .get(key)
            .cloned()
            .ok_or_else(|| SceneError::UnknownScene {
                key: key.to_string(),
            })?;
        info!(from = ?self.current_key, to = %key, "切换场景");

        self.previous_scene = self.current_scene.take();
        if let Some(previous) = self.previous_scene.clone() {
            let exit = previous.try_borrow().ok().and_then(|scene| scene.exit_transition());
            if let Some(exit) = exit {
                self.start_transition(exit, previous);
            }
        }

        self.current_scene = Some(next.clone());
        self.current_key = Some(key.to_string());
        let enter = next.try_borrow().ok().and_then(|scene| scene.enter_transition());
        if let Some(enter) = enter {
            self.start_transition(enter, next);
        }
        Ok(())
    }

    /// 启动过渡并加入运行集合
    fn start_transition(&mut self, transition: TransitionRef<S, E>, scene: SceneRef<S, E>) {
        let Ok(mut running) = transition.try_borrow_mut() else {
            warn!("过渡正被占用，无法启动");
            return;
        };
        running.start(scene, self.config.viewport, &self.notifier);
        debug!(transition = %running.id(), "启动过渡");
        drop(running);

        self.transitioning = true;
        if !contains(&self.running_transitions, &transition) {
            self.running_transitions.push(transition);
        }
    }

    /// 处理事件
    ///
    /// 过渡结束通知会先从运行集合中移除对应过渡；
    /// 之后除非正在过渡且不允许过渡期间传递事件，否则转发给当前场景。
    pub fn handle_event(&mut self, event: &Event<E>) -> Result<(), SceneError> {
        if let Some(id) = event.transition_ended() {
            self.retire_transition(id);
        }

        let Some(current) = self.current_scene.clone() else {
            return Ok(());
        };
        if self.transitioning && !self.config.handle_events_during_transition {
            return Ok(());
        }

        let action = match current.try_borrow_mut() {
            Ok(mut scene) => scene.handle_event(event),
            Err(_) => {
                warn!(scene = ?self.current_key, "场景正被占用，丢弃事件");
                SceneAction::None
            }
        };
        match action {
            SceneAction::None => Ok(()),
            SceneAction::ChangeScene(key) => self.change_scene(&key),
        }
    }

    /// 把通知队列中积压的通知全部送入 `handle_event`
    pub fn dispatch_notifications(&mut self) -> Result<(), SceneError> {
        while let Some(notification) = self.notifier.pop() {
            self.handle_event(&Event::Notification(notification))?;
        }
        Ok(())
    }

    fn retire_transition(&mut self, id: TransitionId) {
        let before = self.running_transitions.len();
        self.running_transitions
            .retain(|t| t.try_borrow().map(|t| t.id() != id).unwrap_or(true));
        if self.running_transitions.len() != before {
            debug!(transition = %id, remaining = self.running_transitions.len(), "过渡结束");
        }
        if self.running_transitions.is_empty() {
            self.transitioning = false;
        }
    }

    /// 更新
    ///
    /// 先推进全部过渡（绑定场景要求时一并更新场景），
    /// 再更新未被过渡覆盖的上一个场景和当前场景。每个场景每帧最多更新一次。
    pub fn update(&mut self, dt: f32) {
        let Some(current) = self.current_scene.clone() else {
            return;
        };

        let mut covered: Vec<SceneRef<S, E>> = Vec::new();
        let mut updated: Vec<SceneRef<S, E>> = Vec::new();

        if self.transitioning {
            for transition in self.running_transitions.clone() {
                let scene = match transition.try_borrow_mut() {
                    Ok(mut transition) => {
                        transition.update(dt);
                        transition.scene()
                    }
                    Err(_) => {
                        warn!("过渡正被占用，跳过本帧更新");
                        continue;
                    }
                };
                let Some(scene) = scene else {
                    warn!("过渡没有绑定场景");
                    continue;
                };

                let wants_update = scene
                    .try_borrow()
                    .map(|s| s.update_during_transition())
                    .unwrap_or(false);
                if wants_update {
                    Self::update_once(&scene, dt, &mut updated);
                }
                if !contains(&covered, &scene) {
                    covered.push(scene);
                }
            }
        }

        if let Some(previous) = self.previous_scene.clone()
            && !contains(&covered, &previous)
        {
            Self::update_once(&previous, dt, &mut updated);
        }
        if !contains(&covered, &current) {
            Self::update_once(&current, dt, &mut updated);
        }
    }

    fn update_once(scene: &SceneRef<S, E>, dt: f32, updated: &mut Vec<SceneRef<S, E>>) {
        if contains(updated, scene) {
            return;
        }
        match scene.try_borrow_mut() {
            Ok(mut s) => s.update(dt),
            Err(_) => warn!("场景正被占用，跳过本帧更新"),
        }
        updated.push(scene.clone());
    }

    /// 绘制
    pub fn draw(&mut self, surface: &mut S) {
        surface.fill(Color::BLACK);
        let Some(current) = self.current_scene.clone() else {
            return;
        };

        if !self.transitioning {
            Self::draw_scene(&current, surface);
            return;
        }

        let transitioning = self.transitioning_scenes();
        if let Some(previous) = self.previous_scene.clone()
            && !contains(&transitioning, &previous)
            && !Rc::ptr_eq(&previous, &current)
        {
            Self::draw_scene(&previous, surface);
        }
        if !contains(&transitioning, &current) {
            Self::draw_scene(&current, surface);
        }

        let mut ordered = self.running_transitions.clone();
        ordered.sort_by_key(|t| self.priority(t));
        for transition in ordered {
            match transition.try_borrow_mut() {
                Ok(mut t) => t.draw(surface),
                Err(_) => warn!("过渡正被占用，跳过本帧绘制"),
            }
        }
    }

    fn draw_scene(scene: &SceneRef<S, E>, surface: &mut S) {
        match scene.try_borrow_mut() {
            Ok(mut s) => s.draw(surface),
            Err(_) => warn!("场景正被占用，跳过本帧绘制"),
        }
    }

    /// 过渡的绘制优先级：当前场景 3，上一个场景 2，其他 1
    fn priority(&self, transition: &TransitionRef<S, E>) -> u8 {
        let Some(scene) = transition.try_borrow().ok().and_then(|t| t.scene()) else {
            return 1;
        };
        if same(&self.current_scene, &scene) {
            3
        } else if same(&self.previous_scene, &scene) {
            2
        } else {
            1
        }
    }

    // ========== 查询 ==========

    /// 正在过渡的场景（去重）
    pub fn transitioning_scenes(&self) -> Vec<SceneRef<S, E>> {
        let mut scenes: Vec<SceneRef<S, E>> = Vec::new();
        for transition in &self.running_transitions {
            if let Some(scene) = transition.try_borrow().ok().and_then(|t| t.scene())
                && !contains(&scenes, &scene)
            {
                scenes.push(scene);
            }
        }
        scenes
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn running_transitions(&self) -> &[TransitionRef<S, E>] {
        &self.running_transitions
    }

    pub fn current_scene(&self) -> Option<&SceneRef<S, E>> {
        self.current_scene.as_ref()
    }

    pub fn previous_scene(&self) -> Option<&SceneRef<S, E>> {
        self.previous_scene.as_ref()
    }

    /// 当前场景的名称
    pub fn current_key(&self) -> Option<&str> {
        self.current_key.as_deref()
    }

    pub fn default_scene(&self) -> Option<&str> {
        self.default_scene.as_deref()
    }

    pub fn scene(&self, key: &str) -> Option<&SceneRef<S, E>> {
        self.scenes.get(key)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// 过渡结束通知写入的队列
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &SceneManagerConfig {
        &self.config
    }
}

impl<S, E> fmt::Debug for SceneManager<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneManager")
            .field("scenes", &self.scenes.len())
            .field("current", &self.current_key)
            .field("transitioning", &self.transitioning)
            .field("running_transitions", &self.running_transitions.len())
            .finish()
    }
}
