//! # 场景切换集成测试
//!
//! 测试 SceneManager → EffectTransition → Effect 的完整链路。
//! 使用只记录操作的表面，不做真实光栅化。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use stage_runtime::{
    Color, EffectId, EffectTransition, Event, Notification, Offset, Scene, SceneAction, SceneBindings,
    SceneManager, SceneManagerConfig, SceneRef, Size, StageConfig, Surface, TransitionRef,
};

/// 记录绘制操作的表面
#[derive(Debug, Clone)]
struct LogSurface {
    name: String,
    size: Size,
    alpha: u8,
    layers: Vec<String>,
    ops: Vec<String>,
}

impl LogSurface {
    fn screen() -> Self {
        Self {
            name: "screen".to_string(),
            size: Size::new(320, 240),
            alpha: 255,
            layers: Vec::new(),
            ops: Vec::new(),
        }
    }

    fn paint(&mut self, what: &str) {
        self.layers.push(what.to_string());
        self.ops.push(format!("paint {what}"));
    }

    fn describe(&self) -> String {
        if self.layers.is_empty() {
            self.name.clone()
        } else {
            format!("{}[{}]", self.name, self.layers.join(","))
        }
    }

    fn count(&self, prefix: &str) -> usize {
        self.ops.iter().filter(|op| op.starts_with(prefix)).count()
    }
}

impl Surface for LogSurface {
    fn new_transparent(size: Size) -> Self {
        Self {
            name: "layer".to_string(),
            size,
            alpha: 255,
            layers: Vec::new(),
            ops: Vec::new(),
        }
    }

    fn size(&self) -> Size {
        self.size
    }

    fn fill(&mut self, color: Color) {
        self.layers.clear();
        self.ops.push(format!("fill a={}", color.a));
    }

    fn blit(&mut self, source: &Self, offset: Offset) {
        self.layers.push(source.describe());
        self.ops.push(format!(
            "blit {} alpha={} at ({}, {})",
            source.describe(),
            source.alpha,
            offset.x,
            offset.y
        ));
    }

    fn scaled(&self, size: Size) -> Self {
        Self { size, ..self.clone() }
    }

    fn rotated(&self, _degrees: f32) -> Self {
        self.clone()
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Key {
    Enter,
    Back,
}

struct Menu {
    name: &'static str,
    bindings: SceneBindings<LogSurface, Key>,
    updates: Rc<Cell<u32>>,
    seen: Rc<RefCell<Vec<String>>>,
    next: Option<&'static str>,
}

impl Menu {
    fn new(name: &'static str, next: Option<&'static str>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            name,
            bindings: SceneBindings::new(),
            updates: Rc::new(Cell::new(0)),
            seen: Rc::new(RefCell::new(Vec::new())),
            next,
        }))
    }
}

impl Scene<LogSurface, Key> for Menu {
    fn handle_event(&mut self, event: &Event<Key>) -> SceneAction {
        match event {
            Event::Input(key) => {
                self.seen.borrow_mut().push(format!("{key:?}"));
                match (key, self.next) {
                    (Key::Enter, Some(next)) => SceneAction::change_to(next),
                    _ => SceneAction::None,
                }
            }
            Event::Notification(_) => {
                self.seen.borrow_mut().push("notification".to_string());
                SceneAction::None
            }
        }
    }

    fn update(&mut self, _dt: f32) {
        self.updates.set(self.updates.get() + 1);
    }

    fn draw(&mut self, surface: &mut LogSurface) {
        surface.paint(self.name);
    }

    fn enter_transition(&self) -> Option<TransitionRef<LogSurface, Key>> {
        self.bindings.enter_transition()
    }

    fn exit_transition(&self) -> Option<TransitionRef<LogSurface, Key>> {
        self.bindings.exit_transition()
    }

    fn update_during_transition(&self) -> bool {
        self.bindings.update_during_transition()
    }
}

fn fade_in(duration: f32) -> TransitionRef<LogSurface, Key> {
    Rc::new(RefCell::new(
        EffectTransition::fade(0.0, 255.0, duration).unwrap(),
    ))
}

fn manager_with(
    scenes: Vec<(&'static str, Rc<RefCell<Menu>>)>,
    config: SceneManagerConfig,
) -> SceneManager<LogSurface, Key> {
    let mut manager = SceneManager::new(config);
    manager
        .register_scenes(
            scenes
                .into_iter()
                .map(|(key, scene)| (key, scene as SceneRef<LogSurface, Key>)),
            None,
        )
        .unwrap();
    manager
}

/// 只有进入过渡时：恰好一个过渡运行，直到结束通知被处理
#[test]
fn test_enter_transition_lifecycle() {
    let a = Menu::new("a", None);
    let b = Menu::new("b", None);
    b.borrow_mut().bindings.set_enter_transition(fade_in(0.5));
    let mut manager = manager_with(vec![("a", a), ("b", b)], SceneManagerConfig::default());

    manager.change_scene("b").unwrap();
    assert!(manager.is_transitioning());
    assert_eq!(manager.running_transitions().len(), 1);

    manager.update(0.3);
    manager.dispatch_notifications().unwrap();
    assert!(manager.is_transitioning());

    manager.update(0.3);
    // 通知已入队，但尚未处理
    assert_eq!(manager.notifier().len(), 1);
    assert!(manager.is_transitioning());

    manager.dispatch_notifications().unwrap();
    assert!(!manager.is_transitioning());
    assert!(manager.running_transitions().is_empty());
    assert!(manager.notifier().is_empty());
}

/// 当前场景处于过渡中时只由过渡绘制一次
#[test]
fn test_covered_scene_drawn_only_by_transition() {
    let a = Menu::new("a", None);
    let b = Menu::new("b", None);
    b.borrow_mut().bindings.set_enter_transition(fade_in(1.0));
    let mut manager = manager_with(vec![("a", a), ("b", b)], SceneManagerConfig::default());

    manager.change_scene("b").unwrap();
    manager.update(0.5);

    let mut screen = LogSurface::screen();
    manager.draw(&mut screen);

    assert_eq!(screen.count("paint b"), 0);
    assert_eq!(screen.count("blit"), 1);
    insta::assert_debug_snapshot!(screen.ops, @r#"
    [
        "fill a=255",
        "paint a",
        "blit layer[layer[b]] alpha=127 at (0, 0)",
    ]
    "#);
}

/// 过渡结束后场景恢复直接绘制
#[test]
fn test_scene_drawn_directly_after_retire() {
    let a = Menu::new("a", None);
    let b = Menu::new("b", None);
    b.borrow_mut().bindings.set_enter_transition(fade_in(0.2));
    let mut manager = manager_with(vec![("a", a), ("b", b)], SceneManagerConfig::default());

    manager.change_scene("b").unwrap();
    manager.update(0.5);
    manager.dispatch_notifications().unwrap();

    let mut screen = LogSurface::screen();
    manager.draw(&mut screen);
    assert_eq!(screen.ops, vec!["fill a=255".to_string(), "paint b".to_string()]);
}

/// 输入触发的切换，以及过渡期间的输入屏蔽
#[test]
fn test_input_driven_scene_change() {
    let title = Menu::new("title", Some("game"));
    let game = Menu::new("game", None);
    game.borrow_mut().bindings.set_enter_transition(fade_in(0.4));
    let game_seen = game.borrow().seen.clone();
    let mut manager = manager_with(
        vec![("title", title.clone()), ("game", game)],
        SceneManagerConfig::default(),
    );

    manager.handle_event(&Event::Input(Key::Enter)).unwrap();
    assert_eq!(manager.current_key(), Some("game"));
    assert_eq!(*title.borrow().seen.borrow(), vec!["Enter".to_string()]);

    // 过渡中，事件不会送达
    manager.handle_event(&Event::Input(Key::Back)).unwrap();
    assert!(game_seen.borrow().is_empty());

    manager.update(0.5);
    manager.dispatch_notifications().unwrap();
    manager.handle_event(&Event::Input(Key::Back)).unwrap();
    assert_eq!(
        *game_seen.borrow(),
        vec!["notification".to_string(), "Back".to_string()]
    );
}

/// 场景同时绑定退出和进入过渡，且要求过渡期间更新时，每帧只更新一次
#[test]
fn test_scene_updated_once_per_frame() {
    let a = Menu::new("a", None);
    {
        let mut scene = a.borrow_mut();
        scene.bindings.set_enter_transition(fade_in(1.0));
        scene.bindings.set_exit_transition(fade_in(1.0));
        scene.bindings.set_update_during_transition(true);
    }
    let updates = a.borrow().updates.clone();
    let mut manager = manager_with(vec![("a", a)], SceneManagerConfig::default());

    manager.change_scene("a").unwrap();
    assert_eq!(manager.running_transitions().len(), 2);
    assert_eq!(manager.transitioning_scenes().len(), 1);

    manager.update(0.1);
    assert_eq!(updates.get(), 1);
    manager.update(0.1);
    assert_eq!(updates.get(), 2);
}

#[test]
fn test_unknown_scene_is_error() {
    let a = Menu::new("a", Some("nowhere"));
    let mut manager = manager_with(vec![("a", a)], SceneManagerConfig::default());

    assert!(manager.change_scene("nowhere").is_err());
    assert!(manager.handle_event(&Event::Input(Key::Enter)).is_err());
    assert_eq!(manager.current_key(), Some("a"));
}

/// 配置中定义的效果作为过渡使用
#[test]
fn test_transition_from_config_definition() {
    let config: StageConfig = serde_json::from_str(
        r#"{
            "manager": { "viewport": { "width": 100, "height": 50 } },
            "effects": {
                "slide_in": {
                    "object_id": "slide_in",
                    "sections": [ { "duration": 1.0, "start_position": [-100, 0], "end_position": [0, 0] } ]
                }
            }
        }"#,
    )
    .unwrap();
    config.validate().unwrap();

    let transition: EffectTransition<LogSurface, Key> =
        EffectTransition::from_definition(config.effect("slide_in").unwrap()).unwrap();
    assert_eq!(transition.effect().object_id(), Some("slide_in"));

    let a = Menu::new("a", None);
    let b = Menu::new("b", None);
    b.borrow_mut()
        .bindings
        .set_enter_transition(Rc::new(RefCell::new(transition)));
    let mut manager = manager_with(vec![("a", a), ("b", b)], config.manager.clone());

    manager.change_scene("b").unwrap();
    manager.update(0.25);

    let mut screen = LogSurface::screen();
    manager.draw(&mut screen);
    assert_eq!(
        screen.ops.last().map(String::as_str),
        Some("blit layer[layer[b]] alpha=255 at (-75, 0)")
    );
}

#[test]
fn test_notification_passes_through_notifier() {
    let a = Menu::new("a", None);
    let seen = a.borrow().seen.clone();
    let mut manager = manager_with(vec![("a", a)], SceneManagerConfig::default());

    manager.notifier().post(Notification::EffectEnded {
        effect: EffectId::new(99),
        object_id: None,
    });
    manager.dispatch_notifications().unwrap();
    assert_eq!(*seen.borrow(), vec!["notification".to_string()]);
}
