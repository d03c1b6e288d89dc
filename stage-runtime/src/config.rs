//! # Config 模块
//!
//! 场景管理器配置与效果定义，均可从 JSON 加载。
//!
//! ## 配置优先级
//!
//! 1. 宿主命令行参数（最高）
//! 2. 配置文件 (stage.json)
//! 3. 默认值（最低）
//!
//! ## 文件格式
//!
//! ```json
//! {
//!   "manager": { "viewport": { "width": 640, "height": 360 } },
//!   "effects": {
//!     "title_in": {
//!       "object_id": "title",
//!       "sections": [
//!         { "duration": 0.5, "start_transparency": 0, "end_transparency": 255 },
//!         { "duration": 1.0, "end_angle": 360 }
//!       ]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::effect::{Effect, Section};
use crate::error::{ConfigError, EffectError};
use crate::surface::{Size, Surface};

/// 场景管理器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneManagerConfig {
    /// 视口尺寸，过渡画布按此尺寸创建
    #[serde(default = "default_viewport")]
    pub viewport: Size,

    /// 过渡期间是否仍把事件转发给当前场景
    #[serde(default)]
    pub handle_events_during_transition: bool,
}

impl Default for SceneManagerConfig {
    fn default() -> Self {
        Self {
            viewport: default_viewport(),
            handle_events_during_transition: false,
        }
    }
}

fn default_viewport() -> Size {
    Size::new(1280, 720)
}

/// 效果定义
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectDefinition {
    /// 日志中用于识别效果的名称
    #[serde(default)]
    pub object_id: Option<String>,
    pub sections: Vec<Section>,
}

impl EffectDefinition {
    /// 按定义创建效果
    pub fn build<S: Surface>(&self) -> Result<Effect<S>, EffectError> {
        Effect::new(self.sections.clone(), self.object_id.clone())
    }
}

/// 完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub manager: SceneManagerConfig,

    /// 具名效果定义
    #[serde(default)]
    pub effects: BTreeMap<String, EffectDefinition>,
}

impl StageConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 严格加载：读取或解析失败都返回错误
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        info!(path = ?path, effects = config.effects.len(), "配置文件加载成功");
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 按名称查找效果定义
    pub fn effect(&self, name: &str) -> Option<&EffectDefinition> {
        self.effects.get(name)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let viewport = self.manager.viewport;
        if viewport.width == 0 || viewport.height == 0 {
            return Err(ConfigError::Validation(format!(
                "视口尺寸必须大于 0: {}x{}",
                viewport.width, viewport.height
            )));
        }

        for (name, definition) in &self.effects {
            if definition.sections.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "效果 '{}' 没有任何分段",
                    name
                )));
            }
            if let Some(index) = definition
                .sections
                .iter()
                .position(|section| !section.has_valid_duration())
            {
                return Err(ConfigError::Validation(format!(
                    "效果 '{}' 的第 {} 个分段时长无效",
                    name, index
                )));
            }
        }

        Ok(())
    }
}
