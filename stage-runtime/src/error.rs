//! # Error 模块
//!
//! 定义 stage-runtime 中使用的错误类型。
//!
//! 这些都是配置错误：在出错的调用处同步返回，不做重试或静默恢复。

use thiserror::Error;

/// 效果配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    /// 没有任何分段
    #[error("效果 {object_id:?} 没有任何分段")]
    NoSections { object_id: Option<String> },

    /// 分段时长缺失或无效
    #[error("第 {index} 个分段的时长无效（{duration}），object_id: {object_id:?}")]
    InvalidDuration {
        index: usize,
        duration: f32,
        object_id: Option<String>,
    },
}

/// 场景管理错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// 场景未注册
    #[error("场景 '{key}' 未注册")]
    UnknownScene { key: String },

    /// 默认场景不在注册表中
    #[error("默认场景 '{key}' 不在场景列表中")]
    UnknownDefaultScene { key: String },

    /// 场景键重复
    #[error("场景 '{key}' 已存在")]
    DuplicateScene { key: String },
}

/// 配置文件错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

/// stage-runtime 统一错误类型
#[derive(Error, Debug)]
pub enum StageError {
    /// 效果错误
    #[error("效果错误: {0}")]
    Effect(#[from] EffectError),

    /// 场景错误
    #[error("场景错误: {0}")]
    Scene(#[from] SceneError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type StageResult<T> = Result<T, StageError>;
