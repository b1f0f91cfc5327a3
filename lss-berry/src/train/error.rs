//! 训练流程的运行时错误.

use std::fmt;

/// 训练流程的运行时错误.
#[derive(Debug, Clone)]
pub enum TrainError {
    /// 特征向量长度不一致.
    ///
    /// `index` 是出问题的记录下标, `expected` 是首条记录确定的长度,
    /// `got` 是该记录的实际长度.
    ShapeMismatch {
        /// 记录下标.
        index: usize,
        /// 期望的特征向量长度.
        expected: usize,
        /// 实际的特征向量长度.
        got: usize,
    },

    /// 某一类样本不足以组装类别均衡的初始训练集.
    InsufficientSamples {
        /// 类别下标 (0 为背景, 1 为前景).
        class: usize,
        /// 该类现有样本数.
        have: usize,
        /// 该类所需样本数.
        need: usize,
    },

    /// 特征名未注册.
    UnknownFeature(String),

    /// PCA 投影拟合失败 (如样本数少于投影维数).
    Projection(String),

    /// 分类器拟合失败 (如训练批只含单一类别).
    Classifier(String),
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainError::ShapeMismatch {
                index,
                expected,
                got,
            } => write!(
                f,
                "第 {index} 条记录的特征向量长度为 {got}, 期望 {expected}"
            ),
            TrainError::InsufficientSamples { class, have, need } => write!(
                f,
                "类别 {class} 只有 {have} 个样本, 均衡初始训练集需要 {need} 个"
            ),
            TrainError::UnknownFeature(name) => write!(f, "未注册的特征名: {name}"),
            TrainError::Projection(msg) => write!(f, "PCA 投影拟合失败: {msg}"),
            TrainError::Classifier(msg) => write!(f, "分类器拟合失败: {msg}"),
        }
    }
}

impl std::error::Error for TrainError {}

/// 训练流程运行时错误的 `Result` 别名.
pub type TrainResult<T> = Result<T, TrainError>;
