#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 对预分割的 3D 肝脏 CT 数据进行 patch 级二分类 (前景/背景)
//! 训练, 核心是难样本挖掘 (hard-sample mining) 主动训练循环.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 数据加载部分按照 LiTS 模式 (`volume-*.nii` + `segmentation-*.nii`)
//!    组织, 其它数据源按同样模式组织亦可工作.
//! 2. 参数非法时, 程序直接 panic, 而不会导致内存错误. As what Rust promises.
//!    数据本身的运行时问题则以 [`TrainError`](train::TrainError) 返回.
//!
//! # 功能总览
//!
//! ### 数据加载 ✅
//!
//! nifti 格式 scan/label 对的加载与轴序规范化.
//!
//! 实现位于 `lss-berry/src/data`.
//!
//! ### patch 提取 ✅
//!
//! 以固定大小窗口划分体数据, 窗口中心体素的标签决定 patch 的二分类目标.
//!
//! 实现位于 `lss-berry/src/patch`.
//!
//! ### 特征提取 ✅
//!
//! 按名字组合的特征注册表 (coordinates / intensity / statistics).
//!
//! 实现位于 `lss-berry/src/features`.
//!
//! ### 难样本挖掘训练循环 ✅
//!
//! 1. 组装类别均衡的初始训练集;
//! 2. 在全量特征矩阵上拟合一次 (且仅一次) 白化 PCA 投影;
//! 3. 每个 epoch: 投影 -> 网格搜索训练 RBF SVM -> 在固定评估池上
//!    计算逐类 precision/recall -> 判定收敛;
//! 4. 未收敛时, 从误分类样本中按学习率随机抽取难样本并入训练集;
//! 5. 收敛、epoch 耗尽或难样本池枯竭时终止.
//!
//! 实现位于 `lss-berry/src/train`.
//!
//! ### 模型落盘 ✅
//!
//! 投影 + 分类器打包为单一 bincode 工件.
//!
//! 实现位于 `lss-berry/src/model.rs`.

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

pub mod consts;

pub mod data;
pub use data::PatientVolume;

pub mod patch;
pub use patch::{Patch, PatchStats};

pub mod features;
pub use features::FeatureRecord;

pub mod train;
pub use train::{TrainError, TrainOutcome, TrainResult, TrainSpec};

mod model;
pub use model::TrainedModel;

pub mod prelude;
