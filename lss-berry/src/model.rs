//! 训练产出的模型工件.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use linfa::prelude::*;
use linfa_svm::Svm;
use ndarray::{Array1, ArrayBase, Data, Ix2};
use serde::{Deserialize, Serialize};

use crate::train::Projection;

/// 一次训练运行的输出工件: 固定投影 + 最后一个 epoch 的分类器.
///
/// 工件以 bincode 格式整体落盘, 加载后即可对新的特征矩阵做预测.
#[derive(Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    projection: Projection,
    classifier: Svm<f64, bool>,
    n_features: usize,
}

impl TrainedModel {
    pub(crate) fn new(projection: Projection, classifier: Svm<f64, bool>, n_features: usize) -> Self {
        Self {
            projection,
            classifier,
            n_features,
        }
    }

    /// 拟合时的特征向量长度.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// 投影的主成分个数.
    #[inline]
    pub fn n_components(&self) -> usize {
        self.projection.components()
    }

    /// 对特征矩阵做预测: 先投影到主成分空间, 再由分类器给出逐行的
    /// 前景/背景判定.
    ///
    /// `x` 的列数必须等于 [`n_features`](Self::n_features), 否则程序 panic.
    pub fn predict<D: Data<Elem = f64>>(&self, x: &ArrayBase<D, Ix2>) -> Array1<bool> {
        assert_eq!(x.ncols(), self.n_features);
        let projected = self.projection.project(x);
        self.classifier.predict(&projected)
    }

    /// 将模型序列化到 `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = BufWriter::new(File::create(path)?);
        bincode::serialize_into(file, self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// 从 `path` 反序列化模型.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = BufReader::new(File::open(path)?);
        bincode::deserialize_from(file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
