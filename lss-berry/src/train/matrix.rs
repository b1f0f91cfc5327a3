//! 特征矩阵组装与可增长训练集.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::{TrainError, TrainResult};
use crate::consts::CLASSES;
use crate::features::FeatureRecord;

/// 将特征记录序列摊平为 `(N, F)` 特征矩阵和长度 `N` 的标签向量.
///
/// 行序与输入记录序一致. 任一记录的特征向量长度与首条记录不一致时,
/// 返回 [`TrainError::ShapeMismatch`].
pub fn build_matrix(records: &[FeatureRecord]) -> TrainResult<(Array2<f64>, Array1<bool>)> {
    let dim = records.first().map_or(0, |r| r.features.len());

    let mut data = Vec::with_capacity(records.len() * dim);
    let mut labels = Vec::with_capacity(records.len());

    for (index, r) in records.iter().enumerate() {
        if r.features.len() != dim {
            return Err(TrainError::ShapeMismatch {
                index,
                expected: dim,
                got: r.features.len(),
            });
        }
        data.extend_from_slice(&r.features);
        labels.push(r.target != 0);
    }

    // 行数与 data 长度在上面的循环中保持一致, 不会失败.
    let x = Array2::from_shape_vec((records.len(), dim), data).unwrap();
    Ok((x, Array1::from_vec(labels)))
}

/// 可增长的训练集缓冲.
///
/// 特征行与标签始终下标对齐; 追加按摊还 O(行) 进行, 不做整体拷贝.
/// 训练集在一次运行内只增不减.
#[derive(Debug, Clone)]
pub struct TrainSet {
    dim: usize,
    data: Vec<f64>,
    labels: Vec<bool>,
}

impl TrainSet {
    /// 创建空训练集. `dim` 是特征向量长度.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// 追加一行特征及其标签.
    ///
    /// `row` 的长度必须等于 `dim`, 否则程序 panic.
    pub fn push_row(&mut self, row: ArrayView1<f64>, label: bool) {
        assert_eq!(row.len(), self.dim);
        self.data.extend(row.iter());
        self.labels.push(label);
    }

    /// 当前样本个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 训练集是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 特征矩阵视图, 形状 `(len, dim)`.
    pub fn matrix(&self) -> ArrayView2<'_, f64> {
        // 形状由 push_row 的不变式保证, 不会失败.
        ArrayView2::from_shape((self.len(), self.dim), &self.data).unwrap()
    }

    /// 标签向量的一份拷贝.
    pub fn labels(&self) -> Array1<bool> {
        Array1::from_vec(self.labels.clone())
    }

    /// 逐类样本个数, 类别序为 `[0, 1]`.
    pub fn class_counts(&self) -> [usize; CLASSES] {
        let fg = self.labels.iter().filter(|&&l| l).count();
        [self.labels.len() - fg, fg]
    }
}
