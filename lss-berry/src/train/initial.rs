//! 初始训练集组装.

use ndarray::{Array1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::index;

use super::matrix::TrainSet;
use super::{TrainError, TrainResult};
use crate::consts::class_index;

/// 从全量特征矩阵中无放回地抽取类别均衡的初始训练集.
///
/// 两类各抽取 `total / 2` 个样本 (`total` 为奇数时向下取整),
/// 特征与标签保持对齐. 任一类样本不足时返回
/// [`TrainError::InsufficientSamples`].
///
/// 抽取由 `rng` 驱动, 相同种子产生相同的初始集.
pub fn balanced_subset(
    x: ArrayView2<f64>,
    y: &Array1<bool>,
    total: usize,
    rng: &mut StdRng,
) -> TrainResult<TrainSet> {
    let need = total / 2;

    // 逐类收集全量下标.
    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, &label) in y.iter().enumerate() {
        by_class[class_index(label)].push(i);
    }

    for (class, pool) in by_class.iter().enumerate() {
        if pool.len() < need {
            return Err(TrainError::InsufficientSamples {
                class,
                have: pool.len(),
                need,
            });
        }
    }

    let mut set = TrainSet::new(x.ncols());
    for pool in &by_class {
        for idx in index::sample(rng, pool.len(), need) {
            let row = pool[idx];
            set.push_row(x.row(row), y[row]);
        }
    }
    Ok(set)
}
