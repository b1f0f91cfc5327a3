//! RBF SVM 分类器训练与超参数网格搜索.

use itertools::Itertools;
use linfa::prelude::*;
use linfa::Dataset;
use linfa_svm::Svm;
use ndarray::{Array1, Array2, Ix1};
use rayon::prelude::*;

use super::{TrainError, TrainResult};

/// `(C, gamma)` 超参数网格.
///
/// 默认网格为 `C = [1e3]`, `gamma = [0.1]`.
#[derive(Debug, Clone)]
pub struct SearchGrid {
    /// 正则化系数候选.
    pub c: Vec<f64>,

    /// RBF 核宽度候选 (sklearn 意义下的 gamma).
    pub gamma: Vec<f64>,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            c: vec![1e3],
            gamma: vec![0.1],
        }
    }
}

/// 网格搜索选出的最优超参数.
#[derive(Debug, Clone, Copy)]
pub struct BestParams {
    /// 正则化系数.
    pub c: f64,

    /// RBF 核宽度.
    pub gamma: f64,

    /// 交叉验证平均准确率.
    pub cv_accuracy: f64,
}

/// 在投影后的训练集上拟合 RBF SVM, 对 `(C, gamma)` 网格做
/// k 折交叉验证搜索, 以验证折上的平均准确率选优.
///
/// 类别权重按训练集类别比例均衡 (少数类获得更大的 C), 补偿难样本
/// 注入造成的类别失衡. 每次调用都从零拟合一个独立模型.
///
/// 网格点之间并行评估; 对外仍表现为一次阻塞调用.
pub fn fit_best(
    x: &Array2<f64>,
    y: &Array1<bool>,
    grid: &SearchGrid,
    cv_folds: usize,
) -> TrainResult<(Svm<f64, bool>, BestParams)> {
    assert_eq!(x.nrows(), y.len());
    assert!(cv_folds >= 2);
    assert!(!grid.c.is_empty() && !grid.gamma.is_empty());

    let n = y.len();
    let pos = y.iter().filter(|&&l| l).count();
    let neg = n - pos;
    if pos == 0 || neg == 0 {
        return Err(TrainError::Classifier(format!(
            "训练批只含单一类别 (前景 {pos}, 背景 {neg})"
        )));
    }

    // sklearn 的 class_weight='balanced': w_c = n / (classes * n_c).
    let w_pos = n as f64 / (2.0 * pos as f64);
    let w_neg = n as f64 / (2.0 * neg as f64);

    let dataset = Dataset::new(x.clone(), y.clone());

    // 折数不能超过样本数; 小训练集时自动收缩.
    let folds = cv_folds.min(n);

    let candidates: Vec<(f64, f64)> = grid
        .c
        .iter()
        .copied()
        .cartesian_product(grid.gamma.iter().copied())
        .collect();

    let scored: Vec<(f64, f64, Result<f64, String>)> = candidates
        .par_iter()
        .map(|&(c, gamma)| (c, gamma, cv_score(&dataset, c, gamma, w_pos, w_neg, folds)))
        .collect();

    let mut best: Option<BestParams> = None;
    let mut last_err = String::new();
    for (c, gamma, score) in scored {
        match score {
            Ok(acc) => {
                if best.map_or(true, |b| acc > b.cv_accuracy) {
                    best = Some(BestParams {
                        c,
                        gamma,
                        cv_accuracy: acc,
                    });
                }
            }
            Err(e) => last_err = e,
        }
    }

    let best = best.ok_or_else(|| {
        TrainError::Classifier(format!("所有网格点的交叉验证均失败: {last_err}"))
    })?;
    log::debug!(
        "网格搜索选定 C = {}, gamma = {}, 交叉验证准确率 {:.4}",
        best.c,
        best.gamma,
        best.cv_accuracy
    );

    // 以最优超参数在完整训练集上重新拟合.
    let svm = fit_one(&dataset, best.c, best.gamma, w_pos, w_neg)
        .map_err(TrainError::Classifier)?;
    Ok((svm, best))
}

/// 拟合单个 `(C, gamma)` 组合.
fn fit_one(
    dataset: &Dataset<f64, bool, Ix1>,
    c: f64,
    gamma: f64,
    w_pos: f64,
    w_neg: f64,
) -> Result<Svm<f64, bool>, String> {
    // linfa 的高斯核是 exp(-|a-b|^2 / eps), 对应 eps = 1 / gamma.
    Svm::<f64, bool>::params()
        .pos_neg_weights(c * w_pos, c * w_neg)
        .gaussian_kernel(1.0 / gamma)
        .fit(dataset)
        .map_err(|e| e.to_string())
}

/// 单个网格点的 k 折交叉验证平均准确率.
fn cv_score(
    dataset: &Dataset<f64, bool, Ix1>,
    c: f64,
    gamma: f64,
    w_pos: f64,
    w_neg: f64,
    folds: usize,
) -> Result<f64, String> {
    let mut acc_sum = 0.0;
    let mut count = 0usize;

    for (train, valid) in dataset.fold(folds) {
        // 某一折可能只含单一类别; 这样的折直接跳过.
        let (t_pos, t_neg) = split_counts(train.targets());
        if t_pos == 0 || t_neg == 0 {
            continue;
        }

        let svm = fit_one(&train, c, gamma, w_pos, w_neg)?;
        let pred = svm.predict(valid.records());
        let hit = pred
            .iter()
            .zip(valid.targets().iter())
            .filter(|(p, t)| p == t)
            .count();
        acc_sum += hit as f64 / pred.len().max(1) as f64;
        count += 1;
    }

    if count == 0 {
        return Err("没有包含两个类别的验证折".to_string());
    }
    Ok(acc_sum / count as f64)
}

fn split_counts(y: &Array1<bool>) -> (usize, usize) {
    let pos = y.iter().filter(|&&l| l).count();
    (pos, y.len() - pos)
}
