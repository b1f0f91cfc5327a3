//! 训练循环编排.
//!
//! 状态机: INITIALIZING -> EPOCH_RUNNING -> {CONVERGED,
//! EPOCH_EXHAUSTED, STAGNATED} -> DONE. 三种终态产出同样形状的结果,
//! 只是报告的终止原因不同.

use linfa::prelude::*;
use linfa_svm::Svm;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::classifier::{self, BestParams};
use super::metrics::{self, ClassReport};
use super::projection::Projection;
use super::{hard, initial, TrainResult, TrainSpec};
use crate::consts::CLASSES;
use crate::model::TrainedModel;

/// 训练终止原因.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// 每一类的 precision 与 recall 都严格超过了收敛阈值.
    Converged,

    /// epoch 预算耗尽.
    EpochsExhausted,

    /// 难样本池枯竭 (本 epoch 选不出任何难样本), 训练集无法再增长.
    Stagnated,
}

/// 单个 epoch 的记录, 仅用于报告.
#[derive(Debug, Clone)]
pub struct EpochRecord {
    /// epoch 序号, 从 0 开始.
    pub epoch: usize,

    /// 本 epoch 开始时的训练集大小.
    pub train_size: usize,

    /// 本 epoch 开始时训练集的逐类样本数, 类别序 `[0, 1]`.
    pub train_per_class: [usize; CLASSES],

    /// 评估池上的逐类指标.
    pub report: ClassReport,

    /// 网格搜索选出的超参数.
    pub best: BestParams,

    /// 难样本池 (误分类样本) 大小. 已收敛的 epoch 不做抽样, 但该值
    /// 仍按混淆矩阵记录.
    pub hard_pool: usize,

    /// 实际注入训练集的难样本个数.
    pub hard_added: usize,
}

/// 一次训练运行的产出.
pub struct TrainOutcome {
    /// 最后一个 epoch 拟合的模型, 即运行的输出工件.
    pub model: TrainedModel,

    /// 各 epoch 的记录.
    pub history: Vec<EpochRecord>,

    /// 终止原因.
    pub termination: Termination,

    /// 终止后在全量数据上的最终评估.
    pub final_report: ClassReport,
}

impl TrainOutcome {
    /// 实际运行的 epoch 个数.
    #[inline]
    pub fn epochs(&self) -> usize {
        self.history.len()
    }
}

pub(super) fn run(spec: &TrainSpec, x: &Array2<f64>, y: &Array1<bool>) -> TrainResult<TrainOutcome> {
    assert_eq!(x.nrows(), y.len());

    let mut rng = StdRng::seed_from_u64(spec.seed);

    // INITIALIZING: 组装初始训练集, 拟合一次投影.
    let mut train = initial::balanced_subset(x.view(), y, spec.initial_train_size, &mut rng)?;
    let projection = Projection::fit(x, spec.components)?;

    // 评估池在整个运行中固定, 投影结果可整个运行复用.
    let x_eval = projection.project(x);

    let mut history: Vec<EpochRecord> = Vec::new();
    let mut termination = Termination::EpochsExhausted;
    let mut last: Option<Svm<f64, bool>> = None;

    // EPOCH_RUNNING.
    for epoch in 0..spec.max_epochs {
        let train_size = train.len();
        let train_per_class = train.class_counts();
        log::info!(
            "epoch {epoch}: 训练集大小 {train_size} (逐类 {train_per_class:?}), 评估池大小 {}",
            y.len()
        );

        // 投影 -> 训练 -> 评估.
        let x_train = projection.project(&train.matrix());
        let labels = train.labels();
        let (svm, best) = classifier::fit_best(&x_train, &labels, &spec.grid, spec.cv_folds)?;

        let pred = svm.predict(&x_eval);
        let report = metrics::evaluate(y.view(), pred.view());
        log::info!("epoch {epoch} 评估:\n{report}");

        // 收敛判定.
        let converged = report.converged(spec.threshold);

        // 难样本选取与注入. 已收敛时训练集保持不变.
        let (hard_pool, hard_added) = if converged {
            (report.disagreements(), 0)
        } else {
            let hs = hard::select(y.view(), pred.view(), spec.learning_rate, &mut rng);
            for &i in &hs.chosen {
                train.push_row(x.row(i), y[i]);
            }
            log::info!("epoch {epoch}: 从 {} 个难样本中选入 {} 个", hs.pool, hs.chosen.len());
            (hs.pool, hs.chosen.len())
        };

        history.push(EpochRecord {
            epoch,
            train_size,
            train_per_class,
            report,
            best,
            hard_pool,
            hard_added,
        });
        last = Some(svm);

        if converged {
            termination = Termination::Converged;
            break;
        }
        if hard_added == 0 {
            // 训练集无法再增长, 继续循环只会重复同样的 epoch.
            log::warn!("epoch {epoch}: 难样本池枯竭 (池大小 {hard_pool}), 提前终止");
            termination = Termination::Stagnated;
            break;
        }
    }

    // DONE: max_epochs >= 1, 循环至少执行了一个 epoch.
    let svm = last.unwrap();

    // 终止后在全量数据上再做一次评估, 作为最终报告.
    let pred = svm.predict(&x_eval);
    let final_report = metrics::evaluate(y.view(), pred.view());

    let model = TrainedModel::new(projection, svm, x.ncols());
    Ok(TrainOutcome {
        model,
        history,
        termination,
        final_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::SearchGrid;
    use ndarray::{Array1, Array2};

    /// 两个线性可分的团, 各 `n` 个样本, 4 维特征.
    fn separable(n: usize) -> (Array2<f64>, Array1<bool>) {
        let x = Array2::from_shape_fn((n * 2, 4), |(i, j)| {
            let sign = if i < n { -4.0 } else { 4.0 };
            sign + ((i * 13 + j * 5) % 16) as f64 * 0.1
        });
        let y = Array1::from_shape_fn(n * 2, |i| i >= n);
        (x, y)
    }

    /// 不可完全分类的数据: 背景团 (50) + 前景团 (45), 外加 5 个与前景
    /// 坐标完全重合的背景样本. 重合点无论预测成哪类都有一半是错的.
    fn contradictory() -> (Array2<f64>, Array1<bool>) {
        let mut rows: Vec<[f64; 2]> = Vec::new();
        let mut labels = Vec::new();

        for i in 0..50 {
            rows.push([-5.0 + (i % 8) as f64 * 0.1, -5.0 + (i % 5) as f64 * 0.1]);
            labels.push(false);
        }
        for i in 0..45 {
            rows.push([5.0 + (i % 8) as f64 * 0.1, 5.0 + (i % 5) as f64 * 0.1]);
            labels.push(true);
        }
        // 与前 5 个前景样本坐标重合的背景样本.
        for i in 0..5 {
            rows.push([5.0 + (i % 8) as f64 * 0.1, 5.0 + (i % 5) as f64 * 0.1]);
            labels.push(false);
        }

        let x = Array2::from_shape_fn((rows.len(), 2), |(i, j)| rows[i][j]);
        (x, Array1::from_vec(labels))
    }

    fn spec(threshold: f64, max_epochs: usize, lr: f64) -> TrainSpec {
        TrainSpec::new(2, max_epochs, threshold, 10, lr, 42)
    }

    #[test]
    fn test_scenario_threshold_zero_converges_at_epoch_zero() {
        let (x, y) = separable(50);

        let out = spec(0.0, 100, 0.1).run(&x, &y).unwrap();
        assert_eq!(out.termination, Termination::Converged);
        assert_eq!(out.epochs(), 1);
        assert_eq!(out.history[0].epoch, 0);
        assert_eq!(out.history[0].hard_added, 0);
        assert_eq!(out.history[0].train_size, 10);
        assert_eq!(out.history[0].train_per_class, [5, 5]);
    }

    #[test]
    fn test_monotonic_growth_and_max_epochs() {
        let (x, y) = contradictory();

        // 阈值不可达 (重合点保证永远有误分类), lr = 1.0 注入整个池.
        let out = spec(0.95, 3, 1.0).run(&x, &y).unwrap();
        assert!(out.epochs() <= 3);

        for pair in out.history.windows(2) {
            // 训练集只增不减, 且增量等于上一 epoch 注入的难样本数.
            assert!(pair[1].train_size >= pair[0].train_size);
            assert_eq!(pair[1].train_size - pair[0].train_size, pair[0].hard_added);
        }
        // lr = 1.0: 每个未收敛 epoch 注入整个难样本池.
        for rec in &out.history[..out.epochs() - 1] {
            assert_eq!(rec.hard_added, rec.hard_pool);
            assert!(rec.hard_pool >= 5);
        }
    }

    #[test]
    fn test_stagnation_terminates_gracefully() {
        let (x, y) = contradictory();

        // 池大小约 5, floor(0.1 * 5) = 0: 第一个未收敛 epoch 即枯竭.
        let out = spec(0.95, 100, 0.1).run(&x, &y).unwrap();
        match out.termination {
            Termination::Stagnated => {
                let last = out.history.last().unwrap();
                assert_eq!(last.hard_added, 0);
            }
            // 池偶尔超过 9 时会正常注入; 此时运行必须仍在预算内结束.
            _ => assert!(out.epochs() <= 100),
        }
    }

    #[test]
    fn test_converged_epoch_records_remaining_errors() {
        let (x, y) = contradictory();

        // 重合点保证恰有 >= 5 个误分类; 阈值 0.5 仍然收敛. 收敛的
        // epoch 不注入, 但误分类个数要如实记录.
        let out = spec(0.5, 10, 0.1).run(&x, &y).unwrap();
        assert_eq!(out.termination, Termination::Converged);

        let last = out.history.last().unwrap();
        assert_eq!(last.hard_added, 0);
        assert!(last.hard_pool >= 5);
        assert_eq!(last.hard_pool, last.report.disagreements());
    }

    #[test]
    fn test_final_model_predicts() {
        let (x, y) = separable(40);

        let out = spec(0.0, 10, 0.5).run(&x, &y).unwrap();
        let pred = out.model.predict(&x);
        assert_eq!(pred.len(), y.len());

        // 线性可分数据上, 最终模型应当基本全对.
        let hit = pred.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(hit as f64 / y.len() as f64 > 0.9);
        assert!(out.final_report.accuracy() > 0.9);
    }

    #[test]
    fn test_custom_grid_is_honored() {
        let (x, y) = separable(30);

        let out = spec(0.0, 5, 0.1)
            .with_grid(SearchGrid {
                c: vec![10.0],
                gamma: vec![0.5],
            })
            .run(&x, &y)
            .unwrap();
        assert_eq!(out.history[0].best.c, 10.0);
        assert_eq!(out.history[0].best.gamma, 0.5);
    }

    #[test]
    fn test_insufficient_initial_samples_fail_fast() {
        let (x, y) = separable(4); // 每类仅 4 个, 初始集需要每类 5 个.

        let err = spec(0.5, 10, 0.1).run(&x, &y).err().unwrap();
        assert!(matches!(
            err,
            crate::train::TrainError::InsufficientSamples { .. }
        ));
    }
}
