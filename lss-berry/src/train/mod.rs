//! 难样本挖掘训练循环.
//!
//! 一次运行的流程: 组装类别均衡的初始训练集, 在全量特征矩阵上拟合一次
//! 白化 PCA 投影; 此后每个 epoch 将当前训练集投影后做网格搜索训练
//! RBF SVM, 在固定评估池上计算逐类 precision/recall 并判定收敛;
//! 未收敛时从误分类样本中按学习率抽取难样本并入训练集. 收敛、epoch
//! 耗尽或难样本池枯竭时终止, 输出最后一个 epoch 的模型.

mod classifier;
mod error;
mod hard;
mod initial;
mod matrix;
mod metrics;
mod projection;
mod run;

use ndarray::{Array1, Array2};

pub use classifier::{BestParams, SearchGrid};
pub use error::{TrainError, TrainResult};
pub use matrix::{build_matrix, TrainSet};
pub use metrics::{evaluate, ClassReport};
pub use projection::Projection;
pub use run::{EpochRecord, Termination, TrainOutcome};

/// 一次训练运行的全部参数.
///
/// 所有随机性 (初始均衡抽样、难样本抽样) 都由 `seed` 派生, 相同参数与
/// 相同输入的两次运行产生相同结果.
#[derive(Debug, Clone)]
pub struct TrainSpec {
    pub(crate) components: usize,
    pub(crate) max_epochs: usize,
    pub(crate) threshold: f64,
    pub(crate) initial_train_size: usize,
    pub(crate) learning_rate: f64,
    pub(crate) seed: u64,
    pub(crate) grid: SearchGrid,
    pub(crate) cv_folds: usize,
}

impl TrainSpec {
    /// 构建训练参数.
    ///
    /// `components` 是 PCA 主成分个数, `max_epochs` 是 epoch 上限,
    /// `threshold` 是收敛阈值, 取值 `[0.0, 1.0]` (每类 precision 与
    /// recall 都须 **严格** 超过它; 取 1.0 时收敛不可达, 运行总以
    /// epoch 耗尽或难样本池枯竭结束),
    /// `initial_train_size` 是均衡初始训练集的总大小,
    /// `learning_rate` 是每 epoch 注入的难样本池比例, `seed` 驱动
    /// 全部随机抽样.
    ///
    /// 超参数网格与交叉验证折数取默认值 (网格 `C = [1e3]`,
    /// `gamma = [0.1]`, 3 折), 可由 [`with_grid`](Self::with_grid) 与
    /// [`with_cv_folds`](Self::with_cv_folds) 覆盖.
    ///
    /// 如果存在非法参数, 则程序 panic.
    pub fn new(
        components: usize,
        max_epochs: usize,
        threshold: f64,
        initial_train_size: usize,
        learning_rate: f64,
        seed: u64,
    ) -> Self {
        assert_ne!(components, 0);
        assert_ne!(max_epochs, 0);
        assert!((0.0..=1.0).contains(&threshold));
        assert!(initial_train_size >= 2);
        assert!(learning_rate > 0.0 && learning_rate <= 1.0);

        Self {
            components,
            max_epochs,
            threshold,
            initial_train_size,
            learning_rate,
            seed,
            grid: SearchGrid::default(),
            cv_folds: 3,
        }
    }

    /// 覆盖超参数网格.
    pub fn with_grid(mut self, grid: SearchGrid) -> Self {
        assert!(!grid.c.is_empty() && !grid.gamma.is_empty());
        self.grid = grid;
        self
    }

    /// 覆盖交叉验证折数 (最小为 2).
    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        assert!(cv_folds >= 2);
        self.cv_folds = cv_folds;
        self
    }

    /// 在全量特征矩阵与标签向量上执行一次完整训练运行.
    ///
    /// `x` 的行数必须等于 `y` 的长度, 否则程序 panic. 评估池即
    /// `(x, y)` 全量, 在运行期间固定不变.
    pub fn run(&self, x: &Array2<f64>, y: &Array1<bool>) -> TrainResult<TrainOutcome> {
        run::run(self, x, y)
    }
}
