//! 线性降维投影.
//!
//! 投影在一次运行中只拟合一次 (于全量特征矩阵上), 之后每个 epoch
//! 复用同一变换. 这保证了各 epoch 的投影空间一致, 难样本在
//! epoch 之间保持可比.

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_reduction::Pca;
use ndarray::{Array2, ArrayBase, Data, Ix2};
use serde::{Deserialize, Serialize};

use super::{TrainError, TrainResult};

/// 已拟合的白化 PCA 投影. 拟合后只读.
#[derive(Clone, Serialize, Deserialize)]
pub struct Projection {
    pca: Pca<f64>,
    components: usize,
}

impl Projection {
    /// 在全量特征矩阵上拟合 `components` 维白化 PCA.
    ///
    /// `components` 必须非零, 否则程序 panic. 样本数或特征数不足以
    /// 支撑所需维数等运行时问题返回 [`TrainError::Projection`].
    pub fn fit(x: &Array2<f64>, components: usize) -> TrainResult<Self> {
        assert_ne!(components, 0);

        let ds = DatasetBase::from(x.clone());
        let pca = Pca::params(components)
            .whiten(true)
            .fit(&ds)
            .map_err(|e| TrainError::Projection(e.to_string()))?;

        Ok(Self { pca, components })
    }

    /// 将任意兼容矩阵 (特征数与拟合时一致) 投影到主成分空间.
    pub fn project<D: Data<Elem = f64>>(&self, x: &ArrayBase<D, Ix2>) -> Array2<f64> {
        self.pca.predict(x)
    }

    /// 投影的主成分个数.
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noisy_matrix(n: usize, f: usize, seed: u64) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((n, f), |(i, j)| {
            (i * j) as f64 * 0.01 + rng.gen_range(-1.0..1.0)
        })
    }

    #[test]
    fn test_fit_and_project_shape() {
        let x = noisy_matrix(50, 6, 3);
        let proj = Projection::fit(&x, 2).unwrap();
        assert_eq!(proj.components(), 2);

        let out = proj.project(&x);
        assert_eq!(out.dim(), (50, 2));

        // 任意兼容矩阵 (行数不同) 亦可投影.
        let other = noisy_matrix(7, 6, 4);
        assert_eq!(proj.project(&other).dim(), (7, 2));
    }

    #[test]
    fn test_projection_is_stable() {
        let x = noisy_matrix(40, 5, 9);
        let proj = Projection::fit(&x, 3).unwrap();

        // 同一已拟合投影, 多次应用结果逐位一致.
        let a = proj.project(&x);
        let b = proj.project(&x);
        assert_eq!(a, b);
    }
}
