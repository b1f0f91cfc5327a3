//! 难样本选取.

use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::seq::index;

/// 一次难样本选取的结果.
#[derive(Debug, Clone)]
pub struct HardSamples {
    /// 被选中样本在评估池中的下标.
    pub chosen: Vec<usize>,

    /// 误分类样本 (难样本池) 总数.
    pub pool: usize,
}

/// 从评估池的误分类样本中随机抽取难样本.
///
/// 难样本池是所有 `truth[i] != pred[i]` 的下标; 从中无放回地均匀抽取
/// `floor(learning_rate * |池|)` 个. 池为空或抽取数为 0 时返回空选取,
/// 不会 panic.
///
/// `truth` 与 `pred` 必须等长, `learning_rate` 必须在 `(0, 1]` 内,
/// 否则程序 panic.
pub fn select(
    truth: ArrayView1<bool>,
    pred: ArrayView1<bool>,
    learning_rate: f64,
    rng: &mut StdRng,
) -> HardSamples {
    assert_eq!(truth.len(), pred.len());
    assert!(learning_rate > 0.0 && learning_rate <= 1.0);

    let pool: Vec<usize> = truth
        .iter()
        .zip(pred.iter())
        .enumerate()
        .filter_map(|(i, (t, p))| (t != p).then_some(i))
        .collect();

    let amount = (learning_rate * pool.len() as f64).floor() as usize;
    if amount == 0 {
        return HardSamples {
            chosen: Vec::new(),
            pool: pool.len(),
        };
    }

    let chosen = index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect();

    HardSamples {
        chosen,
        pool: pool.len(),
    }
}
