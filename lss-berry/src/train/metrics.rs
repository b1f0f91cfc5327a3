//! 逐类分类指标与收敛判定.

use std::fmt;

use ndarray::ArrayView1;

use crate::consts::{class_index, CLASSES};

/// 一次评估的逐类指标与混淆矩阵. 类别序固定为 `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassReport {
    /// 逐类查准率. 某类无预测样本时该类查准率记 0.
    pub precision: [f64; CLASSES],

    /// 逐类查全率. 某类无真值样本时该类查全率记 0.
    pub recall: [f64; CLASSES],

    /// 逐类 F1 分数.
    pub f_score: [f64; CLASSES],

    /// 逐类真值样本数.
    pub support: [usize; CLASSES],

    /// 混淆矩阵. `confusion[t][p]` 为真值 `t` 被预测为 `p` 的样本数.
    pub confusion: [[usize; CLASSES]; CLASSES],
}

/// 在固定评估池上计算逐类指标. 纯函数, 不修改任何输入.
///
/// `truth` 与 `pred` 必须等长, 否则程序 panic.
pub fn evaluate(truth: ArrayView1<bool>, pred: ArrayView1<bool>) -> ClassReport {
    assert_eq!(truth.len(), pred.len());

    let mut confusion = [[0usize; CLASSES]; CLASSES];
    for (&t, &p) in truth.iter().zip(pred.iter()) {
        confusion[class_index(t)][class_index(p)] += 1;
    }

    let mut precision = [0.0; CLASSES];
    let mut recall = [0.0; CLASSES];
    let mut f_score = [0.0; CLASSES];
    let mut support = [0usize; CLASSES];

    for c in 0..CLASSES {
        let tp = confusion[c][c];
        let pred_c: usize = (0..CLASSES).map(|t| confusion[t][c]).sum();
        let true_c: usize = confusion[c].iter().sum();

        support[c] = true_c;
        if pred_c > 0 {
            precision[c] = tp as f64 / pred_c as f64;
        }
        if true_c > 0 {
            recall[c] = tp as f64 / true_c as f64;
        }
        if precision[c] + recall[c] > 0.0 {
            f_score[c] = 2.0 * precision[c] * recall[c] / (precision[c] + recall[c]);
        }
    }

    ClassReport {
        precision,
        recall,
        f_score,
        support,
        confusion,
    }
}

impl ClassReport {
    /// 收敛判定: 每一类的查准率 **和** 查全率都严格超过 `threshold`
    /// 才算收敛. 任何一类任何一项不达标都会阻止收敛.
    pub fn converged(&self, threshold: f64) -> bool {
        (0..CLASSES)
            .all(|c| self.precision[c] > threshold && self.recall[c] > threshold)
    }

    /// 误分类样本总数, 即混淆矩阵的非对角线元素之和.
    pub fn disagreements(&self) -> usize {
        let total: usize = self.support.iter().sum();
        let hit: usize = (0..CLASSES).map(|c| self.confusion[c][c]).sum();
        total - hit
    }

    /// 总体准确率.
    pub fn accuracy(&self) -> f64 {
        let hit: usize = (0..CLASSES).map(|c| self.confusion[c][c]).sum();
        let total: usize = self.support.iter().sum();
        if total == 0 {
            return 0.0;
        }
        hit as f64 / total as f64
    }
}

impl fmt::Display for ClassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for c in 0..CLASSES {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                c, self.precision[c], self.recall[c], self.f_score[c], self.support[c]
            )?;
        }
        writeln!(f)?;
        writeln!(f, "混淆矩阵 (行: 真值, 列: 预测):")?;
        for row in &self.confusion {
            writeln!(f, "[{:>8} {:>8}]", row[0], row[1])?;
        }
        Ok(())
    }
}
