//! patch 特征提取.
//!
//! 特征按名字组合, 名字之间用逗号分隔, 如 `"coordinates,intensity"`.
//! 同一配置下所有 patch 的特征向量长度一致.

use crate::patch::Patch;
use crate::train::{TrainError, TrainResult};

/// 已注册的特征名.
const KNOWN: [&str; 3] = ["coordinates", "intensity", "statistics"];

/// 单个 patch 的特征记录: 定长特征向量与二分类目标.
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    /// 特征向量.
    pub features: Vec<f64>,

    /// 二分类目标: 0 为背景, 1 为前景.
    pub target: u8,
}

/// 单种特征对一个 patch 产生的值的个数.
fn feature_len(name: &str, patch: &Patch) -> usize {
    match name {
        "coordinates" => 3,
        "intensity" => patch.window.len(),
        "statistics" => 4,
        _ => unreachable!("特征名在 extract_features 入口处已校验"),
    }
}

/// 计算单种特征, 追加到 `out`.
fn push_feature(name: &str, patch: &Patch, out: &mut Vec<f64>) {
    match name {
        "coordinates" => {
            let (z, h, w) = patch.center;
            out.extend([z as f64, h as f64, w as f64]);
        }
        "intensity" => {
            out.extend(patch.window.iter().map(|&v| v as f64));
        }
        "statistics" => {
            let n = patch.window.len() as f64;
            let mean = patch.window.iter().map(|&v| v as f64).sum::<f64>() / n;
            let var = patch
                .window
                .iter()
                .map(|&v| (v as f64 - mean).powi(2))
                .sum::<f64>()
                / n;
            let min = patch.window.iter().copied().fold(f32::INFINITY, f32::min);
            let max = patch
                .window
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max);
            out.extend([mean, var.sqrt(), min as f64, max as f64]);
        }
        _ => unreachable!("特征名在 extract_features 入口处已校验"),
    }
}

/// 对所有 patch 提取 `names` 指定的特征组合.
///
/// 返回特征记录序列 (与输入 patch 序列下标对齐) 和特征向量长度.
/// `names` 含未注册的特征名时返回 [`TrainError::UnknownFeature`].
pub fn extract_features(
    patches: &[Patch],
    names: &str,
) -> TrainResult<(Vec<FeatureRecord>, usize)> {
    let names: Vec<&str> = names.split(',').map(str::trim).collect();
    for name in &names {
        if !KNOWN.contains(name) {
            return Err(TrainError::UnknownFeature(name.to_string()));
        }
    }

    let Some(first) = patches.first() else {
        return Ok((Vec::new(), 0));
    };
    let count: usize = names.iter().map(|n| feature_len(n, first)).sum();

    let records = patches
        .iter()
        .map(|p| {
            let mut features = Vec::with_capacity(count);
            for name in &names {
                push_feature(name, p, &mut features);
            }
            debug_assert_eq!(features.len(), count);
            FeatureRecord {
                features,
                target: p.target,
            }
        })
        .collect();

    Ok((records, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn patch(center: (usize, usize, usize), fill: f32, target: u8) -> Patch {
        Patch {
            window: Array3::from_elem((3, 3, 3), fill),
            center,
            target,
        }
    }

    #[test]
    fn test_unknown_feature_name() {
        let patches = [patch((1, 1, 1), 0.0, 0)];
        assert!(matches!(
            extract_features(&patches, "coordinates,gradient"),
            Err(TrainError::UnknownFeature(name)) if name == "gradient"
        ));
    }

    #[test]
    fn test_feature_count_and_alignment() {
        let patches = [patch((1, 2, 3), 10.0, 0), patch((2, 3, 4), -5.0, 1)];

        let (records, count) = extract_features(&patches, "coordinates,intensity").unwrap();
        assert_eq!(count, 3 + 27);
        assert_eq!(records.len(), 2);
        for (r, p) in records.iter().zip(&patches) {
            assert_eq!(r.features.len(), count);
            assert_eq!(r.target, p.target);
        }
        assert_eq!(&records[0].features[..3], &[1.0, 2.0, 3.0]);
        assert!(records[0].features[3..].iter().all(|&v| v == 10.0));
    }

    #[test]
    fn test_statistics_feature() {
        let patches = [patch((0, 0, 0), 2.0, 1)];
        let (records, count) = extract_features(&patches, "statistics").unwrap();
        assert_eq!(count, 4);
        // 常数窗口: mean = 2, std = 0, min = max = 2.
        assert_eq!(records[0].features, vec![2.0, 0.0, 2.0, 2.0]);
    }

    #[test]
    fn test_empty_patch_sequence() {
        let (records, count) = extract_features(&[], "coordinates").unwrap();
        assert!(records.is_empty());
        assert_eq!(count, 0);
    }
}
