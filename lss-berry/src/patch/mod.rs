//! patch 提取.
//!
//! 以固定大小窗口划分体数据. 一个 patch 是一个以某体素为中心的
//! `(x, y, z)` 局部窗口, 其二分类目标由中心体素的标签决定.

use ndarray::{s, Array3};

use crate::consts::{binary_target, CLASSES};
use crate::data::PatientVolume;
use crate::Idx3d;

/// 解析三位数字的窗口大小编码.
///
/// 例如 `"553"` 代表 5x5x3 (宽 x 高 x 深) 的窗口. 每一位必须是非零奇数,
/// 否则返回 `None`.
pub fn parse_window_code(code: &str) -> Option<Idx3d> {
    let digits: Vec<usize> = code
        .chars()
        .map(|c| c.to_digit(10).map(|d| d as usize))
        .collect::<Option<_>>()?;

    match digits.as_slice() {
        &[x, y, z] if [x, y, z].iter().all(|d| d % 2 == 1) => Some((x, y, z)),
        _ => None,
    }
}

/// 单个 patch: 局部窗口数据、中心体素索引与二分类目标.
#[derive(Debug, Clone)]
pub struct Patch {
    /// 窗口数据, 轴序 `(z, H, W)`.
    pub window: Array3<f32>,

    /// 中心体素在原体数据中的索引, `(z, h, w)`.
    pub center: Idx3d,

    /// 二分类目标: 0 为背景, 1 为前景.
    pub target: u8,
}

/// patch 提取的统计信息.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchStats {
    /// patch 总数.
    pub total: usize,

    /// 逐类 patch 个数, 类别序为 `[0, 1]`.
    pub per_class: [usize; CLASSES],
}

/// 将所有病人的体数据划分为 `(x, y, z)` 大小的 patch.
///
/// 只保留窗口完全落在体数据内部的中心体素; 每个这样的体素产生一个
/// patch, 目标值取中心体素标签的二分类映射 (肝脏/肿瘤为前景).
///
/// # 注意
///
/// `window` 的每一维必须是非零奇数, 否则程序 panic.
pub fn patch_volumes(records: &[PatientVolume], window: Idx3d) -> (Vec<Patch>, PatchStats) {
    let (wx, wy, wz) = window;
    assert!(wx % 2 == 1 && wy % 2 == 1 && wz % 2 == 1);
    assert!(wx > 0 && wy > 0 && wz > 0);

    // 窗口半径. 窗口编码是 (宽, 高, 深), 数据轴序是 (z, H, W).
    let (rw, rh, rz) = (wx / 2, wy / 2, wz / 2);

    let mut patches = Vec::new();
    let mut stats = PatchStats::default();

    for pv in records {
        let (nz, nh, nw) = pv.shape();
        if nz < wz || nh < wy || nw < wx {
            log::warn!("{}: 体数据 {:?} 小于窗口, 跳过", pv.id, pv.shape());
            continue;
        }

        for z in rz..nz - rz {
            for h in rh..nh - rh {
                for w in rw..nw - rw {
                    let target = binary_target(pv.label[(z, h, w)]);
                    let win = pv
                        .scan
                        .slice(s![z - rz..=z + rz, h - rh..=h + rh, w - rw..=w + rw])
                        .to_owned();

                    stats.total += 1;
                    stats.per_class[target as usize] += 1;
                    patches.push(Patch {
                        window: win,
                        center: (z, h, w),
                        target,
                    });
                }
            }
        }
    }

    (patches, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_parse_window_code() {
        assert_eq!(parse_window_code("553"), Some((5, 5, 3)));
        assert_eq!(parse_window_code("111"), Some((1, 1, 1)));
        assert_eq!(parse_window_code("999"), Some((9, 9, 9)));

        assert_eq!(parse_window_code(""), None);
        assert_eq!(parse_window_code("55"), None);
        assert_eq!(parse_window_code("5531"), None);
        assert_eq!(parse_window_code("543"), None); // 偶数位非法
        assert_eq!(parse_window_code("5x3"), None);
    }

    /// 构造一个 4x6x6 的 phantom: 上半 z 层为前景.
    fn phantom() -> PatientVolume {
        let scan = Array3::from_shape_fn((4, 6, 6), |(z, h, w)| (z * 100 + h * 10 + w) as f32);
        let label = Array3::from_shape_fn((4, 6, 6), |(z, _, _)| u8::from(z >= 2));
        PatientVolume {
            id: "phantom".into(),
            scan,
            label,
        }
    }

    #[test]
    fn test_patch_count_and_targets() {
        let pv = phantom();
        let (patches, stats) = patch_volumes(std::slice::from_ref(&pv), (3, 3, 3));

        // z: 1..=2, h: 1..=4, w: 1..=4.
        assert_eq!(stats.total, 2 * 4 * 4);
        assert_eq!(patches.len(), stats.total);
        assert_eq!(stats.per_class[0] + stats.per_class[1], stats.total);
        assert_eq!(stats.per_class[0], 4 * 4); // z == 1
        assert_eq!(stats.per_class[1], 4 * 4); // z == 2

        for p in &patches {
            assert_eq!(p.window.shape(), [3, 3, 3]);
            let (z, h, w) = p.center;
            assert_eq!(p.target, u8::from(z >= 2));
            // 窗口中心等于中心体素.
            assert_eq!(p.window[(1, 1, 1)], pv.scan[(z, h, w)]);
        }
    }

    #[test]
    fn test_volume_smaller_than_window_is_skipped() {
        let pv = phantom();
        let (patches, stats) = patch_volumes(std::slice::from_ref(&pv), (9, 9, 9));
        assert!(patches.is_empty());
        assert_eq!(stats.total, 0);
    }
}
