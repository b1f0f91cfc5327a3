//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 原 LiTS 数据集中, 背景的像素值.
    pub const LITS_BACKGROUND: u8 = 0;

    /// 原 LiTS 数据集中, 肝脏的像素值.
    pub const LITS_LIVER: u8 = 1;

    /// 原 LiTS 数据集中, 肿瘤的像素值.
    pub const LITS_TUMOR: u8 = 2;

    /// 像素是否是肝脏或肿瘤?
    #[inline]
    pub const fn is_liver_or_tumor(p: u8) -> bool {
        matches!(p, LITS_LIVER | LITS_TUMOR)
    }
}

/// 二分类的类别个数.
pub const CLASSES: usize = 2;

/// 背景类在指标报告中的下标.
pub const CLASS_BACKGROUND: usize = 0;

/// 前景类在指标报告中的下标.
pub const CLASS_FOREGROUND: usize = 1;

/// 将 LiTS 标签值映射为二分类目标. 肝脏与肿瘤均视为前景.
#[inline]
pub const fn binary_target(label: u8) -> u8 {
    if gray::is_liver_or_tumor(label) {
        1
    } else {
        0
    }
}

/// 将布尔类别转换成报告下标 (`false` -> 0, `true` -> 1).
#[inline]
pub const fn class_index(fg: bool) -> usize {
    if fg {
        CLASS_FOREGROUND
    } else {
        CLASS_BACKGROUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_target() {
        assert_eq!(binary_target(gray::LITS_BACKGROUND), 0);
        assert_eq!(binary_target(gray::LITS_LIVER), 1);
        assert_eq!(binary_target(gray::LITS_TUMOR), 1);
        assert_eq!(binary_target(7), 0);
    }
}
