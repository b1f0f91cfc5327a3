//! LiTS 模式 3D CT 数据加载.
//!
//! 每个病人由一对 nii 文件描述: `volume-{i}.nii` 是 CT 扫描 (HU 值),
//! `segmentation-{i}.nii` 是真值标签. 本模块将其读入内存并规范化轴序.

use std::fmt;
use std::path::{Path, PathBuf};

use ndarray::Array3;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::Idx3d;

/// 数据加载的运行时错误.
#[derive(Debug)]
pub enum LoadError {
    /// nifti 文件本身无法读取.
    Nifti(nifti::NiftiError),

    /// 目录下没有任何 `volume-*` / `segmentation-*` 文件对.
    EmptyFolder(PathBuf),

    /// scan 与 label 的形状不一致.
    ShapeMismatch {
        /// 出问题的 scan 文件.
        path: PathBuf,
        /// scan 的形状.
        scan: Idx3d,
        /// label 的形状.
        label: Idx3d,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Nifti(e) => write!(f, "nifti 读取失败: {e}"),
            LoadError::EmptyFolder(p) => {
                write!(f, "目录 {} 下没有 volume/segmentation 文件对", p.display())
            }
            LoadError::ShapeMismatch { path, scan, label } => write!(
                f,
                "{}: scan 形状 {scan:?} 与 label 形状 {label:?} 不一致",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<nifti::NiftiError> for LoadError {
    fn from(e: nifti::NiftiError) -> Self {
        LoadError::Nifti(e)
    }
}

/// 单个病人的 scan/label 数据对. 数据按 `(z, H, W)` 轴序保存.
#[derive(Debug, Clone)]
pub struct PatientVolume {
    /// 病人标识 (取自 scan 文件名).
    pub id: String,

    /// CT 扫描. HU 值以 `f32` 保存.
    pub scan: Array3<f32>,

    /// 真值标签. 标签值以 `u8` 保存.
    pub label: Array3<u8>,
}

impl PatientVolume {
    /// 数据形状, `(z, H, W)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        let s = self.scan.shape();
        (s[0], s[1], s[2])
    }
}

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 打开 nii 格式的 3D CT 扫描, 规范化为 `(z, H, W)` 轴序.
pub fn open_scan<P: AsRef<Path>>(path: P) -> nifti::Result<Array3<f32>> {
    let obj = ReaderOptions::new().read_file(path.as_ref())?;
    let header = obj.header().clone();

    // [W, H, z] -> [z, H, W].
    let data = obj
        .into_volume()
        .into_ndarray::<f32>()?
        .permuted_axes([2, 1, 0].as_slice());

    // The nature of nifti data field layout.
    debug_assert!(data.is_standard_layout());

    // 该操作不会生成 `Err`, 可直接 unwrap.
    let data =
        Array3::<f32>::from_shape_vec(get_shape_from_header(&header), data.into_raw_vec()).unwrap();

    Ok(data)
}

/// 打开 nii 格式的 3D CT 标注, 规范化为 `(z, H, W)` 轴序.
pub fn open_label<P: AsRef<Path>>(path: P) -> nifti::Result<Array3<u8>> {
    let obj = ReaderOptions::new().read_file(path.as_ref())?;
    let header = obj.header().clone();

    // [W, H, z] -> [z, H, W].
    let data = obj
        .into_volume()
        .into_ndarray::<u8>()?
        .permuted_axes([2, 1, 0].as_slice());

    debug_assert!(data.is_standard_layout());

    let data =
        Array3::<u8>::from_shape_vec(get_shape_from_header(&header), data.into_raw_vec()).unwrap();

    Ok(data)
}

/// 打开一对 scan/label 文件并组装为 [`PatientVolume`].
pub fn open_pair<P: AsRef<Path>>(scan_path: P, label_path: P) -> Result<PatientVolume, LoadError> {
    let scan_path = scan_path.as_ref();
    let scan = open_scan(scan_path)?;
    let label = open_label(label_path.as_ref())?;

    if scan.shape() != label.shape() {
        let s = scan.shape();
        let l = label.shape();
        return Err(LoadError::ShapeMismatch {
            path: scan_path.to_owned(),
            scan: (s[0], s[1], s[2]),
            label: (l[0], l[1], l[2]),
        });
    }

    let id = scan_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(PatientVolume { id, scan, label })
}

/// 从一个目录加载所有 `volume-*` / `segmentation-*` 文件对.
///
/// # 注意
///
/// 1. `path` 必须是目录, 否则程序 panic.
/// 2. 目录下每个 `volume-xxx.nii` 必须有同目录的 `segmentation-xxx.nii`
///    配对文件, 否则返回 `Err`.
/// 3. 一对都找不到时返回 [`LoadError::EmptyFolder`].
pub fn load_folder<P: AsRef<Path>>(path: P) -> Result<Vec<PatientVolume>, LoadError> {
    let path = path.as_ref();
    assert!(path.is_dir());

    let mut scan_names: Vec<String> = std::fs::read_dir(path)
        .map_err(|e| LoadError::Nifti(nifti::NiftiError::Io(e)))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with("volume-") && name.contains(".nii"))
        .collect();
    scan_names.sort_unstable();

    let mut out = Vec::with_capacity(scan_names.len());
    for name in scan_names {
        let label_name = name.replacen("volume-", "segmentation-", 1);
        let pv = open_pair(path.join(&name), path.join(&label_name))?;
        log::debug!("已加载 {}: 形状 {:?}", pv.id, pv.shape());
        out.push(pv);
    }

    if out.is_empty() {
        return Err(LoadError::EmptyFolder(path.to_owned()));
    }
    Ok(out)
}

/// 依次加载多个目录, 拼接所有病人数据.
pub fn load_folders<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PatientVolume>, LoadError> {
    let mut out = Vec::new();
    for p in paths {
        out.extend(load_folder(p)?);
    }
    Ok(out)
}
