//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::consts::{binary_target, CLASSES};

pub use crate::data::{load_folder, load_folders, PatientVolume};

pub use crate::patch::{parse_window_code, patch_volumes, Patch, PatchStats};

pub use crate::features::{extract_features, FeatureRecord};

pub use crate::train::{
    build_matrix, evaluate, ClassReport, SearchGrid, Termination, TrainError, TrainOutcome,
    TrainResult, TrainSpec,
};

pub use crate::TrainedModel;
