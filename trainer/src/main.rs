//! 命令行训练入口.
//!
//! 读取预分割的肝脏 CT 数据, 划分 patch, 提取特征, 以难样本挖掘循环
//! 训练前景/背景 SVM 并报告训练质量, 最终模型落盘.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use lss_berry::prelude::*;

#[derive(Parser)]
#[command(
    name = "trainer",
    about = "基于难样本挖掘的肝脏 patch 前景/背景 SVM 训练",
    allow_negative_numbers = true
)]
struct Cli {
    /// 肝脏分割数据目录 (可指定多个, 子目录按 LiTS 模式组织).
    #[arg(required = true)]
    data_folders: Vec<PathBuf>,

    /// 窗口大小编码 'xyz'. 例如 '553' 使用 5x5x3 的窗口.
    #[arg(short, long, default_value = "553")]
    window_size: String,

    /// 要提取的特征, 逗号分隔, 不要有空格.
    #[arg(short, long, default_value = "coordinates,intensity")]
    features: String,

    /// PCA 主成分个数.
    #[arg(short, long, default_value_t = 20)]
    components: usize,

    /// 最大训练 epoch 数.
    #[arg(short, long, default_value_t = 100)]
    epochs: usize,

    /// 收敛阈值. 两类的 precision 与 recall 都超过该阈值时提前停止.
    #[arg(short, long, default_value_t = 0.95)]
    threshold: f64,

    /// 均衡初始训练集的总大小.
    #[arg(short, long, default_value_t = 1000)]
    initial_size: usize,

    /// 学习率 (每 epoch 注入训练集的难样本池比例).
    #[arg(short, long, default_value_t = 0.1)]
    learning_rate: f64,

    /// 最终模型的存储文件名.
    #[arg(short, long, default_value = "out.bin")]
    model_filename: PathBuf,

    /// 随机种子. 相同种子与相同输入产生相同运行.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// 提高日志详细程度 (-v: info, -vv: debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    simple_logger::SimpleLogger::new().with_level(level).init().ok();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {e}");
            ExitCode::FAILURE
        }
    }
}

/// 数值选项的取值检查. clap 只保证解析出类型, 范围在这里把关,
/// 非法取值以普通错误报告而不是 panic.
fn check_train_options(cli: &Cli) -> Result<(), String> {
    if cli.components == 0 {
        return Err("components 必须为正".into());
    }
    if cli.epochs == 0 {
        return Err("epochs 必须为正".into());
    }
    if !(0.0..=1.0).contains(&cli.threshold) {
        return Err(format!("threshold 必须在 [0, 1] 内, 实际 {}", cli.threshold));
    }
    if cli.initial_size < 2 {
        return Err(format!("initial-size 至少为 2, 实际 {}", cli.initial_size));
    }
    if !(cli.learning_rate > 0.0 && cli.learning_rate <= 1.0) {
        return Err(format!(
            "learning-rate 必须在 (0, 1] 内, 实际 {}",
            cli.learning_rate
        ));
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let window = parse_window_code(&cli.window_size)
        .ok_or_else(|| format!("非法的窗口大小编码: {:?}", cli.window_size))?;
    check_train_options(cli)?;

    for folder in &cli.data_folders {
        if !folder.is_dir() {
            return Err(format!("{} 不是目录", folder.display()).into());
        }
    }

    // 读取预分割数据.
    let t0 = Instant::now();
    let raw_dataset = load_folders(&cli.data_folders)?;
    log::info!(
        "数据加载完成, 耗时 {:.3}s, 共 {} 个病人",
        t0.elapsed().as_secs_f64(),
        raw_dataset.len()
    );

    // 划分 patch.
    let t0 = Instant::now();
    let (patches, stats) = patch_volumes(&raw_dataset, window);
    log::info!("patch 划分完成, 耗时 {:.3}s", t0.elapsed().as_secs_f64());

    println!("patch 总数: {}", stats.total);
    if stats.total > 0 {
        println!(
            "背景 patch: {} ({:.2}%)",
            stats.per_class[0],
            stats.per_class[0] as f64 * 100.0 / stats.total as f64
        );
        println!(
            "前景 patch: {} ({:.2}%)",
            stats.per_class[1],
            stats.per_class[1] as f64 * 100.0 / stats.total as f64
        );
    }

    // 提取特征并组装全量矩阵.
    let t0 = Instant::now();
    let (records, feature_count) = extract_features(&patches, &cli.features)?;
    log::info!(
        "特征提取完成, 耗时 {:.3}s, 每 patch {feature_count} 个特征",
        t0.elapsed().as_secs_f64()
    );

    let (x, y) = build_matrix(&records)?;
    log::info!("全量矩阵形状 {:?}, 标签长度 {}", x.dim(), y.len());

    // 难样本挖掘训练循环.
    let spec = TrainSpec::new(
        cli.components,
        cli.epochs,
        cli.threshold,
        cli.initial_size,
        cli.learning_rate,
        cli.seed,
    );
    let outcome = spec.run(&x, &y)?;

    println!(
        "训练完成. epoch 总数: {}, 终止原因: {:?}",
        outcome.epochs(),
        outcome.termination
    );
    println!("{}", outcome.final_report);

    outcome.model.save(&cli.model_filename)?;
    println!("模型已写入 {}", cli.model_filename.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(extra: &[&str]) -> Cli {
        let mut args = vec!["trainer", "data"];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_options_pass_check() {
        assert!(check_train_options(&cli(&[])).is_ok());
    }

    #[test]
    fn test_threshold_one_is_legal() {
        // 阈值取 1.0 时收敛不可达, 但参数本身合法.
        assert!(check_train_options(&cli(&["-t", "1.0"])).is_ok());
    }

    #[test]
    fn test_out_of_range_options_are_rejected() {
        assert!(check_train_options(&cli(&["-t", "1.5"])).is_err());
        assert!(check_train_options(&cli(&["-t", "-0.1"])).is_err());
        assert!(check_train_options(&cli(&["-c", "0"])).is_err());
        assert!(check_train_options(&cli(&["-e", "0"])).is_err());
        assert!(check_train_options(&cli(&["-i", "1"])).is_err());
        assert!(check_train_options(&cli(&["-l", "0"])).is_err());
        assert!(check_train_options(&cli(&["-l", "1.5"])).is_err());
    }
}
