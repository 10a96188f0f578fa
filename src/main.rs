// ==========================================
// 资源分配优化器 - 命令行入口
// ==========================================
// 用法: allocation-optimizer <graph.json> [config.json] [trace.csv]
// 输出: 结果 JSON 打印到标准输出；指定时写出全量轨迹 CSV
// ==========================================

use allocation_optimizer::importer::JsonGraphFile;
use allocation_optimizer::{logging, Optimizer, OptimizerConfig, APP_NAME, VERSION};
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 3 {
        bail!("用法: allocation-optimizer <graph.json> [config.json] [trace.csv]");
    }

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let config = match args.get(1) {
        Some(path) => OptimizerConfig::from_file(path.as_ref())?,
        None => OptimizerConfig::default(),
    }
    .apply_env_overrides();

    let mut optimizer = Optimizer::new(config).context("优化器初始化失败")?;
    optimizer
        .ingest_from(&JsonGraphFile(PathBuf::from(&args[0])))
        .context("输入图导入失败")?;

    let output = optimizer.get_output().await.context("求解失败")?;
    println!("{}", output.to_json_pretty()?);

    if let Some(path) = args.get(2) {
        let file = File::create(path).with_context(|| format!("无法创建轨迹文件 {}", path))?;
        output.full_trace.write_csv(file)?;
        tracing::info!(path = %path, rows = output.full_trace.len(), "轨迹已写出");
    }

    Ok(())
}
