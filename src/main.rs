use clap::{Arg, ArgAction, Command};
use rustgrid::core::config::{ApiKeys, BotConfig};
use rustgrid::exchanges::BinanceFutures;
use rustgrid::strategy::{CycleOutcome, TradingController};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载环境变量
    dotenv::dotenv().ok();

    // 解析命令行参数
    let matches = Command::new("RustGrid")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Binance期货网格交易机器人")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径")
                .default_value("config/grid.yaml"),
        )
        .arg(
            Arg::new("auto")
                .long("auto")
                .action(ArgAction::SetTrue)
                .help("启动后立即开启自动交易"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .action(ArgAction::SetTrue)
                .help("只执行一个交易周期后退出"),
        )
        .get_matches();

    let config_file = matches.get_one::<String>("config").expect("有默认值");
    let config = BotConfig::from_file(config_file).unwrap_or_else(|e| {
        eprintln!("⚠️ 加载配置 {} 失败({})，使用默认配置", config_file, e);
        BotConfig::default()
    });

    // 从配置设置日志级别
    std::env::set_var("RUST_LOG", &config.strategy.log_level);
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.strategy.log_level),
    )
    .init();

    config.params.validate()?;
    log::info!(
        "启动网格策略: {} @ {} (间隔 {}s)",
        config.strategy.symbol,
        config.strategy.interval,
        config.params.auto_trade_interval_secs
    );

    let api_keys = ApiKeys::from_env("BINANCE")?;
    let exchange = Arc::new(BinanceFutures::new(api_keys));
    let controller = Arc::new(TradingController::new(exchange, &config));

    if matches.get_flag("once") {
        match controller.run_cycle().await {
            Ok(CycleOutcome::Completed(report)) => {
                log::info!(
                    "✅ 周期完成: 挂单 {} 笔, 失败 {} 笔, 清理过期 {} 笔",
                    report.placed,
                    report.failures.len(),
                    report.cancelled_stale
                );
            }
            Ok(outcome) => log::info!("周期结果: {:?}", outcome),
            Err(e) => log::error!("❌ 周期失败: {}", e),
        }
        return Ok(());
    }

    if matches.get_flag("auto") {
        controller.toggle_auto_trading().await;
        log::info!("✅ 自动交易已开启");
    } else {
        log::info!("自动交易未开启，等待外部指令或Ctrl-C退出");
    }

    tokio::signal::ctrl_c().await?;
    log::info!("收到退出信号，停止调度...");
    controller.shutdown().await;
    log::info!("🛑 已退出");

    Ok(())
}
