use anyhow::Context;
use cardsheet::config::cli::LogFormat;
use cardsheet::utils::{logger, validation::Validate};
use cardsheet::{
    BuildEngine, BuildOutcome, CliConfig, FsWatcher, LocalStorage, RebuildOrchestrator,
    CardPipeline, WatchFilter,
};
use clap::Parser;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting cardsheet");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 解析並驗證配置
    let settings = match cli.resolve().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Data dir: {}", settings.data_dir.display());
    tracing::debug!("Template dir: {}", settings.template_dir.display());

    let pipeline = CardPipeline::new(
        LocalStorage::new(&settings.data_dir),
        LocalStorage::new(&settings.template_dir),
        &settings,
    );
    let engine = BuildEngine::new(pipeline);

    if !settings.watch {
        match engine.run_guarded().await {
            BuildOutcome::Rendered(report) => {
                println!(
                    "✅ Rendered {} datasets on {} pages",
                    report.datasets, report.pages
                );
                println!("📁 Output saved to: {}", report.output_path.display());
                return Ok(());
            }
            BuildOutcome::ErrorPage { message, report } => {
                eprintln!("❌ {}", message);
                eprintln!("📁 Error page written to: {}", report.output_path.display());
                std::process::exit(2);
            }
            BuildOutcome::Failed { message } => {
                eprintln!("❌ {}", message);
                std::process::exit(3);
            }
        }
    }

    // 先註冊監看，避免初次建置期間的變更遺失
    let (tx, rx) = mpsc::channel(100);
    let filter = WatchFilter::new(&settings.data_dir, &settings.template_dir)
        .ignoring([settings.output_file.clone(), settings.stylesheet_file()]);
    let _watcher = FsWatcher::start(filter, tx).context("failed to watch for file changes")?;

    let orchestrator = RebuildOrchestrator::new(engine);

    tokio::select! {
        stats = orchestrator.run(rx) => {
            tracing::info!(
                "Watcher stopped after {} builds ({} failed)",
                stats.builds,
                stats.failed_builds
            );
        }
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            tracing::info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
