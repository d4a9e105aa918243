/// 过线计数 (Traffic Flow Counter)
///
/// 回放检测/跟踪结果, 统计穿过参考线的唯一目标数量 (按类别)
///
/// 系统架构:
/// 1. 读取线程: 解析检测记录 (独立工作线程)
/// 2. 计数线程: 中心点 → 区域判断 → 去重计数 → 报告 (主线程)
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};

use traffic_flow_counter::input::spawn_reader;
use traffic_flow_counter::{
    Args, ClassNames, ConsoleSink, CountingPipeline, JsonLinesSink, MultiSink, ObservationSource,
    ReplaySource, Termination,
};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .init();

    run(args)
}

fn run(args: Args) -> Result<()> {
    let config = args
        .counting_config()
        .context("invalid counting configuration")?;

    let names = match &args.names {
        Some(arg) => ClassNames::from_arg(arg).context("failed to load class names")?,
        None => ClassNames::default(),
    };
    info!("{} class names loaded", names.len());

    let mut replay = ReplaySource::open(&args.detections, names)
        .with_context(|| format!("failed to open {}", args.detections.display()))?;
    if let Some(height) = args.frame_height {
        replay = replay.with_default_height(height);
    }
    let stream = replay.stream_info();

    let mut sink = MultiSink::new().with(ConsoleSink::stdout(!args.quiet));
    if let Some(path) = &args.events {
        let events = JsonLinesSink::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        sink.push(events);
    }

    let mut pipeline = CountingPipeline::from_config(&config, stream.as_ref(), sink)
        .context("cannot place the counting line (pass --line-position or --frame-height)")?;

    let (mut source, reader) =
        spawn_reader(replay, args.queue.max(1)).context("failed to start reader thread")?;
    let summary = pipeline.run(&mut source);

    // 关闭接收端, 读取线程随之退出
    drop(source);
    if reader.join().is_err() {
        warn!("reader thread panicked");
    }

    if let Termination::SourceFailed(reason) = &summary.termination {
        warn!("input ended early ({}), counts above are final", reason);
    }

    if let Some(path) = &args.report {
        summary
            .report
            .save_json(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        info!("report saved to {}", path.display());
    }

    Ok(())
}
