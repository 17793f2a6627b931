use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lyric_stage::app::App;
use lyric_stage::config::Config;

/// 终端歌词同步播放器
#[derive(Parser, Debug)]
#[command(name = "lyric-stage", version, about)]
struct Args {
    /// 音频文件
    file: PathBuf,

    /// 配置文件路径
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 指定歌词文件，优先于其他来源
    #[arg(long)]
    lrc: Option<PathBuf>,

    /// 简单输出模式：只打印当前歌词行
    #[arg(long)]
    simple: bool,

    /// 以 JSON 输出当前歌词行（隐含 --simple）
    #[arg(long)]
    json: bool,

    /// 输出调试日志
    #[arg(long, short = 'd')]
    debug: bool,

    /// 加载后不自动播放
    #[arg(long)]
    no_autoplay: bool,
}

/// 日志文件路径（TUI 模式下日志不能写到终端）
fn log_file_path() -> PathBuf {
    let pkg_name = env!("CARGO_PKG_NAME");
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(pkg_name)
        .join(format!("{}.log", pkg_name))
}

fn init_logging(debug: bool, to_file: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lyric_stage={}", level)));
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        let path = log_file_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("无法打开日志文件 {:?}", path))?;
        registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 配置加载早于日志初始化，加载过程中的日志不会输出
    let cli_simple = args.simple || args.json;
    let mut config = Config::load(args.config.clone()).unwrap_or_else(|e| {
        eprintln!("加载配置失败，使用默认配置: {}", e);
        Config::default()
    });

    if cli_simple {
        config.display.simple_output = true;
    }
    if args.json {
        config.display.json_output = true;
    }
    if args.no_autoplay {
        config.player.autoplay = false;
    }
    config.normalize();

    init_logging(args.debug, config.display.enable_tui)?;
    info!("Lyric Stage 启动: {:?}", args.file);
    debug!("配置: {:?}", config);

    let mut app = App::new(Arc::new(config), args.lrc);
    app.run(args.file).await
}
