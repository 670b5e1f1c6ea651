use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use sx127x_board::config::{BoardConfig, BoardRole, Signal};
use sx127x_board::{configure_board, DioCallbacks, DioLine, RpiBoard};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Role {
    Server,
    Client,
}

impl From<Role> for BoardRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Server => BoardRole::Server,
            Role::Client => BoardRole::Client,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LedState {
    On,
    Off,
}

#[derive(Parser, Debug)]
#[command(name = "sx127x-board", about = "SX127x LoRa 板卡工具")]
struct Cli {
    /// 板卡角色
    #[arg(long, value_enum, default_value_t = Role::Server)]
    role: Role,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 打印板级配置，不访问硬件
    Show,
    #[command(flatten)]
    Board(BoardCommand),
}

/// 需要打开板卡的子命令
#[derive(Subcommand, Debug)]
enum BoardCommand {
    /// 初始化后立即清理
    Setup,
    /// 设置 LED
    Led {
        #[arg(value_enum)]
        state: LedState,
        /// 保持时间，结束后清理板卡
        #[arg(long, default_value_t = 1000)]
        hold_ms: u64,
    },
    /// 闪烁 LED
    Blink {
        #[arg(long, default_value_t = 100)]
        period_ms: u64,
        #[arg(long, default_value_t = 2)]
        count: u32,
    },
    /// 复位射频模块
    Reset,
    /// 监听 DIO 中断并打印，Ctrl+C 结束
    Watch {
        /// 运行时长，0 表示一直运行
        #[arg(long, default_value_t = 0)]
        seconds: u64,
        /// 只监听指定的 DIO 线 (0..=3)，可重复；默认全部
        #[arg(long = "dio", value_name = "N")]
        dio: Vec<u8>,
    },
}

fn show(config: &BoardConfig) {
    println!("{}", config.name);
    for (signal, pin) in config.pins.assigned() {
        println!("  {signal:<6} GPIO{pin}");
    }
    println!("  SPI    {}", config.spi);
    println!("  band   {:?} {:?}MHz", config.band, config.band.ranges_mhz());
}

fn open_board(config: &BoardConfig) -> Result<RpiBoard> {
    Ok(configure_board!(config))
}

/// 等待直到 `running` 被清除或超过 `limit`
fn wait_while_running(running: &AtomicBool, limit: Option<Duration>, poll: Duration) {
    let start = Instant::now();
    while running.load(Ordering::SeqCst) {
        if limit.is_some_and(|limit| start.elapsed() >= limit) {
            break;
        }
        sleep(poll);
    }
}

fn ctrlc_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("收到退出信号，正在停止...");
        running.store(false, Ordering::SeqCst);
    })
    .context("设置 Ctrl+C 处理函数失败")
}

fn watch(board: &mut RpiBoard, seconds: u64, dio: &[u8]) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    board.setup()?;
    board.spi_dev()?;

    let events = Arc::new(AtomicU64::new(0));
    let counter = events.clone();
    let handler = move |signal: Signal| {
        let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!("#{n} {signal} 上升沿");
    };

    if dio.is_empty() {
        board.add_events(DioCallbacks::shared(handler))?;
        log::info!("正在监听 DIO0..DIO3");
    } else {
        for &n in dio {
            let line = DioLine::try_from(n)?;
            board.add_event_detect(line, Box::new(handler.clone()))?;
            log::info!("正在监听 {}", line.signal());
        }
    }

    let limit = (seconds > 0).then(|| Duration::from_secs(seconds));
    wait_while_running(&running, limit, Duration::from_millis(200));
    log::info!("共收到 {} 个中断", events.load(Ordering::Relaxed));
    Ok(())
}

fn drive(mut board: RpiBoard, command: BoardCommand) -> Result<()> {
    let result: Result<()> = match command {
        BoardCommand::Setup => board.setup().map_err(Into::into),
        BoardCommand::Led { state, hold_ms } => board
            .set_led(matches!(state, LedState::On))
            .map(|on| {
                log::info!("LED: {}", if on { "on" } else { "off" });
                sleep(Duration::from_millis(hold_ms));
            })
            .map_err(Into::into),
        BoardCommand::Blink { period_ms, count } => board
            .blink(Duration::from_millis(period_ms), count)
            .map_err(Into::into),
        BoardCommand::Reset => board
            .reset()
            .map(|()| log::info!("射频模块已复位"))
            .map_err(Into::into),
        BoardCommand::Watch { seconds, dio } => watch(&mut board, seconds, &dio),
    };

    // 命令失败时也要清理板卡
    let teardown = board.teardown();
    result?;
    teardown?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = BoardRole::from(cli.role).config();

    match cli.command {
        Command::Show => {
            show(config);
            Ok(())
        }
        Command::Board(command) => drive(open_board(config)?, command),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
