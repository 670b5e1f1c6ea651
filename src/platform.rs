//! 树莓派平台绑定
//!
//! 用 rppal 的引脚、延时和 SPI 实例化 [`Board`]。

use rppal::gpio::{InputPin, OutputPin};
use rppal::hal::Delay;
use rppal::spi::Spi;

use crate::board::{Board, BoardError};
use crate::config::{BoardConfig, GpioManager};
use crate::spi;

/// 树莓派上的 SX127x 板卡
pub type RpiBoard = Board<OutputPin, OutputPin, InputPin, Delay, Spi>;

impl RpiBoard {
    /// 按配置取出并设置全部引脚（BCM 编号）
    ///
    /// 不执行 `setup()`，调用方决定何时闪烁 LED。
    pub fn open(config: &BoardConfig) -> Result<Self, BoardError> {
        let pins = GpioManager::new()?.configure(config)?;

        Ok(Board::new(
            *config,
            pins.led,
            pins.reset,
            pins.dio,
            pins.switch,
            Delay::new(),
        ))
    }

    /// 初始化并返回 SPI 句柄
    ///
    /// 第一次调用时打开设备，之后返回同一个句柄。
    pub fn spi_dev(&mut self) -> Result<&mut Spi, BoardError> {
        self.spi_or_open(|config| spi::open(&config.spi))
    }
}
