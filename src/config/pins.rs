//! 引脚配置定义
//!
//! 定义 SX127x 板卡使用的 GPIO 引脚、SPI 参数和射频频段。
//! 所有引脚编号使用 BCM 编号（不是排针物理位置）。

use std::fmt;
use thiserror::Error;

/// 树莓派 40 针排针上可用的最大 BCM GPIO 编号
pub const MAX_BCM_PIN: u8 = 27;

/// SX127x SPI 时钟上限 (10MHz)
pub const SX127X_MAX_SPI_HZ: u32 = 10_000_000;

/// 默认 SPI 时钟，取上限的一半
pub const DEFAULT_SPI_HZ: u32 = 5_000_000;

/// 板上的逻辑信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Dio0,
    Dio1,
    Dio2,
    Dio3,
    Reset,
    Led,
    Switch,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Dio0 => "DIO0",
            Signal::Dio1 => "DIO1",
            Signal::Dio2 => "DIO2",
            Signal::Dio3 => "DIO3",
            Signal::Reset => "RST",
            Signal::Led => "LED",
            Signal::Switch => "SWITCH",
        };
        f.pad(name)
    }
}

/// 引脚配置结构体
///
/// 包含射频模块和板载外设使用的 GPIO 引脚编号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    /// DIO0 中断线
    pub dio0: u8,
    pub dio1: u8,
    pub dio2: u8,
    pub dio3: u8,

    /// 射频模块复位引脚（低电平有效）
    pub reset: u8,

    /// LED 引脚，串联 1kΩ 或 330Ω 电阻
    pub led: u8,

    /// 可选的按键输入
    pub switch: Option<u8>,
}

impl PinConfig {
    /// 获取某个信号对应的引脚
    pub fn pin(&self, signal: Signal) -> Option<u8> {
        match signal {
            Signal::Dio0 => Some(self.dio0),
            Signal::Dio1 => Some(self.dio1),
            Signal::Dio2 => Some(self.dio2),
            Signal::Dio3 => Some(self.dio3),
            Signal::Reset => Some(self.reset),
            Signal::Led => Some(self.led),
            Signal::Switch => self.switch,
        }
    }

    /// 列出所有已分配的 (信号, 引脚)
    pub fn assigned(&self) -> Vec<(Signal, u8)> {
        [
            Signal::Dio0,
            Signal::Dio1,
            Signal::Dio2,
            Signal::Dio3,
            Signal::Reset,
            Signal::Led,
            Signal::Switch,
        ]
        .into_iter()
        .filter_map(|signal| self.pin(signal).map(|pin| (signal, pin)))
        .collect()
    }
}

/// SPI 总线配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    /// SPI 总线编号，对应 /dev/spidev<bus>.<cs>
    pub bus: u8,
    /// 片选编号
    pub chip_select: u8,
    pub max_speed_hz: u32,
}

impl fmt::Display for SpiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/dev/spidev{}.{} @ {}Hz",
            self.bus, self.chip_select, self.max_speed_hz
        )
    }
}

/// 射频模块使用的频段
///
/// 低频段 (band 1&2): 137-175MHz 和 410-525MHz，使用 RF*_LF 引脚；
/// 高频段 (band 3): 862-1020MHz，使用 RF*_HF 引脚。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfBand {
    Low,
    High,
}

impl RfBand {
    /// 频段包含的频率范围 (MHz)
    pub fn ranges_mhz(&self) -> &'static [(f64, f64)] {
        match self {
            RfBand::Low => &[(137.0, 175.0), (410.0, 525.0)],
            RfBand::High => &[(862.0, 1020.0)],
        }
    }

    pub fn contains_mhz(&self, freq_mhz: f64) -> bool {
        self.ranges_mhz()
            .iter()
            .any(|&(low, high)| freq_mhz >= low && freq_mhz <= high)
    }

    pub fn is_low(&self) -> bool {
        matches!(self, RfBand::Low)
    }
}

/// 部署角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardRole {
    Server,
    Client,
}

impl BoardRole {
    /// 返回该角色对应的板级配置
    pub fn config(&self) -> &'static BoardConfig {
        match self {
            BoardRole::Server => &SERVER_BOARD,
            BoardRole::Client => &CLIENT_BOARD,
        }
    }
}

/// 完整的板级配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardConfig {
    pub name: &'static str,
    pub role: BoardRole,
    pub pins: PinConfig,
    pub spi: SpiConfig,
    pub band: RfBand,
}

const RA02_PINS: PinConfig = PinConfig {
    dio0: 4,
    dio1: 17,
    dio2: 18,
    dio3: 27,
    reset: 22,
    led: 13,
    switch: None,
};

const RA02_SPI: SpiConfig = SpiConfig {
    bus: 0,
    chip_select: 0,
    max_speed_hz: DEFAULT_SPI_HZ,
};

/// 服务端板卡：树莓派 3B，一个 LED、传感器和 Ra-02 LoRa 模块
///
/// - DIO0: GPIO4
/// - DIO1: GPIO17
/// - DIO2: GPIO18
/// - DIO3: GPIO27
/// - RST: GPIO22
/// - LED: GPIO13
/// - SPI: 总线 0，片选 0，5MHz
pub const SERVER_BOARD: BoardConfig = BoardConfig {
    name: "server (Raspberry Pi 3B + Ra-02)",
    role: BoardRole::Server,
    pins: RA02_PINS,
    spi: RA02_SPI,
    band: RfBand::Low,
};

/// 客户端板卡：树莓派，一个 LED 和 Ra-02 LoRa 模块
///
/// 引脚分配与服务端相同。
pub const CLIENT_BOARD: BoardConfig = BoardConfig {
    name: "client (Raspberry Pi + Ra-02)",
    role: BoardRole::Client,
    pins: RA02_PINS,
    spi: RA02_SPI,
    band: RfBand::Low,
};

/// 配置校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("引脚 {pin} 同时被 {first} 和 {second} 使用")]
    DuplicatePin { pin: u8, first: Signal, second: Signal },

    #[error("{signal} 的引脚 {pin} 不是有效的 BCM GPIO (0..=27)")]
    InvalidPin { signal: Signal, pin: u8 },

    #[error("无效的 SPI 总线: {0}")]
    InvalidSpiBus(u8),

    #[error("无效的 SPI 片选: {0}")]
    InvalidChipSelect(u8),

    #[error("SPI 时钟 {0}Hz 超出范围 (1..=10000000)")]
    InvalidSpiSpeed(u32),
}

/// 验证板级配置的有效性
///
/// # 参数
/// * `config` - 要验证的板级配置
///
/// # 返回
/// * `Ok(())` - 配置有效
/// * `Err(ConfigError)` - 第一个发现的问题
pub fn validate_config(config: &BoardConfig) -> Result<(), ConfigError> {
    let pins = config.pins.assigned();

    for &(signal, pin) in &pins {
        if pin > MAX_BCM_PIN {
            return Err(ConfigError::InvalidPin { signal, pin });
        }
    }

    // 检查是否有重复的引脚
    for i in 0..pins.len() {
        for j in (i + 1)..pins.len() {
            if pins[i].1 == pins[j].1 {
                return Err(ConfigError::DuplicatePin {
                    pin: pins[i].1,
                    first: pins[i].0,
                    second: pins[j].0,
                });
            }
        }
    }

    let spi = &config.spi;
    if spi.bus > 6 {
        return Err(ConfigError::InvalidSpiBus(spi.bus));
    }
    if spi.chip_select > 2 {
        return Err(ConfigError::InvalidChipSelect(spi.chip_select));
    }
    if spi.max_speed_hz == 0 || spi.max_speed_hz > SX127X_MAX_SPI_HZ {
        return Err(ConfigError::InvalidSpiSpeed(spi.max_speed_hz));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_boards_are_valid() {
        assert_eq!(validate_config(&SERVER_BOARD), Ok(()));
        assert_eq!(validate_config(&CLIENT_BOARD), Ok(()));
    }

    #[test]
    fn test_ra02_pin_assignment() {
        let pins = SERVER_BOARD.pins;
        assert_eq!(pins.pin(Signal::Dio0), Some(4));
        assert_eq!(pins.pin(Signal::Dio1), Some(17));
        assert_eq!(pins.pin(Signal::Dio2), Some(18));
        assert_eq!(pins.pin(Signal::Dio3), Some(27));
        assert_eq!(pins.pin(Signal::Reset), Some(22));
        assert_eq!(pins.pin(Signal::Led), Some(13));
        assert_eq!(pins.pin(Signal::Switch), None);

        assert_eq!(CLIENT_BOARD.pins, SERVER_BOARD.pins);
        assert_eq!(SERVER_BOARD.spi.max_speed_hz, 5_000_000);
        assert_eq!(SERVER_BOARD.spi.bus, 0);
        assert_eq!(SERVER_BOARD.spi.chip_select, 0);
        assert!(SERVER_BOARD.band.is_low());
    }

    #[test]
    fn test_role_lookup() {
        assert_eq!(BoardRole::Server.config().role, BoardRole::Server);
        assert_eq!(BoardRole::Client.config().role, BoardRole::Client);
    }

    #[test]
    fn test_assigned_skips_missing_switch() {
        let assigned = SERVER_BOARD.pins.assigned();
        assert_eq!(assigned.len(), 6);
        assert!(assigned.iter().all(|(signal, _)| *signal != Signal::Switch));

        let mut config = SERVER_BOARD;
        config.pins.switch = Some(23);
        assert_eq!(config.pins.assigned().len(), 7);
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let mut config = CLIENT_BOARD;
        // 按键和 DIO0 共用 GPIO4（早期接线方式）
        config.pins.switch = Some(4);
        assert_eq!(
            validate_config(&config),
            Err(ConfigError::DuplicatePin {
                pin: 4,
                first: Signal::Dio0,
                second: Signal::Switch,
            })
        );
    }

    #[test]
    fn test_out_of_range_pin_rejected() {
        let mut config = SERVER_BOARD;
        config.pins.led = 40;
        assert_eq!(
            validate_config(&config),
            Err(ConfigError::InvalidPin {
                signal: Signal::Led,
                pin: 40,
            })
        );
    }

    #[test]
    fn test_spi_limits() {
        let mut config = SERVER_BOARD;
        config.spi.max_speed_hz = SX127X_MAX_SPI_HZ;
        assert_eq!(validate_config(&config), Ok(()));

        config.spi.max_speed_hz = SX127X_MAX_SPI_HZ + 1;
        assert_eq!(
            validate_config(&config),
            Err(ConfigError::InvalidSpiSpeed(SX127X_MAX_SPI_HZ + 1))
        );

        config.spi.max_speed_hz = 0;
        assert_eq!(validate_config(&config), Err(ConfigError::InvalidSpiSpeed(0)));

        let mut config = SERVER_BOARD;
        config.spi.bus = 7;
        assert_eq!(validate_config(&config), Err(ConfigError::InvalidSpiBus(7)));

        let mut config = SERVER_BOARD;
        config.spi.chip_select = 3;
        assert_eq!(validate_config(&config), Err(ConfigError::InvalidChipSelect(3)));
    }

    #[test]
    fn test_band_ranges() {
        assert!(RfBand::Low.contains_mhz(433.0));
        assert!(RfBand::Low.contains_mhz(137.0));
        assert!(!RfBand::Low.contains_mhz(868.0));
        assert!(RfBand::High.contains_mhz(868.0));
        assert!(RfBand::High.contains_mhz(915.0));
        assert!(!RfBand::High.contains_mhz(433.0));
    }

    #[test]
    fn test_band_edges_inclusive() {
        for freq in [137.0, 175.0, 410.0, 525.0] {
            assert!(RfBand::Low.contains_mhz(freq), "{freq}MHz 应属于低频段");
        }
        for freq in [136.9, 175.1, 409.9, 525.1] {
            assert!(!RfBand::Low.contains_mhz(freq), "{freq}MHz 不属于低频段");
        }
        for freq in [862.0, 1020.0] {
            assert!(RfBand::High.contains_mhz(freq), "{freq}MHz 应属于高频段");
        }
        for freq in [861.9, 1020.1] {
            assert!(!RfBand::High.contains_mhz(freq), "{freq}MHz 不属于高频段");
        }
    }

    #[test]
    fn test_highest_bcm_pin() {
        let mut config = SERVER_BOARD;
        config.pins.dio3 = 5;
        config.pins.led = MAX_BCM_PIN;
        assert_eq!(validate_config(&config), Ok(()));

        config.pins.led = MAX_BCM_PIN + 1;
        assert_eq!(
            validate_config(&config),
            Err(ConfigError::InvalidPin {
                signal: Signal::Led,
                pin: 28,
            })
        );
    }

    #[test]
    fn test_spi_display() {
        assert_eq!(SERVER_BOARD.spi.to_string(), "/dev/spidev0.0 @ 5000000Hz");
    }
}
