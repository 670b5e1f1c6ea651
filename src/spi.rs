//! SPI 设备句柄
//!
//! 打开 /dev/spidev<bus>.<cs>。SX127x 使用 mode 0、MSB 在前。

use rppal::spi::{BitOrder, Bus, Mode, SlaveSelect, Spi};

use crate::config::pins::ConfigError;
use crate::config::SpiConfig;

pub fn bus_for(bus: u8) -> Result<Bus, ConfigError> {
    match bus {
        0 => Ok(Bus::Spi0),
        1 => Ok(Bus::Spi1),
        2 => Ok(Bus::Spi2),
        3 => Ok(Bus::Spi3),
        4 => Ok(Bus::Spi4),
        5 => Ok(Bus::Spi5),
        6 => Ok(Bus::Spi6),
        _ => Err(ConfigError::InvalidSpiBus(bus)),
    }
}

pub fn slave_select_for(cs: u8) -> Result<SlaveSelect, ConfigError> {
    match cs {
        0 => Ok(SlaveSelect::Ss0),
        1 => Ok(SlaveSelect::Ss1),
        2 => Ok(SlaveSelect::Ss2),
        _ => Err(ConfigError::InvalidChipSelect(cs)),
    }
}

/// 打开 SPI 设备
///
/// # 返回
/// * `Ok(Spi)` - 已按 `max_speed_hz` 配置好的句柄，drop 时关闭
/// * `Err(BoardError)` - 配置无效或设备无法打开
pub fn open(config: &SpiConfig) -> Result<Spi, crate::board::BoardError> {
    let bus = bus_for(config.bus)?;
    let slave_select = slave_select_for(config.chip_select)?;

    let spi = Spi::new(bus, slave_select, config.max_speed_hz, Mode::Mode0)?;
    spi.set_bit_order(BitOrder::MsbFirst)?;

    log::info!("SPI 已打开: {config}");
    Ok(spi)
}
