//! 板级配置模块
//!
//! 提供 SX127x 板卡的引脚、SPI 配置定义和 GPIO 管理器

pub mod pins;
pub mod manager;

// 重新导出常用类型
pub use manager::{BoardPins, GpioManager};
pub use pins::{BoardConfig, BoardRole, PinConfig, RfBand, Signal, SpiConfig};
