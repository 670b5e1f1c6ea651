//! SX127x LoRa 模块的板级支持
//!
//! 引脚分配、SPI 参数、中断回调注册以及 LED/复位等简单操作。
//! 射频寄存器协议不在本 crate 范围内。

pub mod board;
pub mod config;
pub mod dio;
pub mod platform;
pub mod spi;

mod macros;

pub use board::{Board, BoardError};
pub use config::pins::{CLIENT_BOARD, SERVER_BOARD};
pub use dio::{DioCallbacks, DioLine};
pub use platform::RpiBoard;
