//! GPIO 管理器
//!
//! 安全地管理 GPIO 引脚的所有权，防止同一引脚被多个信号使用

use rppal::gpio::{Gpio, InputPin, OutputPin};
use std::collections::HashSet;
use thiserror::Error;

use crate::config::pins::{self, BoardConfig, ConfigError, MAX_BCM_PIN};

/// 已配置的板级引脚
///
/// 包含所有已配置的 GPIO 引脚，所有权已从管理器转移
pub struct BoardPins {
    /// LED 引脚，初始为低电平
    pub led: OutputPin,

    /// 复位引脚，初始为高电平
    pub reset: OutputPin,

    /// DIO0..DIO3，下拉输入
    pub dio: [InputPin; 4],

    pub switch: Option<InputPin>,
}

/// GPIO 管理器错误类型
#[derive(Debug, Error)]
pub enum GpioError {
    #[error("引脚 {0} 已被使用")]
    PinAlreadyUsed(u8),

    #[error("无效的引脚编号: {0}")]
    InvalidPin(u8),

    #[error("配置无效: {0}")]
    Config(#[from] ConfigError),

    #[error("GPIO 初始化失败: {0}")]
    GpioInit(#[from] rppal::gpio::Error),
}

/// 引脚占用记录
#[derive(Debug, Default)]
pub struct PinClaims {
    used_pins: HashSet<u8>,
}

impl PinClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记引脚为已使用
    ///
    /// # 返回
    /// * `Ok(())` - 引脚可用，已记录
    /// * `Err(GpioError)` - 引脚已被使用或无效
    pub fn claim(&mut self, pin_num: u8) -> Result<(), GpioError> {
        if pin_num > MAX_BCM_PIN {
            return Err(GpioError::InvalidPin(pin_num));
        }
        if !self.used_pins.insert(pin_num) {
            return Err(GpioError::PinAlreadyUsed(pin_num));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.used_pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used_pins.is_empty()
    }
}

/// GPIO 引脚管理器
///
/// 持有平台 GPIO 控制器，按配置取出引脚并设置模式（BCM 编号）。
pub struct GpioManager {
    gpio: Gpio,
    claims: PinClaims,
}

impl GpioManager {
    /// 创建新的 GPIO 管理器
    ///
    /// # 返回
    /// * `Ok(Self)` - 管理器创建成功
    /// * `Err(GpioError)` - 无法访问 /dev/gpiomem 等平台资源
    pub fn new() -> Result<Self, GpioError> {
        let gpio = Gpio::new()?;

        Ok(Self {
            gpio,
            claims: PinClaims::new(),
        })
    }

    /// 根据板级配置获取所有引脚
    ///
    /// LED 和 RST 配置为输出（LED 低，RST 高），
    /// DIO 线和按键配置为下拉输入。
    pub fn configure(mut self, config: &BoardConfig) -> Result<BoardPins, GpioError> {
        // 验证配置
        pins::validate_config(config)?;

        let p = &config.pins;
        let led = self.take_output(p.led, false)?;
        let reset = self.take_output(p.reset, true)?;
        let dio = [
            self.take_input(p.dio0)?,
            self.take_input(p.dio1)?,
            self.take_input(p.dio2)?,
            self.take_input(p.dio3)?,
        ];
        let switch = match p.switch {
            Some(pin) => Some(self.take_input(pin)?),
            None => None,
        };

        for (signal, pin) in p.assigned() {
            log::debug!("{signal}: GPIO{pin}");
        }
        log::info!("{} 的 {} 个引脚已配置", config.name, self.claims.len());

        Ok(BoardPins {
            led,
            reset,
            dio,
            switch,
        })
    }

    /// 获取输出引脚并设置初始电平
    pub fn take_output(&mut self, pin_num: u8, high: bool) -> Result<OutputPin, GpioError> {
        self.claims.claim(pin_num)?;
        let pin = self.gpio.get(pin_num)?;
        Ok(if high {
            pin.into_output_high()
        } else {
            pin.into_output_low()
        })
    }

    /// 获取下拉输入引脚
    pub fn take_input(&mut self, pin_num: u8) -> Result<InputPin, GpioError> {
        self.claims.claim(pin_num)?;
        Ok(self.gpio.get(pin_num)?.into_input_pulldown())
    }
}
