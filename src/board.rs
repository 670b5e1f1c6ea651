//! 板卡初始化、清理和简单执行操作
//!
//! `Board` 只依赖 embedded-hal 的 `OutputPin` / `DelayNs` 和本 crate 的
//! `EdgeInterrupt`，树莓派上的具体类型见 [`crate::platform`]。

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use std::time::Duration;
use thiserror::Error;

use crate::config::manager::GpioError;
use crate::config::pins::ConfigError;
use crate::config::{BoardConfig, Signal};
use crate::dio::{DioCallback, DioCallbacks, DioLine, EdgeInterrupt, SWITCH_DEBOUNCE};

/// 复位脉冲的低电平时间和复位后的等待时间
pub const RESET_PULSE: Duration = Duration::from_millis(10);

/// 初始化完成时的闪烁参数
pub const SETUP_BLINK_PERIOD: Duration = Duration::from_millis(100);
pub const SETUP_BLINK_COUNT: u32 = 2;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{signal} 引脚操作失败: {detail}")]
    Pin { signal: Signal, detail: String },

    #[error("GPIO 错误: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("GPIO 配置失败: {0}")]
    Manager(#[from] GpioError),

    #[error("SPI 错误: {0}")]
    Spi(#[from] rppal::spi::Error),

    #[error("配置无效: {0}")]
    Config(#[from] ConfigError),

    #[error("DIO{0} 在本板上没有连线")]
    DioNotRouted(u8),

    #[error("无效的 DIO 编号: {0}")]
    InvalidDio(u8),

    #[error("板上没有配置按键引脚")]
    SwitchNotConfigured,
}

/// SX127x 板卡
///
/// * `LED`, `RST` - 输出引脚
/// * `IRQ` - DIO 和按键输入
/// * `D` - 延时
/// * `S` - SPI 句柄，由调用方打开后挂到板卡上
pub struct Board<LED, RST, IRQ, D, S> {
    config: BoardConfig,
    led: LED,
    reset: RST,
    dio: [IRQ; 4],
    switch: Option<IRQ>,
    delay: D,
    spi: Option<S>,
}

impl<LED, RST, IRQ, D, S> Board<LED, RST, IRQ, D, S>
where
    LED: OutputPin,
    RST: OutputPin,
    IRQ: EdgeInterrupt,
    D: DelayNs,
{
    pub fn new(
        config: BoardConfig,
        led: LED,
        reset: RST,
        dio: [IRQ; 4],
        switch: Option<IRQ>,
        delay: D,
    ) -> Self {
        Self {
            config,
            led,
            reset,
            dio,
            switch,
            delay,
            spi: None,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// 初始化板卡
    ///
    /// LED 拉低，RST 拉高，然后闪烁两次表示初始化完成。
    pub fn setup(&mut self) -> Result<(), BoardError> {
        self.write_led(false)?;
        self.write_reset(true)?;
        self.blink(SETUP_BLINK_PERIOD, SETUP_BLINK_COUNT)?;
        log::info!("{} 初始化完成", self.config.name);
        Ok(())
    }

    /// 清理板卡
    ///
    /// 取消所有中断回调，关闭 LED 和 SPI。引脚在 drop 时由平台恢复。
    ///
    /// 某一步失败时仍执行其余步骤，返回第一个错误。
    pub fn teardown(mut self) -> Result<(), BoardError> {
        let mut first_err = None;

        for irq in self.dio.iter_mut().chain(self.switch.as_mut()) {
            if let Err(e) = irq.unlisten() {
                log::warn!("取消中断失败: {e}");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        if let Err(e) = self.write_led(false) {
            log::warn!("关闭 LED 失败: {e}");
            if first_err.is_none() {
                first_err = Some(e);
            }
        }
        if self.spi.take().is_some() {
            log::debug!("SPI {} 已关闭", self.config.spi);
        }

        match first_err {
            Some(e) => Err(e),
            None => {
                log::info!("{} 已清理", self.config.name);
                Ok(())
            }
        }
    }

    /// 挂载已打开的 SPI 句柄，替换旧句柄
    pub fn attach_spi(&mut self, spi: S) -> &mut S {
        self.spi.insert(spi)
    }

    pub fn spi(&mut self) -> Option<&mut S> {
        self.spi.as_mut()
    }

    /// 返回已挂载的 SPI 句柄，没有时用 `open` 打开并挂载
    pub fn spi_or_open<E, F>(&mut self, open: F) -> Result<&mut S, E>
    where
        F: FnOnce(&BoardConfig) -> Result<S, E>,
    {
        let spi = match self.spi.take() {
            Some(spi) => spi,
            None => open(&self.config)?,
        };
        Ok(self.spi.insert(spi))
    }

    /// 为某条 DIO 线注册上升沿回调
    pub fn add_event_detect(&mut self, line: DioLine, mut callback: DioCallback) -> Result<(), BoardError> {
        let signal = line.signal();
        self.dio[line.index()].listen_rising(None, Box::new(move || callback(signal)))?;
        log::debug!(
            "{signal} (GPIO{}) 上升沿中断已注册",
            self.config.pins.pin(signal).unwrap_or_default()
        );
        Ok(())
    }

    /// 注册 DIO0..DIO3 以及可选的按键回调
    pub fn add_events(&mut self, callbacks: DioCallbacks) -> Result<(), BoardError> {
        let (lines, switch_cb) = callbacks.into_lines();

        // 先检查按键，避免注册到一半失败
        if switch_cb.is_some() && self.switch.is_none() {
            return Err(BoardError::SwitchNotConfigured);
        }

        for (line, callback) in lines {
            self.add_event_detect(line, callback)?;
        }

        if let (Some(mut callback), Some(switch)) = (switch_cb, self.switch.as_mut()) {
            switch.listen_rising(
                Some(SWITCH_DEBOUNCE),
                Box::new(move || callback(Signal::Switch)),
            )?;
            log::debug!("按键中断已注册，去抖 {SWITCH_DEBOUNCE:?}");
        }
        Ok(())
    }

    /// 设置 LED 状态并返回写入的值
    pub fn set_led(&mut self, on: bool) -> Result<bool, BoardError> {
        self.write_led(on)?;
        Ok(on)
    }

    pub fn led_on(&mut self) -> Result<(), BoardError> {
        self.write_led(true)
    }

    pub fn led_off(&mut self) -> Result<(), BoardError> {
        self.write_led(false)
    }

    /// 闪烁 LED
    ///
    /// `count` 为 0 时不做任何操作；结束时 LED 保持熄灭。
    pub fn blink(&mut self, period: Duration, count: u32) -> Result<(), BoardError> {
        if count == 0 {
            return Ok(());
        }
        self.led_on()?;
        for _ in 0..count {
            self.wait(period);
            self.led_off()?;
            self.wait(period);
            self.led_on()?;
        }
        self.led_off()
    }

    /// 手动复位射频模块：RST 拉低 10ms 再拉高，等待 10ms
    pub fn reset(&mut self) -> Result<(), BoardError> {
        log::debug!("复位射频模块");
        self.write_reset(false)?;
        self.wait(RESET_PULSE);
        self.write_reset(true)?;
        self.wait(RESET_PULSE);
        Ok(())
    }

    fn write_led(&mut self, on: bool) -> Result<(), BoardError> {
        self.led
            .set_state(PinState::from(on))
            .map_err(|e| BoardError::Pin {
                signal: Signal::Led,
                detail: format!("{e:?}"),
            })
    }

    fn write_reset(&mut self, high: bool) -> Result<(), BoardError> {
        self.reset
            .set_state(PinState::from(high))
            .map_err(|e| BoardError::Pin {
                signal: Signal::Reset,
                detail: format!("{e:?}"),
            })
    }

    fn wait(&mut self, period: Duration) {
        let us = u32::try_from(period.as_micros()).unwrap_or(u32::MAX);
        self.delay.delay_us(us);
    }
}
