//! DIO 中断线
//!
//! SX127x 通过 DIO0..DIO5 报告 RxDone、TxDone 等事件。
//! 本板只引出 DIO0..DIO3，DIO4/DIO5 没有连线。

use rppal::gpio::{InputPin, Trigger};
use std::time::Duration;

use crate::board::BoardError;
use crate::config::Signal;

/// 中断回调，在平台的中断线程中执行
pub type DioCallback = Box<dyn FnMut(Signal) + Send + 'static>;

/// 按键去抖时间
pub const SWITCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// 已引出的 DIO 线
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DioLine {
    Dio0,
    Dio1,
    Dio2,
    Dio3,
}

impl DioLine {
    pub const ALL: [DioLine; 4] = [DioLine::Dio0, DioLine::Dio1, DioLine::Dio2, DioLine::Dio3];

    pub fn index(&self) -> usize {
        match self {
            DioLine::Dio0 => 0,
            DioLine::Dio1 => 1,
            DioLine::Dio2 => 2,
            DioLine::Dio3 => 3,
        }
    }

    pub fn signal(&self) -> Signal {
        match self {
            DioLine::Dio0 => Signal::Dio0,
            DioLine::Dio1 => Signal::Dio1,
            DioLine::Dio2 => Signal::Dio2,
            DioLine::Dio3 => Signal::Dio3,
        }
    }
}

impl TryFrom<u8> for DioLine {
    type Error = BoardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DioLine::Dio0),
            1 => Ok(DioLine::Dio1),
            2 => Ok(DioLine::Dio2),
            3 => Ok(DioLine::Dio3),
            4 | 5 => Err(BoardError::DioNotRouted(value)),
            _ => Err(BoardError::InvalidDio(value)),
        }
    }
}

/// 可以在上升沿触发回调的输入引脚
pub trait EdgeInterrupt {
    /// 注册上升沿回调，替换之前注册的回调
    fn listen_rising(
        &mut self,
        debounce: Option<Duration>,
        callback: Box<dyn FnMut() + Send + 'static>,
    ) -> Result<(), BoardError>;

    /// 取消回调
    fn unlisten(&mut self) -> Result<(), BoardError>;
}

impl EdgeInterrupt for InputPin {
    fn listen_rising(
        &mut self,
        debounce: Option<Duration>,
        mut callback: Box<dyn FnMut() + Send + 'static>,
    ) -> Result<(), BoardError> {
        self.set_async_interrupt(Trigger::RisingEdge, debounce, move |_event| callback())?;
        Ok(())
    }

    fn unlisten(&mut self) -> Result<(), BoardError> {
        self.clear_async_interrupt()?;
        Ok(())
    }
}

/// 一次性注册全部中断时使用的回调集合
pub struct DioCallbacks {
    pub dio0: DioCallback,
    pub dio1: DioCallback,
    pub dio2: DioCallback,
    pub dio3: DioCallback,

    /// 按键回调，需要板上配置了按键引脚
    pub switch: Option<DioCallback>,
}

impl DioCallbacks {
    /// 所有 DIO 线共用同一个处理函数
    pub fn shared<F>(handler: F) -> Self
    where
        F: Fn(Signal) + Send + Clone + 'static,
    {
        Self {
            dio0: Box::new(handler.clone()),
            dio1: Box::new(handler.clone()),
            dio2: Box::new(handler.clone()),
            dio3: Box::new(handler),
            switch: None,
        }
    }

    pub fn with_switch(mut self, callback: DioCallback) -> Self {
        self.switch = Some(callback);
        self
    }

    pub(crate) fn into_lines(self) -> ([(DioLine, DioCallback); 4], Option<DioCallback>) {
        (
            [
                (DioLine::Dio0, self.dio0),
                (DioLine::Dio1, self.dio1),
                (DioLine::Dio2, self.dio2),
                (DioLine::Dio3, self.dio3),
            ],
            self.switch,
        )
    }
}
