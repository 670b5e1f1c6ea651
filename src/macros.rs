//! 配置宏
//!
//! 提供简化板卡初始化的宏

/// 打开并配置板卡的宏
///
/// 失败时记录日志并从当前函数返回 `anyhow` 错误。
///
/// # 示例
/// ```ignore
/// let mut board = configure_board!(BoardRole::Client.config());
/// board.setup()?;
/// ```
#[macro_export]
macro_rules! configure_board {
    () => {
        $crate::configure_board!(&$crate::config::pins::SERVER_BOARD)
    };

    ($config:expr) => {{
        let config: &$crate::config::BoardConfig = $config;

        // 配置校验由 GpioManager::configure 完成
        match $crate::platform::RpiBoard::open(config) {
            Ok(board) => board,
            Err(e) => {
                log::error!("板卡初始化失败: {}", e);
                return Err(anyhow::anyhow!("板卡初始化失败: {}", e));
            }
        }
    }};
}
