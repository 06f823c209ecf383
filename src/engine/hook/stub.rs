//! ### English
//! Non-Windows placeholder for the swap-chain interception.
//!
//! The driver state machine above is fully platform-neutral and tested
//! everywhere; only the detour itself requires Windows.
//!
//! ### 中文
//! 交换链拦截的非 Windows 占位实现。
//!
//! 上层驱动器状态机完全与平台无关并可在任何平台测试；只有 detour 本身
//! 依赖 Windows。

use crate::engine::error::OverlayError;

/// ### English
/// Always reports failure on non-Windows builds.
///
/// ### 中文
/// 非 Windows 构建下总是报告失败。
pub fn install() -> Result<(), OverlayError> {
    Err(OverlayError::HookInstall(
        "swap-chain interception is only implemented on Windows".to_string(),
    ))
}
