//! ### English
//! C ABI bindings for the startup configuration and the in-game page URL.
//!
//! ### 中文
//! 启动配置与游戏内页面 URL 的 C ABI 绑定。

use std::ffi::c_char;

use super::WebOverlayConfig;
use crate::engine::runtime::OverlayRuntime;

#[unsafe(no_mangle)]
/// ### English
/// Writes the configuration snapshot to `out`. Returns `false` (leaving
/// `out` untouched) when `out` is NULL or bootstrap has not run.
///
/// ### 中文
/// 将配置快照写入 `out`。当 `out` 为 NULL 或 bootstrap 尚未执行时返回
/// `false`（`out` 保持不变）。
pub unsafe extern "C" fn web_overlay_config(out: *mut WebOverlayConfig) -> bool {
    if out.is_null() {
        return false;
    }
    let Some(runtime) = OverlayRuntime::get() else {
        return false;
    };

    let config = runtime.config();
    unsafe {
        *out = WebOverlayConfig {
            browser_fps: config.effective_fps(),
            browser_debugging_enabled: u32::from(config.browser_debugging_enabled),
        };
    }
    true
}

#[unsafe(no_mangle)]
/// ### English
/// Copies the in-game overlay page URL into `buffer` as NUL-terminated
/// UTF-8 and returns the required capacity in bytes (including the NUL).
///
/// When `buffer` is NULL or `capacity` is too small nothing is written; the
/// caller should retry with the returned capacity. Returns `0` when
/// bootstrap has not run or the endpoint does not form a valid URL.
///
/// ### 中文
/// 将游戏内 overlay 页面 URL 以 NUL 结尾的 UTF-8 拷贝到 `buffer`，并返回
/// 所需容量（字节数，含 NUL）。
///
/// 当 `buffer` 为 NULL 或 `capacity` 不足时不写入任何内容；调用方应按返
/// 回的容量重试。bootstrap 尚未执行或端点无法构成合法 URL 时返回 `0`。
pub unsafe extern "C" fn web_overlay_ingame_url(buffer: *mut c_char, capacity: u32) -> u32 {
    let Some(runtime) = OverlayRuntime::get() else {
        return 0;
    };
    let Ok(url) = runtime.endpoint().ingame_url() else {
        return 0;
    };

    let bytes = url.as_str().as_bytes();
    let required = bytes.len() + 1;
    if !buffer.is_null() && capacity as usize >= required {
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer.cast::<u8>(), bytes.len());
            *buffer.add(bytes.len()) = 0;
        }
    }

    required as u32
}
