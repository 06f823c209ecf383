//! ### English
//! C ABI bindings for the embedder's browser side: sink registration,
//! readiness, and interaction mode.
//!
//! ### 中文
//! 宿主浏览器侧的 C ABI 绑定：sink 注册、就绪通知与交互模式。

use tracing::{info, warn};

use super::WebOverlayBrowserApi;
use crate::engine::runtime::OverlayRuntime;

#[unsafe(no_mangle)]
/// ### English
/// Installs the embedder's browser function table for this process.
///
/// One-time installation; repeated calls (or a table with NULL entries)
/// return `false` and leave the previously installed table in place.
///
/// ### 中文
/// 为当前进程安装宿主浏览器函数表。
///
/// 一次性安装；重复调用（或表中含 NULL 项）返回 `false`，已安装的表保持
/// 不变。
pub extern "C" fn web_overlay_set_browser_api(api: WebOverlayBrowserApi) -> bool {
    let Some(runtime) = OverlayRuntime::get() else {
        return false;
    };

    match runtime.bridge().install_sink(api.send_input_events) {
        Ok(()) => {
            info!("browser API installed");
            true
        }
        Err(err) => {
            warn!("browser API rejected: {err}");
            false
        }
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Marks the embedded-browser subsystem ready. The swap hook binds input
/// forwarding on the first intercepted frame after this call. Idempotent.
///
/// ### 中文
/// 标记内嵌浏览器子系统就绪。此调用之后的第一个被拦截帧中，swap hook 会
/// 绑定输入转发。幂等。
pub extern "C" fn web_overlay_notify_browser_ready() {
    if let Some(runtime) = OverlayRuntime::get() {
        runtime.bridge().notify_ready();
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Switches interaction mode (`0` = off). While on, overlay-bound input is
/// swallowed from the host and buttons/wheel/keyboard are forwarded to the
/// browser; while off, only mouse moves are forwarded.
///
/// ### 中文
/// 切换交互模式（`0` = 关闭）。开启时，发往 overlay 的输入不再传给宿主，
/// 按键/滚轮/键盘会转发给浏览器；关闭时只转发鼠标移动。
pub extern "C" fn web_overlay_set_interaction_mode(enabled: u32) {
    if let Some(runtime) = OverlayRuntime::get() {
        runtime.bridge().set_interaction_mode(enabled != 0);
    }
}
