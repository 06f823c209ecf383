//! ### English
//! C ABI surface for `web_overlay_engine`.
//!
//! All exported symbols are `extern "C"` (or `extern "system"` where the
//! platform demands it); structs are `#[repr(C)]`. Pointer arguments are
//! validated and NULL-tolerant: a bad argument makes the call a no-op or a
//! null/`false` return, never a crash inside the host process.
//!
//! ### 中文
//! `web_overlay_engine` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"`（平台要求处为 `extern "system"`）；结构
//! 体使用 `#[repr(C)]`。指针参数会被校验并容忍 NULL：错误参数只会让调用
//! 变成 no-op 或返回 null/`false`，绝不会让宿主进程崩溃。

mod abi;
mod bootstrap;
mod browser;
mod canvas;
mod config;

/// ### English
/// C ABI version for `web_overlay_engine`.
///
/// ### 中文
/// `web_overlay_engine` 的 C ABI 版本号。
const WEB_OVERLAY_ABI_VERSION: u32 = 1;

#[repr(C)]
#[derive(Clone, Copy, Default)]
/// ### English
/// Function pointer table the embedder's browser side registers once.
///
/// All fields are raw addresses (`usize`) and must be non-zero when
/// installing.
///
/// ### 中文
/// 宿主浏览器侧一次性注册的函数指针表。
///
/// 所有字段都是原始地址（`usize`），安装时必须为非 0。
pub struct WebOverlayBrowserApi {
    /// ### English
    /// `void (*)(const WebOverlayInputEvent*, uint32_t)`: batched input
    /// delivery, called on the graphics thread once per intercepted swap.
    ///
    /// ### 中文
    /// `void (*)(const WebOverlayInputEvent*, uint32_t)`：批量输入投递，
    /// 在图形线程上每次被拦截的 swap 调用一次。
    pub send_input_events: usize,
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
/// ### English
/// Configuration snapshot handed to the embedder.
///
/// ### 中文
/// 交给宿主的配置快照。
pub struct WebOverlayConfig {
    /// ### English
    /// Windowless paint rate, already clamped to the accepted range.
    ///
    /// ### 中文
    /// 离屏绘制帧率，已压缩到可接受范围。
    pub browser_fps: u32,
    /// ### English
    /// Remote-debugging flag (`0` = off).
    ///
    /// ### 中文
    /// 远程调试标志（`0` = 关闭）。
    pub browser_debugging_enabled: u32,
}
