//! ### English
//! Liaison with the out-of-process embedded browser.
//!
//! The browser itself is opaque: it paints BGRA frames through the producer
//! boundary and consumes input events through a function-pointer sink the
//! embedder registers once over the C ABI. This module owns that sink table
//! plus the two flags the browser side flips: "subsystem ready" and
//! "interaction mode".
//!
//! ### 中文
//! 与进程外内嵌浏览器的联络层。
//!
//! 浏览器本身是不透明的：它通过生产者边界绘制 BGRA 帧，并通过宿主经
//! C ABI 一次性注册的函数指针 sink 接收输入事件。本模块持有该 sink 表，
//! 以及浏览器侧翻转的两个标志：“子系统就绪”与“交互模式”。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::input_types::WebOverlayInputEvent;

/// ### English
/// Function pointer type for the embedder's batched input sink.
///
/// ### 中文
/// 宿主批量输入 sink 的函数指针类型。
pub type SendInputEventsFn = unsafe extern "C" fn(*const WebOverlayInputEvent, u32);

/// ### English
/// Validated embedder sink table.
///
/// ### 中文
/// 校验后的宿主 sink 表。
#[derive(Clone, Copy)]
struct BrowserEventSink {
    /// ### English
    /// Function pointer: batched input delivery.
    ///
    /// ### 中文
    /// 函数指针：批量输入投递。
    send_input_events: SendInputEventsFn,
}

/// ### English
/// Shared bridge state. All fields are atomics or write-once, so the bridge
/// is freely readable from the graphics thread, the window procedure, and
/// the C ABI without locks.
///
/// ### 中文
/// 共享的桥接状态。所有字段要么是原子的、要么只写一次，因此图形线程、
/// 窗口过程与 C ABI 均可无锁读取。
pub struct BrowserBridge {
    /// ### English
    /// Sink table; installed once by the embedder.
    ///
    /// ### 中文
    /// sink 表；由宿主安装一次。
    sink: OnceLock<BrowserEventSink>,
    /// ### English
    /// Browser subsystem readiness (gates input binding in the hook).
    ///
    /// ### 中文
    /// 浏览器子系统就绪标志（控制 hook 中的输入绑定时机）。
    ready: AtomicBool,
    /// ### English
    /// Interaction mode: when set, overlay-bound input is swallowed from the
    /// host and every event class is forwarded.
    ///
    /// ### 中文
    /// 交互模式：置位时，发往 overlay 的输入不再传给宿主，且所有事件类别
    /// 都被转发。
    interaction: AtomicBool,
}

impl BrowserBridge {
    /// ### English
    /// Creates a bridge with no sink, not ready, interaction off.
    ///
    /// ### 中文
    /// 创建无 sink、未就绪、交互关闭的桥。
    pub fn new() -> Self {
        Self {
            sink: OnceLock::new(),
            ready: AtomicBool::new(false),
            interaction: AtomicBool::new(false),
        }
    }

    /// ### English
    /// Installs the embedder sink table for this process.
    ///
    /// This is a one-time installation backed by `OnceLock`; repeated calls
    /// return an error.
    ///
    /// #### Parameters
    /// - `send_input_events`: Raw function pointer value; must be non-zero.
    ///
    /// ### 中文
    /// 为当前进程安装宿主 sink 表。
    ///
    /// 该安装由 `OnceLock` 保证只执行一次；重复调用会返回错误。
    ///
    /// #### 参数
    /// - `send_input_events`：原始函数指针值；必须非零。
    pub fn install_sink(&self, send_input_events: usize) -> Result<(), String> {
        if send_input_events == 0 {
            return Err("WebOverlayBrowserApi.send_input_events is NULL".to_string());
        }

        let sink = BrowserEventSink {
            send_input_events: unsafe {
                std::mem::transmute::<usize, SendInputEventsFn>(send_input_events)
            },
        };

        self.sink
            .set(sink)
            .map_err(|_| "browser API is already installed".to_string())
    }

    /// ### English
    /// Marks the browser subsystem ready (idempotent).
    ///
    /// ### 中文
    /// 标记浏览器子系统就绪（幂等）。
    pub fn notify_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// ### English
    /// Whether the browser subsystem reported ready.
    ///
    /// ### 中文
    /// 浏览器子系统是否已报告就绪。
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// ### English
    /// Sets interaction mode.
    ///
    /// ### 中文
    /// 设置交互模式。
    pub fn set_interaction_mode(&self, enabled: bool) {
        self.interaction.store(enabled, Ordering::Release);
    }

    /// ### English
    /// Whether interaction mode is on.
    ///
    /// ### 中文
    /// 交互模式是否开启。
    pub fn interaction_mode(&self) -> bool {
        self.interaction.load(Ordering::Acquire)
    }

    /// ### English
    /// Delivers a batch of events to the sink, if one is installed. Empty
    /// batches are skipped without an ABI call.
    ///
    /// #### Parameters
    /// - `events`: Translated events, oldest first.
    ///
    /// ### 中文
    /// 将一批事件投递给 sink（若已安装）。空批直接跳过，不做 ABI 调用。
    ///
    /// #### 参数
    /// - `events`：已翻译事件，从旧到新。
    pub fn forward(&self, events: &[WebOverlayInputEvent]) {
        if events.is_empty() {
            return;
        }
        if let Some(sink) = self.sink.get() {
            unsafe { (sink.send_input_events)(events.as_ptr(), events.len() as u32) };
        }
    }
}

impl Default for BrowserBridge {
    fn default() -> Self {
        Self::new()
    }
}
