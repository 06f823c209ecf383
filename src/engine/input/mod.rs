//! ### English
//! Input forwarding: Win32 message translation plus the bounded queue that
//! carries events from the host window procedure to the graphics thread.
//!
//! The window procedure runs on the host's window thread and must never
//! block or call back into the embedder; it only translates and `try_send`s.
//! The graphics thread drains the queue once per intercepted swap and hands
//! the batch to the browser sink. Under pressure events are dropped, mouse
//! moves are coalesced to the most recent one.
//!
//! ### 中文
//! 输入转发：Win32 消息翻译，以及把事件从宿主窗口过程送到图形线程的有界
//! 队列。
//!
//! 窗口过程运行在宿主窗口线程上，绝不能阻塞或回调宿主；它只做翻译和
//! `try_send`。图形线程在每次被拦截的 swap 中排空队列，并把整批交给浏览
//! 器 sink。压力之下事件会被丢弃，鼠标移动只保留最新一条。

#[cfg(windows)]
pub mod windows;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::engine::input_types::{
    WEB_OVERLAY_INPUT_KIND_KEY, WEB_OVERLAY_INPUT_KIND_MOUSE_BUTTON,
    WEB_OVERLAY_INPUT_KIND_MOUSE_MOVE, WEB_OVERLAY_INPUT_KIND_WHEEL, WEB_OVERLAY_MODIFIER_SHIFT,
    WebOverlayInputEvent,
};

/// ### English
/// Queue depth; a frame's worth of events at any realistic input rate.
///
/// ### 中文
/// 队列深度；在任何现实输入速率下都足够容纳一帧的事件量。
const INPUT_QUEUE_CAPACITY: usize = 256;

// Win32 message codes, spelled out locally so translation stays
// platform-neutral and testable.
pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_CHAR: u32 = 0x0102;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;
pub const WM_SYSCHAR: u32 = 0x0106;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_MOUSELEAVE: u32 = 0x02A3;

/// ### English
/// Result of translating one window message.
///
/// ### 中文
/// 翻译单条窗口消息的结果。
#[derive(Clone, Copy, Debug)]
pub struct TranslatedMessage {
    /// ### English
    /// The event to enqueue for the browser.
    ///
    /// ### 中文
    /// 需要为浏览器排队的事件。
    pub event: WebOverlayInputEvent,
    /// ### English
    /// Whether the window procedure should swallow the message instead of
    /// passing it to the host.
    ///
    /// ### 中文
    /// 窗口过程是否应吞掉该消息，而不是传给宿主。
    pub swallow: bool,
}

#[inline]
fn cursor_from_lparam(lparam: isize) -> (f32, f32) {
    // GET_X/Y_LPARAM semantics: low/high words, sign-extended for
    // multi-monitor coordinates.
    let x = (lparam & 0xFFFF) as u16 as i16;
    let y = ((lparam >> 16) & 0xFFFF) as u16 as i16;
    (f32::from(x), f32::from(y))
}

#[inline]
fn wheel_delta_from_wparam(wparam: usize) -> f64 {
    f64::from(((wparam >> 16) & 0xFFFF) as u16 as i16)
}

/// ### English
/// Translates one Win32 message into a browser input event.
///
/// Policy (matching the overlay's interaction model): mouse moves and leaves
/// are always forwarded so hover effects work, but are only swallowed while
/// interaction mode is on; buttons, wheel and keyboard are both forwarded
/// and swallowed only in interaction mode. Returns `None` for messages the
/// overlay does not care about.
///
/// #### Parameters
/// - `msg`: Win32 message code.
/// - `wparam` / `lparam`: Raw message parameters.
/// - `modifiers`: Precomputed `WEB_OVERLAY_MODIFIER_*` mask.
/// - `interaction`: Current interaction-mode flag.
///
/// ### 中文
/// 将一条 Win32 消息翻译为浏览器输入事件。
///
/// 策略（与 overlay 的交互模型一致）：鼠标移动与离开始终转发以支持悬停
/// 效果，但仅在交互模式开启时被吞掉；按键、滚轮与键盘仅在交互模式下转发
/// 并吞掉。overlay 不关心的消息返回 `None`。
///
/// #### 参数
/// - `msg`：Win32 消息码。
/// - `wparam` / `lparam`：原始消息参数。
/// - `modifiers`：预先计算的 `WEB_OVERLAY_MODIFIER_*` 掩码。
/// - `interaction`：当前交互模式标志。
pub fn translate_message(
    msg: u32,
    wparam: usize,
    lparam: isize,
    modifiers: u32,
    interaction: bool,
) -> Option<TranslatedMessage> {
    match msg {
        WM_MOUSEMOVE | WM_MOUSELEAVE => {
            let (x, y) = cursor_from_lparam(lparam);
            Some(TranslatedMessage {
                event: WebOverlayInputEvent {
                    kind: WEB_OVERLAY_INPUT_KIND_MOUSE_MOVE,
                    x,
                    y,
                    modifiers,
                    ..WebOverlayInputEvent::default()
                },
                swallow: interaction,
            })
        }

        WM_LBUTTONDOWN | WM_LBUTTONUP | WM_MBUTTONDOWN | WM_MBUTTONUP | WM_RBUTTONDOWN
        | WM_RBUTTONUP => {
            if !interaction {
                return None;
            }

            let (x, y) = cursor_from_lparam(lparam);
            let (mouse_button, mouse_action) = match msg {
                WM_LBUTTONDOWN => (0, 0),
                WM_LBUTTONUP => (0, 1),
                WM_MBUTTONDOWN => (1, 0),
                WM_MBUTTONUP => (1, 1),
                WM_RBUTTONDOWN => (2, 0),
                _ => (2, 1),
            };
            Some(TranslatedMessage {
                event: WebOverlayInputEvent {
                    kind: WEB_OVERLAY_INPUT_KIND_MOUSE_BUTTON,
                    x,
                    y,
                    modifiers,
                    mouse_button,
                    mouse_action,
                    ..WebOverlayInputEvent::default()
                },
                swallow: true,
            })
        }

        WM_MOUSEWHEEL => {
            if !interaction {
                return None;
            }

            let (x, y) = cursor_from_lparam(lparam);
            let delta = wheel_delta_from_wparam(wparam);
            // Shift turns the wheel into horizontal scroll.
            let horizontal = modifiers & WEB_OVERLAY_MODIFIER_SHIFT != 0;
            Some(TranslatedMessage {
                event: WebOverlayInputEvent {
                    kind: WEB_OVERLAY_INPUT_KIND_WHEEL,
                    x,
                    y,
                    modifiers,
                    wheel_delta_x: if horizontal { delta } else { 0.0 },
                    wheel_delta_y: if horizontal { 0.0 } else { delta },
                    ..WebOverlayInputEvent::default()
                },
                swallow: true,
            })
        }

        WM_KEYDOWN | WM_KEYUP | WM_CHAR | WM_SYSKEYDOWN | WM_SYSKEYUP | WM_SYSCHAR => {
            if !interaction {
                return None;
            }

            let is_system = matches!(msg, WM_SYSKEYDOWN | WM_SYSKEYUP | WM_SYSCHAR);
            let (key_state, key_code, key_codepoint) = match msg {
                WM_KEYDOWN | WM_SYSKEYDOWN => (0, wparam as u32, 0),
                WM_KEYUP | WM_SYSKEYUP => (1, wparam as u32, 0),
                _ => (2, 0, wparam as u32),
            };
            Some(TranslatedMessage {
                event: WebOverlayInputEvent {
                    kind: WEB_OVERLAY_INPUT_KIND_KEY,
                    modifiers,
                    key_state,
                    key_code,
                    key_codepoint,
                    is_system_key: u32::from(is_system),
                    ..WebOverlayInputEvent::default()
                },
                swallow: true,
            })
        }

        _ => None,
    }
}

/// ### English
/// The bounded event queue between window procedure and graphics thread.
///
/// ### 中文
/// 窗口过程与图形线程之间的有界事件队列。
pub struct InputForwarder {
    /// ### English
    /// Producer end, used by the window procedure.
    ///
    /// ### 中文
    /// 生产端，供窗口过程使用。
    tx: Sender<WebOverlayInputEvent>,
    /// ### English
    /// Consumer end, drained on the graphics thread.
    ///
    /// ### 中文
    /// 消费端，在图形线程排空。
    rx: Receiver<WebOverlayInputEvent>,
}

impl InputForwarder {
    /// ### English
    /// Creates the queue at its fixed capacity.
    ///
    /// ### 中文
    /// 以固定容量创建队列。
    pub fn new() -> Self {
        let (tx, rx) = bounded(INPUT_QUEUE_CAPACITY);
        Self { tx, rx }
    }

    /// ### English
    /// Enqueues one event, dropping it if the queue is full. Never blocks.
    ///
    /// ### 中文
    /// 入队一个事件，队列已满则丢弃。绝不阻塞。
    pub fn push(&self, event: WebOverlayInputEvent) {
        let _ = self.tx.try_send(event);
    }

    /// ### English
    /// Drains everything queued since the last call into `batch`, keeping
    /// event order but coalescing mouse moves down to the most recent one
    /// (appended last). `batch` is cleared first.
    ///
    /// #### Parameters
    /// - `batch`: Reused output buffer.
    ///
    /// ### 中文
    /// 将上次调用以来排队的所有事件排空到 `batch`，保持事件顺序，但把
    /// 鼠标移动合并为最新一条（追加在末尾）。`batch` 会先被清空。
    ///
    /// #### 参数
    /// - `batch`：复用的输出缓冲。
    pub fn drain_coalesced(&self, batch: &mut Vec<WebOverlayInputEvent>) {
        batch.clear();

        let mut last_mouse_move: Option<WebOverlayInputEvent> = None;
        while let Ok(event) = self.rx.try_recv() {
            if event.kind == WEB_OVERLAY_INPUT_KIND_MOUSE_MOVE {
                last_mouse_move = Some(event);
            } else {
                batch.push(event);
            }
        }

        if let Some(event) = last_mouse_move {
            batch.push(event);
        }
    }
}

impl Default for InputForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input_types::WEB_OVERLAY_MODIFIER_CONTROL;

    fn lparam_xy(x: i16, y: i16) -> isize {
        (((y as u16 as usize) << 16) | (x as u16 as usize)) as isize
    }

    #[test]
    fn mouse_move_is_forwarded_outside_interaction_mode() {
        let translated =
            translate_message(WM_MOUSEMOVE, 0, lparam_xy(120, 45), 0, false).expect("forwarded");
        assert_eq!(translated.event.kind, WEB_OVERLAY_INPUT_KIND_MOUSE_MOVE);
        assert_eq!(translated.event.x, 120.0);
        assert_eq!(translated.event.y, 45.0);
        assert!(!translated.swallow);
    }

    #[test]
    fn negative_cursor_coordinates_sign_extend() {
        let translated =
            translate_message(WM_MOUSEMOVE, 0, lparam_xy(-5, -17), 0, true).expect("forwarded");
        assert_eq!(translated.event.x, -5.0);
        assert_eq!(translated.event.y, -17.0);
        assert!(translated.swallow);
    }

    #[test]
    fn buttons_and_keys_require_interaction_mode() {
        assert!(translate_message(WM_LBUTTONDOWN, 0, 0, 0, false).is_none());
        assert!(translate_message(WM_KEYDOWN, 0x41, 0, 0, false).is_none());

        let button = translate_message(WM_RBUTTONUP, 0, lparam_xy(3, 4), 0, true).expect("button");
        assert_eq!(button.event.kind, WEB_OVERLAY_INPUT_KIND_MOUSE_BUTTON);
        assert_eq!(button.event.mouse_button, 2);
        assert_eq!(button.event.mouse_action, 1);
        assert!(button.swallow);

        let key = translate_message(WM_KEYDOWN, 0x41, 0, WEB_OVERLAY_MODIFIER_CONTROL, true)
            .expect("key");
        assert_eq!(key.event.kind, WEB_OVERLAY_INPUT_KIND_KEY);
        assert_eq!(key.event.key_code, 0x41);
        assert_eq!(key.event.key_state, 0);
        assert_eq!(key.event.is_system_key, 0);
        assert_eq!(key.event.modifiers, WEB_OVERLAY_MODIFIER_CONTROL);
    }

    #[test]
    fn char_and_system_keys_translate() {
        let ch = translate_message(WM_CHAR, 'a' as usize, 0, 0, true).expect("char");
        assert_eq!(ch.event.key_state, 2);
        assert_eq!(ch.event.key_codepoint, 'a' as u32);

        let sys = translate_message(WM_SYSKEYDOWN, 0x12, 0, 0, true).expect("syskey");
        assert_eq!(sys.event.is_system_key, 1);
    }

    #[test]
    fn wheel_shift_scrolls_horizontally() {
        let wparam = (120u16 as usize) << 16;
        let vertical = translate_message(WM_MOUSEWHEEL, wparam, 0, 0, true).expect("wheel");
        assert_eq!(vertical.event.wheel_delta_y, 120.0);
        assert_eq!(vertical.event.wheel_delta_x, 0.0);

        let horizontal =
            translate_message(WM_MOUSEWHEEL, wparam, 0, WEB_OVERLAY_MODIFIER_SHIFT, true)
                .expect("wheel");
        assert_eq!(horizontal.event.wheel_delta_x, 120.0);
        assert_eq!(horizontal.event.wheel_delta_y, 0.0);
    }

    #[test]
    fn drain_coalesces_mouse_moves_and_keeps_other_order() {
        let forwarder = InputForwarder::new();
        let mv = |x: f32| WebOverlayInputEvent {
            kind: WEB_OVERLAY_INPUT_KIND_MOUSE_MOVE,
            x,
            ..WebOverlayInputEvent::default()
        };
        let key = WebOverlayInputEvent {
            kind: WEB_OVERLAY_INPUT_KIND_KEY,
            key_code: 13,
            ..WebOverlayInputEvent::default()
        };

        forwarder.push(mv(1.0));
        forwarder.push(key);
        forwarder.push(mv(2.0));
        forwarder.push(mv(3.0));

        let mut batch = Vec::new();
        forwarder.drain_coalesced(&mut batch);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].kind, WEB_OVERLAY_INPUT_KIND_KEY);
        assert_eq!(batch[1].x, 3.0);

        // Queue is empty afterwards.
        forwarder.drain_coalesced(&mut batch);
        assert!(batch.is_empty());
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let forwarder = InputForwarder::new();
        for i in 0..(INPUT_QUEUE_CAPACITY + 50) {
            forwarder.push(WebOverlayInputEvent {
                kind: WEB_OVERLAY_INPUT_KIND_KEY,
                key_code: i as u32,
                ..WebOverlayInputEvent::default()
            });
        }

        let mut batch = Vec::new();
        forwarder.drain_coalesced(&mut batch);
        assert_eq!(batch.len(), INPUT_QUEUE_CAPACITY);
    }
}
