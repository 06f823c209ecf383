//! ### English
//! Windows window-procedure subclassing for input capture.
//!
//! The host window's procedure is replaced once (from the graphics thread,
//! after the browser reports ready); the replacement translates messages,
//! enqueues them for the graphics thread, optionally swallows them while
//! interaction mode is on, and otherwise chains to the original procedure.
//!
//! ### 中文
//! 通过 Windows 窗口过程子类化捕获输入。
//!
//! 宿主窗口过程只替换一次（浏览器报告就绪后、在图形线程上执行）；替换
//! 过程负责翻译消息、为图形线程排队，在交互模式开启时吞掉消息，其余情况
//! 链式调用原始过程。

use std::sync::atomic::{AtomicIsize, Ordering};

use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows_sys::Win32::Graphics::Gdi::ScreenToClient;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyState, VK_CAPITAL, VK_CONTROL, VK_LBUTTON, VK_MBUTTON, VK_MENU, VK_NUMLOCK, VK_RBUTTON,
    VK_SHIFT,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CallWindowProcW, DefWindowProcW, GWLP_WNDPROC, SetWindowLongPtrW, WNDPROC,
};

use super::{WM_MOUSEWHEEL, translate_message};
use crate::engine::input_types::{
    WEB_OVERLAY_MODIFIER_ALT, WEB_OVERLAY_MODIFIER_CAPS_LOCK, WEB_OVERLAY_MODIFIER_CONTROL,
    WEB_OVERLAY_MODIFIER_LEFT_BUTTON, WEB_OVERLAY_MODIFIER_MIDDLE_BUTTON,
    WEB_OVERLAY_MODIFIER_NUM_LOCK, WEB_OVERLAY_MODIFIER_RIGHT_BUTTON, WEB_OVERLAY_MODIFIER_SHIFT,
};
use crate::engine::runtime::OverlayRuntime;

static ORIGINAL_WNDPROC: AtomicIsize = AtomicIsize::new(0);

/// ### English
/// Subclasses `hwnd` with the overlay window procedure. Returns `false`
/// when the replacement could not be installed.
///
/// #### Parameters
/// - `hwnd`: The host window owning the hooked GL context.
///
/// ### 中文
/// 用 overlay 窗口过程对 `hwnd` 做子类化。无法安装替换过程时返回
/// `false`。
///
/// #### 参数
/// - `hwnd`：持有被 hook GL 上下文的宿主窗口。
pub fn install(hwnd: HWND) -> bool {
    let previous =
        unsafe { SetWindowLongPtrW(hwnd, GWLP_WNDPROC, overlay_window_proc as usize as isize) };
    if previous == 0 {
        return false;
    }

    ORIGINAL_WNDPROC.store(previous, Ordering::Release);
    true
}

/// ### English
/// Current modifier mask from the thread's key state.
///
/// ### 中文
/// 从线程按键状态得到的当前修饰键掩码。
fn read_modifiers() -> u32 {
    fn down(vk: u16) -> bool {
        (unsafe { GetKeyState(i32::from(vk)) } as u16) & 0x8000 != 0
    }
    fn toggled(vk: u16) -> bool {
        (unsafe { GetKeyState(i32::from(vk)) } as u16) & 1 != 0
    }

    let mut modifiers = 0;
    if down(VK_SHIFT) {
        modifiers |= WEB_OVERLAY_MODIFIER_SHIFT;
    }
    if down(VK_CONTROL) {
        modifiers |= WEB_OVERLAY_MODIFIER_CONTROL;
    }
    if down(VK_MENU) {
        modifiers |= WEB_OVERLAY_MODIFIER_ALT;
    }
    if down(VK_LBUTTON) {
        modifiers |= WEB_OVERLAY_MODIFIER_LEFT_BUTTON;
    }
    if down(VK_MBUTTON) {
        modifiers |= WEB_OVERLAY_MODIFIER_MIDDLE_BUTTON;
    }
    if down(VK_RBUTTON) {
        modifiers |= WEB_OVERLAY_MODIFIER_RIGHT_BUTTON;
    }
    if toggled(VK_CAPITAL) {
        modifiers |= WEB_OVERLAY_MODIFIER_CAPS_LOCK;
    }
    if toggled(VK_NUMLOCK) {
        modifiers |= WEB_OVERLAY_MODIFIER_NUM_LOCK;
    }
    modifiers
}

/// ### English
/// Repacks a screen-space `lparam` point into client space for `hwnd`.
///
/// ### 中文
/// 将屏幕坐标的 `lparam` 点重新打包为 `hwnd` 的客户区坐标。
fn screen_to_client_lparam(hwnd: HWND, lparam: LPARAM) -> LPARAM {
    let mut point = POINT {
        x: i32::from((lparam & 0xFFFF) as u16 as i16),
        y: i32::from(((lparam >> 16) & 0xFFFF) as u16 as i16),
    };
    if unsafe { ScreenToClient(hwnd, &mut point) } == 0 {
        return lparam;
    }

    ((((point.y as u16) as isize) << 16) | ((point.x as u16) as isize)) as LPARAM
}

/// ### English
/// The replacement window procedure. Never blocks and never calls back into
/// the embedder; delivery happens on the graphics thread.
///
/// ### 中文
/// 替换后的窗口过程。绝不阻塞、绝不回调宿主；投递发生在图形线程。
unsafe extern "system" fn overlay_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if let Some(runtime) = OverlayRuntime::get() {
        let interaction = runtime.bridge().interaction_mode();
        // Wheel messages carry screen coordinates; everything else is
        // already client-relative.
        let lparam = if msg == WM_MOUSEWHEEL {
            screen_to_client_lparam(hwnd, lparam)
        } else {
            lparam
        };
        if let Some(translated) =
            translate_message(msg, wparam, lparam, read_modifiers(), interaction)
        {
            runtime.input().push(translated.event);
            if translated.swallow {
                return 0;
            }
        }
    }

    let original = ORIGINAL_WNDPROC.load(Ordering::Acquire);
    if original == 0 {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    let original: WNDPROC = unsafe { std::mem::transmute(original) };
    unsafe { CallWindowProcW(original, hwnd, msg, wparam, lparam) }
}
