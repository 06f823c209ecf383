//! ### English
//! Windows implementation of the swap-chain interception.
//!
//! A `retour` detour on `opengl32!wglSwapBuffers` redirects every present
//! into [`swap_buffers_detour`], which drives the thread-local [`SwapDriver`]
//! and then chains to the original entry point on every path, including
//! panics, which are caught so they can never unwind into host frames.
//!
//! GL entry points are resolved the way the host's own context resolves
//! them: `wglGetProcAddress` first, `GetProcAddress` on `opengl32.dll` for
//! the 1.x entry points the former refuses to return.
//!
//! ### 中文
//! 交换链拦截的 Windows 实现。
//!
//! 通过 `retour` 对 `opengl32!wglSwapBuffers` 做 detour，把每次 present
//! 重定向到 [`swap_buffers_detour`]：驱动线程局部的 [`SwapDriver`]，然后
//! 链式调用原始入口；任何路径都如此，包括 panic（会被捕获，绝不向宿主
//! 栈帧展开）。
//!
//! GL 入口点按宿主上下文自身的方式解析：先 `wglGetProcAddress`，对它拒
//! 绝返回的 1.x 入口点回退到 `opengl32.dll` 的 `GetProcAddress`。

use std::cell::RefCell;
use std::ffi::{CStr, CString, c_void};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use dpi::PhysicalSize;
use retour::GenericDetour;
use tracing::error;
use windows_sys::Win32::Foundation::{HMODULE, RECT};
use windows_sys::Win32::Graphics::Gdi::{HDC, WindowFromDC};
use windows_sys::Win32::Graphics::OpenGL::wglGetProcAddress;
use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress, LoadLibraryW};
use windows_sys::Win32::UI::WindowsAndMessaging::GetClientRect;

use super::SwapDriver;
use crate::engine::error::OverlayError;
use crate::engine::gl::{GlApi, GlowApi};
use crate::engine::input;
use crate::engine::input_types::WebOverlayInputEvent;
use crate::engine::runtime::OverlayRuntime;

/// ### English
/// Signature of the hooked present entry point.
///
/// ### 中文
/// 被 hook 的 present 入口点签名。
type WglSwapBuffersFn = unsafe extern "system" fn(hdc: HDC) -> i32;

static SWAP_DETOUR: OnceLock<GenericDetour<WglSwapBuffersFn>> = OnceLock::new();
static PANIC_LOGGED: AtomicBool = AtomicBool::new(false);

thread_local! {
    /// ### English
    /// Driver state owned by the (single) thread the host presents from.
    ///
    /// ### 中文
    /// 由宿主执行 present 的（单一）线程持有的驱动器状态。
    static DRIVER: RefCell<Option<SwapDriver>> = const { RefCell::new(None) };
    /// ### English
    /// Reused scratch batch for input pumping.
    ///
    /// ### 中文
    /// 输入泵送复用的批缓冲。
    static INPUT_BATCH: RefCell<Vec<WebOverlayInputEvent>> = const { RefCell::new(Vec::new()) };
}

/// ### English
/// NUL-terminated UTF-16 for Win32 `*W` calls.
///
/// ### 中文
/// 供 Win32 `*W` 调用使用的 NUL 结尾 UTF-16。
fn wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

/// ### English
/// Resolves `wglSwapBuffers` and installs + enables the detour. One-shot:
/// a second call reports `HookInstall`.
///
/// ### 中文
/// 解析 `wglSwapBuffers` 并安装、启用 detour。一次性操作：第二次调用会
/// 报告 `HookInstall` 错误。
pub fn install() -> Result<(), OverlayError> {
    let opengl32 = unsafe { LoadLibraryW(wide("opengl32.dll").as_ptr()) };
    if opengl32.is_null() {
        return Err(OverlayError::HookInstall(
            "opengl32.dll could not be loaded".to_string(),
        ));
    }

    let Some(target) = (unsafe { GetProcAddress(opengl32, c"wglSwapBuffers".as_ptr().cast()) })
    else {
        return Err(OverlayError::HookInstall(
            "wglSwapBuffers not exported by opengl32.dll".to_string(),
        ));
    };
    let target: WglSwapBuffersFn = unsafe { std::mem::transmute(target) };

    let detour = unsafe { GenericDetour::new(target, swap_buffers_detour) }
        .map_err(|err| OverlayError::HookInstall(format!("create detour: {err}")))?;

    if SWAP_DETOUR.set(detour).is_err() {
        return Err(OverlayError::HookInstall(
            "swap-chain hook is already installed".to_string(),
        ));
    }
    let Some(installed) = SWAP_DETOUR.get() else {
        return Err(OverlayError::HookInstall(
            "swap-chain hook vanished during install".to_string(),
        ));
    };
    unsafe { installed.enable() }
        .map_err(|err| OverlayError::HookInstall(format!("enable detour: {err}")))
}

/// ### English
/// The replacement present entry point: run the overlay driver (panics
/// contained), then always chain to the original.
///
/// ### 中文
/// 替换后的 present 入口：先运行 overlay 驱动器（panic 被包住），然后
/// 必定链式调用原始实现。
unsafe extern "system" fn swap_buffers_detour(hdc: HDC) -> i32 {
    let drove = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| drive(hdc)));
    if drove.is_err() && !PANIC_LOGGED.swap(true, Ordering::AcqRel) {
        error!("composite pass panicked; overlay frames will be skipped");
    }

    match SWAP_DETOUR.get() {
        Some(detour) => unsafe { detour.call(hdc) },
        // Unreachable once installed, but the host's present must not be lost.
        None => 1,
    }
}

fn drive(hdc: HDC) {
    let Some(runtime) = OverlayRuntime::get() else {
        return;
    };

    DRIVER.with(|slot| {
        let mut slot = slot.borrow_mut();
        let driver = slot.get_or_insert_with(|| SwapDriver::new(Arc::clone(runtime.pool())));
        let mut env = WinSwapEnv { hdc, runtime };
        driver.on_swap(&mut env);
    });
}

/// ### English
/// Per-frame platform services bound to the intercepted device context.
///
/// ### 中文
/// 绑定到被拦截设备上下文的每帧平台服务。
struct WinSwapEnv {
    /// ### English
    /// Device context of the present being intercepted.
    ///
    /// ### 中文
    /// 被拦截 present 的设备上下文。
    hdc: HDC,
    /// ### English
    /// Process-wide runtime.
    ///
    /// ### 中文
    /// 进程级运行时。
    runtime: &'static OverlayRuntime,
}

impl super::SwapEnv for WinSwapEnv {
    fn load_graphics(&mut self) -> Option<Rc<dyn GlApi>> {
        let opengl32 = unsafe { GetModuleHandleW(wide("opengl32.dll").as_ptr()) };
        if opengl32.is_null() {
            return None;
        }

        let api = unsafe {
            GlowApi::from_loader(|name| {
                let Ok(c_name) = CString::new(name) else {
                    return std::ptr::null();
                };
                gl_proc_address(opengl32, &c_name)
            })
        };
        Some(Rc::new(api))
    }

    fn window_size(&self) -> PhysicalSize<u32> {
        let hwnd = unsafe { WindowFromDC(self.hdc) };
        if hwnd.is_null() {
            return PhysicalSize::new(0, 0);
        }

        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        if unsafe { GetClientRect(hwnd, &mut rect) } == 0 {
            return PhysicalSize::new(0, 0);
        }

        PhysicalSize::new(
            (rect.right - rect.left).max(0) as u32,
            (rect.bottom - rect.top).max(0) as u32,
        )
    }

    fn browser_ready(&self) -> bool {
        self.runtime.bridge().is_ready()
    }

    fn bind_input(&mut self) -> bool {
        let hwnd = unsafe { WindowFromDC(self.hdc) };
        !hwnd.is_null() && input::windows::install(hwnd)
    }

    fn pump_input(&mut self) {
        INPUT_BATCH.with(|scratch| {
            let mut batch = scratch.borrow_mut();
            self.runtime.input().drain_coalesced(&mut batch);
            self.runtime.bridge().forward(&batch);
        });
    }
}

/// ### English
/// Two-stage GL symbol resolution. `wglGetProcAddress` hands out sentinel
/// values (0, 1, 2, 3, -1) for entry points that live in `opengl32.dll`
/// itself; those fall back to `GetProcAddress`.
///
/// ### 中文
/// 两级 GL 符号解析。对位于 `opengl32.dll` 自身的入口点，
/// `wglGetProcAddress` 会返回哨兵值（0、1、2、3、-1），这些情况回退到
/// `GetProcAddress`。
fn gl_proc_address(opengl32: HMODULE, name: &CStr) -> *const c_void {
    if let Some(proc) = unsafe { wglGetProcAddress(name.as_ptr().cast()) } {
        let address = proc as usize;
        if address > 3 && address != usize::MAX {
            return proc as *const c_void;
        }
    }

    match unsafe { GetProcAddress(opengl32, name.as_ptr().cast()) } {
        Some(proc) => proc as *const c_void,
        None => std::ptr::null(),
    }
}
