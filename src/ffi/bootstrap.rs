//! ### English
//! Library entry points: `DllMain` for injection and an explicit bootstrap
//! export for embedders that load the library themselves.
//!
//! `DllMain` only spawns the startup thread; no real work ever runs under
//! the loader lock.
//!
//! ### 中文
//! 库入口点：用于注入的 `DllMain`，以及供自行加载本库的宿主使用的显式
//! bootstrap 导出。
//!
//! `DllMain` 仅派生启动线程；绝不在 loader 锁内做任何实际工作。

use std::ffi::c_void;

#[unsafe(no_mangle)]
/// ### English
/// Runs the full startup sequence for the library mapped at `module`:
/// diagnostics, configuration, endpoint, runtime, swap-chain hook. Returns
/// `false` when the module directory cannot be resolved (or on non-Windows
/// builds). Safe to call at most once; later calls keep the first runtime.
///
/// ### 中文
/// 为映射在 `module` 的库运行完整启动序列：诊断、配置、端点、运行时、
/// 交换链 hook。无法解析模块目录（或非 Windows 构建）时返回 `false`。
/// 至多调用一次有效；后续调用沿用第一次的运行时。
pub extern "C" fn web_overlay_bootstrap(module: *mut c_void) -> bool {
    #[cfg(windows)]
    {
        let Some(dir) = module_directory(module) else {
            return false;
        };
        crate::engine::bootstrap::start(&dir);
        true
    }

    #[cfg(not(windows))]
    {
        let _ = module;
        false
    }
}

/// ### English
/// Directory containing the module mapped at `module`.
///
/// ### 中文
/// 映射在 `module` 的模块所在目录。
#[cfg(windows)]
fn module_directory(module: *mut c_void) -> Option<std::path::PathBuf> {
    use std::os::windows::ffi::OsStringExt;

    use windows_sys::Win32::System::LibraryLoader::GetModuleFileNameW;

    let mut buffer = [0u16; 1024];
    let len = unsafe { GetModuleFileNameW(module, buffer.as_mut_ptr(), buffer.len() as u32) };
    if len == 0 || len as usize >= buffer.len() {
        return None;
    }

    let path = std::path::PathBuf::from(std::ffi::OsString::from_wide(&buffer[..len as usize]));
    path.parent().map(std::path::Path::to_path_buf)
}

#[cfg(windows)]
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
/// ### English
/// Injection entry point: on process attach, hand the module handle to a
/// dedicated startup thread and return immediately.
///
/// ### 中文
/// 注入入口点：进程附加时，把模块句柄交给专用启动线程并立即返回。
pub unsafe extern "system" fn DllMain(module: *mut c_void, reason: u32, _reserved: *mut c_void) -> i32 {
    use windows_sys::Win32::System::SystemServices::DLL_PROCESS_ATTACH;

    if reason == DLL_PROCESS_ATTACH {
        let module_addr = module as usize;
        std::thread::spawn(move || {
            let _ = web_overlay_bootstrap(module_addr as *mut c_void);
        });
    }
    1
}
