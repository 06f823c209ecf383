//! ### English
//! One-shot DLL-injection launcher.
//!
//! `web-overlay-injector <pid>` forces the target process to load
//! `web_overlay_engine.dll` from the current directory: allocate memory in
//! the target, write the library path, start a remote thread on
//! `kernel32!LoadLibraryA`. No retry logic; numeric exit codes per failure.
//!
//! ### 中文
//! 一次性的 DLL 注入启动器。
//!
//! `web-overlay-injector <pid>` 强制目标进程从当前目录加载
//! `web_overlay_engine.dll`：在目标内分配内存、写入库路径、在
//! `kernel32!LoadLibraryA` 上启动远程线程。无重试逻辑；按失败点返回数字
//! 退出码。

#[cfg(windows)]
fn main() -> std::process::ExitCode {
    windows_main::run()
}

#[cfg(not(windows))]
fn main() -> std::process::ExitCode {
    eprintln!("web-overlay-injector only runs on Windows");
    std::process::ExitCode::from(1)
}

#[cfg(windows)]
mod windows_main {
    use std::ffi::c_void;
    use std::process::ExitCode;

    use windows_sys::Win32::Foundation::CloseHandle;
    use windows_sys::Win32::System::Diagnostics::Debug::WriteProcessMemory;
    use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress};
    use windows_sys::Win32::System::Memory::{
        MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE, VirtualAllocEx, VirtualFreeEx,
    };
    use windows_sys::Win32::System::Threading::{
        CreateRemoteThread, OpenProcess, PROCESS_ALL_ACCESS,
    };

    /// ### English
    /// Remote thread entry signature expected by `CreateRemoteThread`.
    ///
    /// ### 中文
    /// `CreateRemoteThread` 期望的远程线程入口签名。
    type ThreadStart = unsafe extern "system" fn(*mut c_void) -> u32;

    fn wide(value: &str) -> Vec<u16> {
        value.encode_utf16().chain(std::iter::once(0)).collect()
    }

    pub fn run() -> ExitCode {
        let Some(pid) = std::env::args().nth(1).and_then(|arg| arg.parse::<u32>().ok()) else {
            eprintln!("usage: web-overlay-injector <pid>");
            return ExitCode::from(1);
        };

        let library_path = match std::env::current_dir() {
            Ok(dir) => dir.join("web_overlay_engine.dll"),
            Err(err) => {
                eprintln!("failed to resolve current directory: {err}");
                return ExitCode::from(1);
            }
        };
        // LoadLibraryA takes the path as NUL-terminated ANSI bytes.
        let mut path_bytes = library_path.to_string_lossy().into_owned().into_bytes();
        path_bytes.push(0);

        let process = unsafe { OpenProcess(PROCESS_ALL_ACCESS, 0, pid) };
        if process.is_null() {
            eprintln!("failed to open process {pid}");
            return ExitCode::from(2);
        }

        let remote_path = unsafe {
            VirtualAllocEx(
                process,
                std::ptr::null(),
                path_bytes.len(),
                MEM_COMMIT | MEM_RESERVE,
                PAGE_READWRITE,
            )
        };
        if remote_path.is_null() {
            eprintln!("failed to allocate memory in target process");
            unsafe { CloseHandle(process) };
            return ExitCode::from(2);
        }

        let wrote = unsafe {
            WriteProcessMemory(
                process,
                remote_path,
                path_bytes.as_ptr().cast(),
                path_bytes.len(),
                std::ptr::null_mut(),
            )
        };
        if wrote == 0 {
            eprintln!("failed to write memory in target process");
            unsafe {
                VirtualFreeEx(process, remote_path, 0, MEM_RELEASE);
                CloseHandle(process);
            }
            return ExitCode::from(3);
        }

        let kernel32 = unsafe { GetModuleHandleW(wide("kernel32.dll").as_ptr()) };
        let load_library =
            unsafe { GetProcAddress(kernel32, c"LoadLibraryA".as_ptr().cast()) };
        let Some(load_library) = load_library else {
            eprintln!("failed to resolve LoadLibraryA");
            unsafe {
                VirtualFreeEx(process, remote_path, 0, MEM_RELEASE);
                CloseHandle(process);
            }
            return ExitCode::from(4);
        };

        let thread = unsafe {
            CreateRemoteThread(
                process,
                std::ptr::null(),
                0,
                Some(std::mem::transmute::<_, ThreadStart>(load_library)),
                remote_path,
                0,
                std::ptr::null_mut(),
            )
        };
        if thread.is_null() {
            eprintln!("failed to create remote thread in target process");
            unsafe {
                VirtualFreeEx(process, remote_path, 0, MEM_RELEASE);
                CloseHandle(process);
            }
            return ExitCode::from(4);
        }

        unsafe {
            CloseHandle(thread);
            CloseHandle(process);
        }
        ExitCode::SUCCESS
    }
}
