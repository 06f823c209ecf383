//! ### English
//! Error taxonomy for the overlay engine.
//!
//! Nothing in this crate ever aborts the host process: every error here
//! degrades to "skip this frame's overlay rendering" and is retried (or
//! permanently inert) on subsequent swaps.
//!
//! ### 中文
//! overlay 引擎的错误分类。
//!
//! 本 crate 不会让宿主进程异常退出：这里的每种错误都退化为
//! “跳过本帧 overlay 渲染”，并在后续 swap 中重试（或永久静默）。

use thiserror::Error;

/// ### English
/// Errors surfaced by the engine's fallible construction and install paths.
///
/// Hot-path failures (a pixel buffer that fails to map, a paint for stale
/// dimensions) are deliberately *not* represented here: those return null /
/// `false` sentinels so the producer and consumer never block or allocate.
///
/// ### 中文
/// 引擎可失败的构建/安装路径产生的错误。
///
/// 热路径失败（像素缓冲 map 失败、针对过期尺寸的 paint）刻意不在此表示：
/// 它们返回 null / `false` 哨兵值，保证生产者与消费者既不阻塞也不分配。
#[derive(Debug, Error)]
pub enum OverlayError {
    /// ### English
    /// Installing the swap-chain detour (or resolving its target symbol) failed.
    ///
    /// ### 中文
    /// 安装交换链 detour（或解析其目标符号）失败。
    #[error("hook installation failed: {0}")]
    HookInstall(String),

    /// ### English
    /// A shader stage failed to compile.
    ///
    /// ### 中文
    /// 着色器编译失败。
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile {
        /// ### English
        /// Human-readable stage name (`"vertex"` / `"fragment"`).
        ///
        /// ### 中文
        /// 可读的着色阶段名（`"vertex"` / `"fragment"`）。
        stage: &'static str,
        /// ### English
        /// Driver-provided info log.
        ///
        /// ### 中文
        /// 驱动返回的 info log。
        log: String,
    },

    /// ### English
    /// The shader program failed to link.
    ///
    /// ### 中文
    /// 着色器程序链接失败。
    #[error("program link failed: {0}")]
    ProgramLink(String),

    /// ### English
    /// A GPU object could not be allocated (zero name returned).
    ///
    /// ### 中文
    /// GPU 对象分配失败（返回了 0 名称）。
    #[error("failed to allocate GPU {0} object")]
    ObjectAlloc(&'static str),

    /// ### English
    /// The configuration file could not be read or parsed.
    ///
    /// ### 中文
    /// 配置文件读取或解析失败。
    #[error("config error: {0}")]
    Config(String),
}
