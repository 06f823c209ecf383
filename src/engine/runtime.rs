//! ### English
//! The process-wide overlay runtime.
//!
//! All cross-thread state is owned by one explicit [`OverlayRuntime`] value:
//! the frame pool, the browser bridge, the input queue, and the startup
//! configuration. The single unavoidable global is the `OnceLock` holding it
//! at the hook/FFI boundary, because the intercepted swap entry and the
//! producer callbacks arrive as bare `extern` calls with no instance
//! argument. Everything below that boundary takes the runtime by reference.
//!
//! ### 中文
//! 进程级 overlay 运行时。
//!
//! 所有跨线程状态由一个显式的 [`OverlayRuntime`] 值持有：帧缓冲池、浏览
//! 器桥、输入队列与启动配置。唯一不可避免的全局量是 hook/FFI 边界上保存
//! 它的 `OnceLock`，因为被拦截的 swap 入口与生产者回调都是不带实例参数
//! 的裸 `extern` 调用。边界之下的一切都按引用接收运行时。

use std::sync::{Arc, OnceLock};

use crate::engine::browser::BrowserBridge;
use crate::engine::canvas::frame_pool::FramePool;
use crate::engine::config::{OverlayConfig, ServerEndpoint};
use crate::engine::input::InputForwarder;

static RUNTIME: OnceLock<OverlayRuntime> = OnceLock::new();

/// ### English
/// Shared services for the hook thread, the window procedure, and the C ABI.
///
/// ### 中文
/// 供 hook 线程、窗口过程与 C ABI 共享的服务集合。
pub struct OverlayRuntime {
    /// ### English
    /// Frame pool shared with the browser paint thread.
    ///
    /// ### 中文
    /// 与浏览器 paint 线程共享的帧缓冲池。
    pool: Arc<FramePool>,
    /// ### English
    /// Browser liaison (sink, readiness, interaction mode).
    ///
    /// ### 中文
    /// 浏览器联络层（sink、就绪、交互模式）。
    bridge: BrowserBridge,
    /// ### English
    /// Input queue from the window procedure to the graphics thread.
    ///
    /// ### 中文
    /// 从窗口过程到图形线程的输入队列。
    input: InputForwarder,
    /// ### English
    /// Startup configuration, read once.
    ///
    /// ### 中文
    /// 启动配置，只读取一次。
    config: OverlayConfig,
    /// ### English
    /// Stats-server endpoint, read once.
    ///
    /// ### 中文
    /// 统计服务器端点，只读取一次。
    endpoint: ServerEndpoint,
}

impl OverlayRuntime {
    /// ### English
    /// Installs the runtime for this process, or returns the existing one if
    /// bootstrap already ran (later configurations are discarded).
    ///
    /// #### Parameters
    /// - `config`: Parsed startup configuration.
    /// - `endpoint`: Parsed stats-server endpoint.
    ///
    /// ### 中文
    /// 为当前进程安装运行时；若 bootstrap 已执行过，则返回现有实例
    ///（后来的配置被丢弃）。
    ///
    /// #### 参数
    /// - `config`：解析后的启动配置。
    /// - `endpoint`：解析后的统计服务器端点。
    pub fn install(config: OverlayConfig, endpoint: ServerEndpoint) -> &'static OverlayRuntime {
        RUNTIME.get_or_init(|| OverlayRuntime {
            pool: Arc::new(FramePool::new()),
            bridge: BrowserBridge::new(),
            input: InputForwarder::new(),
            config,
            endpoint,
        })
    }

    /// ### English
    /// The runtime, if bootstrap has installed one.
    ///
    /// ### 中文
    /// 运行时（若 bootstrap 已安装）。
    pub fn get() -> Option<&'static OverlayRuntime> {
        RUNTIME.get()
    }

    /// ### English
    /// Frame pool handle.
    ///
    /// ### 中文
    /// 帧缓冲池句柄。
    pub fn pool(&self) -> &Arc<FramePool> {
        &self.pool
    }

    /// ### English
    /// Browser bridge.
    ///
    /// ### 中文
    /// 浏览器桥。
    pub fn bridge(&self) -> &BrowserBridge {
        &self.bridge
    }

    /// ### English
    /// Input queue.
    ///
    /// ### 中文
    /// 输入队列。
    pub fn input(&self) -> &InputForwarder {
        &self.input
    }

    /// ### English
    /// Startup configuration.
    ///
    /// ### 中文
    /// 启动配置。
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// ### English
    /// Stats-server endpoint.
    ///
    /// ### 中文
    /// 统计服务器端点。
    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }
}
