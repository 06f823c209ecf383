//! ### English
//! Swap-chain interception: the per-frame driver that runs inside the hooked
//! buffer-swap call.
//!
//! The driver is a small state machine (`Uninitialized → GraphicsLoaded →
//! InputBound → Active`) fed by a platform environment trait so the
//! transitions and failure semantics are testable without a real detour.
//! Failure anywhere degrades to "skip the overlay"; the platform glue always
//! forwards the original swap, so a broken overlay can never break the host.
//!
//! ### 中文
//! 交换链拦截：运行在被 hook 的 buffer-swap 调用内部的每帧驱动器。
//!
//! 驱动器是一个小状态机（`Uninitialized → GraphicsLoaded → InputBound →
//! Active`），通过平台环境 trait 供给，使状态转移与失败语义无需真实
//! detour 即可测试。任何失败都退化为“跳过 overlay”；平台胶水层始终转发原始
//! swap，损坏的 overlay 绝不会拖垮宿主。

#[cfg(not(windows))]
pub mod stub;
#[cfg(windows)]
pub mod windows;

#[cfg(not(windows))]
pub use stub::install;
#[cfg(windows)]
pub use windows::install;

use std::rc::Rc;
use std::sync::Arc;

use dpi::PhysicalSize;
use tracing::{info, warn};

use crate::engine::canvas::OverlayCanvas;
use crate::engine::canvas::frame_pool::FramePool;
use crate::engine::gl::GlApi;

/// ### English
/// Lifecycle stage of the interception driver.
///
/// ### 中文
/// 拦截驱动器的生命周期阶段。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
    /// ### English
    /// No swap intercepted yet; graphics not resolved.
    ///
    /// ### 中文
    /// 尚未拦截到 swap；图形函数未解析。
    Uninitialized,
    /// ### English
    /// GL entry points resolved; browser input not yet bound.
    ///
    /// ### 中文
    /// GL 入口点已解析；浏览器输入尚未绑定。
    GraphicsLoaded,
    /// ### English
    /// Input forwarding installed; first full composite still pending.
    ///
    /// ### 中文
    /// 输入转发已安装；首次完整合成尚未执行。
    InputBound,
    /// ### English
    /// Steady state: composite + forward every frame.
    ///
    /// ### 中文
    /// 稳态：每帧合成并转发。
    Active,
}

/// ### English
/// Platform services the driver needs each intercepted frame.
///
/// Implemented by the Windows detour glue in production and by a fake in
/// tests.
///
/// ### 中文
/// 驱动器在每个被拦截帧中所需的平台服务。
///
/// 生产环境由 Windows detour 胶水实现，测试中由 fake 实现。
pub trait SwapEnv {
    /// ### English
    /// Resolves the GL function table for the current context. Called at
    /// most once per driver; `None` leaves the overlay permanently inert.
    ///
    /// ### 中文
    /// 为当前上下文解析 GL 函数表。每个驱动器至多调用一次；返回 `None`
    /// 则 overlay 永久静默。
    fn load_graphics(&mut self) -> Option<Rc<dyn GlApi>>;

    /// ### English
    /// Client-area size of the window owning the current context;
    /// `(0, 0)` means "not yet presentable".
    ///
    /// ### 中文
    /// 持有当前上下文的窗口客户区尺寸；`(0, 0)` 表示“尚不可呈现”。
    fn window_size(&self) -> PhysicalSize<u32>;

    /// ### English
    /// Whether the embedded-browser subsystem has reported ready.
    ///
    /// ### 中文
    /// 内嵌浏览器子系统是否已报告就绪。
    fn browser_ready(&self) -> bool;

    /// ### English
    /// Installs the input-forwarding hook. Called at most once per driver.
    ///
    /// ### 中文
    /// 安装输入转发 hook。每个驱动器至多调用一次。
    fn bind_input(&mut self) -> bool;

    /// ### English
    /// Drains queued input events to the browser sink.
    ///
    /// ### 中文
    /// 将排队的输入事件转发给浏览器 sink。
    fn pump_input(&mut self);
}

/// ### English
/// Graphics-thread-owned driver state. One instance lives in a thread-local
/// of the hooked thread; everything shared sits inside the [`FramePool`].
///
/// ### 中文
/// 图形线程独占的驱动器状态。实例存放于被 hook 线程的 thread-local 中；
/// 所有共享状态都在 [`FramePool`] 里。
pub struct SwapDriver {
    /// ### English
    /// Current lifecycle stage.
    ///
    /// ### 中文
    /// 当前生命周期阶段。
    stage: HookStage,
    /// ### English
    /// Pool handed to the canvas on graphics load.
    ///
    /// ### 中文
    /// 图形加载时交给画布的缓冲池。
    pool: Arc<FramePool>,
    /// ### English
    /// Canvas, present from `GraphicsLoaded` onward.
    ///
    /// ### 中文
    /// 画布，自 `GraphicsLoaded` 起存在。
    canvas: Option<OverlayCanvas>,
    /// ### English
    /// One-shot guard for graphics resolution.
    ///
    /// ### 中文
    /// 图形解析的一次性保护标志。
    graphics_attempted: bool,
    /// ### English
    /// One-shot guard for input binding.
    ///
    /// ### 中文
    /// 输入绑定的一次性保护标志。
    input_attempted: bool,
}

impl SwapDriver {
    /// ### English
    /// Creates an uninitialized driver over the shared pool.
    ///
    /// ### 中文
    /// 基于共享缓冲池创建未初始化的驱动器。
    pub fn new(pool: Arc<FramePool>) -> Self {
        Self {
            stage: HookStage::Uninitialized,
            pool,
            canvas: None,
            graphics_attempted: false,
            input_attempted: false,
        }
    }

    /// ### English
    /// Current stage (test observability).
    ///
    /// ### 中文
    /// 当前阶段（测试可观测性）。
    pub fn stage(&self) -> HookStage {
        self.stage
    }

    /// ### English
    /// Drives one intercepted swap: lazy graphics/input initialization, input
    /// pump, then the composite pass. The caller forwards the original swap
    /// afterwards regardless of what happened here.
    ///
    /// #### Parameters
    /// - `env`: Platform services for this frame.
    ///
    /// ### 中文
    /// 驱动一次被拦截的 swap：惰性初始化图形/输入、泵送输入、执行合成。
    /// 无论这里发生什么，调用方随后都会转发原始 swap。
    ///
    /// #### 参数
    /// - `env`：本帧的平台服务。
    pub fn on_swap(&mut self, env: &mut dyn SwapEnv) {
        if !self.graphics_attempted {
            self.graphics_attempted = true;
            match env.load_graphics() {
                Some(gl) => {
                    self.canvas = Some(OverlayCanvas::new(gl, Arc::clone(&self.pool)));
                    self.stage = HookStage::GraphicsLoaded;
                    info!("graphics function table resolved");
                }
                None => {
                    warn!("failed to resolve graphics function table, overlay disabled");
                }
            }
        }

        let Some(canvas) = &mut self.canvas else {
            return;
        };

        if !self.input_attempted && env.browser_ready() {
            self.input_attempted = true;
            if env.bind_input() {
                self.stage = HookStage::InputBound;
                info!("input forwarding bound");
            } else {
                warn!("input binding failed, overlay renders without input");
            }
        }

        if matches!(self.stage, HookStage::InputBound | HookStage::Active) {
            env.pump_input();
        }

        canvas.composite(env.window_size());
        if self.stage == HookStage::InputBound {
            self.stage = HookStage::Active;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    use dpi::PhysicalSize;

    use super::*;
    use crate::engine::gl::recording::RecordingGl;

    struct FakeEnv {
        gl: Option<Rc<RecordingGl>>,
        load_calls: Cell<usize>,
        size: PhysicalSize<u32>,
        ready: bool,
        bind_ok: bool,
        bind_calls: Cell<usize>,
        pump_calls: Cell<usize>,
    }

    impl FakeEnv {
        fn working() -> Self {
            Self {
                gl: Some(Rc::new(RecordingGl::new())),
                load_calls: Cell::new(0),
                size: PhysicalSize::new(800, 600),
                ready: false,
                bind_ok: true,
                bind_calls: Cell::new(0),
                pump_calls: Cell::new(0),
            }
        }
    }

    impl SwapEnv for FakeEnv {
        fn load_graphics(&mut self) -> Option<Rc<dyn GlApi>> {
            self.load_calls.set(self.load_calls.get() + 1);
            self.gl.clone().map(|gl| gl as Rc<dyn GlApi>)
        }

        fn window_size(&self) -> PhysicalSize<u32> {
            self.size
        }

        fn browser_ready(&self) -> bool {
            self.ready
        }

        fn bind_input(&mut self) -> bool {
            self.bind_calls.set(self.bind_calls.get() + 1);
            self.bind_ok
        }

        fn pump_input(&mut self) {
            self.pump_calls.set(self.pump_calls.get() + 1);
        }
    }

    #[test]
    fn graphics_is_resolved_exactly_once() {
        let mut env = FakeEnv::working();
        let mut driver = SwapDriver::new(Arc::new(FramePool::new()));

        driver.on_swap(&mut env);
        driver.on_swap(&mut env);
        driver.on_swap(&mut env);

        assert_eq!(env.load_calls.get(), 1);
        assert_eq!(driver.stage(), HookStage::GraphicsLoaded);
    }

    #[test]
    fn graphics_failure_leaves_overlay_inert_without_retry() {
        let mut env = FakeEnv::working();
        env.gl = None;
        let mut driver = SwapDriver::new(Arc::new(FramePool::new()));

        driver.on_swap(&mut env);
        driver.on_swap(&mut env);

        assert_eq!(env.load_calls.get(), 1);
        assert_eq!(driver.stage(), HookStage::Uninitialized);
        assert_eq!(env.pump_calls.get(), 0);
    }

    #[test]
    fn input_binds_once_after_browser_reports_ready() {
        let mut env = FakeEnv::working();
        let mut driver = SwapDriver::new(Arc::new(FramePool::new()));

        driver.on_swap(&mut env);
        assert_eq!(env.bind_calls.get(), 0);

        env.ready = true;
        driver.on_swap(&mut env);
        driver.on_swap(&mut env);

        assert_eq!(env.bind_calls.get(), 1);
        assert_eq!(driver.stage(), HookStage::Active);
        assert!(env.pump_calls.get() >= 1);
    }

    #[test]
    fn input_bind_failure_still_renders() {
        let mut env = FakeEnv::working();
        env.ready = true;
        env.bind_ok = false;
        let mut driver = SwapDriver::new(Arc::new(FramePool::new()));

        driver.on_swap(&mut env);
        driver.on_swap(&mut env);

        assert_eq!(env.bind_calls.get(), 1);
        assert_eq!(driver.stage(), HookStage::GraphicsLoaded);
        // The composite still ran: the canvas created its surface.
        let gl = env.gl.as_ref().unwrap();
        assert!(gl.call_count("draw_arrays") >= 1);
        assert_eq!(env.pump_calls.get(), 0);
    }

    #[test]
    fn zero_sized_window_skips_composite() {
        let mut env = FakeEnv::working();
        env.size = PhysicalSize::new(0, 0);
        let mut driver = SwapDriver::new(Arc::new(FramePool::new()));

        driver.on_swap(&mut env);
        assert_eq!(env.gl.as_ref().unwrap().call_count("draw_arrays"), 0);

        env.size = PhysicalSize::new(1280, 720);
        driver.on_swap(&mut env);
        assert_eq!(env.gl.as_ref().unwrap().call_count("draw_arrays"), 1);
    }
}
