//! ### English
//! The overlay canvas: render surface, frame pool and quad renderer, driven
//! once per intercepted swap by the graphics thread.
//!
//! Control flow per frame: window-size check (resize both pool and renderer
//! wholesale on mismatch) → consume/upload the latest completed paint →
//! re-arm the producer mapping → draw, all inside one state snapshot so the
//! host's own rendering cannot observe the pass.
//!
//! ### 中文
//! overlay 画布：渲染 surface、帧缓冲池与四边形渲染器，由图形线程在每次
//! 被拦截的 swap 中驱动一次。
//!
//! 每帧控制流：窗口尺寸检查（不一致时整体重建缓冲池与渲染器）→ 消费/上传
//! 最新完成的 paint → 重新建立生产者映射 → 绘制，全部处于同一个状态快照
//! 之内，宿主自身的渲染无法观察到这一过程。

pub mod frame_pool;
pub mod renderer;
pub mod snapshot;

use std::rc::Rc;
use std::sync::Arc;

use dpi::PhysicalSize;
use tracing::{info, warn};

use self::frame_pool::FramePool;
use self::renderer::QuadRenderer;
use self::snapshot::GlStateSnapshot;
use crate::engine::gl::GlApi;

/// ### English
/// Graphics-thread-owned canvas state. `!Send` by construction (holds the
/// `Rc<dyn GlApi>`); only the shared [`FramePool`] crosses threads.
///
/// ### 中文
/// 图形线程独占的画布状态。因持有 `Rc<dyn GlApi>` 而天然 `!Send`；只有
/// 共享的 [`FramePool`] 跨线程。
pub struct OverlayCanvas {
    /// ### English
    /// GL for every call this canvas makes.
    ///
    /// ### 中文
    /// 本画布所有调用使用的 GL。
    gl: Rc<dyn GlApi>,
    /// ### English
    /// Pool shared with the browser paint thread.
    ///
    /// ### 中文
    /// 与浏览器 paint 线程共享的缓冲池。
    pool: Arc<FramePool>,
    /// ### English
    /// Current renderer generation; `None` until the first successful resize
    /// (or after a failed recreation, in which case composition is skipped).
    ///
    /// ### 中文
    /// 当前渲染器代；首次成功 resize 之前为 `None`（重建失败后亦然，此时
    /// 跳过合成）。
    renderer: Option<QuadRenderer>,
}

impl OverlayCanvas {
    /// ### English
    /// Creates a canvas with no GPU objects yet; they appear on the first
    /// composite with a non-zero window size.
    ///
    /// ### 中文
    /// 创建尚无 GPU 对象的画布；对象在首次以非零窗口尺寸合成时创建。
    pub fn new(gl: Rc<dyn GlApi>, pool: Arc<FramePool>) -> Self {
        Self {
            gl,
            pool,
            renderer: None,
        }
    }

    /// ### English
    /// Runs one composite pass for the given client-area size. A `(0, 0)`
    /// size means "not yet presentable": no resize, no draw, no GL calls.
    ///
    /// #### Parameters
    /// - `window_size`: Client-area size of the window owning the context.
    ///
    /// ### 中文
    /// 以给定客户区尺寸执行一次合成。尺寸为 `(0, 0)` 表示“尚不可呈现”：
    /// 不 resize、不绘制、不做任何 GL 调用。
    ///
    /// #### 参数
    /// - `window_size`：持有上下文的窗口客户区尺寸。
    pub fn composite(&mut self, window_size: PhysicalSize<u32>) {
        if window_size.width == 0 || window_size.height == 0 {
            return;
        }

        let snapshot = GlStateSnapshot::capture(self.gl.as_ref());
        self.composite_pass(window_size);
        snapshot.restore(self.gl.as_ref());
    }

    fn composite_pass(&mut self, window_size: PhysicalSize<u32>) {
        if self.renderer.as_ref().map(QuadRenderer::size) != Some(window_size) {
            self.recreate_surface(window_size);
        }

        let Some(renderer) = &self.renderer else {
            return;
        };

        let gl = self.gl.as_ref();
        if let Some(source) = self.pool.consume_and_swap(gl) {
            if !renderer.upload(source) {
                warn!(
                    filled_width = source.size.width,
                    filled_height = source.size.height,
                    "dropping frame filled at stale dimensions"
                );
            }
            self.pool.recycle_uploaded();
        }

        self.pool.prepare_producer(gl);
        renderer.draw();
    }

    /// ### English
    /// Wholesale surface regeneration: the pool is resized first so any
    /// in-flight producer mapping is invalidated before the old texture
    /// generation goes away.
    ///
    /// ### 中文
    /// surface 整体重建：先 resize 缓冲池，使任何进行中的生产者映射在旧
    /// 纹理代销毁之前先行失效。
    fn recreate_surface(&mut self, window_size: PhysicalSize<u32>) {
        self.pool.resize(self.gl.as_ref(), window_size);

        match QuadRenderer::create(&self.gl, window_size) {
            Ok(renderer) => {
                info!(
                    width = window_size.width,
                    height = window_size.height,
                    "render surface resized"
                );
                self.renderer = Some(renderer);
            }
            Err(err) => {
                warn!("renderer recreation failed, overlay inert: {err}");
                self.renderer = None;
            }
        }
    }

    /// ### English
    /// The pool shared with the producer boundary.
    ///
    /// ### 中文
    /// 与生产者边界共享的缓冲池。
    pub fn pool(&self) -> &Arc<FramePool> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Arc;

    use dpi::PhysicalSize;

    use super::frame_pool::{BYTES_PER_PIXEL, FramePool};
    use super::*;
    use crate::engine::gl::recording::{FakeGlState, RecordingGl};

    fn canvas() -> (Rc<RecordingGl>, Arc<FramePool>, OverlayCanvas) {
        let gl = Rc::new(RecordingGl::new());
        let dyn_gl: Rc<dyn GlApi> = gl.clone();
        let pool = Arc::new(FramePool::new());
        let canvas = OverlayCanvas::new(dyn_gl, Arc::clone(&pool));
        (gl, pool, canvas)
    }

    fn paint(pool: &FramePool, size: PhysicalSize<u32>) {
        let ptr = pool.acquire_producer_buffer(size);
        assert!(!ptr.is_null(), "producer could not acquire at {size:?}");
        let byte_len = (size.width * size.height * BYTES_PER_PIXEL) as usize;
        unsafe { std::ptr::write_bytes(ptr, 0xAB, byte_len) };
        pool.release_producer_buffer();
    }

    #[test]
    fn zero_size_composite_performs_no_gl_calls() {
        let (gl, _pool, mut canvas) = canvas();
        canvas.composite(PhysicalSize::new(0, 0));
        assert_eq!(gl.total_calls(), 0);
    }

    #[test]
    fn steady_state_cycle_uploads_and_draws() {
        let (gl, pool, mut canvas) = canvas();
        let size = PhysicalSize::new(800, 600);

        // First pass creates the surface and arms the producer mapping.
        canvas.composite(size);
        assert_eq!(gl.call_count("draw_arrays"), 1);
        assert_eq!(gl.call_count("tex_sub_image_2d_pbo"), 0);

        // Matching size: no recreation on the next pass.
        gl.reset_calls();
        canvas.composite(size);
        assert_eq!(gl.call_count("create_texture"), 0);
        assert_eq!(gl.call_count("create_buffer"), 0);

        paint(&pool, size);

        gl.reset_calls();
        canvas.composite(size);
        assert_eq!(gl.call_count("tex_sub_image_2d_pbo"), 1);
        assert_eq!(gl.call_count("draw_arrays"), 1);
        assert!(!pool.pending_upload_active());
    }

    #[test]
    fn resize_between_draws_recreates_once_and_discards_in_flight_paint() {
        let (gl, pool, mut canvas) = canvas();
        canvas.composite(PhysicalSize::new(800, 600));

        // Producer is mid-paint at the old size when the window grows.
        let stale = pool.acquire_producer_buffer(PhysicalSize::new(800, 600));
        assert!(!stale.is_null());
        pool.release_producer_buffer();

        gl.reset_calls();
        canvas.composite(PhysicalSize::new(1024, 768));

        // Exactly one pool + renderer regeneration, no upload of the stale frame.
        assert_eq!(gl.call_count("create_buffer"), 3); // 2 PBOs + quad VBO
        assert_eq!(gl.call_count("create_texture"), 1);
        assert_eq!(gl.call_count("tex_sub_image_2d_pbo"), 0);

        // Steady state at the new size: nothing further is recreated.
        gl.reset_calls();
        canvas.composite(PhysicalSize::new(1024, 768));
        assert_eq!(gl.call_count("create_buffer"), 0);
        assert_eq!(gl.call_count("create_texture"), 0);

        paint(&pool, PhysicalSize::new(1024, 768));
        canvas.composite(PhysicalSize::new(1024, 768));
        assert_eq!(gl.call_count("tex_sub_image_2d_pbo"), 1);
    }

    #[test]
    fn composite_leaves_tracked_state_bit_identical() {
        let (gl, pool, mut canvas) = canvas();
        let size = PhysicalSize::new(800, 600);
        canvas.composite(size);
        paint(&pool, size);

        let host_state = FakeGlState {
            current_program: 31,
            active_texture: glow::TEXTURE0 + 2,
            texture_2d: 17,
            array_buffer: 23,
            vertex_array: 29,
            blend: false,
            cull_face: true,
            depth_test: true,
            scissor_test: true,
            viewport: [0, 0, 800, 600],
            scissor_box: [5, 5, 100, 100],
            ..FakeGlState::default()
        };
        gl.set_state(host_state.clone());

        canvas.composite(size);
        assert_eq!(gl.state(), host_state);
    }
}
