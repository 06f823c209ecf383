//! ### English
//! Producer boundary: the two calls the embedded browser's paint callback
//! makes, once per painted frame.
//!
//! ### 中文
//! 生产者边界：内嵌浏览器 paint 回调每绘制一帧所做的两个调用。

use dpi::PhysicalSize;

use crate::engine::runtime::OverlayRuntime;

#[unsafe(no_mangle)]
/// ### English
/// Returns a write pointer for one BGRA frame at `width` × `height`, or NULL.
///
/// NULL means "skip this paint": the overlay is not bootstrapped yet, the
/// dimensions are stale (a resize is propagating), or no buffer is currently
/// mapped. The callback must treat NULL as retry-next-paint, and must not
/// retain a non-NULL pointer past the matching `web_overlay_paint_complete`.
///
/// ### 中文
/// 返回一个 `width` × `height` BGRA 帧的写指针，或 NULL。
///
/// NULL 意为“跳过本次 paint”：overlay 尚未 bootstrap、尺寸已过期
///（resize 正在传播）、或当前没有已映射的 buffer。回调必须把 NULL 当作
/// 下次 paint 重试，并且不得在对应的 `web_overlay_paint_complete` 之后
/// 继续持有非 NULL 指针。
pub extern "C" fn web_overlay_paint_buffer(width: u32, height: u32) -> *mut u8 {
    let Some(runtime) = OverlayRuntime::get() else {
        return std::ptr::null_mut();
    };
    if width == 0 || height == 0 {
        return std::ptr::null_mut();
    }

    runtime
        .pool()
        .acquire_producer_buffer(PhysicalSize::new(width, height))
}

#[unsafe(no_mangle)]
/// ### English
/// Signals that the browser finished writing the acquired frame. Idempotent:
/// repeated signals without an intervening consumed frame coalesce into one.
///
/// ### 中文
/// 通知浏览器已写完获取到的帧。幂等：两次信号之间若无帧被消费，会合并为
/// 一帧。
pub extern "C" fn web_overlay_paint_complete() {
    if let Some(runtime) = OverlayRuntime::get() {
        runtime.pool().release_producer_buffer();
    }
}
