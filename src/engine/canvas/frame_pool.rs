//! ### English
//! Ping-pong pixel-buffer pool shared between the browser paint thread
//! (producer) and the graphics thread inside the swap hook (consumer).
//!
//! Two GPU pixel-unpack buffers alternate roles: while the producer writes
//! BGRA pixels into the mapped producer-side buffer, the consumer uploads the
//! previously filled one. The paint-ready handoff is a single-writer atomic
//! flag and the mapped-pointer handoff an atomic pointer; a mutex serializes
//! `resize` against `acquire`/`consume` because resize touches several fields
//! non-atomically. Nothing here ever blocks: `acquire` and `consume` try once
//! and return a sentinel, so the worst case under pressure is a dropped or
//! repeated frame, never a stall in either thread.
//!
//! All GL calls (map, unmap, create, delete) happen on the graphics thread;
//! the producer only ever loads the published pointer and size.
//!
//! ### 中文
//! 浏览器 paint 线程（生产者）与 swap hook 内图形线程（消费者）共享的
//! ping-pong 像素缓冲池。
//!
//! 两个 GPU pixel-unpack buffer 轮换角色：生产者向已映射的生产侧 buffer
//! 写入 BGRA 像素，同时消费者上传上一帧填充完的那个。paint-ready 交接是
//! 单写者原子标志，映射指针交接是原子指针；`resize` 触碰多个字段、无法
//! 原子完成，因此用互斥锁将其与 `acquire`/`consume` 串行化。这里没有任何
//! 阻塞操作：`acquire` 与 `consume` 只尝试一次并返回哨兵值，压力之下最坏
//! 情况是丢帧或重复帧，绝不会卡住任何一方。
//!
//! 所有 GL 调用（map、unmap、创建、删除）都发生在图形线程；生产者只读取
//! 已发布的指针与尺寸。

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicU64, Ordering};

use dpi::PhysicalSize;

use crate::engine::gl::GlApi;

/// ### English
/// Bytes per BGRA8 pixel.
///
/// ### 中文
/// 每个 BGRA8 像素的字节数。
pub const BYTES_PER_PIXEL: u32 = 4;

/// ### English
/// Fixed pool depth (always 2: one producer-side, one consumer-side buffer).
///
/// ### 中文
/// 固定缓冲池深度（始终为 2：生产侧与消费侧各一个）。
pub const PING_PONG_COUNT: usize = 2;

#[inline]
fn pack_size(size: PhysicalSize<u32>) -> u64 {
    (u64::from(size.width) << 32) | u64::from(size.height)
}

#[inline]
fn unpack_size(packed: u64) -> PhysicalSize<u32> {
    PhysicalSize::new((packed >> 32) as u32, packed as u32)
}

/// ### English
/// A consumed frame ready for texture upload (the filled, now-unmapped PBO).
///
/// ### 中文
/// 已被消费、等待纹理上传的帧（填充完毕且已解除映射的 PBO）。
#[derive(Clone, Copy, Debug)]
pub struct UploadSource {
    /// ### English
    /// PBO object name to bind as the pixel-unpack source.
    ///
    /// ### 中文
    /// 作为 pixel-unpack 源绑定的 PBO 对象名。
    pub buffer: u32,
    /// ### English
    /// Frame dimensions the buffer was filled at.
    ///
    /// ### 中文
    /// 该 buffer 填充时的帧尺寸。
    pub size: PhysicalSize<u32>,
}

/// ### English
/// Fields only the graphics thread mutates, guarded by the pool mutex.
///
/// ### 中文
/// 仅图形线程修改的字段，由缓冲池互斥锁保护。
struct PoolInner {
    /// ### English
    /// PBO object names (`0` = not yet created).
    ///
    /// ### 中文
    /// PBO 对象名（`0` = 尚未创建）。
    buffers: [u32; PING_PONG_COUNT],
    /// ### English
    /// Index of the producer-side buffer; the other one is consumer-side.
    ///
    /// ### 中文
    /// 生产侧 buffer 的下标；另一个即消费侧。
    producer: usize,
    /// ### English
    /// Whether the producer-side buffer is currently mapped for writing.
    ///
    /// ### 中文
    /// 生产侧 buffer 当前是否处于写映射状态。
    mapped: bool,
    /// ### English
    /// Buffer name consumed but not yet recycled after its texture upload.
    ///
    /// ### 中文
    /// 已消费、但纹理上传后尚未回收的 buffer 名。
    pending_upload: Option<u32>,
    /// ### English
    /// Current buffer dimensions.
    ///
    /// ### 中文
    /// 当前 buffer 尺寸。
    size: PhysicalSize<u32>,
}

/// ### English
/// The ping-pong frame buffer pool. `Send + Sync`: shared state is either
/// atomic or behind the mutex, and GPU objects are plain names whose GL is
/// passed in by the graphics thread per call.
///
/// ### 中文
/// ping-pong 帧缓冲池。`Send + Sync`：共享状态要么是原子的、要么在互斥锁
/// 之后，GPU 对象只是普通名字，GL 由图形线程每次调用传入。
pub struct FramePool {
    /// ### English
    /// Structure-changing state (buffers, roles, mapping).
    ///
    /// ### 中文
    /// 结构性状态（buffer、角色、映射）。
    inner: Mutex<PoolInner>,
    /// ### English
    /// Producer-finished flag. Producer stores `true`, consumer stores `false`.
    ///
    /// ### 中文
    /// 生产完成标志。生产者写 `true`，消费者写 `false`。
    paint_ready: AtomicBool,
    /// ### English
    /// Pointer into the mapped producer-side buffer, or null. Written only by
    /// the graphics thread, read by the producer.
    ///
    /// ### 中文
    /// 指向已映射生产侧 buffer 的指针，或 null。仅图形线程写，生产者读。
    producer_ptr: AtomicPtr<u8>,
    /// ### English
    /// Packed `(width, height)` of the current buffers (`0` = no surface yet).
    /// Lets the producer reject stale-dimension paints without the lock.
    ///
    /// ### 中文
    /// 当前 buffer 的打包 `(width, height)`（`0` = 尚无 surface）。
    /// 生产者无需持锁即可拒绝过期尺寸的 paint。
    surface_packed: AtomicU64,
}

impl FramePool {
    /// ### English
    /// Creates an empty pool; buffers appear on the first `resize`.
    ///
    /// ### 中文
    /// 创建空缓冲池；buffer 在首次 `resize` 时创建。
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                buffers: [0; PING_PONG_COUNT],
                producer: 0,
                mapped: false,
                pending_upload: None,
                size: PhysicalSize::new(0, 0),
            }),
            paint_ready: AtomicBool::new(false),
            producer_ptr: AtomicPtr::new(std::ptr::null_mut()),
            surface_packed: AtomicU64::new(0),
        }
    }

    /// ### English
    /// Deletes and recreates both buffers at `size`, invalidating any
    /// in-flight mapping. Graphics thread only; takes the full lock.
    ///
    /// The producer's published pointer is nulled *before* the unmap so a
    /// paint racing the resize re-acquires against the new size instead of
    /// writing through a dead mapping.
    ///
    /// #### Parameters
    /// - `gl`: GL used to recreate the buffers.
    /// - `size`: New surface dimensions.
    ///
    /// ### 中文
    /// 以 `size` 删除并重建两个 buffer，使任何进行中的映射失效。
    /// 仅限图形线程；持有完整锁。
    ///
    /// 在 unmap 之前先将发布给生产者的指针清空，使与 resize 竞争的 paint
    /// 针对新尺寸重新 acquire，而不是写入已失效的映射。
    ///
    /// #### 参数
    /// - `gl`：用于重建 buffer 的 GL。
    /// - `size`：新的 surface 尺寸。
    pub fn resize(&self, gl: &dyn GlApi, size: PhysicalSize<u32>) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        self.producer_ptr
            .store(std::ptr::null_mut(), Ordering::Release);
        self.paint_ready.store(false, Ordering::Release);

        if inner.mapped {
            gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, inner.buffers[inner.producer]);
            gl.unmap_buffer(glow::PIXEL_UNPACK_BUFFER);
            gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, 0);
            inner.mapped = false;
        }

        for buffer in inner.buffers {
            if buffer != 0 {
                gl.delete_buffer(buffer);
            }
        }

        let byte_len = (size.width * size.height * BYTES_PER_PIXEL) as i32;
        for slot in &mut inner.buffers {
            let buffer = gl.create_buffer();
            gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, buffer);
            gl.buffer_data_size(glow::PIXEL_UNPACK_BUFFER, byte_len, glow::STREAM_DRAW);
            *slot = buffer;
        }
        gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, 0);

        inner.producer = 0;
        inner.pending_upload = None;
        inner.size = size;
        self.surface_packed.store(pack_size(size), Ordering::Release);
    }

    /// ### English
    /// Maps the producer-side buffer and publishes the write pointer, if it is
    /// not mapped already. Graphics thread only. A failed map leaves the
    /// pointer null; the next swap retries.
    ///
    /// ### 中文
    /// 若生产侧 buffer 尚未映射，则映射它并发布写指针。仅限图形线程。
    /// 映射失败时指针保持 null，下一次 swap 重试。
    pub fn prepare_producer(&self, gl: &dyn GlApi) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let buffer = inner.buffers[inner.producer];
        if buffer == 0 || inner.mapped {
            return;
        }

        let byte_len = (inner.size.width * inner.size.height * BYTES_PER_PIXEL) as i32;
        gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, buffer);
        let ptr = gl.map_buffer_range(
            glow::PIXEL_UNPACK_BUFFER,
            0,
            byte_len,
            glow::MAP_WRITE_BIT | glow::MAP_INVALIDATE_BUFFER_BIT,
        );
        gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, 0);

        if ptr.is_null() {
            return;
        }

        inner.mapped = true;
        self.producer_ptr.store(ptr, Ordering::Release);
    }

    /// ### English
    /// Producer-side: returns the write pointer for a paint at `requested`
    /// dimensions, or null if the dimensions are stale, no buffer is mapped,
    /// or a resize holds the lock. Null means "skip this paint and retry";
    /// it is never fatal.
    ///
    /// The pointer stays valid until `consume_and_swap` or `resize` runs; the
    /// caller must not retain it past its matching `release_producer_buffer`.
    ///
    /// #### Parameters
    /// - `requested`: Dimensions the producer is about to paint at.
    ///
    /// ### 中文
    /// 生产侧：返回以 `requested` 尺寸 paint 的写指针；若尺寸过期、无已
    /// 映射 buffer、或 resize 正持有锁，则返回 null。null 意为“跳过本次
    /// paint 稍后重试”，绝非致命错误。
    ///
    /// 指针在 `consume_and_swap` 或 `resize` 执行前有效；调用方不得在对应
    /// 的 `release_producer_buffer` 之后继续持有它。
    ///
    /// #### 参数
    /// - `requested`：生产者即将 paint 的尺寸。
    pub fn acquire_producer_buffer(&self, requested: PhysicalSize<u32>) -> *mut u8 {
        let packed = self.surface_packed.load(Ordering::Acquire);
        if packed == 0 || unpack_size(packed) != requested {
            return std::ptr::null_mut();
        }

        // Contention here means a resize is mid-flight; drop the paint.
        let Ok(inner) = self.inner.try_lock() else {
            return std::ptr::null_mut();
        };
        if !inner.mapped {
            return std::ptr::null_mut();
        }

        self.producer_ptr.load(Ordering::Acquire)
    }

    /// ### English
    /// Producer-side "paint complete" signal. Does not unmap (that is the
    /// graphics thread's job) and never blocks. Signaling twice without an
    /// intervening consume coalesces into one frame.
    ///
    /// ### 中文
    /// 生产侧“paint 完成”信号。不做 unmap（那是图形线程的职责），也绝不
    /// 阻塞。两次信号之间若无消费，会合并为一帧。
    pub fn release_producer_buffer(&self) {
        self.paint_ready.store(true, Ordering::Release);
    }

    /// ### English
    /// Consumer-side: if a completed paint is pending, unmaps the filled
    /// buffer, swaps producer/consumer roles, and returns the upload source.
    /// Returns `None` (performing zero GL calls) when no paint is pending,
    /// and drops the signal when it refers to a mapping that no longer exists
    /// (stale notify after a resize).
    ///
    /// This is the coalescing point: paints that arrive between two polls are
    /// not queued; only the latest completed buffer survives.
    ///
    /// ### 中文
    /// 消费侧：若有已完成的 paint，解除已填充 buffer 的映射、交换生产/
    /// 消费角色并返回上传源。无待处理 paint 时返回 `None` 且不执行任何
    /// GL 调用；若信号指向已不存在的映射（resize 后的过期通知）则丢弃。
    ///
    /// 这里是合并点：两次轮询之间到达的 paint 不排队，只保留最新完成的
    /// 那个 buffer。
    pub fn consume_and_swap(&self, gl: &dyn GlApi) -> Option<UploadSource> {
        if !self.paint_ready.load(Ordering::Acquire) {
            return None;
        }

        let Ok(mut inner) = self.inner.try_lock() else {
            return None;
        };

        self.paint_ready.store(false, Ordering::Release);
        if !inner.mapped {
            return None;
        }

        self.producer_ptr
            .store(std::ptr::null_mut(), Ordering::Release);

        let filled = inner.buffers[inner.producer];
        gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, filled);
        gl.unmap_buffer(glow::PIXEL_UNPACK_BUFFER);
        gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, 0);
        inner.mapped = false;

        inner.pending_upload = Some(filled);
        inner.producer = (inner.producer + 1) % PING_PONG_COUNT;

        Some(UploadSource {
            buffer: filled,
            size: inner.size,
        })
    }

    /// ### English
    /// Marks the consumed buffer idle again after its texture upload.
    ///
    /// ### 中文
    /// 纹理上传完成后，将已消费的 buffer 重新标记为空闲。
    pub fn recycle_uploaded(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.pending_upload = None;
    }

    /// ### English
    /// Dimensions of the current buffers, if any resize has happened yet.
    ///
    /// ### 中文
    /// 当前 buffer 的尺寸（若已发生过 resize）。
    pub fn surface_size(&self) -> Option<PhysicalSize<u32>> {
        let packed = self.surface_packed.load(Ordering::Acquire);
        (packed != 0).then(|| unpack_size(packed))
    }

    /// ### English
    /// Whether a consumed buffer is awaiting recycle (test observability).
    ///
    /// ### 中文
    /// 是否有已消费 buffer 等待回收（测试可观测性）。
    #[cfg(test)]
    pub fn pending_upload_active(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pending_upload
            .is_some()
    }

    /// ### English
    /// Whether the producer-side buffer is currently mapped (test observability).
    ///
    /// ### 中文
    /// 生产侧 buffer 当前是否已映射（测试可观测性）。
    #[cfg(test)]
    pub fn producer_mapped(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .mapped
    }
}

impl Default for FramePool {
    fn default() -> Self {
        Self::new()
    }
}
