//! ### English
//! Recording [`GlApi`] implementation for tests.
//!
//! Counts every call, tracks live object names for leak assertions, models
//! the pipeline state the overlay touches so state-restoration can be checked
//! bit-for-bit, and backs `map_buffer_range` with real heap memory so
//! producer writes work without a GL context.
//!
//! ### 中文
//! 测试用的记录型 [`GlApi`] 实现。
//!
//! 统计每次调用、跟踪存活对象名以断言无泄漏、模拟 overlay 触碰的管线状态
//! 以便逐位校验状态恢复，并用真实堆内存支撑 `map_buffer_range`，使生产者
//! 写入无需 GL 上下文。

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use super::GlApi;

/// ### English
/// The fake pipeline state tracked by [`RecordingGl`].
///
/// Field meanings mirror the `glGet` parameters the overlay snapshots.
///
/// ### 中文
/// [`RecordingGl`] 跟踪的伪管线状态。
///
/// 字段含义与 overlay 快照的 `glGet` 参数一一对应。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakeGlState {
    pub current_program: u32,
    pub active_texture: u32,
    pub texture_2d: u32,
    pub array_buffer: u32,
    pub pixel_unpack_buffer: u32,
    pub vertex_array: u32,
    pub blend: bool,
    pub cull_face: bool,
    pub depth_test: bool,
    pub scissor_test: bool,
    pub blend_src_rgb: u32,
    pub blend_dst_rgb: u32,
    pub blend_src_alpha: u32,
    pub blend_dst_alpha: u32,
    pub blend_equation_rgb: u32,
    pub blend_equation_alpha: u32,
    pub viewport: [i32; 4],
    pub scissor_box: [i32; 4],
    pub unpack_alignment: i32,
}

impl Default for FakeGlState {
    fn default() -> Self {
        Self {
            current_program: 0,
            active_texture: glow::TEXTURE0,
            texture_2d: 0,
            array_buffer: 0,
            pixel_unpack_buffer: 0,
            vertex_array: 0,
            blend: false,
            cull_face: true,
            depth_test: true,
            scissor_test: false,
            blend_src_rgb: glow::ONE,
            blend_dst_rgb: glow::ZERO,
            blend_src_alpha: glow::ONE,
            blend_dst_alpha: glow::ZERO,
            blend_equation_rgb: glow::FUNC_ADD,
            blend_equation_alpha: glow::FUNC_ADD,
            viewport: [0, 0, 800, 600],
            scissor_box: [0, 0, 800, 600],
            unpack_alignment: 4,
        }
    }
}

/// ### English
/// Recording GL double. All interior-mutable so it can sit behind `Rc<dyn GlApi>`.
///
/// ### 中文
/// 记录型 GL 替身。全部使用内部可变性，以便置于 `Rc<dyn GlApi>` 之后。
#[derive(Default)]
pub struct RecordingGl {
    calls: RefCell<Vec<&'static str>>,
    next_name: Cell<u32>,
    live: RefCell<HashSet<(&'static str, u32)>>,
    mapped: RefCell<HashMap<u32, Box<[u8]>>>,
    uniforms: RefCell<HashMap<(u32, String), i32>>,
    state: RefCell<FakeGlState>,
    /// ### English
    /// Test knob: when set, `map_buffer_range` returns null.
    ///
    /// ### 中文
    /// 测试开关：置位时 `map_buffer_range` 返回 null。
    pub fail_mapping: Cell<bool>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self {
            next_name: Cell::new(1),
            ..Self::default()
        }
    }

    fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }

    fn alloc(&self, kind: &'static str) -> u32 {
        let name = self.next_name.get();
        self.next_name.set(name + 1);
        self.live.borrow_mut().insert((kind, name));
        name
    }

    fn release(&self, kind: &'static str, name: u32) {
        self.live.borrow_mut().remove(&(kind, name));
    }

    /// ### English
    /// Number of calls recorded for one entry point.
    ///
    /// ### 中文
    /// 某个入口点被调用的次数。
    pub fn call_count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == name).count()
    }

    /// ### English
    /// Total number of GL calls recorded.
    ///
    /// ### 中文
    /// 记录到的 GL 调用总数。
    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    /// ### English
    /// Forgets the call log (object/state tracking is kept).
    ///
    /// ### 中文
    /// 清空调用日志（对象与状态跟踪保留）。
    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// ### English
    /// Live (created, not yet deleted) object count across all kinds.
    ///
    /// ### 中文
    /// 所有类型中仍存活（已创建未删除）的对象数。
    pub fn live_objects(&self) -> usize {
        self.live.borrow().len()
    }

    /// ### English
    /// Number of currently mapped buffers.
    ///
    /// ### 中文
    /// 当前处于映射状态的 buffer 数。
    pub fn mapped_buffers(&self) -> usize {
        self.mapped.borrow().len()
    }

    /// ### English
    /// Copy of the fake pipeline state.
    ///
    /// ### 中文
    /// 伪管线状态的拷贝。
    pub fn state(&self) -> FakeGlState {
        self.state.borrow().clone()
    }

    /// ### English
    /// Overwrites the fake pipeline state (to model host-set state).
    ///
    /// ### 中文
    /// 覆盖伪管线状态（模拟宿主设置的状态）。
    pub fn set_state(&self, state: FakeGlState) {
        *self.state.borrow_mut() = state;
    }
}

impl GlApi for RecordingGl {
    fn create_buffer(&self) -> u32 {
        self.record("create_buffer");
        self.alloc("buffer")
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record("delete_buffer");
        self.mapped.borrow_mut().remove(&buffer);
        self.release("buffer", buffer);
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        self.record("bind_buffer");
        let mut state = self.state.borrow_mut();
        match target {
            glow::PIXEL_UNPACK_BUFFER => state.pixel_unpack_buffer = buffer,
            glow::ARRAY_BUFFER => state.array_buffer = buffer,
            _ => {}
        }
    }

    fn buffer_data_size(&self, _target: u32, _size: i32, _usage: u32) {
        self.record("buffer_data_size");
    }

    fn buffer_data_u8_slice(&self, _target: u32, _data: &[u8], _usage: u32) {
        self.record("buffer_data_u8_slice");
    }

    fn map_buffer_range(&self, _target: u32, _offset: i32, length: i32, _access: u32) -> *mut u8 {
        self.record("map_buffer_range");
        if self.fail_mapping.get() {
            return std::ptr::null_mut();
        }

        let buffer = self.state.borrow().pixel_unpack_buffer;
        let mut storage = vec![0u8; length.max(0) as usize].into_boxed_slice();
        let ptr = storage.as_mut_ptr();
        self.mapped.borrow_mut().insert(buffer, storage);
        ptr
    }

    fn unmap_buffer(&self, _target: u32) {
        self.record("unmap_buffer");
        let buffer = self.state.borrow().pixel_unpack_buffer;
        self.mapped.borrow_mut().remove(&buffer);
    }

    fn create_texture(&self) -> u32 {
        self.record("create_texture");
        self.alloc("texture")
    }

    fn delete_texture(&self, texture: u32) {
        self.record("delete_texture");
        self.release("texture", texture);
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.record("bind_texture");
        if target == glow::TEXTURE_2D {
            self.state.borrow_mut().texture_2d = texture;
        }
    }

    fn tex_parameter_i32(&self, _target: u32, _parameter: u32, _value: i32) {
        self.record("tex_parameter_i32");
    }

    fn tex_image_2d_empty(
        &self,
        _target: u32,
        _internal_format: i32,
        _width: i32,
        _height: i32,
        _format: u32,
        _ty: u32,
    ) {
        self.record("tex_image_2d_empty");
    }

    fn tex_sub_image_2d_pbo(
        &self,
        _target: u32,
        _x: i32,
        _y: i32,
        _width: i32,
        _height: i32,
        _format: u32,
        _ty: u32,
        _offset: i32,
    ) {
        self.record("tex_sub_image_2d_pbo");
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        self.record("pixel_store_i32");
        if parameter == glow::UNPACK_ALIGNMENT {
            self.state.borrow_mut().unpack_alignment = value;
        }
    }

    fn create_shader(&self, _kind: u32) -> u32 {
        self.record("create_shader");
        self.alloc("shader")
    }

    fn shader_source(&self, _shader: u32, _source: &str) {
        self.record("shader_source");
    }

    fn compile_shader(&self, _shader: u32) {
        self.record("compile_shader");
    }

    fn shader_compile_ok(&self, _shader: u32) -> bool {
        self.record("shader_compile_ok");
        true
    }

    fn shader_info_log(&self, _shader: u32) -> String {
        self.record("shader_info_log");
        String::new()
    }

    fn delete_shader(&self, shader: u32) {
        self.record("delete_shader");
        self.release("shader", shader);
    }

    fn create_program(&self) -> u32 {
        self.record("create_program");
        self.alloc("program")
    }

    fn attach_shader(&self, _program: u32, _shader: u32) {
        self.record("attach_shader");
    }

    fn link_program(&self, _program: u32) {
        self.record("link_program");
    }

    fn program_link_ok(&self, _program: u32) -> bool {
        self.record("program_link_ok");
        true
    }

    fn program_info_log(&self, _program: u32) -> String {
        self.record("program_info_log");
        String::new()
    }

    fn delete_program(&self, program: u32) {
        self.record("delete_program");
        self.release("program", program);
    }

    fn use_program(&self, program: u32) {
        self.record("use_program");
        self.state.borrow_mut().current_program = program;
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        self.record("uniform_location");
        let mut uniforms = self.uniforms.borrow_mut();
        let next = uniforms.len() as i32;
        *uniforms.entry((program, name.to_owned())).or_insert(next)
    }

    fn uniform_1_i32(&self, _location: i32, _value: i32) {
        self.record("uniform_1_i32");
    }

    fn uniform_2_f32(&self, _location: i32, _x: f32, _y: f32) {
        self.record("uniform_2_f32");
    }

    fn create_vertex_array(&self) -> u32 {
        self.record("create_vertex_array");
        self.alloc("vertex_array")
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.record("delete_vertex_array");
        self.release("vertex_array", vertex_array);
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        self.record("bind_vertex_array");
        self.state.borrow_mut().vertex_array = vertex_array;
    }

    fn enable_vertex_attrib_array(&self, _index: u32) {
        self.record("enable_vertex_attrib_array");
    }

    fn vertex_attrib_pointer_f32(&self, _index: u32, _size: i32, _stride: i32, _offset: i32) {
        self.record("vertex_attrib_pointer_f32");
    }

    fn draw_arrays(&self, _mode: u32, _first: i32, _count: i32) {
        self.record("draw_arrays");
    }

    fn enable(&self, cap: u32) {
        self.record("enable");
        let mut state = self.state.borrow_mut();
        match cap {
            glow::BLEND => state.blend = true,
            glow::CULL_FACE => state.cull_face = true,
            glow::DEPTH_TEST => state.depth_test = true,
            glow::SCISSOR_TEST => state.scissor_test = true,
            _ => {}
        }
    }

    fn disable(&self, cap: u32) {
        self.record("disable");
        let mut state = self.state.borrow_mut();
        match cap {
            glow::BLEND => state.blend = false,
            glow::CULL_FACE => state.cull_face = false,
            glow::DEPTH_TEST => state.depth_test = false,
            glow::SCISSOR_TEST => state.scissor_test = false,
            _ => {}
        }
    }

    fn is_enabled(&self, cap: u32) -> bool {
        self.record("is_enabled");
        let state = self.state.borrow();
        match cap {
            glow::BLEND => state.blend,
            glow::CULL_FACE => state.cull_face,
            glow::DEPTH_TEST => state.depth_test,
            glow::SCISSOR_TEST => state.scissor_test,
            _ => false,
        }
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        self.record("blend_func_separate");
        let mut state = self.state.borrow_mut();
        state.blend_src_rgb = src_rgb;
        state.blend_dst_rgb = dst_rgb;
        state.blend_src_alpha = src_alpha;
        state.blend_dst_alpha = dst_alpha;
    }

    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32) {
        self.record("blend_equation_separate");
        let mut state = self.state.borrow_mut();
        state.blend_equation_rgb = mode_rgb;
        state.blend_equation_alpha = mode_alpha;
    }

    fn active_texture(&self, unit: u32) {
        self.record("active_texture");
        self.state.borrow_mut().active_texture = unit;
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record("viewport");
        self.state.borrow_mut().viewport = [x, y, width, height];
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record("scissor");
        self.state.borrow_mut().scissor_box = [x, y, width, height];
    }

    fn get_parameter_i32(&self, parameter: u32) -> i32 {
        self.record("get_parameter_i32");
        let state = self.state.borrow();
        match parameter {
            glow::CURRENT_PROGRAM => state.current_program as i32,
            glow::ACTIVE_TEXTURE => state.active_texture as i32,
            glow::TEXTURE_BINDING_2D => state.texture_2d as i32,
            glow::ARRAY_BUFFER_BINDING => state.array_buffer as i32,
            glow::PIXEL_UNPACK_BUFFER_BINDING => state.pixel_unpack_buffer as i32,
            glow::VERTEX_ARRAY_BINDING => state.vertex_array as i32,
            glow::BLEND_SRC_RGB => state.blend_src_rgb as i32,
            glow::BLEND_DST_RGB => state.blend_dst_rgb as i32,
            glow::BLEND_SRC_ALPHA => state.blend_src_alpha as i32,
            glow::BLEND_DST_ALPHA => state.blend_dst_alpha as i32,
            glow::BLEND_EQUATION_RGB => state.blend_equation_rgb as i32,
            glow::BLEND_EQUATION_ALPHA => state.blend_equation_alpha as i32,
            glow::UNPACK_ALIGNMENT => state.unpack_alignment,
            _ => 0,
        }
    }

    fn get_parameter_i32_slice(&self, parameter: u32, out: &mut [i32]) {
        self.record("get_parameter_i32_slice");
        let state = self.state.borrow();
        let source = match parameter {
            glow::VIEWPORT => state.viewport,
            glow::SCISSOR_BOX => state.scissor_box,
            _ => [0; 4],
        };
        for (dst, src) in out.iter_mut().zip(source) {
            *dst = src;
        }
    }
}
