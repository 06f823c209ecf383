//! ### English
//! `glow`-backed production implementation of [`GlApi`].
//!
//! Entry points are resolved through a caller-supplied loader (on Windows:
//! `wglGetProcAddress` with an `opengl32.dll` fallback), because the overlay
//! renders inside a context the host application created.
//!
//! ### 中文
//! 基于 `glow` 的 [`GlApi`] 生产实现。
//!
//! GL 入口点通过调用方提供的 loader 解析（Windows 上为 `wglGetProcAddress`
//! 加 `opengl32.dll` 回退），因为 overlay 是在宿主程序创建的上下文内渲染的。

use std::ffi::c_void;
use std::num::NonZeroU32;

use glow::{HasContext, PixelUnpackData};

use super::GlApi;

/// ### English
/// [`GlApi`] implementation over a native `glow::Context`.
///
/// Must only be created and used on the thread that owns the current GL
/// context (the graphics thread inside the swap hook).
///
/// ### 中文
/// 基于原生 `glow::Context` 的 [`GlApi`] 实现。
///
/// 只能在持有当前 GL 上下文的线程（swap hook 内的图形线程）上创建和使用。
pub struct GlowApi {
    /// ### English
    /// The underlying glow context.
    ///
    /// ### 中文
    /// 底层 glow 上下文。
    gl: glow::Context,
}

impl GlowApi {
    /// ### English
    /// Builds a context from a proc-address loader.
    ///
    /// #### Parameters
    /// - `loader`: Resolves a NUL-free GL symbol name to a function pointer.
    ///
    /// # Safety
    /// The returned pointers must be valid GL entry points for the context
    /// current on this thread, and the context must outlive the `GlowApi`.
    ///
    /// ### 中文
    /// 从函数指针 loader 构建上下文。
    ///
    /// #### 参数
    /// - `loader`：把不含 NUL 的 GL 符号名解析为函数指针。
    ///
    /// # Safety
    /// 返回的指针必须是当前线程上下文的有效 GL 入口点，且该上下文生命期
    /// 覆盖 `GlowApi`。
    pub unsafe fn from_loader(loader: impl FnMut(&str) -> *const c_void) -> Self {
        let mut loader = loader;
        Self {
            gl: unsafe { glow::Context::from_loader_function(|name| loader(name)) },
        }
    }
}

#[inline]
fn buf(name: u32) -> Option<glow::NativeBuffer> {
    NonZeroU32::new(name).map(glow::NativeBuffer)
}

#[inline]
fn tex(name: u32) -> Option<glow::NativeTexture> {
    NonZeroU32::new(name).map(glow::NativeTexture)
}

#[inline]
fn shader(name: u32) -> Option<glow::NativeShader> {
    NonZeroU32::new(name).map(glow::NativeShader)
}

#[inline]
fn program(name: u32) -> Option<glow::NativeProgram> {
    NonZeroU32::new(name).map(glow::NativeProgram)
}

#[inline]
fn vao(name: u32) -> Option<glow::NativeVertexArray> {
    NonZeroU32::new(name).map(glow::NativeVertexArray)
}

impl GlApi for GlowApi {
    fn create_buffer(&self) -> u32 {
        unsafe { self.gl.create_buffer() }.map_or(0, |b| b.0.get())
    }

    fn delete_buffer(&self, buffer: u32) {
        if let Some(buffer) = buf(buffer) {
            unsafe { self.gl.delete_buffer(buffer) };
        }
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        unsafe { self.gl.bind_buffer(target, buf(buffer)) };
    }

    fn buffer_data_size(&self, target: u32, size: i32, usage: u32) {
        unsafe { self.gl.buffer_data_size(target, size, usage) };
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(target, data, usage) };
    }

    fn map_buffer_range(&self, target: u32, offset: i32, length: i32, access: u32) -> *mut u8 {
        unsafe { self.gl.map_buffer_range(target, offset, length, access) }
    }

    fn unmap_buffer(&self, target: u32) {
        unsafe { self.gl.unmap_buffer(target) };
    }

    fn create_texture(&self) -> u32 {
        unsafe { self.gl.create_texture() }.map_or(0, |t| t.0.get())
    }

    fn delete_texture(&self, texture: u32) {
        if let Some(texture) = tex(texture) {
            unsafe { self.gl.delete_texture(texture) };
        }
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        unsafe { self.gl.bind_texture(target, tex(texture)) };
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(target, parameter, value) };
    }

    fn tex_image_2d_empty(
        &self,
        target: u32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
    ) {
        unsafe {
            self.gl.tex_image_2d(
                target,
                0,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                PixelUnpackData::Slice(None),
            );
        }
    }

    fn tex_sub_image_2d_pbo(
        &self,
        target: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        offset: i32,
    ) {
        unsafe {
            self.gl.tex_sub_image_2d(
                target,
                0,
                x,
                y,
                width,
                height,
                format,
                ty,
                PixelUnpackData::BufferOffset(offset as u32),
            );
        }
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        unsafe { self.gl.pixel_store_i32(parameter, value) };
    }

    fn create_shader(&self, kind: u32) -> u32 {
        unsafe { self.gl.create_shader(kind) }.map_or(0, |s| s.0.get())
    }

    fn shader_source(&self, shader_name: u32, source: &str) {
        if let Some(shader) = shader(shader_name) {
            unsafe { self.gl.shader_source(shader, source) };
        }
    }

    fn compile_shader(&self, shader_name: u32) {
        if let Some(shader) = shader(shader_name) {
            unsafe { self.gl.compile_shader(shader) };
        }
    }

    fn shader_compile_ok(&self, shader_name: u32) -> bool {
        shader(shader_name).is_some_and(|s| unsafe { self.gl.get_shader_compile_status(s) })
    }

    fn shader_info_log(&self, shader_name: u32) -> String {
        shader(shader_name).map_or_else(String::new, |s| unsafe { self.gl.get_shader_info_log(s) })
    }

    fn delete_shader(&self, shader_name: u32) {
        if let Some(shader) = shader(shader_name) {
            unsafe { self.gl.delete_shader(shader) };
        }
    }

    fn create_program(&self) -> u32 {
        unsafe { self.gl.create_program() }.map_or(0, |p| p.0.get())
    }

    fn attach_shader(&self, program_name: u32, shader_name: u32) {
        if let (Some(program), Some(shader)) = (program(program_name), shader(shader_name)) {
            unsafe { self.gl.attach_shader(program, shader) };
        }
    }

    fn link_program(&self, program_name: u32) {
        if let Some(program) = program(program_name) {
            unsafe { self.gl.link_program(program) };
        }
    }

    fn program_link_ok(&self, program_name: u32) -> bool {
        program(program_name).is_some_and(|p| unsafe { self.gl.get_program_link_status(p) })
    }

    fn program_info_log(&self, program_name: u32) -> String {
        program(program_name)
            .map_or_else(String::new, |p| unsafe { self.gl.get_program_info_log(p) })
    }

    fn delete_program(&self, program_name: u32) {
        if let Some(program) = program(program_name) {
            unsafe { self.gl.delete_program(program) };
        }
    }

    fn use_program(&self, program_name: u32) {
        unsafe { self.gl.use_program(program(program_name)) };
    }

    fn uniform_location(&self, program_name: u32, name: &str) -> i32 {
        let Some(program) = program(program_name) else {
            return -1;
        };
        unsafe { self.gl.get_uniform_location(program, name) }.map_or(-1, |loc| loc.0 as i32)
    }

    fn uniform_1_i32(&self, location: i32, value: i32) {
        if location >= 0 {
            let loc = glow::NativeUniformLocation(location as u32);
            unsafe { self.gl.uniform_1_i32(Some(&loc), value) };
        }
    }

    fn uniform_2_f32(&self, location: i32, x: f32, y: f32) {
        if location >= 0 {
            let loc = glow::NativeUniformLocation(location as u32);
            unsafe { self.gl.uniform_2_f32(Some(&loc), x, y) };
        }
    }

    fn create_vertex_array(&self) -> u32 {
        unsafe { self.gl.create_vertex_array() }.map_or(0, |v| v.0.get())
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        if let Some(vertex_array) = vao(vertex_array) {
            unsafe { self.gl.delete_vertex_array(vertex_array) };
        }
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        unsafe { self.gl.bind_vertex_array(vao(vertex_array)) };
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset)
        };
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode, first, count) };
    }

    fn enable(&self, cap: u32) {
        unsafe { self.gl.enable(cap) };
    }

    fn disable(&self, cap: u32) {
        unsafe { self.gl.disable(cap) };
    }

    fn is_enabled(&self, cap: u32) -> bool {
        unsafe { self.gl.is_enabled(cap) }
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        unsafe {
            self.gl
                .blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha)
        };
    }

    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32) {
        unsafe { self.gl.blend_equation_separate(mode_rgb, mode_alpha) };
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(unit) };
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) };
    }

    fn get_parameter_i32(&self, parameter: u32) -> i32 {
        unsafe { self.gl.get_parameter_i32(parameter) }
    }

    fn get_parameter_i32_slice(&self, parameter: u32, out: &mut [i32]) {
        unsafe { self.gl.get_parameter_i32_slice(parameter, out) };
    }
}
