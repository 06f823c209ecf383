//! ### English
//! Narrow OpenGL access layer for the overlay pipeline.
//!
//! All GPU calls in this crate go through the object-safe [`GlApi`] trait with
//! raw `u32` object names (`0` = none), threaded around as `Rc<dyn GlApi>` so
//! the whole render path stays pinned to the graphics thread by `!Send`.
//! Production code uses the `glow`-backed [`GlowApi`]; tests substitute a
//! recording stub that counts calls without a GL context.
//!
//! ### 中文
//! overlay 管线的窄 OpenGL 访问层。
//!
//! 本 crate 的所有 GPU 调用都经过对象安全的 [`GlApi`] trait，使用原始 `u32`
//! 对象名（`0` = 无），并以 `Rc<dyn GlApi>` 传递，借助 `!Send` 把整条渲染
//! 路径固定在图形线程。生产代码使用基于 `glow` 的 [`GlowApi`]；测试以
//! 不需要 GL 上下文的计数 stub 替代。

mod glow_backend;
pub mod handles;
#[cfg(test)]
pub(crate) mod recording;

pub use glow_backend::GlowApi;

/// ### English
/// The subset of OpenGL the overlay pipeline needs, as an object-safe trait.
///
/// Object names are raw `u32` (`0` = none / unbind); uniform locations are
/// `i32` (`-1` = not found). Every method maps 1:1 onto one GL entry point so
/// a counting test double can observe exactly which GPU calls a code path
/// performs.
///
/// ### 中文
/// overlay 管线所需的 OpenGL 子集，以对象安全 trait 表达。
///
/// 对象名为原始 `u32`（`0` = 无 / 解绑）；uniform location 为 `i32`
///（`-1` = 未找到）。每个方法与一个 GL 入口点一一对应，便于测试用计数
/// stub 精确观察某条代码路径执行了哪些 GPU 调用。
pub trait GlApi {
    // --- buffer objects ---

    /// ### English
    /// Creates a buffer object; returns `0` on failure.
    ///
    /// ### 中文
    /// 创建 buffer 对象；失败返回 `0`。
    fn create_buffer(&self) -> u32;
    /// ### English
    /// Deletes a buffer object (`0` is ignored).
    ///
    /// ### 中文
    /// 删除 buffer 对象（`0` 被忽略）。
    fn delete_buffer(&self, buffer: u32);
    /// ### English
    /// Binds `buffer` to `target` (`0` unbinds).
    ///
    /// ### 中文
    /// 将 `buffer` 绑定到 `target`（`0` 表示解绑）。
    fn bind_buffer(&self, target: u32, buffer: u32);
    /// ### English
    /// Allocates `size` bytes of uninitialized storage for the bound buffer.
    ///
    /// ### 中文
    /// 为当前绑定的 buffer 分配 `size` 字节未初始化存储。
    fn buffer_data_size(&self, target: u32, size: i32, usage: u32);
    /// ### English
    /// Uploads `data` into the bound buffer.
    ///
    /// ### 中文
    /// 将 `data` 上传到当前绑定的 buffer。
    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32);
    /// ### English
    /// Maps a range of the bound buffer; returns null on failure.
    ///
    /// ### 中文
    /// 映射当前绑定 buffer 的一段区间；失败返回 null。
    fn map_buffer_range(&self, target: u32, offset: i32, length: i32, access: u32) -> *mut u8;
    /// ### English
    /// Unmaps the bound buffer.
    ///
    /// ### 中文
    /// 解除当前绑定 buffer 的映射。
    fn unmap_buffer(&self, target: u32);

    // --- textures ---

    /// ### English
    /// Creates a texture object; returns `0` on failure.
    ///
    /// ### 中文
    /// 创建纹理对象；失败返回 `0`。
    fn create_texture(&self) -> u32;
    /// ### English
    /// Deletes a texture object (`0` is ignored).
    ///
    /// ### 中文
    /// 删除纹理对象（`0` 被忽略）。
    fn delete_texture(&self, texture: u32);
    /// ### English
    /// Binds `texture` to `target` (`0` unbinds).
    ///
    /// ### 中文
    /// 将 `texture` 绑定到 `target`（`0` 表示解绑）。
    fn bind_texture(&self, target: u32, texture: u32);
    /// ### English
    /// Sets an integer texture parameter on the bound texture.
    ///
    /// ### 中文
    /// 设置当前绑定纹理的整型参数。
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    /// ### English
    /// Allocates an empty level-0 image for the bound texture.
    ///
    /// ### 中文
    /// 为当前绑定纹理分配空的 level-0 图像。
    fn tex_image_2d_empty(
        &self,
        target: u32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
    );
    /// ### English
    /// Sub-image upload sourced from the bound `PIXEL_UNPACK_BUFFER` at `offset`.
    ///
    /// ### 中文
    /// 以当前绑定的 `PIXEL_UNPACK_BUFFER` 中 `offset` 处为源做子图像上传。
    #[allow(clippy::too_many_arguments)]
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
    );
    /// ### English
    /// Sets a pixel-store parameter (e.g. `UNPACK_ALIGNMENT`).
    ///
    /// ### 中文
    /// 设置像素存储参数（例如 `UNPACK_ALIGNMENT`）。
    fn pixel_store_i32(&self, parameter: u32, value: i32);

    // --- shaders / programs ---

    /// ### English
    /// Creates a shader object of the given kind; returns `0` on failure.
    ///
    /// ### 中文
    /// 创建给定类型的着色器对象；失败返回 `0`。
    fn create_shader(&self, kind: u32) -> u32;
    /// ### English
    /// Replaces the shader's source string.
    ///
    /// ### 中文
    /// 替换着色器源码。
    fn shader_source(&self, shader: u32, source: &str);
    /// ### English
    /// Compiles the shader.
    ///
    /// ### 中文
    /// 编译着色器。
    fn compile_shader(&self, shader: u32);
    /// ### English
    /// Returns whether the last compile succeeded.
    ///
    /// ### 中文
    /// 返回上次编译是否成功。
    fn shader_compile_ok(&self, shader: u32) -> bool;
    /// ### English
    /// Returns the shader info log.
    ///
    /// ### 中文
    /// 返回着色器 info log。
    fn shader_info_log(&self, shader: u32) -> String;
    /// ### English
    /// Deletes a shader object.
    ///
    /// ### 中文
    /// 删除着色器对象。
    fn delete_shader(&self, shader: u32);
    /// ### English
    /// Creates a program object; returns `0` on failure.
    ///
    /// ### 中文
    /// 创建 program 对象；失败返回 `0`。
    fn create_program(&self) -> u32;
    /// ### English
    /// Attaches a shader to a program.
    ///
    /// ### 中文
    /// 将着色器附加到 program。
    fn attach_shader(&self, program: u32, shader: u32);
    /// ### English
    /// Links the program.
    ///
    /// ### 中文
    /// 链接 program。
    fn link_program(&self, program: u32);
    /// ### English
    /// Returns whether the last link succeeded.
    ///
    /// ### 中文
    /// 返回上次链接是否成功。
    fn program_link_ok(&self, program: u32) -> bool;
    /// ### English
    /// Returns the program info log.
    ///
    /// ### 中文
    /// 返回 program info log。
    fn program_info_log(&self, program: u32) -> String;
    /// ### English
    /// Deletes a program object.
    ///
    /// ### 中文
    /// 删除 program 对象。
    fn delete_program(&self, program: u32);
    /// ### English
    /// Makes `program` current (`0` = no program).
    ///
    /// ### 中文
    /// 将 `program` 设为当前（`0` = 无 program）。
    fn use_program(&self, program: u32);
    /// ### English
    /// Returns the location of a uniform, or `-1` if absent.
    ///
    /// ### 中文
    /// 返回 uniform 的 location，不存在返回 `-1`。
    fn uniform_location(&self, program: u32, name: &str) -> i32;
    /// ### English
    /// Sets an `int` uniform (no-op for location `-1`).
    ///
    /// ### 中文
    /// 设置 `int` uniform（location 为 `-1` 时为 no-op）。
    fn uniform_1_i32(&self, location: i32, value: i32);
    /// ### English
    /// Sets a `vec2` uniform (no-op for location `-1`).
    ///
    /// ### 中文
    /// 设置 `vec2` uniform（location 为 `-1` 时为 no-op）。
    fn uniform_2_f32(&self, location: i32, x: f32, y: f32);

    // --- geometry ---

    /// ### English
    /// Creates a vertex array object; returns `0` on failure.
    ///
    /// ### 中文
    /// 创建 vertex array 对象；失败返回 `0`。
    fn create_vertex_array(&self) -> u32;
    /// ### English
    /// Deletes a vertex array object.
    ///
    /// ### 中文
    /// 删除 vertex array 对象。
    fn delete_vertex_array(&self, vertex_array: u32);
    /// ### English
    /// Binds a vertex array object (`0` unbinds).
    ///
    /// ### 中文
    /// 绑定 vertex array 对象（`0` 表示解绑）。
    fn bind_vertex_array(&self, vertex_array: u32);
    /// ### English
    /// Enables a vertex attribute array index.
    ///
    /// ### 中文
    /// 启用一个顶点属性数组下标。
    fn enable_vertex_attrib_array(&self, index: u32);
    /// ### English
    /// Configures a float vertex attribute pointer into the bound VBO.
    ///
    /// ### 中文
    /// 配置指向当前绑定 VBO 的浮点顶点属性指针。
    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32);
    /// ### English
    /// Issues a non-indexed draw.
    ///
    /// ### 中文
    /// 发起非索引绘制。
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);

    // --- pipeline state ---

    /// ### English
    /// Enables a capability.
    ///
    /// ### 中文
    /// 启用一项能力。
    fn enable(&self, cap: u32);
    /// ### English
    /// Disables a capability.
    ///
    /// ### 中文
    /// 关闭一项能力。
    fn disable(&self, cap: u32);
    /// ### English
    /// Queries whether a capability is enabled.
    ///
    /// ### 中文
    /// 查询某项能力是否启用。
    fn is_enabled(&self, cap: u32) -> bool;
    /// ### English
    /// Sets separate RGB/alpha blend factors.
    ///
    /// ### 中文
    /// 设置 RGB/alpha 独立的混合因子。
    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
    /// ### English
    /// Sets separate RGB/alpha blend equations.
    ///
    /// ### 中文
    /// 设置 RGB/alpha 独立的混合方程。
    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32);
    /// ### English
    /// Selects the active texture unit.
    ///
    /// ### 中文
    /// 选择当前活动纹理单元。
    fn active_texture(&self, unit: u32);
    /// ### English
    /// Sets the viewport rectangle.
    ///
    /// ### 中文
    /// 设置视口矩形。
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// ### English
    /// Sets the scissor rectangle.
    ///
    /// ### 中文
    /// 设置裁剪矩形。
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    /// ### English
    /// Queries a single integer state value.
    ///
    /// ### 中文
    /// 查询单个整型状态值。
    fn get_parameter_i32(&self, parameter: u32) -> i32;
    /// ### English
    /// Queries a multi-component integer state value (viewport, scissor box).
    ///
    /// ### 中文
    /// 查询多分量整型状态值（viewport、scissor box）。
    fn get_parameter_i32_slice(&self, parameter: u32, out: &mut [i32]);
}
