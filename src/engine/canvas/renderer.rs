//! ### English
//! Texture + full-screen quad renderer for the composited browser frame.
//!
//! All GPU objects (texture, program, quad VBO, VAO) are regenerated
//! wholesale on every resize: allocation churn is traded for a trivially
//! correct lifecycle, and the scoped handle wrappers guarantee the previous
//! generation is deleted even on error paths.
//!
//! ### 中文
//! 合成浏览器帧所用的纹理 + 全屏四边形渲染器。
//!
//! 所有 GPU 对象（纹理、program、四边形 VBO、VAO）在每次 resize 时整体
//! 重建：用分配开销换取显而易见正确的生命周期，作用域句柄封装保证即使
//! 在错误路径上旧一代对象也会被删除。

use std::rc::Rc;

use dpi::PhysicalSize;

use super::frame_pool::UploadSource;
use crate::engine::error::OverlayError;
use crate::engine::gl::GlApi;
use crate::engine::gl::handles::{GlBuffer, GlProgram, GlTexture, GlVertexArray};

/// ### English
/// Vertex stage: pixel-space quad positions to clip space, Y flipped so
/// buffer row 0 lands at the top of the window.
///
/// ### 中文
/// 顶点阶段：像素空间四边形坐标变换到裁剪空间，翻转 Y 使 buffer 第 0 行
/// 落在窗口顶部。
const VERTEX_SRC: &str = r"#version 130
in vec2 a_position;
in vec2 a_uv;
uniform vec2 u_screen_size;
out vec2 v_uv;
void main() {
    vec2 ndc = vec2(
        a_position.x / u_screen_size.x * 2.0 - 1.0,
        1.0 - a_position.y / u_screen_size.y * 2.0);
    gl_Position = vec4(ndc, 0.0, 1.0);
    v_uv = a_uv;
}
";

/// ### English
/// Fragment stage: sample the browser frame and discard near-transparent
/// pixels instead of blending them, so partially transparent browser edges do
/// not leave a dark halo over the host's opaque framebuffer.
///
/// ### 中文
/// 片段阶段：采样浏览器帧，并丢弃接近全透明的像素而不是混合它们，避免
/// 半透明的浏览器边缘在宿主不透明帧缓冲上留下暗色光晕。
const FRAGMENT_SRC: &str = r"#version 130
uniform sampler2D u_frame;
in vec2 v_uv;
out vec4 frag_color;
void main() {
    vec4 color = texture(u_frame, v_uv);
    if (color.a < 0.1) discard;
    frag_color = color;
}
";

/// ### English
/// One generation of GPU objects sized to the current render surface.
///
/// ### 中文
/// 与当前渲染 surface 尺寸对应的一代 GPU 对象。
pub struct QuadRenderer {
    /// ### English
    /// GL the objects belong to.
    ///
    /// ### 中文
    /// 对象所属的 GL。
    gl: Rc<dyn GlApi>,
    /// ### English
    /// Surface dimensions this generation was built for.
    ///
    /// ### 中文
    /// 本代对象构建时的 surface 尺寸。
    size: PhysicalSize<u32>,
    /// ### English
    /// BGRA8 destination texture, always matching `size`.
    ///
    /// ### 中文
    /// BGRA8 目标纹理，始终与 `size` 一致。
    texture: GlTexture,
    /// ### English
    /// The composite program.
    ///
    /// ### 中文
    /// 合成 program。
    program: GlProgram,
    /// ### English
    /// Static quad vertex buffer (pixel positions + UVs).
    ///
    /// ### 中文
    /// 静态四边形顶点缓冲（像素坐标 + UV）。
    quad: GlBuffer,
    /// ### English
    /// Vertex array capturing the quad layout.
    ///
    /// ### 中文
    /// 记录四边形布局的 vertex array。
    vertex_array: GlVertexArray,
}

impl QuadRenderer {
    /// ### English
    /// Builds a complete object generation for `size`. Safe to call once per
    /// resize: the previous generation (if any) is dropped by the caller and
    /// its objects deleted by the handle wrappers.
    ///
    /// Caller must run this inside a composite pass (state snapshot held),
    /// with nothing bound to `PIXEL_UNPACK_BUFFER`.
    ///
    /// #### Parameters
    /// - `gl`: GL used for all objects.
    /// - `size`: New surface dimensions (both components non-zero).
    ///
    /// ### 中文
    /// 为 `size` 构建完整的一代对象。每次 resize 调用一次即可：上一代由
    /// 调用方 drop，其对象经句柄封装删除。
    ///
    /// 调用方必须在合成过程内（已持有状态快照）执行，且此时
    /// `PIXEL_UNPACK_BUFFER` 上不得有绑定。
    ///
    /// #### 参数
    /// - `gl`：用于所有对象的 GL。
    /// - `size`：新的 surface 尺寸（两个分量均非零）。
    pub fn create(gl: &Rc<dyn GlApi>, size: PhysicalSize<u32>) -> Result<Self, OverlayError> {
        let texture = GlTexture::new(gl)?;
        gl.bind_texture(glow::TEXTURE_2D, texture.name());
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MAG_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_S,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_T,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_image_2d_empty(
            glow::TEXTURE_2D,
            glow::RGBA8 as i32,
            size.width as i32,
            size.height as i32,
            glow::BGRA,
            glow::UNSIGNED_BYTE,
        );

        let program = GlProgram::link(gl, VERTEX_SRC, FRAGMENT_SRC)?;
        gl.use_program(program.name());
        let u_screen_size = gl.uniform_location(program.name(), "u_screen_size");
        gl.uniform_2_f32(u_screen_size, size.width as f32, size.height as f32);
        let u_frame = gl.uniform_location(program.name(), "u_frame");
        gl.uniform_1_i32(u_frame, 0);

        let quad = GlBuffer::new(gl)?;
        let vertex_array = GlVertexArray::new(gl)?;
        gl.bind_vertex_array(vertex_array.name());
        gl.bind_buffer(glow::ARRAY_BUFFER, quad.name());
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            &quad_vertices(size),
            glow::STATIC_DRAW,
        );
        // Layout: vec2 position, vec2 uv, interleaved.
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 2, 16, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 2, 16, 8);
        gl.bind_vertex_array(0);

        Ok(Self {
            gl: Rc::clone(gl),
            size,
            texture,
            program,
            quad,
            vertex_array,
        })
    }

    /// ### English
    /// Dimensions this generation was built for.
    ///
    /// ### 中文
    /// 本代对象构建时的尺寸。
    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// ### English
    /// Sub-image upload from a consumed PBO into the texture. Rejects (and
    /// reports `false` for) a source filled at dimensions other than the
    /// current surface, which is possible only if resize ordering was
    /// violated.
    ///
    /// #### Parameters
    /// - `source`: Filled, unmapped PBO returned by the frame pool.
    ///
    /// ### 中文
    /// 将已消费的 PBO 内容子图像上传到纹理。若源的填充尺寸与当前 surface
    /// 不一致（仅在 resize 顺序被破坏时可能发生）则拒绝并返回 `false`。
    ///
    /// #### 参数
    /// - `source`：帧缓冲池返回的已填充、已解除映射的 PBO。
    pub fn upload(&self, source: UploadSource) -> bool {
        if source.size != self.size {
            return false;
        }

        let gl = self.gl.as_ref();
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, source.buffer);
        gl.bind_texture(glow::TEXTURE_2D, self.texture.name());
        gl.tex_sub_image_2d_pbo(
            glow::TEXTURE_2D,
            0,
            0,
            self.size.width as i32,
            self.size.height as i32,
            glow::BGRA,
            glow::UNSIGNED_BYTE,
            0,
        );
        gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, 0);
        true
    }

    /// ### English
    /// Draws the textured quad over the full surface. Runs inside the pass
    /// snapshot; blending is standard src-alpha over, culling, depth and
    /// scissor tests are off so the host's settings cannot clip the overlay.
    ///
    /// ### 中文
    /// 在整个 surface 上绘制带纹理的四边形。运行于过程快照之内；使用标准
    /// src-alpha over 混合，并关闭剔除、深度与裁剪测试，避免宿主的设置
    /// 裁掉 overlay。
    pub fn draw(&self) {
        let gl = self.gl.as_ref();

        gl.enable(glow::BLEND);
        gl.blend_func_separate(
            glow::SRC_ALPHA,
            glow::ONE_MINUS_SRC_ALPHA,
            glow::SRC_ALPHA,
            glow::ONE_MINUS_SRC_ALPHA,
        );
        gl.blend_equation_separate(glow::FUNC_ADD, glow::FUNC_ADD);
        gl.disable(glow::CULL_FACE);
        gl.disable(glow::DEPTH_TEST);
        gl.disable(glow::SCISSOR_TEST);

        gl.viewport(0, 0, self.size.width as i32, self.size.height as i32);
        gl.use_program(self.program.name());
        gl.bind_vertex_array(self.vertex_array.name());
        gl.bind_texture(glow::TEXTURE_2D, self.texture.name());

        gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);

        gl.bind_vertex_array(0);
    }
}

/// ### English
/// Interleaved `(x, y, u, v)` triangle-strip vertices covering `size`, as
/// native-endian bytes.
///
/// ### 中文
/// 覆盖 `size` 的交错 `(x, y, u, v)` triangle-strip 顶点，按本机字节序。
fn quad_vertices(size: PhysicalSize<u32>) -> Vec<u8> {
    let w = size.width as f32;
    let h = size.height as f32;
    #[rustfmt::skip]
    let vertices: [f32; 16] = [
        0.0, 0.0, 0.0, 0.0,
        0.0, h,   0.0, 1.0,
        w,   0.0, 1.0, 0.0,
        w,   h,   1.0, 1.0,
    ];

    let mut bytes = Vec::with_capacity(vertices.len() * 4);
    for value in vertices {
        bytes.extend_from_slice(&value.to_ne_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use dpi::PhysicalSize;

    use super::*;
    use crate::engine::gl::recording::RecordingGl;

    fn rc_gl() -> (Rc<RecordingGl>, Rc<dyn GlApi>) {
        let gl = Rc::new(RecordingGl::new());
        let dyn_gl: Rc<dyn GlApi> = gl.clone();
        (gl, dyn_gl)
    }

    #[test]
    fn recreate_with_same_size_keeps_object_count_stable() {
        let (gl, dyn_gl) = rc_gl();
        let size = PhysicalSize::new(800, 600);

        let first = QuadRenderer::create(&dyn_gl, size).expect("create");
        let baseline = gl.live_objects();

        let second = QuadRenderer::create(&dyn_gl, size).expect("recreate");
        assert_eq!(second.size(), first.size());
        drop(first);

        // Same generation footprint, and nothing leaked across recreation.
        assert_eq!(gl.live_objects(), baseline);
        drop(second);
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn upload_rejects_stale_dimensions() {
        let (_gl, dyn_gl) = rc_gl();
        let renderer = QuadRenderer::create(&dyn_gl, PhysicalSize::new(1024, 768)).expect("create");

        let stale = UploadSource {
            buffer: 99,
            size: PhysicalSize::new(800, 600),
        };
        let fresh = UploadSource {
            buffer: 99,
            size: PhysicalSize::new(1024, 768),
        };

        assert!(!renderer.upload(stale));
        assert!(renderer.upload(fresh));
    }

    #[test]
    fn draw_issues_one_triangle_strip() {
        let (gl, dyn_gl) = rc_gl();
        let renderer = QuadRenderer::create(&dyn_gl, PhysicalSize::new(640, 480)).expect("create");

        gl.reset_calls();
        renderer.draw();
        assert_eq!(gl.call_count("draw_arrays"), 1);
    }
}
