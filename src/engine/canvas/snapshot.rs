//! ### English
//! Capture/restore of every piece of OpenGL state the composite pass touches.
//!
//! The overlay draws inside someone else's frame: the host application must
//! not be able to observe that the composite pass ran at all. The snapshot is
//! an ephemeral value captured at the start of each pass and restored at the
//! end; it is never persisted.
//!
//! ### 中文
//! 捕获/恢复合成过程触碰的所有 OpenGL 状态。
//!
//! overlay 是在别人的帧里绘制的：宿主程序不应能观察到合成过程发生过。
//! 快照是短暂值，在每次合成开始时捕获、结束时恢复，从不持久化。

use crate::engine::gl::GlApi;

/// ### English
/// Saved pipeline state. Field set matches exactly what the renderer and the
/// upload step modify; anything not listed here must not be touched by them.
///
/// ### 中文
/// 保存的管线状态。字段集合与渲染器和上传步骤修改的状态严格一致；未列出
/// 的状态它们一律不得触碰。
pub struct GlStateSnapshot {
    active_texture: u32,
    current_program: u32,
    texture_2d: u32,
    array_buffer: u32,
    pixel_unpack_buffer: u32,
    vertex_array: u32,
    blend: bool,
    cull_face: bool,
    depth_test: bool,
    scissor_test: bool,
    blend_src_rgb: u32,
    blend_dst_rgb: u32,
    blend_src_alpha: u32,
    blend_dst_alpha: u32,
    blend_equation_rgb: u32,
    blend_equation_alpha: u32,
    viewport: [i32; 4],
    scissor_box: [i32; 4],
    unpack_alignment: i32,
}

impl GlStateSnapshot {
    /// ### English
    /// Reads the current values of all tracked state.
    ///
    /// The composite pass only ever binds textures on unit 0, so capture
    /// switches to `TEXTURE0` (after saving the host's active unit) and
    /// records *that* unit's 2D binding; `restore` puts the binding back
    /// while unit 0 is still active, then reactivates the host's unit.
    ///
    /// ### 中文
    /// 读取所有被跟踪状态的当前值。
    ///
    /// 合成过程只会在 0 号纹理单元上绑定纹理，因此捕获时（先保存宿主的
    /// 活动单元）切换到 `TEXTURE0` 并记录该单元的 2D 绑定；`restore` 在
    /// 0 号单元仍处于活动状态时恢复绑定，再切回宿主的单元。
    pub fn capture(gl: &dyn GlApi) -> Self {
        let active_texture = gl.get_parameter_i32(glow::ACTIVE_TEXTURE) as u32;
        gl.active_texture(glow::TEXTURE0);

        let mut viewport = [0i32; 4];
        gl.get_parameter_i32_slice(glow::VIEWPORT, &mut viewport);
        let mut scissor_box = [0i32; 4];
        gl.get_parameter_i32_slice(glow::SCISSOR_BOX, &mut scissor_box);

        Self {
            active_texture,
            current_program: gl.get_parameter_i32(glow::CURRENT_PROGRAM) as u32,
            texture_2d: gl.get_parameter_i32(glow::TEXTURE_BINDING_2D) as u32,
            array_buffer: gl.get_parameter_i32(glow::ARRAY_BUFFER_BINDING) as u32,
            pixel_unpack_buffer: gl.get_parameter_i32(glow::PIXEL_UNPACK_BUFFER_BINDING) as u32,
            vertex_array: gl.get_parameter_i32(glow::VERTEX_ARRAY_BINDING) as u32,
            blend: gl.is_enabled(glow::BLEND),
            cull_face: gl.is_enabled(glow::CULL_FACE),
            depth_test: gl.is_enabled(glow::DEPTH_TEST),
            scissor_test: gl.is_enabled(glow::SCISSOR_TEST),
            blend_src_rgb: gl.get_parameter_i32(glow::BLEND_SRC_RGB) as u32,
            blend_dst_rgb: gl.get_parameter_i32(glow::BLEND_DST_RGB) as u32,
            blend_src_alpha: gl.get_parameter_i32(glow::BLEND_SRC_ALPHA) as u32,
            blend_dst_alpha: gl.get_parameter_i32(glow::BLEND_DST_ALPHA) as u32,
            blend_equation_rgb: gl.get_parameter_i32(glow::BLEND_EQUATION_RGB) as u32,
            blend_equation_alpha: gl.get_parameter_i32(glow::BLEND_EQUATION_ALPHA) as u32,
            viewport,
            scissor_box,
            unpack_alignment: gl.get_parameter_i32(glow::UNPACK_ALIGNMENT),
        }
    }

    /// ### English
    /// Writes every tracked value back, consuming the snapshot.
    ///
    /// ### 中文
    /// 将所有被跟踪的值写回，并消耗快照。
    pub fn restore(self, gl: &dyn GlApi) {
        set_cap(gl, glow::BLEND, self.blend);
        set_cap(gl, glow::CULL_FACE, self.cull_face);
        set_cap(gl, glow::DEPTH_TEST, self.depth_test);
        set_cap(gl, glow::SCISSOR_TEST, self.scissor_test);

        gl.blend_func_separate(
            self.blend_src_rgb,
            self.blend_dst_rgb,
            self.blend_src_alpha,
            self.blend_dst_alpha,
        );
        gl.blend_equation_separate(self.blend_equation_rgb, self.blend_equation_alpha);

        gl.use_program(self.current_program);
        gl.bind_vertex_array(self.vertex_array);
        gl.bind_buffer(glow::ARRAY_BUFFER, self.array_buffer);
        gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, self.pixel_unpack_buffer);

        // Unit 0 is still the only unit the pass touched.
        gl.bind_texture(glow::TEXTURE_2D, self.texture_2d);
        gl.active_texture(self.active_texture);

        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, self.unpack_alignment);
        gl.viewport(
            self.viewport[0],
            self.viewport[1],
            self.viewport[2],
            self.viewport[3],
        );
        gl.scissor(
            self.scissor_box[0],
            self.scissor_box[1],
            self.scissor_box[2],
            self.scissor_box[3],
        );
    }
}

fn set_cap(gl: &dyn GlApi, cap: u32, enabled: bool) {
    if enabled {
        gl.enable(cap);
    } else {
        gl.disable(cap);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::engine::gl::recording::{FakeGlState, RecordingGl};

    #[test]
    fn capture_then_restore_is_identity() {
        let gl = Rc::new(RecordingGl::new());
        let host_state = FakeGlState {
            current_program: 7,
            active_texture: glow::TEXTURE0 + 3,
            texture_2d: 11,
            array_buffer: 5,
            vertex_array: 9,
            blend: true,
            cull_face: false,
            depth_test: true,
            scissor_test: true,
            blend_src_rgb: glow::ONE,
            blend_dst_rgb: glow::ONE,
            viewport: [10, 20, 640, 480],
            scissor_box: [1, 2, 3, 4],
            unpack_alignment: 8,
            ..FakeGlState::default()
        };
        gl.set_state(host_state.clone());

        let snapshot = GlStateSnapshot::capture(gl.as_ref());

        // Scramble everything the overlay could conceivably touch.
        gl.use_program(42);
        gl.bind_texture(glow::TEXTURE_2D, 42);
        gl.bind_vertex_array(42);
        gl.bind_buffer(glow::ARRAY_BUFFER, 42);
        gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, 42);
        gl.disable(glow::BLEND);
        gl.enable(glow::CULL_FACE);
        gl.disable(glow::DEPTH_TEST);
        gl.disable(glow::SCISSOR_TEST);
        gl.blend_func_separate(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA, glow::ONE, glow::ZERO);
        gl.blend_equation_separate(glow::FUNC_SUBTRACT, glow::FUNC_SUBTRACT);
        gl.active_texture(glow::TEXTURE0);
        gl.viewport(0, 0, 1, 1);
        gl.scissor(0, 0, 1, 1);
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);

        snapshot.restore(gl.as_ref());
        assert_eq!(gl.state(), host_state);
    }
}
