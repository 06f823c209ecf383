//! ### English
//! Scoped-ownership wrappers for GPU object names.
//!
//! Each wrapper owns its `Rc<dyn GlApi>` and deletes the underlying object on
//! drop, so resize paths and early returns can never leak a GPU handle.
//!
//! ### 中文
//! GPU 对象名的作用域所有权封装。
//!
//! 每个封装持有自己的 `Rc<dyn GlApi>`，并在 drop 时删除底层对象，因此
//! resize 路径和提前返回都不可能泄漏 GPU 句柄。

use std::rc::Rc;

use super::GlApi;
use crate::engine::error::OverlayError;

/// ### English
/// Owned buffer object, deleted on drop.
///
/// ### 中文
/// 拥有所有权的 buffer 对象，drop 时删除。
pub struct GlBuffer {
    /// ### English
    /// GL used for deletion.
    ///
    /// ### 中文
    /// 用于删除的 GL。
    gl: Rc<dyn GlApi>,
    /// ### English
    /// Raw object name.
    ///
    /// ### 中文
    /// 原始对象名。
    name: u32,
}

impl GlBuffer {
    /// ### English
    /// Creates a new buffer object.
    ///
    /// ### 中文
    /// 创建新的 buffer 对象。
    pub fn new(gl: &Rc<dyn GlApi>) -> Result<Self, OverlayError> {
        let name = gl.create_buffer();
        if name == 0 {
            return Err(OverlayError::ObjectAlloc("buffer"));
        }
        Ok(Self {
            gl: Rc::clone(gl),
            name,
        })
    }

    /// ### English
    /// Raw object name for bind calls.
    ///
    /// ### 中文
    /// 用于绑定调用的原始对象名。
    #[inline]
    pub fn name(&self) -> u32 {
        self.name
    }
}

impl Drop for GlBuffer {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.name);
    }
}

/// ### English
/// Owned 2D texture, deleted on drop.
///
/// ### 中文
/// 拥有所有权的 2D 纹理，drop 时删除。
pub struct GlTexture {
    /// ### English
    /// GL used for deletion.
    ///
    /// ### 中文
    /// 用于删除的 GL。
    gl: Rc<dyn GlApi>,
    /// ### English
    /// Raw object name.
    ///
    /// ### 中文
    /// 原始对象名。
    name: u32,
}

impl GlTexture {
    /// ### English
    /// Creates a new texture object.
    ///
    /// ### 中文
    /// 创建新的纹理对象。
    pub fn new(gl: &Rc<dyn GlApi>) -> Result<Self, OverlayError> {
        let name = gl.create_texture();
        if name == 0 {
            return Err(OverlayError::ObjectAlloc("texture"));
        }
        Ok(Self {
            gl: Rc::clone(gl),
            name,
        })
    }

    /// ### English
    /// Raw object name for bind calls.
    ///
    /// ### 中文
    /// 用于绑定调用的原始对象名。
    #[inline]
    pub fn name(&self) -> u32 {
        self.name
    }
}

impl Drop for GlTexture {
    fn drop(&mut self) {
        self.gl.delete_texture(self.name);
    }
}

/// ### English
/// Owned vertex array object, deleted on drop.
///
/// ### 中文
/// 拥有所有权的 vertex array 对象，drop 时删除。
pub struct GlVertexArray {
    /// ### English
    /// GL used for deletion.
    ///
    /// ### 中文
    /// 用于删除的 GL。
    gl: Rc<dyn GlApi>,
    /// ### English
    /// Raw object name.
    ///
    /// ### 中文
    /// 原始对象名。
    name: u32,
}

impl GlVertexArray {
    /// ### English
    /// Creates a new vertex array object.
    ///
    /// ### 中文
    /// 创建新的 vertex array 对象。
    pub fn new(gl: &Rc<dyn GlApi>) -> Result<Self, OverlayError> {
        let name = gl.create_vertex_array();
        if name == 0 {
            return Err(OverlayError::ObjectAlloc("vertex array"));
        }
        Ok(Self {
            gl: Rc::clone(gl),
            name,
        })
    }

    /// ### English
    /// Raw object name for bind calls.
    ///
    /// ### 中文
    /// 用于绑定调用的原始对象名。
    #[inline]
    pub fn name(&self) -> u32 {
        self.name
    }
}

impl Drop for GlVertexArray {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.name);
    }
}

/// ### English
/// Owned, linked shader program, deleted on drop.
///
/// ### 中文
/// 拥有所有权的已链接着色器程序，drop 时删除。
pub struct GlProgram {
    /// ### English
    /// GL used for deletion.
    ///
    /// ### 中文
    /// 用于删除的 GL。
    gl: Rc<dyn GlApi>,
    /// ### English
    /// Raw object name.
    ///
    /// ### 中文
    /// 原始对象名。
    name: u32,
}

impl GlProgram {
    /// ### English
    /// Compiles both stages and links them into a program.
    ///
    /// Shader objects are deleted before returning on every path, success or
    /// failure.
    ///
    /// #### Parameters
    /// - `vertex_src`: Vertex stage GLSL source.
    /// - `fragment_src`: Fragment stage GLSL source.
    ///
    /// ### 中文
    /// 编译两个着色阶段并链接为 program。
    ///
    /// 无论成功或失败，着色器对象都会在返回前删除。
    ///
    /// #### 参数
    /// - `vertex_src`：顶点阶段 GLSL 源码。
    /// - `fragment_src`：片段阶段 GLSL 源码。
    pub fn link(
        gl: &Rc<dyn GlApi>,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, OverlayError> {
        let vertex = compile_stage(gl, glow::VERTEX_SHADER, "vertex", vertex_src)?;
        let fragment = match compile_stage(gl, glow::FRAGMENT_SHADER, "fragment", fragment_src) {
            Ok(fragment) => fragment,
            Err(err) => {
                gl.delete_shader(vertex);
                return Err(err);
            }
        };

        let name = gl.create_program();
        if name == 0 {
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);
            return Err(OverlayError::ObjectAlloc("program"));
        }

        gl.attach_shader(name, vertex);
        gl.attach_shader(name, fragment);
        gl.link_program(name);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        if !gl.program_link_ok(name) {
            let log = gl.program_info_log(name);
            gl.delete_program(name);
            return Err(OverlayError::ProgramLink(log));
        }

        Ok(Self {
            gl: Rc::clone(gl),
            name,
        })
    }

    /// ### English
    /// Raw object name for `use_program` / uniform lookup.
    ///
    /// ### 中文
    /// 用于 `use_program` / uniform 查询的原始对象名。
    #[inline]
    pub fn name(&self) -> u32 {
        self.name
    }
}

impl Drop for GlProgram {
    fn drop(&mut self) {
        self.gl.delete_program(self.name);
    }
}

fn compile_stage(
    gl: &Rc<dyn GlApi>,
    kind: u32,
    stage: &'static str,
    source: &str,
) -> Result<u32, OverlayError> {
    let shader = gl.create_shader(kind);
    if shader == 0 {
        return Err(OverlayError::ObjectAlloc("shader"));
    }

    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.shader_compile_ok(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(OverlayError::ShaderCompile { stage, log });
    }

    Ok(shader)
}
