//! The boundary between the object wrappers and the graphics driver.
//!
//! Wrappers never call into `gl` directly; they go through a [`Driver`] so
//! that the ambient bind-then-operate sequences stay in one place.

use super::error::GlResult;
use super::shader::shader::Stage;
use super::texture::PixelFormat;
use super::uniform::{UniformLocation, UniformValue};
use gl::types::*;
use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::c_void;
use std::ptr;

/// The OpenGL ES 2.0 object-management and shader-compilation entry points.
///
/// Calls that name a target implicitly (`tex_image_2d`, `renderbuffer_storage`,
/// the frame buffer calls) act on whatever the matching `bind_*` call last
/// selected.
///
/// Every call that changes driver state reports its own error. Creation,
/// queries and deletion have no error to return, so an implementation must
/// still leave no pending error behind for the next call to pick up.
pub trait Driver {
    fn create_shader(&self, stage: Stage) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &str) -> GlResult<()>;
    fn compile_shader(&self, shader: GLuint) -> GlResult<()>;
    fn shader_parameter(&self, shader: GLuint, pname: GLenum) -> GLint;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint) -> GlResult<()>;
    fn detach_shader(&self, program: GLuint, shader: GLuint) -> GlResult<()>;
    fn bind_attrib_location(&self, program: GLuint, index: GLuint, name: &CStr) -> GlResult<()>;
    fn link_program(&self, program: GLuint) -> GlResult<()>;
    fn validate_program(&self, program: GLuint) -> GlResult<()>;
    fn program_parameter(&self, program: GLuint, pname: GLenum) -> GLint;
    fn program_info_log(&self, program: GLuint) -> String;
    fn uniform_location(&self, program: GLuint, name: &CStr) -> UniformLocation;
    fn use_program(&self, program: GLuint) -> GlResult<()>;
    fn uniform(&self, location: UniformLocation, value: UniformValue) -> GlResult<()>;
    fn delete_program(&self, program: GLuint);

    fn gen_texture(&self) -> GLuint;
    fn bind_texture(&self, texture: GLuint) -> GlResult<()>;
    fn tex_image_2d(
        &self,
        level: GLint,
        format: &PixelFormat,
        width: GLsizei,
        height: GLsizei,
        data: Option<&[u8]>,
    ) -> GlResult<()>;
    fn tex_parameter(&self, pname: GLenum, param: GLint) -> GlResult<()>;
    fn delete_texture(&self, texture: GLuint);

    fn gen_renderbuffer(&self) -> GLuint;
    fn bind_renderbuffer(&self, renderbuffer: GLuint) -> GlResult<()>;
    fn renderbuffer_storage(&self, format: GLenum, width: GLsizei, height: GLsizei) -> GlResult<()>;
    fn delete_renderbuffer(&self, renderbuffer: GLuint);

    fn gen_framebuffer(&self) -> GLuint;
    fn bind_framebuffer(&self, framebuffer: GLuint) -> GlResult<()>;
    fn framebuffer_texture_2d(&self, attachment: GLenum, texture: GLuint, level: GLint) -> GlResult<()>;
    fn framebuffer_renderbuffer(&self, attachment: GLenum, renderbuffer: GLuint) -> GlResult<()>;
    fn check_framebuffer_status(&self) -> GLenum;
    fn delete_framebuffer(&self, framebuffer: GLuint);
}

/// A [`Driver`] backed by the function pointers of the current GL context.
#[derive(Debug)]
pub struct GlDriver {
    _marker: PhantomData<*mut ()>,
}

impl GlDriver {
    /// Loads the GL entry points through `loader` and returns a driver
    /// for the context that is current on this thread.
    pub fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        debug!("loaded GL entry points");
        GlDriver { _marker: PhantomData }
    }
}

// Clears the error flag of a call whose signature has no room for it, so the
// next checked call does not report it as its own.
fn settle<T>(call: &str, result: GlResult<T>, fallback: T) -> T {
    result.unwrap_or_else(|err| {
        warn!("{} failed: {}", call, err);
        fallback
    })
}

fn read_log(length: GLint, read: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if length <= 0 {
        return String::new();
    }
    let mut buffer = vec![0u8; length as usize];
    let mut written = 0;
    read(length, &mut written, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buffer).into_owned()
}

impl Driver for GlDriver {
    fn create_shader(&self, stage: Stage) -> GLuint {
        settle("glCreateShader", unsafe { gl_call!(CreateShader(stage as GLenum)) }, 0)
    }

    fn shader_source(&self, shader: GLuint, source: &str) -> GlResult<()> {
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        unsafe { gl_call!(ShaderSource(shader, 1, &ptr, &len)) }
    }

    fn compile_shader(&self, shader: GLuint) -> GlResult<()> {
        unsafe { gl_call!(CompileShader(shader)) }
    }

    fn shader_parameter(&self, shader: GLuint, pname: GLenum) -> GLint {
        let mut value = 0;
        let result = unsafe { gl_call!(GetShaderiv(shader, pname, &mut value)) };
        settle("glGetShaderiv", result.map(|_| value), 0)
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let length = self.shader_parameter(shader, gl::INFO_LOG_LENGTH);
        read_log(length, |len, written, buf| {
            let result = unsafe { gl_call!(GetShaderInfoLog(shader, len, written, buf)) };
            settle("glGetShaderInfoLog", result, ())
        })
    }

    fn delete_shader(&self, shader: GLuint) {
        settle("glDeleteShader", unsafe { gl_call!(DeleteShader(shader)) }, ())
    }

    fn create_program(&self) -> GLuint {
        settle("glCreateProgram", unsafe { gl_call!(CreateProgram()) }, 0)
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) -> GlResult<()> {
        unsafe { gl_call!(AttachShader(program, shader)) }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) -> GlResult<()> {
        unsafe { gl_call!(DetachShader(program, shader)) }
    }

    fn bind_attrib_location(&self, program: GLuint, index: GLuint, name: &CStr) -> GlResult<()> {
        unsafe { gl_call!(BindAttribLocation(program, index, name.as_ptr())) }
    }

    fn link_program(&self, program: GLuint) -> GlResult<()> {
        unsafe { gl_call!(LinkProgram(program)) }
    }

    fn validate_program(&self, program: GLuint) -> GlResult<()> {
        unsafe { gl_call!(ValidateProgram(program)) }
    }

    fn program_parameter(&self, program: GLuint, pname: GLenum) -> GLint {
        let mut value = 0;
        let result = unsafe { gl_call!(GetProgramiv(program, pname, &mut value)) };
        settle("glGetProgramiv", result.map(|_| value), 0)
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let length = self.program_parameter(program, gl::INFO_LOG_LENGTH);
        read_log(length, |len, written, buf| {
            let result = unsafe { gl_call!(GetProgramInfoLog(program, len, written, buf)) };
            settle("glGetProgramInfoLog", result, ())
        })
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> UniformLocation {
        settle("glGetUniformLocation", unsafe { gl_call!(GetUniformLocation(program, name.as_ptr())) }, -1)
    }

    fn use_program(&self, program: GLuint) -> GlResult<()> {
        unsafe { gl_call!(UseProgram(program)) }
    }

    fn uniform(&self, location: UniformLocation, value: UniformValue) -> GlResult<()> {
        unsafe {
            match value {
                UniformValue::Float(v) => gl_call!(Uniform1f(location, v)),
                UniformValue::Vec2(v) => gl_call!(Uniform2f(location, v[0], v[1])),
                UniformValue::Vec3(v) => gl_call!(Uniform3f(location, v[0], v[1], v[2])),
                UniformValue::Vec4(v) => gl_call!(Uniform4f(location, v[0], v[1], v[2], v[3])),
                UniformValue::Int(v) => gl_call!(Uniform1i(location, v)),
                UniformValue::IVec2(v) => gl_call!(Uniform2i(location, v[0], v[1])),
                UniformValue::IVec3(v) => gl_call!(Uniform3i(location, v[0], v[1], v[2])),
                UniformValue::IVec4(v) => gl_call!(Uniform4i(location, v[0], v[1], v[2], v[3])),
                // ES 2.0 requires `transpose` to be false.
                UniformValue::Mat2(m) => {
                    gl_call!(UniformMatrix2fv(location, 1, gl::FALSE, m.as_ptr() as *const f32))
                }
                UniformValue::Mat3(m) => {
                    gl_call!(UniformMatrix3fv(location, 1, gl::FALSE, m.as_ptr() as *const f32))
                }
                UniformValue::Mat4(m) => {
                    gl_call!(UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr() as *const f32))
                }
            }
        }
    }

    fn delete_program(&self, program: GLuint) {
        settle("glDeleteProgram", unsafe { gl_call!(DeleteProgram(program)) }, ())
    }

    fn gen_texture(&self) -> GLuint {
        let mut id = 0;
        let result = unsafe { gl_call!(GenTextures(1, &mut id)) };
        settle("glGenTextures", result.map(|_| id), 0)
    }

    fn bind_texture(&self, texture: GLuint) -> GlResult<()> {
        unsafe { gl_call!(BindTexture(gl::TEXTURE_2D, texture)) }
    }

    fn tex_image_2d(
        &self,
        level: GLint,
        format: &PixelFormat,
        width: GLsizei,
        height: GLsizei,
        data: Option<&[u8]>,
    ) -> GlResult<()> {
        let pixels = data.map_or(ptr::null(), |data| data.as_ptr() as *const c_void);
        unsafe {
            gl_call!(TexImage2D(
                gl::TEXTURE_2D,
                level,
                format.internal_format as GLint,
                width,
                height,
                0,
                format.format,
                format.component_type,
                pixels
            ))
        }
    }

    fn tex_parameter(&self, pname: GLenum, param: GLint) -> GlResult<()> {
        unsafe { gl_call!(TexParameteri(gl::TEXTURE_2D, pname, param)) }
    }

    fn delete_texture(&self, texture: GLuint) {
        settle("glDeleteTextures", unsafe { gl_call!(DeleteTextures(1, &texture)) }, ())
    }

    fn gen_renderbuffer(&self) -> GLuint {
        let mut id = 0;
        let result = unsafe { gl_call!(GenRenderbuffers(1, &mut id)) };
        settle("glGenRenderbuffers", result.map(|_| id), 0)
    }

    fn bind_renderbuffer(&self, renderbuffer: GLuint) -> GlResult<()> {
        unsafe { gl_call!(BindRenderbuffer(gl::RENDERBUFFER, renderbuffer)) }
    }

    fn renderbuffer_storage(&self, format: GLenum, width: GLsizei, height: GLsizei) -> GlResult<()> {
        unsafe { gl_call!(RenderbufferStorage(gl::RENDERBUFFER, format, width, height)) }
    }

    fn delete_renderbuffer(&self, renderbuffer: GLuint) {
        settle("glDeleteRenderbuffers", unsafe { gl_call!(DeleteRenderbuffers(1, &renderbuffer)) }, ())
    }

    fn gen_framebuffer(&self) -> GLuint {
        let mut id = 0;
        let result = unsafe { gl_call!(GenFramebuffers(1, &mut id)) };
        settle("glGenFramebuffers", result.map(|_| id), 0)
    }

    fn bind_framebuffer(&self, framebuffer: GLuint) -> GlResult<()> {
        unsafe { gl_call!(BindFramebuffer(gl::FRAMEBUFFER, framebuffer)) }
    }

    fn framebuffer_texture_2d(&self, attachment: GLenum, texture: GLuint, level: GLint) -> GlResult<()> {
        unsafe {
            gl_call!(FramebufferTexture2D(gl::FRAMEBUFFER, attachment, gl::TEXTURE_2D, texture, level))
        }
    }

    fn framebuffer_renderbuffer(&self, attachment: GLenum, renderbuffer: GLuint) -> GlResult<()> {
        unsafe {
            gl_call!(FramebufferRenderbuffer(gl::FRAMEBUFFER, attachment, gl::RENDERBUFFER, renderbuffer))
        }
    }

    fn check_framebuffer_status(&self) -> GLenum {
        settle("glCheckFramebufferStatus", unsafe { gl_call!(CheckFramebufferStatus(gl::FRAMEBUFFER)) }, 0)
    }

    fn delete_framebuffer(&self, framebuffer: GLuint) {
        settle("glDeleteFramebuffers", unsafe { gl_call!(DeleteFramebuffers(1, &framebuffer)) }, ())
    }
}
