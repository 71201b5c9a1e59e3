use gl::types::GLenum;
use std::fmt;
use thiserror::Error;

pub type GlResult<T> = Result<T, GlError>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
#[error("OpenGL error {code:#06x} ({})", describe(.code))]
pub struct GlError {
    code: GLenum,
}

impl GlError {
    pub fn new(code: GLenum) -> Self {
        GlError { code }
    }

    pub fn code(&self) -> GLenum {
        self.code
    }

    fn get_raw() -> GLenum {
        unsafe { gl::GetError() }
    }

    pub fn map_value<T>(val: T) -> GlResult<T> {
        match Self::get_raw() {
            gl::NO_ERROR => Ok(val),
            // GL specification states that it is undefined to issue any GL
            // calls after an out of memory error is received.
            gl::OUT_OF_MEMORY => ::std::process::abort(),
            code => Err(GlError { code }),
        }
    }
}

fn describe(code: &GLenum) -> &'static str {
    match *code {
        gl::INVALID_ENUM => "invalid enum",
        gl::INVALID_VALUE => "invalid value",
        gl::INVALID_OPERATION => "invalid operation",
        gl::INVALID_FRAMEBUFFER_OPERATION => "invalid framebuffer operation",
        gl::OUT_OF_MEMORY => "out of memory",
        _ => "unknown",
    }
}

macro_rules! gl_call {
    ($name:ident($($args:expr),*)) => {{
        $crate::gl_api::error::GlError::map_value(::gl::$name($($args),*))
    }}
}

/// The kind of driver object a wrapper owns.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ObjectKind {
    Shader,
    Program,
    Texture,
    RenderTarget,
    FrameBuffer,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ObjectKind::Shader => "shader",
            ObjectKind::Program => "program",
            ObjectKind::Texture => "texture",
            ObjectKind::RenderTarget => "render buffer",
            ObjectKind::FrameBuffer => "frame buffer",
        })
    }
}

/// The driver handed back handle 0 when asked for a new object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
#[error("the driver could not allocate a {0} object")]
pub struct CreationError(pub ObjectKind);
