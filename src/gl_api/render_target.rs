use crate::gl_api::driver::{Driver, GlDriver};
use crate::gl_api::error::{CreationError, GlResult, ObjectKind};
use gl::types::*;

/// Storage formats ES 2.0 guarantees for render buffers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum RenderTargetFormat {
    Rgba4 = gl::RGBA4,
    Rgb5A1 = gl::RGB5_A1,
    Rgb565 = gl::RGB565,
    Depth16 = gl::DEPTH_COMPONENT16,
    Stencil8 = gl::STENCIL_INDEX8,
}

/// One driver render buffer object.
#[derive(Debug)]
pub struct RenderTarget<'gl, D: Driver = GlDriver> {
    gl: &'gl D,
    id: GLuint,
}

impl<'gl, D: Driver> RenderTarget<'gl, D> {
    pub fn new(gl: &'gl D) -> Result<Self, CreationError> {
        match gl.gen_renderbuffer() {
            0 => Err(CreationError(ObjectKind::RenderTarget)),
            id => {
                debug!("created render buffer {}", id);
                Ok(RenderTarget { gl, id })
            }
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn bind(&self) -> GlResult<()> {
        trace!("binding render buffer {}", self.id);
        self.gl.bind_renderbuffer(self.id)
    }

    pub fn make_storage(&self, width: u32, height: u32, format: RenderTargetFormat) -> GlResult<()> {
        self.bind()?;
        self.gl
            .renderbuffer_storage(format as GLenum, width as GLsizei, height as GLsizei)
    }
}

impl<'gl, D: Driver> Drop for RenderTarget<'gl, D> {
    fn drop(&mut self) {
        if self.id != 0 {
            debug!("deleting render buffer {}", self.id);
            self.gl.delete_renderbuffer(self.id);
            self.id = 0;
        }
    }
}
