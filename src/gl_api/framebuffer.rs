use crate::gl_api::driver::{Driver, GlDriver};
use crate::gl_api::error::{CreationError, GlResult, ObjectKind};
use crate::gl_api::render_target::RenderTarget;
use crate::gl_api::texture::Texture;
use gl::types::*;

// ES 2.0 only; desktop GL has no equivalent, so the `gl` crate lacks it.
const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: GLenum = 0x8CD9;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum AttachmentPoint {
    Color = gl::COLOR_ATTACHMENT0,
    Depth = gl::DEPTH_ATTACHMENT,
    Stencil = gl::STENCIL_ATTACHMENT,
}

impl AttachmentPoint {
    fn slot(self) -> usize {
        match self {
            AttachmentPoint::Color => 0,
            AttachmentPoint::Depth => 1,
            AttachmentPoint::Stencil => 2,
        }
    }
}

/// Something that can supply pixels to a frame buffer attachment point.
#[derive(Debug)]
pub enum Attachment<'a, 'gl, D: Driver = GlDriver> {
    Texture { texture: &'a Texture<'gl, D>, level: u32 },
    RenderTarget(&'a RenderTarget<'gl, D>),
}

impl<'a, 'gl, D: Driver> Attachment<'a, 'gl, D> {
    pub fn texture_level(texture: &'a Texture<'gl, D>, level: u32) -> Self {
        Attachment::Texture { texture, level }
    }
}

// Manual impls: deriving would demand `D: Clone`.
impl<'a, 'gl, D: Driver> Clone for Attachment<'a, 'gl, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, 'gl, D: Driver> Copy for Attachment<'a, 'gl, D> {}

impl<'a, 'gl, D: Driver> From<&'a Texture<'gl, D>> for Attachment<'a, 'gl, D> {
    fn from(texture: &'a Texture<'gl, D>) -> Self {
        Attachment::Texture { texture, level: 0 }
    }
}

impl<'a, 'gl, D: Driver> From<&'a RenderTarget<'gl, D>> for Attachment<'a, 'gl, D> {
    fn from(target: &'a RenderTarget<'gl, D>) -> Self {
        Attachment::RenderTarget(target)
    }
}

/// Why the driver does or does not accept a frame buffer's attachments.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Completeness {
    Complete,
    IncompleteAttachment,
    MissingAttachment,
    IncompleteDimensions,
    Unsupported,
    Other(GLenum),
}

impl From<GLenum> for Completeness {
    fn from(status: GLenum) -> Self {
        match status {
            gl::FRAMEBUFFER_COMPLETE => Completeness::Complete,
            gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => Completeness::IncompleteAttachment,
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => Completeness::MissingAttachment,
            FRAMEBUFFER_INCOMPLETE_DIMENSIONS => Completeness::IncompleteDimensions,
            gl::FRAMEBUFFER_UNSUPPORTED => Completeness::Unsupported,
            other => Completeness::Other(other),
        }
    }
}

/// One driver frame buffer object.
///
/// Attached textures and render targets are borrowed for `'a`: none of them
/// can be dropped while the frame buffer still refers to it.
#[derive(Debug)]
pub struct FrameBuffer<'gl, 'a, D: Driver = GlDriver> {
    gl: &'gl D,
    id: GLuint,
    attachments: [Option<Attachment<'a, 'gl, D>>; 3],
}

impl<'gl, 'a, D: Driver> FrameBuffer<'gl, 'a, D> {
    pub fn new(gl: &'gl D) -> Result<Self, CreationError> {
        match gl.gen_framebuffer() {
            0 => Err(CreationError(ObjectKind::FrameBuffer)),
            id => {
                debug!("created frame buffer {}", id);
                Ok(FrameBuffer { gl, id, attachments: [None, None, None] })
            }
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn bind(&self) -> GlResult<()> {
        trace!("binding frame buffer {}", self.id);
        self.gl.bind_framebuffer(self.id)
    }

    /// Attaches `target` at `point`, replacing whatever was there. Other
    /// attachment points are left alone.
    pub fn attach<A>(&mut self, point: AttachmentPoint, target: A) -> GlResult<()>
    where
        A: Into<Attachment<'a, 'gl, D>>,
    {
        let attachment = target.into();
        self.bind()?;
        match attachment {
            Attachment::Texture { texture, level } => {
                self.gl.framebuffer_texture_2d(point as GLenum, texture.id(), level as GLint)?
            }
            Attachment::RenderTarget(target) => {
                self.gl.framebuffer_renderbuffer(point as GLenum, target.id())?
            }
        }
        self.attachments[point.slot()] = Some(attachment);
        Ok(())
    }

    pub fn detach(&mut self, point: AttachmentPoint) -> GlResult<()> {
        let previous = match self.attachments[point.slot()] {
            Some(attachment) => attachment,
            None => return Ok(()),
        };
        self.bind()?;
        match previous {
            Attachment::Texture { .. } => self.gl.framebuffer_texture_2d(point as GLenum, 0, 0)?,
            Attachment::RenderTarget(_) => self.gl.framebuffer_renderbuffer(point as GLenum, 0)?,
        }
        self.attachments[point.slot()] = None;
        Ok(())
    }

    pub fn attachment(&self, point: AttachmentPoint) -> Option<Attachment<'a, 'gl, D>> {
        self.attachments[point.slot()]
    }

    pub fn completeness(&self) -> GlResult<Completeness> {
        self.bind()?;
        Ok(Completeness::from(self.gl.check_framebuffer_status()))
    }

    /// Whether the driver can render into the current set of attachments.
    /// A frame buffer that cannot even be bound is not.
    pub fn status(&self) -> bool {
        match self.completeness() {
            Ok(completeness) => completeness == Completeness::Complete,
            Err(err) => {
                warn!("could not check frame buffer {}: {}", self.id, err);
                false
            }
        }
    }
}

impl<'gl, 'a, D: Driver> Drop for FrameBuffer<'gl, 'a, D> {
    fn drop(&mut self) {
        if self.id != 0 {
            debug!("deleting frame buffer {}", self.id);
            self.gl.delete_framebuffer(self.id);
            self.id = 0;
        }
    }
}
