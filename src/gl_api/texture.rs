use crate::gl_api::driver::{Driver, GlDriver};
use crate::gl_api::error::{CreationError, GlError, GlResult, ObjectKind};
use gl::types::*;
use image::RgbaImage;
use thiserror::Error;

/// The pixel layouts a texture can be allocated with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PixelKind {
    /// 8-bit RGBA.
    Rgba8,
    /// 8-bit RGB, stored as RGBA8.
    Rgb8,
    /// 32-bit float RGB, transferred as float RGBA.
    Rgb32F,
}

/// The driver constants `glTexImage2D` needs for one [`PixelKind`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PixelFormat {
    pub internal_format: GLenum,
    pub format: GLenum,
    pub component_type: GLenum,
    /// Size of one pixel in the transfer format.
    pub bytes_per_pixel: usize,
}

// Indexed by `PixelKind as usize`. The sized internal formats come from
// OES_rgb8_rgba8 and EXT_color_buffer_float; the values match desktop GL.
static PIXEL_FORMATS: [PixelFormat; 3] = [
    PixelFormat {
        internal_format: gl::RGBA8,
        format: gl::RGBA,
        component_type: gl::UNSIGNED_BYTE,
        bytes_per_pixel: 4,
    },
    PixelFormat {
        internal_format: gl::RGBA8,
        format: gl::RGBA,
        component_type: gl::UNSIGNED_BYTE,
        bytes_per_pixel: 4,
    },
    PixelFormat {
        internal_format: gl::RGB32F,
        format: gl::RGBA,
        component_type: gl::FLOAT,
        bytes_per_pixel: 16,
    },
];

impl PixelKind {
    pub fn format(self) -> &'static PixelFormat {
        &PIXEL_FORMATS[self as usize]
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum Filter {
    Nearest = gl::NEAREST,
    Linear = gl::LINEAR,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum Wrap {
    Repeat = gl::REPEAT,
    ClampToEdge = gl::CLAMP_TO_EDGE,
    MirroredRepeat = gl::MIRRORED_REPEAT,
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("pixel data holds {actual} bytes but {expected} are needed")]
    DataTooSmall { expected: usize, actual: usize },
    #[error("a {width}x{height} image does not fit in memory")]
    TooLarge { width: u32, height: u32 },
    #[error(transparent)]
    Gl(#[from] GlError),
}

/// One driver 2-D texture object.
///
/// Every operation binds the texture first, so callers never depend on
/// which texture happens to be bound.
#[derive(Debug)]
pub struct Texture<'gl, D: Driver = GlDriver> {
    gl: &'gl D,
    id: GLuint,
}

impl<'gl, D: Driver> Texture<'gl, D> {
    pub fn new(gl: &'gl D) -> Result<Self, CreationError> {
        match gl.gen_texture() {
            0 => Err(CreationError(ObjectKind::Texture)),
            id => {
                debug!("created texture {}", id);
                Ok(Texture { gl, id })
            }
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn bind(&self) -> GlResult<()> {
        trace!("binding texture {}", self.id);
        self.gl.bind_texture(self.id)
    }

    /// Allocates storage for mip `level`, uploading `data` if given. The
    /// data must be laid out in the transfer format of `kind`.
    pub fn make_storage(
        &self,
        width: u32,
        height: u32,
        kind: PixelKind,
        level: u32,
        data: Option<&[u8]>,
    ) -> Result<(), TextureError> {
        let format = kind.format();
        if let Some(data) = data {
            let expected = (width as usize)
                .checked_mul(height as usize)
                .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel))
                .ok_or(TextureError::TooLarge { width, height })?;
            if data.len() < expected {
                return Err(TextureError::DataTooSmall { expected, actual: data.len() });
            }
        }

        self.bind()?;
        self.gl
            .tex_image_2d(level as GLint, format, width as GLsizei, height as GLsizei, data)?;
        Ok(())
    }

    /// Uninitialized level 0 storage.
    pub fn allocate(&self, width: u32, height: u32, kind: PixelKind) -> Result<(), TextureError> {
        self.make_storage(width, height, kind, 0, None)
    }

    pub fn upload_image(&self, image: &RgbaImage, level: u32) -> Result<(), TextureError> {
        let (width, height) = image.dimensions();
        self.make_storage(width, height, PixelKind::Rgba8, level, Some(&**image))
    }

    pub fn set_filter(&self, min: Filter, mag: Filter) -> GlResult<()> {
        self.bind()?;
        self.gl.tex_parameter(gl::TEXTURE_MIN_FILTER, min as GLint)?;
        self.gl.tex_parameter(gl::TEXTURE_MAG_FILTER, mag as GLint)
    }

    pub fn set_wrap(&self, s: Wrap, t: Wrap) -> GlResult<()> {
        self.bind()?;
        self.gl.tex_parameter(gl::TEXTURE_WRAP_S, s as GLint)?;
        self.gl.tex_parameter(gl::TEXTURE_WRAP_T, t as GLint)
    }
}

impl<'gl, D: Driver> Drop for Texture<'gl, D> {
    fn drop(&mut self) {
        if self.id != 0 {
            debug!("deleting texture {}", self.id);
            self.gl.delete_texture(self.id);
            self.id = 0;
        }
    }
}
