//! Owned wrappers around OpenGL ES 2.0 objects.
//!
//! Every wrapper borrows the [`Driver`](gl_api::driver::Driver) that issued
//! its handle and releases that handle exactly once when dropped.

#[macro_use]
extern crate log;

#[macro_use]
pub mod gl_api;

pub use crate::gl_api::driver::{Driver, GlDriver};
pub use crate::gl_api::error::{CreationError, GlError, GlResult, ObjectKind};
pub use crate::gl_api::framebuffer::{Attachment, AttachmentPoint, Completeness, FrameBuffer};
pub use crate::gl_api::render_target::{RenderTarget, RenderTargetFormat};
pub use crate::gl_api::shader::program::{Program, ProgramError};
pub use crate::gl_api::shader::shader::{Shader, SourceError, Stage};
pub use crate::gl_api::shader::{pipeline_from_files, simple_pipeline, PipelineError, Status};
pub use crate::gl_api::texture::{Filter, PixelFormat, PixelKind, Texture, TextureError, Wrap};
pub use crate::gl_api::uniform::{Uniform, UniformData, UniformLocation, UniformValue};
