use super::{collect_status, Status};
use crate::gl_api::driver::{Driver, GlDriver};
use crate::gl_api::error::{CreationError, GlError, GlResult, ObjectKind};
use gl::types::*;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// The pipeline stage a shader object is compiled for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum Stage {
    Vertex = gl::VERTEX_SHADER,
    Fragment = gl::FRAGMENT_SHADER,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Gl(#[from] GlError),
}

/// One driver shader object. The handle drops to 0 once a compile failure
/// has been reported, after which every call on the shader does nothing.
#[derive(Debug)]
pub struct Shader<'gl, D: Driver = GlDriver> {
    gl: &'gl D,
    id: GLuint,
    stage: Stage,
}

impl<'gl, D: Driver> Shader<'gl, D> {
    pub fn new(gl: &'gl D, stage: Stage) -> Result<Self, CreationError> {
        match gl.create_shader(stage) {
            0 => Err(CreationError(ObjectKind::Shader)),
            id => {
                debug!("created {} shader {}", stage, id);
                Ok(Shader { gl, id, stage })
            }
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_live(&self) -> bool {
        self.id != 0
    }

    /// Replaces the shader's source and asks the driver to compile it.
    /// Check the outcome with [`status`](Shader::status).
    pub fn source(&self, src: &str) -> GlResult<()> {
        if self.id == 0 {
            return Ok(());
        }
        self.gl.shader_source(self.id, src)?;
        self.gl.compile_shader(self.id)
    }

    pub fn source_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SourceError> {
        let src = fs::read_to_string(path)?;
        self.source(&src)?;
        Ok(())
    }

    /// Reads the compile log and status. A failed compile releases the
    /// shader object, so asking again reports `(false, "")`.
    pub fn status(&mut self) -> Status {
        let driver = self.gl;
        let status = collect_status(
            &mut self.id,
            |id| driver.shader_info_log(id),
            |id| driver.shader_parameter(id, gl::COMPILE_STATUS),
            |id| driver.delete_shader(id),
        );
        if !status.success && !status.log.is_empty() {
            warn!("{} shader failed to compile:\n{}", self.stage, status.log);
        }
        status
    }
}

impl<'gl, D: Driver> Drop for Shader<'gl, D> {
    fn drop(&mut self) {
        if self.id != 0 {
            debug!("deleting {} shader {}", self.stage, self.id);
            self.gl.delete_shader(self.id);
            self.id = 0;
        }
    }
}
