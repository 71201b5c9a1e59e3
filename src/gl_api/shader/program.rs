use super::shader::{Shader, Stage};
use super::{collect_status, Status};
use crate::gl_api::driver::{Driver, GlDriver};
use crate::gl_api::error::{CreationError, GlError, GlResult, ObjectKind};
use crate::gl_api::uniform::{Uniform, UniformData, UniformLocation};
use gl::types::*;
use std::ffi::CString;
use std::mem;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("cannot link program {program}: no {stage} shader attached")]
    MissingStage { program: GLuint, stage: Stage },
    #[error("name {0:?} contains a nul byte")]
    InvalidName(String),
    #[error(transparent)]
    Gl(#[from] GlError),
}

/// One driver program object.
///
/// Attached shaders are borrowed for `'s`, so they stay alive until they
/// are detached or the program goes away. A failed link or validation
/// releases the program; every later call on it does nothing.
#[derive(Debug)]
pub struct Program<'gl, 's, D: Driver = GlDriver> {
    gl: &'gl D,
    id: GLuint,
    attached: Vec<&'s Shader<'gl, D>>,
}

impl<'gl, 's, D: Driver> Program<'gl, 's, D> {
    pub fn new(gl: &'gl D) -> Result<Self, CreationError> {
        match gl.create_program() {
            0 => Err(CreationError(ObjectKind::Program)),
            id => {
                debug!("created program {}", id);
                Ok(Program { gl, id, attached: Vec::new() })
            }
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn is_live(&self) -> bool {
        self.id != 0
    }

    pub fn attached(&self) -> &[&'s Shader<'gl, D>] {
        &self.attached
    }

    pub fn attach(&mut self, shader: &'s Shader<'gl, D>) -> GlResult<()> {
        if self.id == 0 || !shader.is_live() {
            return Ok(());
        }
        self.gl.attach_shader(self.id, shader.id())?;
        self.attached.push(shader);
        Ok(())
    }

    pub fn detach(&mut self, shader: &Shader<'gl, D>) -> GlResult<()> {
        let position = self.attached.iter().position(|attached| ::std::ptr::eq(*attached, shader));
        if let Some(index) = position {
            self.attached.remove(index);
            if self.id != 0 && shader.is_live() {
                self.gl.detach_shader(self.id, shader.id())?;
            }
        }
        Ok(())
    }

    /// Detaches every shader, giving back a program that borrows none.
    pub fn detach_all<'t>(mut self) -> GlResult<Program<'gl, 't, D>> {
        for shader in mem::replace(&mut self.attached, Vec::new()) {
            if self.id != 0 && shader.is_live() {
                self.gl.detach_shader(self.id, shader.id())?;
            }
        }
        // `self` is dropped with a zero handle, so ownership moves cleanly.
        let id = mem::replace(&mut self.id, 0);
        Ok(Program { gl: self.gl, id, attached: Vec::new() })
    }

    /// Fixes the vertex attribute slot of `name`. Only takes effect at the
    /// next link.
    pub fn bind_attrib_name(&self, name: &str, index: GLuint) -> Result<(), ProgramError> {
        if self.id == 0 {
            return Ok(());
        }
        let c_name = CString::new(name).map_err(|_| ProgramError::InvalidName(name.into()))?;
        self.gl.bind_attrib_location(self.id, index, &c_name)?;
        Ok(())
    }

    /// Asks the driver to link the attached shaders. Refuses without a live
    /// vertex and a live fragment shader attached. Check the outcome with
    /// [`link_status`](Program::link_status).
    pub fn link(&mut self) -> Result<(), ProgramError> {
        if self.id == 0 {
            return Ok(());
        }
        for &stage in &[Stage::Vertex, Stage::Fragment] {
            let present = self.attached.iter().any(|shader| shader.stage() == stage && shader.is_live());
            if !present {
                return Err(ProgramError::MissingStage { program: self.id, stage });
            }
        }
        self.gl.link_program(self.id)?;
        Ok(())
    }

    pub fn link_status(&mut self) -> Status {
        let status = self.check(gl::LINK_STATUS);
        if !status.success && !status.log.is_empty() {
            warn!("program failed to link:\n{}", status.log);
        }
        status
    }

    pub fn validate(&self) -> GlResult<()> {
        if self.id == 0 {
            return Ok(());
        }
        self.gl.validate_program(self.id)
    }

    pub fn validate_status(&mut self) -> Status {
        let status = self.check(gl::VALIDATE_STATUS);
        if !status.success && !status.log.is_empty() {
            warn!("program failed validation:\n{}", status.log);
        }
        status
    }

    fn check(&mut self, pname: GLenum) -> Status {
        let driver = self.gl;
        let status = collect_status(
            &mut self.id,
            |id| driver.program_info_log(id),
            |id| driver.program_parameter(id, pname),
            |id| driver.delete_program(id),
        );
        if !status.success {
            // The driver object is gone, and with it every attachment.
            self.attached.clear();
        }
        status
    }

    /// The slot of an active uniform, or `None` if `name` is not one.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        if self.id == 0 {
            return None;
        }
        let c_name = CString::new(name).ok()?;
        match self.gl.uniform_location(self.id, &c_name) {
            -1 => None,
            location => Some(location),
        }
    }

    pub fn uniform<T: ?Sized>(&self, name: &str) -> Option<Uniform<T>> {
        self.uniform_location(name).map(Uniform::new)
    }

    /// Makes this the current program.
    pub fn bind(&self) -> GlResult<()> {
        if self.id == 0 {
            return Ok(());
        }
        trace!("binding program {}", self.id);
        self.gl.use_program(self.id)
    }

    pub fn set_uniform<T: UniformData>(&self, uniform: &Uniform<T>, value: T) -> GlResult<()> {
        if self.id == 0 {
            return Ok(());
        }
        self.bind()?;
        self.gl.uniform(uniform.location(), value.value())
    }
}

impl<'gl, 's, D: Driver> Drop for Program<'gl, 's, D> {
    fn drop(&mut self) {
        if self.id != 0 {
            debug!("deleting program {}", self.id);
            self.gl.delete_program(self.id);
            self.id = 0;
        }
    }
}
