#[macro_use]
pub mod error;

pub mod driver;
pub mod framebuffer;
pub mod render_target;
pub mod shader;
pub mod texture;
pub mod uniform;

#[cfg(test)]
pub(crate) mod fake;
