use cgmath::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};
use std::marker::PhantomData;

pub type UniformLocation = ::gl::types::GLint;

/// A uniform slot of a linked program, typed by the value it accepts.
///
/// Obtained from [`Program::uniform`](crate::Program::uniform) and written
/// with [`Program::set_uniform`](crate::Program::set_uniform).
#[derive(Debug)]
pub struct Uniform<T: ?Sized> {
    location: UniformLocation,
    _marker: PhantomData<*const T>,
}

impl<T: ?Sized> Uniform<T> {
    pub(crate) fn new(location: UniformLocation) -> Self {
        Uniform { location, _marker: PhantomData }
    }

    pub fn location(&self) -> UniformLocation {
        self.location
    }
}

/// Every uniform type an ES 2.0 shader can declare.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    IVec2([i32; 2]),
    IVec3([i32; 3]),
    IVec4([i32; 4]),
    Mat2([[f32; 2]; 2]),
    Mat3([[f32; 3]; 3]),
    Mat4([[f32; 4]; 4]),
}

pub trait UniformData {
    fn value(&self) -> UniformValue;
}

macro_rules! uniform {
    // Macro cleanliness means that we can't use `self` in the macro invocation scope
    // without first introducing it into scope there (slightly unfortunate)
    ($self:ident, $type:ty => $variant:ident($expr:expr)) => (
        impl UniformData for $type {
            #[inline(always)]
            fn value(&$self) -> UniformValue {
                UniformValue::$variant($expr)
            }
        }
    )
}

uniform!(self, f32 => Float(*self));
uniform!(self, [f32; 1] => Float(self[0]));
uniform!(self, [f32; 2] => Vec2(*self));
uniform!(self, [f32; 3] => Vec3(*self));
uniform!(self, [f32; 4] => Vec4(*self));
uniform!(self, (f32,) => Float(self.0));
uniform!(self, (f32, f32) => Vec2([self.0, self.1]));
uniform!(self, (f32, f32, f32) => Vec3([self.0, self.1, self.2]));
uniform!(self, (f32, f32, f32, f32) => Vec4([self.0, self.1, self.2, self.3]));
uniform!(self, Vector2<f32> => Vec2([self.x, self.y]));
uniform!(self, Vector3<f32> => Vec3([self.x, self.y, self.z]));
uniform!(self, Vector4<f32> => Vec4([self.x, self.y, self.z, self.w]));

// Booleans and samplers are set through the integer entry points.
uniform!(self, i32 => Int(*self));
uniform!(self, bool => Int(*self as i32));
uniform!(self, [i32; 1] => Int(self[0]));
uniform!(self, [i32; 2] => IVec2(*self));
uniform!(self, [i32; 3] => IVec3(*self));
uniform!(self, [i32; 4] => IVec4(*self));
uniform!(self, (i32,) => Int(self.0));
uniform!(self, (i32, i32) => IVec2([self.0, self.1]));
uniform!(self, (i32, i32, i32) => IVec3([self.0, self.1, self.2]));
uniform!(self, (i32, i32, i32, i32) => IVec4([self.0, self.1, self.2, self.3]));
uniform!(self, Vector2<i32> => IVec2([self.x, self.y]));
uniform!(self, Vector3<i32> => IVec3([self.x, self.y, self.z]));
uniform!(self, Vector4<i32> => IVec4([self.x, self.y, self.z, self.w]));

uniform!(self, Matrix2<f32> => Mat2((*self).into()));
uniform!(self, Matrix3<f32> => Mat3((*self).into()));
uniform!(self, Matrix4<f32> => Mat4((*self).into()));
