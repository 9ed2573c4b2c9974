use crate::common::naming;
use crate::error::BindingError;
use crate::web::context::Context;
use crate::web::payload::{self, Payload, PayloadSource};
use std::any::{Any, TypeId, type_name};
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

/// Converts one path segment into the declared parameter type.
pub type PathConverter = fn(&str) -> Result<Box<dyn Any + Send>, String>;

/// Decodes and validates a payload parameter from the live context.
pub type PayloadDecoder = fn(PayloadSource, &Context) -> Result<Box<dyn Any + Send>, BindingError>;

/// How a parameter type is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Owned value, e.g. `i64` or `String`.
    Value,
    /// Shared instance, `Arc<T>`.
    Shared,
    /// The request context.
    Context,
    /// Request payload marker: `Body<T>`, `Form<T>` or `Query<T>`.
    Payload(PayloadSource),
}

/// Primitive family of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Bool,
    Int,
    Uint,
    Float,
    Char,
    String,
    Other,
}

impl PrimitiveKind {
    pub fn of<T: ?Sized + 'static>() -> Self {
        let id = TypeId::of::<T>();
        let any_of = |ids: &[TypeId]| ids.contains(&id);
        if id == TypeId::of::<bool>() {
            PrimitiveKind::Bool
        } else if any_of(&[
            TypeId::of::<i8>(),
            TypeId::of::<i16>(),
            TypeId::of::<i32>(),
            TypeId::of::<i64>(),
            TypeId::of::<i128>(),
            TypeId::of::<isize>(),
        ]) {
            PrimitiveKind::Int
        } else if any_of(&[
            TypeId::of::<u8>(),
            TypeId::of::<u16>(),
            TypeId::of::<u32>(),
            TypeId::of::<u64>(),
            TypeId::of::<u128>(),
            TypeId::of::<usize>(),
        ]) {
            PrimitiveKind::Uint
        } else if any_of(&[TypeId::of::<f32>(), TypeId::of::<f64>()]) {
            PrimitiveKind::Float
        } else if id == TypeId::of::<char>() {
            PrimitiveKind::Char
        } else if any_of(&[TypeId::of::<String>(), TypeId::of::<str>()]) {
            PrimitiveKind::String
        } else {
            PrimitiveKind::Other
        }
    }
}

/// Declaration of one method parameter, the receiver excluded.
#[derive(Clone)]
pub struct Param {
    name: String,
    type_name: &'static str,
    indirect_type_name: &'static str,
    kind: ParamKind,
    primitive: PrimitiveKind,
    converter: Option<PathConverter>,
    decoder: Option<PayloadDecoder>,
}

impl Param {
    /// Owned value bound from a path segment when it has a placeholder.
    pub fn value<T>(name: &str) -> Self
    where
        T: FromStr + Send + 'static,
        T::Err: Display,
    {
        Self {
            name: name.to_string(),
            type_name: type_name::<T>(),
            indirect_type_name: type_name::<T>(),
            kind: ParamKind::Value,
            primitive: PrimitiveKind::of::<T>(),
            converter: Some(convert::<T>),
            decoder: None,
        }
    }

    /// `Arc<T>` parameter, normally resolved from the dependency registry.
    pub fn shared<T: ?Sized + 'static>(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name::<Arc<T>>(),
            indirect_type_name: type_name::<T>(),
            kind: ParamKind::Shared,
            primitive: PrimitiveKind::of::<T>(),
            converter: None,
            decoder: None,
        }
    }

    pub fn context(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name::<Context>(),
            indirect_type_name: type_name::<Context>(),
            kind: ParamKind::Context,
            primitive: PrimitiveKind::Other,
            converter: None,
            decoder: None,
        }
    }

    /// Payload marker `W` wrapping the decoded type `T`.
    pub fn payload<W: 'static, T: Payload>(name: &str, source: PayloadSource) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name::<W>(),
            indirect_type_name: type_name::<T>(),
            kind: ParamKind::Payload(source),
            primitive: PrimitiveKind::Other,
            converter: None,
            decoder: Some(decode_erased::<T>),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type behind `Arc` or the payload marker.
    pub fn indirect_type_name(&self) -> &'static str {
        self.indirect_type_name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn primitive(&self) -> PrimitiveKind {
        self.primitive
    }

    /// Registry key of the indirect type.
    pub fn qualified_name(&self) -> String {
        naming::lower_camel_full_name(self.indirect_type_name)
    }

    pub(crate) fn converter(&self) -> Option<PathConverter> {
        self.converter
    }

    pub(crate) fn decoder(&self) -> Option<PayloadDecoder> {
        self.decoder
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Param")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("primitive", &self.primitive)
            .finish()
    }
}

fn convert<T>(raw: &str) -> Result<Box<dyn Any + Send>, String>
where
    T: FromStr + Send + 'static,
    T::Err: Display,
{
    raw.parse::<T>()
        .map(|value| Box::new(value) as Box<dyn Any + Send>)
        .map_err(|e| e.to_string())
}

fn decode_erased<T: Payload>(
    source: PayloadSource,
    ctx: &Context,
) -> Result<Box<dyn Any + Send>, BindingError> {
    payload::decode::<T>(source, ctx).map(|value| Box::new(value) as Box<dyn Any + Send>)
}

/// A bound argument before it is handed to the method.
pub enum Argument {
    /// Converted or decoded value, owned by the call.
    Value(Box<dyn Any + Send>),
    /// Registry instance; always an `Arc<T>` behind the `Any`.
    Instance(Arc<dyn Any + Send + Sync>),
}

impl Argument {
    pub fn downcast<T: 'static>(self) -> Option<T> {
        match self {
            Argument::Value(value) => value.downcast::<T>().ok().map(|value| *value),
            Argument::Instance(_) => None,
        }
    }

    pub fn downcast_shared<T: ?Sized + Send + Sync + 'static>(self) -> Option<Arc<T>> {
        match self {
            Argument::Instance(instance) => instance
                .downcast::<Arc<T>>()
                .ok()
                .map(|inner| Arc::clone(inner.as_ref())),
            Argument::Value(value) => value.downcast::<Arc<T>>().ok().map(|inner| *inner),
        }
    }
}

/// Parameter types a controller method may declare.
///
/// `describe` feeds the method table at startup, `from_argument` unpacks the
/// bound value at call time.
pub trait FromArgument: Sized + Send + 'static {
    fn describe(name: &str) -> Param;

    fn from_argument(argument: Argument) -> Option<Self>;
}

macro_rules! impl_value_argument {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromArgument for $ty {
                fn describe(name: &str) -> Param {
                    Param::value::<$ty>(name)
                }

                fn from_argument(argument: Argument) -> Option<Self> {
                    argument.downcast::<$ty>()
                }
            }
        )*
    };
}

impl_value_argument!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

impl<T: ?Sized + Send + Sync + 'static> FromArgument for Arc<T> {
    fn describe(name: &str) -> Param {
        Param::shared::<T>(name)
    }

    fn from_argument(argument: Argument) -> Option<Self> {
        argument.downcast_shared::<T>()
    }
}

/// Arguments of one call, in declaration order.
pub struct Args<'a> {
    slots: Vec<Option<Argument>>,
    context: &'a mut Context,
}

impl<'a> Args<'a> {
    pub fn new(slots: Vec<Option<Argument>>, context: &'a mut Context) -> Self {
        Self { slots, context }
    }

    /// Move the argument at `index` out, typed as `T`.
    pub fn take<T: FromArgument>(&mut self, index: usize) -> Result<T, BindingError> {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .and_then(T::from_argument)
            .ok_or(BindingError::Argument {
                index,
                expected: type_name::<T>(),
            })
    }

    pub fn context(&mut self) -> &mut Context {
        self.context
    }
}
