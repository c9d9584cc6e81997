//! The structured test programs that hints are applied to.
//!
//! A [`Program`] is a sequence of [`Call`]s, and each call owns a tree of
//! [`Arg`]s. Only two kinds of argument carry hints: integer constants
//! ([`ScalarConstant`]) and fixed-length byte buffers ([`ByteBuffer`]).
//! Pointers and groups are walked through to reach the arguments they contain;
//! every other kind is left alone.

use crate::{comps::write_hex, Error, Result, Width};
use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

/// A test program: an ordered sequence of calls.
///
/// Cloning a program is a deep copy; clones share no state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Program {
    /// The calls of this program, in execution order.
    pub calls: Vec<Call>,
}

/// A single call to an API or system entry point.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Call {
    /// The name of the entry point being called.
    pub name: String,
    /// The call's arguments, in order.
    pub args: Vec<Arg>,
}

/// A call argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Arg {
    /// An integer constant. Receives scalar hints.
    Const(ScalarConstant),

    /// A byte buffer. Receives buffer hints when its length is fixed.
    Data(ByteBuffer),

    /// A pointer. The address is never hinted, but the pointee is.
    Pointer {
        /// The address stored in the pointer.
        addr: u64,
        /// The argument the pointer refers to, if any.
        pointee: Option<Box<Arg>>,
    },

    /// A struct or array of inner arguments, all of which are hinted.
    Group(Vec<Arg>),

    /// A union with its active option. Not hinted.
    Union {
        /// Index of the active option.
        index: usize,
        /// The active option's argument.
        option: Box<Arg>,
    },

    /// A reference to a resource produced by an earlier call. Not hinted.
    Resource {
        /// The resource's identifier.
        id: u64,
    },
}

/// An integer constant with a declared width and signedness.
///
/// The value is always stored as its unsigned bit pattern and always fits in
/// the declared width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScalarConstant {
    value: u64,
    width: Width,
    signed: bool,
}

/// Whether a byte buffer's length is fixed or variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferLen {
    /// The buffer's length is fixed by its type.
    Fixed,
    /// The buffer's length may vary. Such buffers are often referenced by
    /// length fields elsewhere in the program.
    Variable,
}

/// A byte buffer argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ByteBuffer {
    /// The buffer's contents.
    pub bytes: Vec<u8>,
    /// Whether `bytes.len()` is fixed.
    pub len: BufferLen,
}

/// The location of one argument within a program.
///
/// `steps` descends from the call's argument list: the first step indexes the
/// call's arguments, and each further step indexes a group member. A pointer
/// is descended through implicitly, using step `0` for its pointee.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArgPath {
    /// Index of the call in the program.
    pub call: usize,
    /// Steps from the call's argument list down to the argument.
    pub steps: Vec<usize>,
}

impl Program {
    /// Create a new program from its calls.
    pub fn new(calls: Vec<Call>) -> Self {
        Self { calls }
    }

    /// Get the argument at `path`.
    pub fn arg(&self, path: &ArgPath) -> Result<&Arg> {
        let call = self.calls.get(path.call).ok_or_else(Error::invalid_path)?;
        let (first, rest) = path.steps.split_first().ok_or_else(Error::invalid_path)?;
        let mut arg = call.args.get(*first).ok_or_else(Error::invalid_path)?;
        for &step in rest {
            arg = arg.child(step).ok_or_else(Error::invalid_path)?;
        }
        Ok(arg)
    }

    /// Get a mutable reference to the argument at `path`.
    pub fn arg_mut(&mut self, path: &ArgPath) -> Result<&mut Arg> {
        let call = self
            .calls
            .get_mut(path.call)
            .ok_or_else(Error::invalid_path)?;
        let (first, rest) = path.steps.split_first().ok_or_else(Error::invalid_path)?;
        let mut arg = call.args.get_mut(*first).ok_or_else(Error::invalid_path)?;
        for &step in rest {
            arg = arg.child_mut(step).ok_or_else(Error::invalid_path)?;
        }
        Ok(arg)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for call in &self.calls {
            writeln!(f, "{call}")?;
        }
        Ok(())
    }
}

impl Call {
    /// Create a new call to `name` with the given arguments.
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

impl Arg {
    /// Create a constant argument, checking that `value` fits in `width`.
    pub fn constant(value: u64, width: Width) -> Result<Self> {
        Ok(Arg::Const(ScalarConstant::new(value, width, false)?))
    }

    /// Create a fixed-length byte buffer argument.
    pub fn fixed_data(bytes: impl Into<Vec<u8>>) -> Self {
        Arg::Data(ByteBuffer::fixed(bytes))
    }

    /// Create a variable-length byte buffer argument.
    pub fn variable_data(bytes: impl Into<Vec<u8>>) -> Self {
        Arg::Data(ByteBuffer::variable(bytes))
    }

    /// Create a pointer to `pointee` at address `addr`.
    pub fn pointer(addr: u64, pointee: Arg) -> Self {
        Arg::Pointer {
            addr,
            pointee: Some(Box::new(pointee)),
        }
    }

    /// The `index`th child reachable by hinting, if any.
    ///
    /// Pointers have their pointee as child `0`. Groups have their members.
    /// Unions are opaque.
    pub(crate) fn child(&self, index: usize) -> Option<&Arg> {
        match self {
            Arg::Pointer {
                pointee: Some(p), ..
            } if index == 0 => Some(&**p),
            Arg::Group(members) => members.get(index),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> Option<&mut Arg> {
        match self {
            Arg::Pointer {
                pointee: Some(p), ..
            } if index == 0 => Some(&mut **p),
            Arg::Group(members) => members.get_mut(index),
            _ => None,
        }
    }

    /// The number of children reachable by hinting.
    pub(crate) fn child_count(&self) -> usize {
        match self {
            Arg::Pointer {
                pointee: Some(_), ..
            } => 1,
            Arg::Group(members) => members.len(),
            _ => 0,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Const(c) => write!(f, "{c}"),
            Arg::Data(d) => write_hex(f, &d.bytes),
            Arg::Pointer { addr, pointee } => {
                write!(f, "&({addr:#x})")?;
                match pointee {
                    Some(p) => write!(f, "={p}"),
                    None => write!(f, "=nil"),
                }
            }
            Arg::Group(members) => {
                write!(f, "{{")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{m}")?;
                }
                write!(f, "}}")
            }
            Arg::Union { index, option } => write!(f, "@{index}={option}"),
            Arg::Resource { id } => write!(f, "r{id}"),
        }
    }
}

impl ScalarConstant {
    /// Create a new constant, checking that `value` fits in `width`.
    ///
    /// Signed values are given as their two's-complement bit pattern within
    /// `width`, for example `-1i8` is `0xff`.
    pub fn new(value: u64, width: Width, signed: bool) -> Result<Self> {
        if !width.fits(value) {
            return Err(Error::value_out_of_range(value, width));
        }
        Ok(Self {
            value,
            width,
            signed,
        })
    }

    /// Like [`ScalarConstant::new`] but takes the width as a bit count.
    pub fn with_bits(value: u64, bits: u32, signed: bool) -> Result<Self> {
        let width = Width::from_bits(bits).ok_or_else(|| Error::invalid_width(bits))?;
        Self::new(value, width, signed)
    }

    /// The constant's value, as an unsigned bit pattern.
    #[inline]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// The constant's declared width.
    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    /// Whether the constant's type is signed.
    #[inline]
    pub fn signed(&self) -> bool {
        self.signed
    }

    /// Replace the value, checking that it fits in this constant's width.
    pub fn set_value(&mut self, value: u64) -> Result<()> {
        if !self.width.fits(value) {
            return Err(Error::value_out_of_range(value, self.width));
        }
        self.value = value;
        Ok(())
    }
}

impl fmt::Display for ScalarConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.value)
    }
}

impl ByteBuffer {
    /// Create a fixed-length buffer.
    pub fn fixed(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            len: BufferLen::Fixed,
        }
    }

    /// Create a variable-length buffer.
    pub fn variable(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            len: BufferLen::Variable,
        }
    }

    /// Whether this buffer's length is fixed.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.len == BufferLen::Fixed
    }
}
