mod byte_slice;
mod bytecode_buffer;
mod constant_pool;

pub use byte_slice::ByteSlice;
pub use bytecode_buffer::BytecodeBuffer;
pub use constant_pool::{ConstantPool, PoolValue};
