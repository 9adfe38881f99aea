//! Storage layer for task persistence.

mod memory;
mod rows;
mod supabase;
mod traits;

pub use memory::MemoryStorage;
pub use rows::{NewTaskRow, TaskRow, TaskRowPatch};
pub use supabase::SupabaseStorage;
pub use traits::{NewTask, Storage};
