//! Test support shared by unit tests.


pub(crate) use memory::MemoryStore;
