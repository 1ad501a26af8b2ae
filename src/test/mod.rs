
pub use heap_storage::test_heap_storage;
