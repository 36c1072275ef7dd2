pub mod bundle_indexing;
pub mod gather_scatter;
pub mod index_set;
pub mod lane;
pub mod thread_dispatcher;
pub mod vector;
pub mod vector2_wide;
