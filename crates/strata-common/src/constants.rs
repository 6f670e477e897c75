//! System-wide constants for StrataDB.
//!
//! The cache budgets here shape the sorter's run length and the join's block
//! length. They are defaults; `EngineConfig` can override them per instance.

// =============================================================================
// Cache Geometry
// =============================================================================

/// Size of a CPU cache line in bytes.
pub const CACHE_LINE_SIZE: usize = 64;

/// Bytes of cache the sorter assumes it may use for one in-place run.
///
/// 500 cache lines, roughly the L1 data cache of a commodity core.
pub const DEFAULT_SORT_CACHE_BYTES: usize = 500 * CACHE_LINE_SIZE;

/// Size of the L1 data cache assumed by the blocked join.
pub const L1_CACHE_SIZE: usize = 32 * 1024;

/// Bytes of one join block: a quarter of L1, so that a left block, a right
/// block and the output cursor all stay resident.
pub const DEFAULT_JOIN_BLOCK_BYTES: usize = L1_CACHE_SIZE / 4;

// =============================================================================
// Vector Constants
// =============================================================================

/// Initial capacity of a growable vector.
pub const DEFAULT_VECTOR_CAPACITY: usize = 8;

// =============================================================================
// B+-Tree Constants
// =============================================================================

/// Default B+-tree order. A node holds at most `2 * ORDER` keys.
pub const DEFAULT_BTREE_ORDER: usize = 16;

/// Smallest order for which split and redistribution stay well defined.
pub const MIN_BTREE_ORDER: usize = 2;

// =============================================================================
// Persistence Constants
// =============================================================================

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "./db";

/// Catalog metadata file name.
pub const CATALOG_FILE: &str = "catalog.meta";

/// Extension of raw column data files.
pub const COLUMN_FILE_EXT: &str = "col";

/// Extension of persisted sorted index files.
pub const SORTED_INDEX_FILE_EXT: &str = "sidx";

/// Suffix for files being written before the atomic rename.
pub const TMP_FILE_SUFFIX: &str = "tmp";

/// Magic number of the catalog file ("STRC").
pub const CATALOG_MAGIC: u32 = 0x5354_5243;

/// Magic number of column data files ("STRD").
pub const COLUMN_MAGIC: u32 = 0x5354_5244;

/// Magic number of sorted index files ("STRI").
pub const SORTED_INDEX_MAGIC: u32 = 0x5354_5249;

/// Version of the on-disk format.
pub const FORMAT_VERSION: u32 = 1;
