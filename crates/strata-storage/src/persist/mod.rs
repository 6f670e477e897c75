//! Catalog and column persistence.
//!
//! `sync` flushes a database to a directory; `restore` loads it back.
//!
//! # Directory Structure
//!
//! ```text
//! <dir>/
//! ├── catalog.meta            # Database, tables, columns, index kinds
//! ├── <table>.<column>.col    # Raw little-endian i32 values, row order
//! └── <table>.<column>.sidx   # Sorted index pairs (sorted indexes only)
//! ```
//!
//! B+-trees are not written; restore rebuilds them from the column data.

mod format;

pub use format::{decode_frame, encode_frame, write_atomic};

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use bytes::{BufMut, BytesMut};
use strata_common::config::EngineConfig;
use strata_common::constants::{
    CATALOG_FILE, CATALOG_MAGIC, COLUMN_FILE_EXT, COLUMN_MAGIC, SORTED_INDEX_FILE_EXT,
    SORTED_INDEX_MAGIC,
};
use strata_common::error::{StrataError, StrataResult};
use strata_common::types::IndexKind;
use tracing::{info, warn};

use self::format::{put_str, PayloadReader};
use crate::catalog::Database;
use crate::column::Column;
use crate::index::{ColumnIndex, SortedIndex};
use crate::sort::SortEntry;
use crate::table::{check_name, Table};

/// Tag for a column without an index.
const NO_INDEX: u8 = 0;

/// Column metadata as recorded in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMeta {
    name: String,
    clustered: bool,
    index: Option<IndexKind>,
}

/// Table metadata as recorded in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableMeta {
    name: String,
    declared: usize,
    row_count: usize,
    columns: Vec<ColumnMeta>,
}

/// Writes every table of `db` into `dir`.
pub fn sync(db: &Database, dir: &Path) -> StrataResult<()> {
    fs::create_dir_all(dir)?;
    let sync_writes = db.config().sync_writes;

    let mut tables = Vec::with_capacity(db.table_count());
    for handle in db.tables() {
        let table = handle.read();
        for column in table.columns() {
            write_column(dir, table.name(), column, sync_writes)?;
        }
        tables.push(table_meta(&table));
    }

    let catalog = encode_catalog(db.name(), &tables);
    write_atomic(dir, CATALOG_FILE, &catalog, sync_writes)?;

    info!(
        database = db.name(),
        tables = tables.len(),
        dir = %dir.display(),
        "synced database"
    );
    Ok(())
}

/// Loads the database stored in `dir`.
///
/// Returns `Ok(None)` if the directory holds no catalog.
pub fn restore(dir: &Path, config: &EngineConfig) -> StrataResult<Option<Database>> {
    let catalog_path = dir.join(CATALOG_FILE);
    let data = match fs::read(&catalog_path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let payload = decode_frame(CATALOG_MAGIC, &data).map_err(|e| {
        warn!(path = %catalog_path.display(), error = %e, "unreadable catalog");
        e
    })?;
    let (name, tables) = decode_catalog(payload)?;

    let mut db = Database::new(name, config.clone());
    for meta in tables {
        db.attach_table(restore_table(dir, meta, config)?)?;
    }

    info!(
        database = db.name(),
        tables = db.table_count(),
        dir = %dir.display(),
        "restored database"
    );
    Ok(Some(db))
}

// =============================================================================
// Catalog encoding
// =============================================================================

fn table_meta(table: &Table) -> TableMeta {
    TableMeta {
        name: table.name().to_string(),
        declared: table.declared_columns(),
        row_count: table.row_count(),
        columns: table
            .columns()
            .iter()
            .map(|c| ColumnMeta {
                name: c.name().to_string(),
                clustered: c.is_clustered(),
                index: c.index_kind(),
            })
            .collect(),
    }
}

fn encode_catalog(db_name: &str, tables: &[TableMeta]) -> bytes::Bytes {
    let mut buf = BytesMut::new();
    put_str(&mut buf, db_name);
    buf.put_u32_le(tables.len() as u32);
    for table in tables {
        put_str(&mut buf, &table.name);
        buf.put_u32_le(table.declared as u32);
        buf.put_u64_le(table.row_count as u64);
        buf.put_u32_le(table.columns.len() as u32);
        for column in &table.columns {
            put_str(&mut buf, &column.name);
            buf.put_u8(u8::from(column.clustered));
            buf.put_u8(column.index.map_or(NO_INDEX, IndexKind::as_u8));
        }
    }
    encode_frame(CATALOG_MAGIC, &buf)
}

fn decode_catalog(payload: &[u8]) -> StrataResult<(String, Vec<TableMeta>)> {
    let mut reader = PayloadReader::new(payload);
    let db_name = reader.string("database name")?;
    let table_count = reader.u32("table count")?;

    let mut tables = Vec::new();
    for _ in 0..table_count {
        let name = reader.string("table name")?;
        let declared = reader.u32("declared columns")? as usize;
        let row_count = reader.u64("row count")? as usize;
        let column_count = reader.u32("column count")?;

        let mut columns = Vec::new();
        for _ in 0..column_count {
            let name = reader.string("column name")?;
            let clustered = reader.u8("clustered flag")? != 0;
            let tag = reader.u8("index kind")?;
            let index = match tag {
                NO_INDEX => None,
                tag => Some(IndexKind::from_u8(tag).ok_or_else(|| {
                    StrataError::corruption(format!("unknown index kind tag {tag}"))
                })?),
            };
            columns.push(ColumnMeta {
                name,
                clustered,
                index,
            });
        }
        tables.push(TableMeta {
            name,
            declared,
            row_count,
            columns,
        });
    }
    reader.finish("catalog")?;
    Ok((db_name, tables))
}

// =============================================================================
// Column files
// =============================================================================

fn data_file_name(table: &str, column: &str, ext: &str) -> StrataResult<String> {
    check_name("table", table)?;
    check_name("column", column)?;
    Ok(format!("{table}.{column}.{ext}"))
}

fn write_column(dir: &Path, table: &str, column: &Column, sync_writes: bool) -> StrataResult<()> {
    let values = column.values();
    let mut buf = BytesMut::with_capacity(8 + values.len() * 4);
    buf.put_u64_le(values.len() as u64);
    for &value in values {
        buf.put_i32_le(value);
    }
    let name = data_file_name(table, column.name(), COLUMN_FILE_EXT)?;
    write_atomic(dir, &name, &encode_frame(COLUMN_MAGIC, &buf), sync_writes)?;

    if let Some(ColumnIndex::Sorted(index)) = column.index() {
        let entries = index.entries();
        let mut buf = BytesMut::with_capacity(8 + entries.len() * 8);
        buf.put_u64_le(entries.len() as u64);
        for entry in entries {
            buf.put_i32_le(entry.value);
            buf.put_u32_le(entry.row);
        }
        let name = data_file_name(table, column.name(), SORTED_INDEX_FILE_EXT)?;
        write_atomic(dir, &name, &encode_frame(SORTED_INDEX_MAGIC, &buf), sync_writes)?;
    }
    Ok(())
}

fn read_frame(dir: &Path, name: &str, magic: u32) -> StrataResult<Vec<u8>> {
    let path = dir.join(name);
    let data = fs::read(&path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "missing data file");
        StrataError::from(e)
    })?;
    let payload = decode_frame(magic, &data).map_err(|e| {
        warn!(path = %path.display(), error = %e, "corrupt data file");
        e
    })?;
    Ok(payload.to_vec())
}

fn read_column_values(dir: &Path, table: &str, column: &str, rows: usize) -> StrataResult<Vec<i32>> {
    let name = data_file_name(table, column, COLUMN_FILE_EXT)?;
    let payload = read_frame(dir, &name, COLUMN_MAGIC)?;
    let mut reader = PayloadReader::new(&payload);

    let count = reader.count("value count", 4)?;
    if count != rows {
        return Err(StrataError::corruption(format!(
            "{name} holds {count} values, catalog records {rows} rows"
        )));
    }
    let mut values = Vec::new();
    values
        .try_reserve_exact(count)
        .map_err(|_| StrataError::out_of_memory("column", count))?;
    for _ in 0..count {
        values.push(reader.i32("column value")?);
    }
    reader.finish(&name)?;
    Ok(values)
}

fn read_sorted_index(dir: &Path, table: &str, column: &str, rows: usize) -> StrataResult<SortedIndex> {
    let name = data_file_name(table, column, SORTED_INDEX_FILE_EXT)?;
    let payload = read_frame(dir, &name, SORTED_INDEX_MAGIC)?;
    let mut reader = PayloadReader::new(&payload);

    let count = reader.count("entry count", 8)?;
    if count != rows {
        return Err(StrataError::corruption(format!(
            "{name} holds {count} entries, catalog records {rows} rows"
        )));
    }
    let mut entries = Vec::new();
    entries
        .try_reserve_exact(count)
        .map_err(|_| StrataError::out_of_memory("sorted index", count))?;
    for _ in 0..count {
        let value = reader.i32("index value")?;
        let row = reader.u32("index position")?;
        if row as usize >= rows {
            return Err(StrataError::corruption(format!(
                "{name} references position {row} of {rows}"
            )));
        }
        entries.push(SortEntry::new(value, row));
    }
    reader.finish(&name)?;
    SortedIndex::from_entries(entries)
}

fn restore_table(dir: &Path, meta: TableMeta, config: &EngineConfig) -> StrataResult<Table> {
    let mut columns = Vec::with_capacity(meta.columns.len());
    for column_meta in &meta.columns {
        let values = read_column_values(dir, &meta.name, &column_meta.name, meta.row_count)?;
        let mut column = Column::from_values(column_meta.name.clone(), column_meta.clustered, values);

        match column_meta.index {
            Some(IndexKind::Sorted) => {
                let index = read_sorted_index(dir, &meta.name, &column_meta.name, meta.row_count)?;
                column.set_index(ColumnIndex::Sorted(index));
            }
            Some(IndexKind::BPlusTree) => {
                let index = ColumnIndex::build(
                    IndexKind::BPlusTree,
                    column.values(),
                    column_meta.clustered,
                    config,
                )?;
                column.set_index(index);
            }
            None => {}
        }
        columns.push(column);
    }

    Table::from_parts(meta.name, meta.declared, columns, config.clone())
}
