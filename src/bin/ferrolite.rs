//! Command-line inspection tool: lists the schema of a database file, or
//! dumps the rows of one table.
//!
//! ```text
//! ferrolite <database>            list tables and indexes
//! ferrolite <database> <table>    dump every row of the table
//! ```

use std::process::ExitCode;

use eyre::Result;

use ferrolite::Database;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.as_slice() {
        [path] => list_schema(path),
        [path, table] => dump_table(path, table),
        _ => {
            eprintln!("usage: ferrolite <database> [table]");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ferrolite: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn list_schema(path: &str) -> Result<()> {
    let db = Database::open(path)?;
    let header = db.header();
    println!(
        "page size {} | {} pages | schema cookie {}",
        header.page_size(),
        header.database_size(),
        header.schema_cookie()
    );

    let catalog = db.schema()?;

    let mut tables: Vec<_> = catalog.tables().collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));
    for table in tables {
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| {
                if c.decl_type.is_empty() {
                    c.name.clone()
                } else {
                    format!("{} {}", c.name, c.decl_type)
                }
            })
            .collect();
        println!("table {} (root {}): {}", table.name, table.root_page, columns.join(", "));
    }

    let mut indexes: Vec<_> = catalog.indexes().collect();
    indexes.sort_by(|a, b| a.name.cmp(&b.name));
    for index in indexes {
        println!("index {} on {} (root {})", index.name, index.table_name, index.root_page);
    }
    Ok(())
}

fn dump_table(path: &str, table_name: &str) -> Result<()> {
    let db = Database::open(path)?;
    let catalog = db.schema()?;
    let table = catalog
        .table(table_name)
        .ok_or_else(|| eyre::eyre!("no such table: {}", table_name))?;

    for row in db.scan(table) {
        let row = row?;
        let rendered: Vec<String> = row.values.iter().map(|v| v.to_string()).collect();
        println!("{}|{}", row.rowid, rendered.join("|"));
    }
    Ok(())
}
