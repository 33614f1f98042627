//! The `neuromaster reference` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use neuromaster_core::catalog;

pub fn execute(id: Option<u8>) -> Result<()> {
    if let Some(id) = id {
        let nerve = catalog::by_id(id)?;
        println!("{} — {} ({})", nerve.roman, nerve.name, nerve.function_type);
        println!("  {}", nerve.description);
        println!("  Key function: {}", nerve.key_function);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Nerve", "Name", "Type", "Key function"]);
    for nerve in catalog::all() {
        table.add_row(vec![
            Cell::new(nerve.id),
            Cell::new(nerve.roman),
            Cell::new(nerve.name),
            Cell::new(nerve.function_type),
            Cell::new(nerve.key_function),
        ]);
    }
    println!("{table}");
    Ok(())
}
