use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("voltmon version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
