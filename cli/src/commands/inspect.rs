use anyhow::Result;
use sitefill::inspect_layer;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::InspectArgs) -> Result<()> {
    let summary = inspect_layer(&args.path, args.sample)?;
    print!("{summary}");
    Ok(())
}
