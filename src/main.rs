use anyhow::Result;

fn main() -> Result<()> {
    calls2bed::cli::run()
}
