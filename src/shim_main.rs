//! waylay-shim - the runtime behind every generated shim script
//!
//! Generated scripts export the shim identity (tool name, diverted
//! binary, version stamp) and exec this binary, which rewrites the
//! invocation per the tool's stored rules and replaces itself with the
//! real target.

use anyhow::Result;
use std::process::ExitCode;
use waylay_shim::run_shim;

fn main() -> ExitCode {
    env_logger::init();
    match run_main() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("waylay-shim: {e:#}");
            ExitCode::from(126)
        }
    }
}

fn run_main() -> Result<i32> {
    let exit_code = run_shim()?;
    Ok(exit_code)
}
