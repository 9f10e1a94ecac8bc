//! This build script copies the `memory.x` file from the crate root into a directory where
//! the linker can always find it at build time. It also records the build time, which the
//! firmware uses as its initial clock reference.

use std::{env, error::Error, fs::File, io::Write, path::PathBuf};

fn main() -> Result<(), Box<dyn Error>> {
    // Put memory layout in the output directory and ensure it's on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?);
    File::create(out.join("memory.x"))?.write_all(include_bytes!("memory.x"))?;
    println!("cargo:rustc-link-search={}", out.display());

    // Create rs file with current UTC time
    File::create(out.join("utc.rs"))?.write_fmt(format_args!(
        "const UTC_EPOCH: i64 = {:?};",
        chrono::Utc::now().timestamp()
    ))?;

    // Without `rerun-if-changed` this runs on every build, keeping `UTC_EPOCH` current.
    Ok(())
}
